// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, ColorImage, TextureHandle};

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(ctx: &eg::Context, w: u32, h: u32, bytes: &[u8], name: &str) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Load a texture from a cached poster; rejects anything that isn't roughly 2:3.
/// (UI thread only)
pub fn load_poster_texture(ctx: &eg::Context, path: &Path, name: &str) -> Result<TextureHandle, String> {
    let (w, h, bytes) = super::cache::load_rgba(path)?;
    if h == 0 {
        return Err(format!("empty image {}", path.display()));
    }
    let ar = (w as f32) / (h as f32);
    if !(0.55..=0.80).contains(&ar) {
        return Err(format!("non-poster aspect {w}x{h} ar={ar:.2}"));
    }
    Ok(upload_rgba(ctx, w, h, &bytes, name))
}

/// Paint a poster texture (or a grey placeholder) into `rect`.
pub fn paint_poster(painter: &eg::Painter, rect: eg::Rect, tex: Option<&TextureHandle>) {
    match tex {
        Some(tex) => {
            painter.image(
                tex.id(),
                rect,
                eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                eg::Color32::WHITE,
            );
        }
        None => {
            painter.rect_filled(rect, 6.0, eg::Color32::from_gray(40));
        }
    }
}
