// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::model::Movie;

pub const CARD_W: f32 = 160.0;
pub const H_SPACING: f32 = 8.0;
pub const V_SPACING: f32 = 12.0;

const HEART_SIZE: f32 = 26.0;

fn draw_rating_badge(p: &eg::Painter, rect: eg::Rect, rating: f64) {
    if rating <= 0.0 {
        return;
    }
    let pad = 6.0;
    let r = eg::Rect::from_min_size(
        eg::pos2(rect.left() + pad, rect.top() + pad),
        eg::vec2(48.0, 20.0),
    );

    let visuals = p.ctx().style().visuals.clone();
    let bg = visuals.extreme_bg_color.gamma_multiply(0.92);
    let fg = visuals.strong_text_color();

    p.rect_filled(r, eg::Rounding::same(6.0), bg);
    p.text(
        r.center(),
        eg::Align2::CENTER_CENTER,
        format!("★ {rating:.1}"),
        eg::FontId::monospace(12.0),
        fg,
    );
}

fn heart_rect(poster_rect: eg::Rect) -> eg::Rect {
    let pad = 6.0;
    eg::Rect::from_min_size(
        eg::pos2(poster_rect.right() - pad - HEART_SIZE, poster_rect.top() + pad),
        eg::vec2(HEART_SIZE, HEART_SIZE),
    )
}

impl crate::app::CinexApp {
    /// Card grid for `movies`. Clicking a card opens the detail panel; the
    /// heart in the corner toggles the favorite.
    pub(crate) fn ui_render_movie_grid(
        &mut self,
        ui: &mut eg::Ui,
        ctx: &eg::Context,
        movies: &[Movie],
        id_salt: &str,
    ) {
        let card_w: f32 = CARD_W;
        let text_h: f32 = 44.0;
        let card_h: f32 = card_w * 1.5 + text_h;

        let mut uploads_left = crate::app::MAX_UPLOADS_PER_FRAME;
        let mut clicked: Option<u64> = None;
        let mut fav_clicked: Option<usize> = None;

        let avail = ui.available_width();
        let cols = ((avail + H_SPACING) / (card_w + H_SPACING))
            .floor()
            .max(1.0) as usize;

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

            for (col, movie) in movies.iter().enumerate() {
                if col > 0 && col % cols == 0 {
                    ui.end_row();
                }

                // opportunistic upload
                if uploads_left > 0 && self.try_upload_poster(ctx, movie.id) {
                    uploads_left -= 1;
                }

                ui.allocate_ui_with_layout(
                    eg::vec2(card_w, card_h),
                    eg::Layout::top_down(eg::Align::Min),
                    |ui| {
                        ui.set_min_size(eg::vec2(card_w, card_h));
                        let rect = ui.max_rect();

                        let card_id = eg::Id::new((id_salt, "card", movie.id));
                        let card = ui.interact(rect, card_id, eg::Sense::click());

                        let poster_rect = eg::Rect::from_min_max(
                            rect.min,
                            eg::pos2(rect.min.x + card_w, rect.min.y + card_w * 1.5),
                        );
                        let text_rect = eg::Rect::from_min_max(
                            eg::pos2(rect.min.x, poster_rect.max.y + 4.0),
                            rect.max,
                        );

                        super::super::gfx::paint_poster(
                            ui.painter(),
                            poster_rect,
                            self.poster_texture(movie.id),
                        );
                        draw_rating_badge(ui.painter(), poster_rect, movie.vote_average);

                        // Favorite toggle (registered after the card so it wins the click)
                        let hr = heart_rect(poster_rect);
                        let heart = ui
                            .interact(hr, eg::Id::new((id_salt, "fav", movie.id)), eg::Sense::click())
                            .on_hover_text("Toggle favorite");
                        let is_fav = self.session.is_favorite(movie.id);
                        let heart_color = if is_fav {
                            eg::Color32::from_rgb(230, 60, 80)
                        } else {
                            eg::Color32::from_white_alpha(if heart.hovered() { 255 } else { 190 })
                        };
                        ui.painter().circle_filled(
                            hr.center(),
                            HEART_SIZE * 0.5,
                            eg::Color32::from_black_alpha(140),
                        );
                        ui.painter().text(
                            hr.center(),
                            eg::Align2::CENTER_CENTER,
                            if is_fav { "♥" } else { "♡" },
                            eg::FontId::proportional(16.0),
                            heart_color,
                        );
                        if heart.clicked() {
                            fav_clicked = Some(col);
                        } else if card.clicked() {
                            clicked = Some(movie.id);
                        }

                        ui.allocate_ui_at_rect(text_rect, |ui| {
                            ui.add(
                                eg::Label::new(eg::RichText::new(movie.title_line()).size(14.0))
                                    .wrap(),
                            );
                        });

                        // Selection stroke
                        if self.selected == Some(movie.id) {
                            ui.painter().rect_stroke(
                                rect.shrink(1.0),
                                6.0,
                                eg::Stroke::new(2.0, eg::Color32::YELLOW),
                            );
                        } else if card.hovered() {
                            ui.painter().rect_stroke(
                                poster_rect,
                                6.0,
                                eg::Stroke::new(1.0, ui.visuals().strong_text_color()),
                            );
                        }
                    },
                );
            }

            ui.end_row();
        });

        if let Some(i) = fav_clicked {
            if let Some(m) = movies.get(i) {
                self.toggle_favorite(m);
            }
        }
        if let Some(id) = clicked {
            self.select_movie(id);
        }
    }
}
