use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::{Duration, SystemTime};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::DEFAULT_CACHE_DIR;

// Chosen once: seeded from the app config, else the default dir
static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_PRUNE_ONCE: Once = Once::new();

const POSTER_RETENTION_DAYS: u64 = 14;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

/// TMDB size bucket used for grid posters.
pub const POSTER_SIZE: &str = "w342";

/// Create `requested`, falling back to the default dir if that fails.
pub fn resolve_cache_dir(requested: PathBuf) -> PathBuf {
    match fs::create_dir_all(&requested) {
        Ok(()) => requested,
        Err(e) => {
            warn!("failed to create cache dir {}: {e}", requested.display());
            let path = PathBuf::from(DEFAULT_CACHE_DIR);
            let _ = fs::create_dir_all(&path);
            path
        }
    }
}

/// Pin the cache dir to `requested` unless it was already chosen.
/// Returns the dir in effect.
pub fn init_cache_dir(requested: PathBuf) -> PathBuf {
    CACHE_DIR_ONCE.get_or_init(|| resolve_cache_dir(requested)).clone()
}

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| resolve_cache_dir(PathBuf::from(DEFAULT_CACHE_DIR)))
        .clone()
}

pub fn poster_cache_dir() -> PathBuf {
    let dir = POSTER_DIR_ONCE.get_or_init(|| {
        let mut path = cache_dir().join("posters");
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("failed to create poster cache dir {}: {e}", path.display());
            path = cache_dir();
        }
        path
    });

    POSTER_PRUNE_ONCE.call_once({
        let path = dir.clone();
        move || match prune_poster_cache_in_dir(&path, POSTER_RETENTION_SECS) {
            Ok(n) if n > 0 => debug!("pruned {n} old posters"),
            Ok(_) => {}
            Err(err) => warn!("poster cache prune failed: {err}"),
        }
    });

    dir.clone()
}

/// Remove cached posters older than `max_age_secs`. Non-image files are left alone.
pub fn prune_poster_cache_in_dir(dir: &Path, max_age_secs: u64) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(max_age_secs))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_poster = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png" | "part"))
            .unwrap_or(false);
        if !is_poster {
            continue;
        }
        let modified = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(&path);
            removed += 1;
        }
    }
    Ok(removed)
}

/// `https://image.tmdb.org/t/p` + `w342` + `/abc.jpg`
pub fn poster_url(image_base: &str, size: &str, poster_path: &str) -> Option<String> {
    let p = poster_path.trim();
    if p.is_empty() {
        return None;
    }
    let sep = if p.starts_with('/') { "" } else { "/" };
    Some(format!("{}/{}{}{}", image_base.trim_end_matches('/'), size, sep, p))
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

pub fn cached_poster_path_in(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.jpg"))
}

pub fn find_cached_poster(key: &str) -> Option<PathBuf> {
    let p = cached_poster_path_in(&poster_cache_dir(), key);
    p.exists().then_some(p)
}

/// Return (width, height, RGBA8 bytes) for a cached poster file.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}

/// Shrink to `max_width` (keeping aspect) and encode as JPEG.
pub fn resize_to_jpeg(img: DynamicImage, max_width: u32, quality: u8) -> Result<Vec<u8>, String> {
    let (w, h) = img.dimensions();
    let out = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32)).round().max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
    encoder
        .encode_image(&out.to_rgb8())
        .map_err(|e| format!("jpeg encode: {e}"))?;
    Ok(jpeg_bytes)
}

/// Write via `<dest>.part` then rename, so readers never see a half file.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, dest).map_err(|e| format!("rename: {e}"))
}

/// Download a poster with a shared client, resize it and store it in the
/// poster cache. Returns the on-disk path; cache hits skip the network.
pub fn download_poster_with_client(
    client: &Client,
    url: &str,
    key: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    let dest = cached_poster_path_in(&poster_cache_dir(), key);
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download bytes: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode poster: {e}"))?;
    let jpeg = resize_to_jpeg(img, max_width, quality)?;
    write_atomic(&dest, &jpeg)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_url_joins_parts() {
        assert_eq!(
            poster_url("https://image.tmdb.org/t/p/", "w342", "/abc.jpg").as_deref(),
            Some("https://image.tmdb.org/t/p/w342/abc.jpg")
        );
        assert_eq!(
            poster_url("https://image.tmdb.org/t/p", "w500", "abc.jpg").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(poster_url("https://image.tmdb.org/t/p", "w342", "  "), None);
    }

    #[test]
    fn cache_key_is_stable_md5() {
        let a = url_to_cache_key("https://image.tmdb.org/t/p/w342/abc.jpg");
        assert_eq!(a, url_to_cache_key("https://image.tmdb.org/t/p/w342/abc.jpg"));
        assert_eq!(a.len(), 32);
        assert_ne!(a, url_to_cache_key("https://image.tmdb.org/t/p/w342/abd.jpg"));
    }

    #[test]
    fn resize_keeps_aspect_and_writes_atomically() {
        let img = DynamicImage::new_rgb8(600, 900);
        let jpeg = resize_to_jpeg(img, 300, 80).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = cached_poster_path_in(dir.path(), "k");
        write_atomic(&dest, &jpeg).unwrap();
        assert!(dest.exists());
        assert!(!dest.with_extension("jpg.part").exists());

        let (w, h, rgba) = load_rgba(&dest).unwrap();
        assert_eq!((w, h), (300, 450));
        assert_eq!(rgba.len(), (300 * 450 * 4) as usize);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let jpeg = resize_to_jpeg(DynamicImage::new_rgb8(100, 150), 300, 80).unwrap();
        let img = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(img.dimensions(), (100, 150));
    }

    #[test]
    fn resolve_creates_the_configured_dir() {
        let root = tempfile::tempdir().unwrap();
        let wanted = root.path().join("nested").join("cache");
        assert_eq!(resolve_cache_dir(wanted.clone()), wanted);
        assert!(wanted.is_dir());
    }

    #[test]
    fn prune_skips_fresh_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fresh.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        assert_eq!(prune_poster_cache_in_dir(dir.path(), 3600).unwrap(), 0);
        assert!(dir.path().join("fresh.jpg").exists());

        // zero retention: every poster is older than "now"
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(prune_poster_cache_in_dir(dir.path(), 0).unwrap(), 1);
        assert!(!dir.path().join("fresh.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
