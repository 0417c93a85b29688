use std::{env, fs, path::Path, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_CACHE_DIR: &str = ".cinedex_cache";
pub const PREFS_DB_FILE: &str = "prefs.db";

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_POSTER_WORKERS: usize = 8;

/// Environment variable that overrides `tmdb_api_key` from the config file.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub image_base_url: String,
    pub cache_dir: Option<String>,
    pub request_timeout_secs: u64,
    pub poster_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            cache_dir: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            poster_workers: DEFAULT_POSTER_WORKERS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "api_key")]
    tmdb_api_key: Option<String>,
    tmdb_base_url: Option<String>,
    image_base_url: Option<String>,
    cache_dir: Option<String>,
    request_timeout_secs: Option<u64>,
    poster_workers: Option<usize>,
}

impl AppConfig {
    fn merge(&mut self, parsed: RawConfig) {
        if let Some(key) = parsed.tmdb_api_key.filter(|k| !k.trim().is_empty()) {
            self.tmdb_api_key = Some(key);
        }
        if let Some(url) = parsed.tmdb_base_url {
            self.tmdb_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = parsed.image_base_url {
            self.image_base_url = url.trim_end_matches('/').to_string();
        }
        if parsed.cache_dir.is_some() {
            self.cache_dir = parsed.cache_dir;
        }
        if let Some(secs) = parsed.request_timeout_secs {
            if secs == 0 {
                warn!("request_timeout_secs = 0 in config.json; keeping {}s", self.request_timeout_secs);
            } else {
                self.request_timeout_secs = secs;
            }
        }
        if let Some(n) = parsed.poster_workers {
            self.poster_workers = n.clamp(1, 32);
        }
    }

    pub fn cache_dir_path(&self) -> PathBuf {
        PathBuf::from(self.cache_dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR))
    }

    pub fn prefs_db_path(&self) -> PathBuf {
        self.cache_dir_path().join(PREFS_DB_FILE)
    }
}

pub fn load_config() -> AppConfig {
    let mut cfg = load_config_from(Path::new(CONFIG_FILE));
    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            cfg.tmdb_api_key = Some(key);
        }
    }
    if cfg.tmdb_api_key.is_none() {
        warn!("No TMDB api key configured; set `tmdb_api_key` in config.json or {API_KEY_ENV}.");
    }
    cfg
}

/// Defaults merged with whatever the file at `cfg_path` provides. Never fails.
pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();

    match fs::read_to_string(cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                cfg.merge(parsed);
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!("Failed to parse {} ({}). Using defaults.", cfg_path.display(), err);
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
        }
    }

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_cfg(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.json"));
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.prefs_db_path(), PathBuf::from(".cinedex_cache").join("prefs.db"));
    }

    #[test]
    fn file_values_override_defaults() {
        let f = write_cfg(
            r#"{
                "tmdb_api_key": "abc123",
                "tmdb_base_url": "http://localhost:9000/3/",
                "cache_dir": "/tmp/cdx",
                "request_timeout_secs": 5,
                "poster_workers": 99
            }"#,
        );
        let cfg = load_config_from(f.path());
        assert_eq!(cfg.tmdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.tmdb_base_url, "http://localhost:9000/3");
        assert_eq!(cfg.image_base_url, DEFAULT_IMAGE_BASE_URL);
        assert_eq!(cfg.cache_dir_path(), PathBuf::from("/tmp/cdx"));
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.poster_workers, 32);
    }

    #[test]
    fn legacy_key_alias_and_blank_key() {
        let cfg = load_config_from(write_cfg(r#"{ "api_key": "old" }"#).path());
        assert_eq!(cfg.tmdb_api_key.as_deref(), Some("old"));

        let cfg = load_config_from(write_cfg(r#"{ "tmdb_api_key": "  " }"#).path());
        assert_eq!(cfg.tmdb_api_key, None);
    }

    #[test]
    fn malformed_file_falls_back() {
        let cfg = load_config_from(write_cfg("{ not json").path());
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn zero_timeout_is_ignored() {
        let cfg = load_config_from(write_cfg(r#"{ "request_timeout_secs": 0 }"#).path());
        assert_eq!(cfg.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
