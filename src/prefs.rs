// src/prefs.rs: persisted key/value preferences
use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::StoreError;
use crate::model::Movie;

pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_LAST_SEARCH: &str = "lastSearch";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_USERNAME: &str = "username";

const SQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
  key   TEXT PRIMARY KEY,
  value TEXT NOT NULL
)
"#;

/// Independent string blobs keyed by name. Each `set` overwrites the whole
/// value; there is no cross-key transaction.
pub struct PrefStore {
    conn: Connection,
}

impl PrefStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// File-backed store, or an in-memory one if the file can't be opened.
    pub fn open_or_memory(path: &Path) -> Result<Self, StoreError> {
        match Self::open(path) {
            Ok(s) => Ok(s),
            Err(e) => {
                warn!("prefs store {} unavailable ({e}); preferences won't persist", path.display());
                Self::in_memory()
            }
        }
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SQL_INIT)?;
        Ok(Self { conn })
    }

    // ---- raw ----
    pub fn get(&self, key: &str) -> Option<String> {
        let res = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional();
        match res {
            Ok(v) => v,
            Err(e) => {
                warn!("prefs read `{key}` failed: {e}");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    // ---- typed ----
    pub fn favorites(&self) -> Vec<Movie> {
        let Some(raw) = self.get(KEY_FAVORITES) else {
            return Vec::new();
        };
        match serde_json::from_str::<Option<Vec<Movie>>>(&raw) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                warn!("stored favorites are malformed ({e}); starting empty");
                Vec::new()
            }
        }
    }

    pub fn set_favorites(&self, list: &[Movie]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(list)?;
        self.set(KEY_FAVORITES, &raw)
    }

    pub fn last_search(&self) -> String {
        self.get(KEY_LAST_SEARCH).unwrap_or_default()
    }

    pub fn set_last_search(&self, query: &str) -> Result<(), StoreError> {
        self.set(KEY_LAST_SEARCH, query)
    }

    pub fn clear_last_search(&self) -> Result<(), StoreError> {
        self.remove(KEY_LAST_SEARCH)
    }

    pub fn dark_mode(&self) -> bool {
        self.get(KEY_DARK_MODE)
            .and_then(|raw| serde_json::from_str::<Option<bool>>(&raw).ok().flatten())
            .unwrap_or(false)
    }

    pub fn set_dark_mode(&self, on: bool) -> Result<(), StoreError> {
        self.set(KEY_DARK_MODE, &serde_json::to_string(&on)?)
    }

    /// Login stub: a username is all there is to a session.
    pub fn username(&self) -> Option<String> {
        self.get(KEY_USERNAME).filter(|u| !u.is_empty())
    }

    pub fn set_username(&self, name: &str) -> Result<(), StoreError> {
        self.set(KEY_USERNAME, name)
    }

    pub fn clear_username(&self) -> Result<(), StoreError> {
        self.remove(KEY_USERNAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_empty_store() {
        let s = PrefStore::in_memory().unwrap();
        assert!(s.favorites().is_empty());
        assert_eq!(s.last_search(), "");
        assert!(!s.dark_mode());
        assert_eq!(s.username(), None);
    }

    #[test]
    fn malformed_blobs_fall_back_to_defaults() {
        let s = PrefStore::in_memory().unwrap();
        s.set(KEY_FAVORITES, "{oops").unwrap();
        s.set(KEY_DARK_MODE, "maybe").unwrap();
        assert!(s.favorites().is_empty());
        assert!(!s.dark_mode());

        s.set(KEY_FAVORITES, "null").unwrap();
        s.set(KEY_DARK_MODE, "null").unwrap();
        assert!(s.favorites().is_empty());
        assert!(!s.dark_mode());
    }

    #[test]
    fn set_overwrites_and_remove_clears() {
        let s = PrefStore::in_memory().unwrap();
        s.set_last_search("alien").unwrap();
        s.set_last_search("aliens").unwrap();
        assert_eq!(s.last_search(), "aliens");
        s.clear_last_search().unwrap();
        assert_eq!(s.last_search(), "");
        // removing twice is fine
        s.clear_last_search().unwrap();
    }

    #[test]
    fn login_stub_round_trip() {
        let s = PrefStore::in_memory().unwrap();
        s.set_username("ripley").unwrap();
        assert_eq!(s.username().as_deref(), Some("ripley"));
        s.clear_username().unwrap();
        assert_eq!(s.username(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.db");
        {
            let s = PrefStore::open(&path).unwrap();
            let mut m = Movie::new(603, "The Matrix");
            m.extra.insert("popularity".into(), serde_json::json!(88.1));
            s.set_favorites(&[m]).unwrap();
            s.set_dark_mode(true).unwrap();
        }
        let s = PrefStore::open(&path).unwrap();
        let favs = s.favorites();
        assert_eq!(favs.len(), 1);
        assert_eq!(favs[0].id, 603);
        assert_eq!(favs[0].extra.get("popularity"), Some(&serde_json::json!(88.1)));
        assert!(s.dark_mode());
        assert_eq!(s.get(KEY_DARK_MODE).as_deref(), Some("true"));
    }
}
