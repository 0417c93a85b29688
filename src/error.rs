// src/error.rs
use thiserror::Error;

/// Failures talking to the TMDB REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("bad request url for {path}: {reason}")]
    Url { path: String, reason: String },

    #[error("GET {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {path}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Used by test doubles and anything else that isn't a real HTTP call.
    #[error("{0}")]
    Other(String),
}

/// Failures reading or writing the local preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
