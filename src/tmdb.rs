// src/tmdb.rs: blocking TMDB v3 client
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::model::{FilterParams, Genre, GenreList, Movie, MovieDetails, MoviePage};

pub const TRENDING_PATH: &str = "/trending/movie/week";
pub const SEARCH_PATH: &str = "/search/movie";
pub const DISCOVER_PATH: &str = "/discover/movie";
pub const GENRES_PATH: &str = "/genre/movie/list";

/// The five read-only calls the app makes. `TmdbClient` is the real one;
/// tests drive the session with a fake.
pub trait MovieSource: Send + Sync {
    fn trending(&self) -> Result<Vec<Movie>, ApiError>;
    fn search(&self, query: &str, page: u32, extra: &FilterParams) -> Result<MoviePage, ApiError>;
    fn discover(&self, page: u32, filters: &FilterParams) -> Result<MoviePage, ApiError>;
    fn details(&self, id: u64) -> Result<MovieDetails, ApiError>;
    fn genres(&self) -> Result<Vec<Genre>, ApiError>;
}

pub struct TmdbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("cinedex/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport { path: "<client>".into(), source })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            &cfg.tmdb_base_url,
            cfg.tmdb_api_key.as_deref().unwrap_or_default(),
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    /// Full request URL for `path`, with `api_key` first and `params` after.
    pub fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| ApiError::Url {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("api_key", &self.api_key);
            for (k, v) in params {
                q.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, ApiError> {
        let url = self.endpoint(path, params)?;
        debug!(path, ?params, "tmdb GET");

        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|source| ApiError::Transport { path: path.to_string(), source: source.without_url() })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { path: path.to_string(), status });
        }

        let body = resp
            .text()
            .map_err(|source| ApiError::Transport { path: path.to_string(), source: source.without_url() })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { path: path.to_string(), source })
    }

    fn logged<T>(what: &str, res: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &res {
            warn!("Error {what}: {e}");
        }
        res
    }
}

fn paged_params<'a>(page: &'a str, extra: &'a FilterParams) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![("page", page)];
    params.extend(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    params
}

impl MovieSource for TmdbClient {
    fn trending(&self) -> Result<Vec<Movie>, ApiError> {
        let res = self.get_json::<MoviePage>(TRENDING_PATH, &[]).map(|p| p.results);
        Self::logged("fetching trending movies", res)
    }

    fn search(&self, query: &str, page: u32, extra: &FilterParams) -> Result<MoviePage, ApiError> {
        if query.trim().is_empty() {
            return Err(ApiError::EmptyQuery);
        }
        let page = page.to_string();
        let mut params = vec![("query", query)];
        params.extend(paged_params(&page, extra));
        Self::logged("searching movies", self.get_json(SEARCH_PATH, &params))
    }

    fn discover(&self, page: u32, filters: &FilterParams) -> Result<MoviePage, ApiError> {
        let page = page.to_string();
        let params = paged_params(&page, filters);
        Self::logged("discovering movies", self.get_json(DISCOVER_PATH, &params))
    }

    fn details(&self, id: u64) -> Result<MovieDetails, ApiError> {
        let path = format!("/movie/{id}");
        let res = self.get_json(&path, &[("append_to_response", "videos,credits")]);
        Self::logged("fetching movie details", res)
    }

    fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let res = self.get_json::<GenreList>(GENRES_PATH, &[]).map(|g| g.genres);
        Self::logged("fetching genres", res)
    }
}
