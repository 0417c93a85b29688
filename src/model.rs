// src/model.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extra query parameters handed to search/discover (`with_genres`, `year`, ...).
pub type FilterParams = BTreeMap<String, String>;

pub const PARAM_GENRE: &str = "with_genres";
pub const PARAM_YEAR: &str = "year";
pub const PARAM_MIN_RATING: &str = "vote_average.gte";

/// A movie as returned by list endpoints. Fields we don't render are kept in
/// `extra` so a stored favorite carries the full upstream record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            overview: None,
            vote_average: 0.0,
            release_date: None,
            genre_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Year part of `release_date` ("2008-07-16" -> 2008).
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// "Title (YYYY)" or just the title.
    pub fn title_line(&self) -> String {
        match self.year() {
            Some(y) => format!("{} ({})", self.title, y),
            None => self.title.clone(),
        }
    }
}

/// One page of search/discover results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// `/movie/{id}?append_to_response=videos,credits`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<Videos>,
    #[serde(flatten)]
    pub movie: Movie,
}

impl MovieDetails {
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .as_ref()?
            .results
            .iter()
            .find(|v| v.kind == "Trailer")
    }

    /// Watch URL for the trailer, only for YouTube-hosted videos.
    pub fn trailer_url(&self) -> Option<String> {
        let v = self.trailer()?;
        if v.site.eq_ignore_ascii_case("youtube") || v.site.is_empty() {
            Some(format!("https://www.youtube.com/watch?v={}", v.key))
        } else {
            None
        }
    }

    pub fn director(&self) -> Option<&CrewMember> {
        self.credits
            .as_ref()?
            .crew
            .iter()
            .find(|c| c.job.as_deref() == Some("Director"))
    }

    pub fn top_cast(&self, n: usize) -> &[CastMember] {
        match &self.credits {
            Some(c) => &c.cast[..c.cast.len().min(n)],
            None => &[],
        }
    }

    /// "2h 5m"; `None` when the runtime is unknown or zero.
    pub fn runtime_label(&self) -> Option<String> {
        match self.runtime {
            Some(m) if m > 0 => Some(format!("{}h {}m", m / 60, m % 60)),
            _ => None,
        }
    }
}

/// Filter controls. `min_rating == 0` and `None` both mean "no constraint".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub genre: Option<u32>,
    pub year: Option<i32>,
    pub min_rating: f32,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.year.is_none() && self.min_rating <= 0.0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn params(&self) -> FilterParams {
        let mut out = FilterParams::new();
        if let Some(g) = self.genre {
            out.insert(PARAM_GENRE.to_string(), g.to_string());
        }
        if let Some(y) = self.year {
            out.insert(PARAM_YEAR.to_string(), y.to_string());
        }
        if self.min_rating > 0.0 {
            out.insert(PARAM_MIN_RATING.to_string(), self.min_rating.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_params_skip_unconstrained_fields() {
        let f = FilterState::default();
        assert!(f.is_empty());
        assert!(f.params().is_empty());

        let f = FilterState { genre: Some(28), year: None, min_rating: 0.0 };
        let p = f.params();
        assert_eq!(p.len(), 1);
        assert_eq!(p.get(PARAM_GENRE).map(String::as_str), Some("28"));

        let f = FilterState { genre: None, year: Some(1999), min_rating: 7.5 };
        let p = f.params();
        assert_eq!(p.get(PARAM_YEAR).map(String::as_str), Some("1999"));
        assert_eq!(p.get(PARAM_MIN_RATING).map(String::as_str), Some("7.5"));
        assert!(!p.contains_key(PARAM_GENRE));
    }

    #[test]
    fn whole_ratings_render_without_fraction() {
        let f = FilterState { genre: None, year: None, min_rating: 7.0 };
        assert_eq!(f.params().get(PARAM_MIN_RATING).map(String::as_str), Some("7"));
    }

    #[test]
    fn movie_keeps_unknown_fields() {
        let raw = r#"{
            "id": 155,
            "title": "The Dark Knight",
            "poster_path": "/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
            "overview": null,
            "vote_average": 8.5,
            "release_date": "2008-07-16",
            "genre_ids": [18, 28],
            "popularity": 123.4,
            "adult": false
        }"#;
        let m: Movie = serde_json::from_str(raw).unwrap();
        assert_eq!(m.id, 155);
        assert_eq!(m.year(), Some(2008));
        assert_eq!(m.title_line(), "The Dark Knight (2008)");
        assert_eq!(m.overview, None);
        assert_eq!(m.extra.get("popularity"), Some(&serde_json::json!(123.4)));

        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["adult"], serde_json::json!(false));
        assert_eq!(back["genre_ids"], serde_json::json!([18, 28]));
    }

    #[test]
    fn movie_with_blank_release_date_has_no_year() {
        let mut m = Movie::new(1, "Untitled");
        m.release_date = Some(String::new());
        assert_eq!(m.year(), None);
        assert_eq!(m.title_line(), "Untitled");
    }

    #[test]
    fn page_defaults_missing_pagination() {
        let p: MoviePage = serde_json::from_str(r#"{ "results": [ { "id": 1, "title": "A" } ] }"#).unwrap();
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.results.len(), 1);
    }

    #[test]
    fn details_derived_views() {
        let raw = r#"{
            "id": 27205,
            "title": "Inception",
            "runtime": 148,
            "tagline": "Your mind is the scene of the crime.",
            "genres": [ { "id": 28, "name": "Action" } ],
            "credits": {
                "cast": [
                    { "id": 1, "name": "A", "character": "Cobb" },
                    { "id": 2, "name": "B" },
                    { "id": 3, "name": "C" }
                ],
                "crew": [
                    { "id": 9, "name": "Someone", "job": "Producer" },
                    { "id": 10, "name": "Christopher Nolan", "job": "Director" }
                ]
            },
            "videos": { "results": [
                { "key": "abc", "site": "YouTube", "type": "Teaser", "name": "Teaser" },
                { "key": "YoHD9XEInc0", "site": "YouTube", "type": "Trailer", "name": "Official" }
            ] }
        }"#;
        let d: MovieDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(d.movie.id, 27205);
        assert_eq!(d.runtime_label().as_deref(), Some("2h 28m"));
        assert_eq!(d.director().map(|c| c.name.as_str()), Some("Christopher Nolan"));
        assert_eq!(d.top_cast(2).len(), 2);
        assert_eq!(d.top_cast(10).len(), 3);
        assert_eq!(
            d.trailer_url().as_deref(),
            Some("https://www.youtube.com/watch?v=YoHD9XEInc0")
        );
        assert!(!d.movie.extra.contains_key("runtime"));
    }

    #[test]
    fn details_without_credits_or_videos() {
        let d: MovieDetails = serde_json::from_str(r#"{ "id": 5, "title": "X", "runtime": 0 }"#).unwrap();
        assert!(d.trailer().is_none());
        assert!(d.director().is_none());
        assert!(d.top_cast(6).is_empty());
        assert_eq!(d.runtime_label(), None);
    }
}
