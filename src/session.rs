// src/session.rs: query/pagination state for the movie browser
//
// Network-backed actions are split in two: `begin_*` mutates state and hands
// back a `Ticket`, `complete` applies whatever the ticket fetched. The UI runs
// tickets on worker threads; the synchronous wrappers at the bottom do both
// halves in one call.

use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::model::{FilterParams, FilterState, Genre, Movie, MovieDetails, MoviePage};
use crate::prefs::PrefStore;
use crate::tmdb::MovieSource;

/// Which upstream listing produced the current results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Trending,
    Search,
    Filtered,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fetch {
    Trending,
    Genres,
    Search {
        query: String,
        page: u32,
        params: FilterParams,
    },
    Discover {
        page: u32,
        params: FilterParams,
    },
}

impl Fetch {
    pub fn run(&self, source: &dyn MovieSource) -> Fetched {
        match self {
            Self::Trending => Fetched::Trending(source.trending()),
            Self::Genres => Fetched::Genres(source.genres()),
            Self::Search { query, page, params } => Fetched::Page(source.search(query, *page, params)),
            Self::Discover { page, params } => Fetched::Page(source.discover(*page, params)),
        }
    }
}

#[derive(Debug)]
pub enum Fetched {
    Trending(Result<Vec<Movie>, ApiError>),
    Genres(Result<Vec<Genre>, ApiError>),
    Page(Result<MoviePage, ApiError>),
}

/// A fetch the session is waiting on. `seq` is unique and increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
    pub seq: u64,
    pub fetch: Fetch,
}

pub struct MovieSession {
    store: PrefStore,

    trending: Vec<Movie>,
    results: Vec<Movie>,
    favorites: Vec<Movie>,
    genres: Vec<Genre>,

    query: String,
    mode: Mode,
    page: u32,
    total_pages: u32,

    filters: FilterState,
    is_filtered: bool,

    dark_mode: bool,
    last_error: Option<String>,

    // request fencing: only the latest ticket per slot may apply
    next_seq: u64,
    results_pending: Option<u64>,
    trending_pending: Option<u64>,
}

impl MovieSession {
    pub fn new(store: PrefStore) -> Self {
        let favorites = store.favorites();
        let query = store.last_search();
        let dark_mode = store.dark_mode();
        info!(
            favorites = favorites.len(),
            last_search = %query,
            dark_mode,
            "session restored"
        );
        Self {
            store,
            trending: Vec::new(),
            results: Vec::new(),
            favorites,
            genres: Vec::new(),
            query,
            mode: Mode::Trending,
            page: 1,
            total_pages: 0,
            filters: FilterState::default(),
            is_filtered: false,
            dark_mode,
            last_error: None,
            next_seq: 0,
            results_pending: None,
            trending_pending: None,
        }
    }

    // ---- read side ----
    pub fn trending(&self) -> &[Movie] {
        &self.trending
    }

    pub fn results(&self) -> &[Movie] {
        &self.results
    }

    pub fn favorites(&self) -> &[Movie] {
        &self.favorites
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn genre_name(&self, id: u32) -> Option<&str> {
        self.genres.iter().find(|g| g.id == id).map(|g| g.name.as_str())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn loading(&self) -> bool {
        self.results_pending.is_some() || self.trending_pending.is_some()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Filter widgets edit this directly; nothing is fetched until `apply_filters`.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn store(&self) -> &PrefStore {
        &self.store
    }

    /// Results when there are any, otherwise the trending set. An empty search
    /// and no search at all look the same here.
    pub fn displayed(&self) -> &[Movie] {
        if self.results.is_empty() {
            &self.trending
        } else {
            &self.results
        }
    }

    pub fn list_title(&self) -> String {
        if !self.query.is_empty() {
            format!("Search Results for \"{}\"", self.query)
        } else if self.is_filtered {
            "Filtered Movies".to_string()
        } else {
            "Trending Movies".to_string()
        }
    }

    pub fn can_load_more(&self) -> bool {
        !self.displayed().is_empty() && self.page < self.total_pages
    }

    // ---- begin ----
    fn issue(&mut self, fetch: Fetch) -> Ticket {
        self.next_seq += 1;
        Ticket { seq: self.next_seq, fetch }
    }

    fn issue_results(&mut self, fetch: Fetch) -> Ticket {
        let ticket = self.issue(fetch);
        if let Some(old) = self.results_pending.replace(ticket.seq) {
            debug!(superseded = old, by = ticket.seq, "results request superseded");
        }
        ticket
    }

    /// Search text wins over discover whenever both are present.
    fn results_fetch(&self, page: u32) -> Fetch {
        let params = self.filters.params();
        if self.has_query() {
            Fetch::Search { query: self.query.clone(), page, params }
        } else {
            Fetch::Discover { page, params }
        }
    }

    /// Drop the current results and go back to showing trending.
    fn reset_to_trending(&mut self) {
        self.results.clear();
        self.page = 1;
        self.total_pages = 0;
        self.mode = Mode::Trending;
        self.results_pending = None;
    }

    pub fn begin_startup(&mut self) -> Vec<Ticket> {
        let trending = self.issue(Fetch::Trending);
        self.trending_pending = Some(trending.seq);
        let genres = self.issue(Fetch::Genres);
        vec![trending, genres]
    }

    /// `None` for a blank query: nothing changes and nothing is fetched.
    pub fn begin_search(&mut self, query: &str, page: u32) -> Option<Ticket> {
        if query.trim().is_empty() {
            return None;
        }
        let fetch = Fetch::Search {
            query: query.to_string(),
            page: page.max(1),
            params: self.filters.params(),
        };
        Some(self.issue_results(fetch))
    }

    pub fn begin_apply_filters(&mut self) -> Ticket {
        self.is_filtered = true;
        let fetch = self.results_fetch(1);
        self.issue_results(fetch)
    }

    /// `None` once the last page is loaded.
    pub fn begin_load_more(&mut self) -> Option<Ticket> {
        if self.page >= self.total_pages {
            return None;
        }
        let fetch = self.results_fetch(self.page + 1);
        Some(self.issue_results(fetch))
    }

    pub fn begin_reset_filters(&mut self) -> Option<Ticket> {
        self.filters.clear();
        self.is_filtered = false;
        if self.has_query() {
            let fetch = self.results_fetch(1);
            Some(self.issue_results(fetch))
        } else {
            self.reset_to_trending();
            None
        }
    }

    /// Header "home": forget the search text, keep filters.
    pub fn clear_search(&mut self) {
        self.query.clear();
        self.reset_to_trending();
        if let Err(e) = self.store.clear_last_search() {
            warn!("could not clear last search: {e}");
        }
    }

    // ---- complete ----
    pub fn complete(&mut self, ticket: Ticket, fetched: Fetched) {
        match fetched {
            Fetched::Trending(res) => {
                if self.trending_pending != Some(ticket.seq) {
                    debug!(seq = ticket.seq, "dropping stale trending response");
                    return;
                }
                self.trending_pending = None;
                match res {
                    Ok(list) => {
                        info!(count = list.len(), "trending loaded");
                        self.trending = list;
                    }
                    Err(e) => {
                        warn!("trending failed: {e}");
                        self.trending.clear();
                    }
                }
            }
            Fetched::Genres(res) => match res {
                Ok(list) => {
                    info!(count = list.len(), "genres loaded");
                    self.genres = list;
                }
                Err(e) => {
                    warn!("genres failed: {e}; genre filter will be empty");
                    self.genres.clear();
                }
            },
            Fetched::Page(res) => {
                if self.results_pending != Some(ticket.seq) {
                    debug!(seq = ticket.seq, "dropping stale results response");
                    return;
                }
                self.results_pending = None;
                self.apply_page(&ticket.fetch, res);
            }
        }
    }

    fn apply_page(&mut self, fetch: &Fetch, res: Result<MoviePage, ApiError>) {
        let (page, query) = match fetch {
            Fetch::Search { query, page, .. } => (*page, Some(query)),
            Fetch::Discover { page, .. } => (*page, None),
            Fetch::Trending | Fetch::Genres => return,
        };

        let data = match res {
            Ok(data) => data,
            Err(e) => {
                warn!(page, "results fetch failed: {e}");
                self.results.clear();
                self.last_error = Some(e.to_string());
                return;
            }
        };

        let got = data.results.len();
        if page <= 1 {
            self.results = data.results;
        } else {
            self.results.extend(data.results);
        }
        self.total_pages = data.total_pages;
        self.page = page;
        self.last_error = None;

        match query {
            Some(q) => {
                self.mode = Mode::Search;
                if self.query != *q {
                    self.query = q.clone();
                }
                if let Err(e) = self.store.set_last_search(q) {
                    warn!("could not persist last search: {e}");
                }
            }
            None => self.mode = Mode::Filtered,
        }
        debug!(page, got, total = self.results.len(), total_pages = self.total_pages, "results applied");
    }

    // ---- favorites / prefs ----
    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.iter().any(|m| m.id == id)
    }

    /// The list record for `id` from results, trending or favorites.
    pub fn listed_movie(&self, id: u64) -> Option<&Movie> {
        self.results
            .iter()
            .chain(&self.trending)
            .chain(&self.favorites)
            .find(|m| m.id == id)
    }

    /// What to store when a movie is favorited from its details: the list
    /// record when we have one, otherwise the details with `genre_ids` filled in.
    pub fn favorite_snapshot(&self, details: &MovieDetails) -> Movie {
        if let Some(m) = self.listed_movie(details.movie.id) {
            return m.clone();
        }
        let mut movie = details.movie.clone();
        if movie.genre_ids.is_empty() {
            movie.genre_ids = details.genres.iter().map(|g| g.id).collect();
        }
        movie
    }

    /// Returns false if it was already a favorite.
    pub fn add_favorite(&mut self, movie: &Movie) -> bool {
        if self.is_favorite(movie.id) {
            return false;
        }
        self.favorites.push(movie.clone());
        self.persist_favorites();
        true
    }

    /// Returns false if `id` wasn't a favorite.
    pub fn remove_favorite(&mut self, id: u64) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|m| m.id != id);
        if self.favorites.len() == before {
            return false;
        }
        self.persist_favorites();
        true
    }

    /// Returns the new membership.
    pub fn toggle_favorite(&mut self, movie: &Movie) -> bool {
        if self.is_favorite(movie.id) {
            self.remove_favorite(movie.id);
            false
        } else {
            self.add_favorite(movie);
            true
        }
    }

    fn persist_favorites(&self) {
        if let Err(e) = self.store.set_favorites(&self.favorites) {
            warn!("could not persist favorites: {e}");
        }
    }

    pub fn set_dark_mode(&mut self, on: bool) {
        self.dark_mode = on;
        if let Err(e) = self.store.set_dark_mode(on) {
            warn!("could not persist dark mode: {e}");
        }
    }

    // ---- synchronous wrappers ----
    pub fn run(&mut self, source: &dyn MovieSource, ticket: Ticket) {
        let fetched = ticket.fetch.run(source);
        self.complete(ticket, fetched);
    }

    pub fn startup(&mut self, source: &dyn MovieSource) {
        for ticket in self.begin_startup() {
            self.run(source, ticket);
        }
    }

    pub fn search(&mut self, source: &dyn MovieSource, query: &str, page: u32) {
        if let Some(ticket) = self.begin_search(query, page) {
            self.run(source, ticket);
        }
    }

    pub fn apply_filters(&mut self, source: &dyn MovieSource) {
        let ticket = self.begin_apply_filters();
        self.run(source, ticket);
    }

    pub fn load_more(&mut self, source: &dyn MovieSource) {
        if let Some(ticket) = self.begin_load_more() {
            self.run(source, ticket);
        }
    }

    pub fn reset_filters(&mut self, source: &dyn MovieSource) {
        if let Some(ticket) = self.begin_reset_filters() {
            self.run(source, ticket);
        }
    }
}
