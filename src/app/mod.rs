// src/app/mod.rs: egui shell around MovieSession, network on worker threads

// ---- Standard lib imports ----
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

// ---- Crates ----
use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, info};

// ---- Local modules ----
pub mod cache;
pub mod detail;
pub mod gfx;
pub mod prefetch;
pub mod ui;

use crate::config::AppConfig;
use crate::model::{Movie, MovieDetails};
use crate::prefs::PrefStore;
use crate::session::{Fetched, MovieSession, Ticket};
use crate::tmdb::{MovieSource, TmdbClient};

// ---- Tunables ----
pub(crate) const RESIZE_MAX_W: u32 = 342;
pub(crate) const RESIZE_QUALITY: u8 = 80;
const MAX_FETCH_MSGS_PER_FRAME: usize = 16;
pub(crate) const MAX_DONE_PER_FRAME: usize = 12;
pub(crate) const MAX_UPLOADS_PER_FRAME: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Favorites,
    Login,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

pub struct PosterSlot {
    pub key: String,
    pub path: Option<PathBuf>,
    pub tex: Option<TextureHandle>, // UI thread only
    pub state: PosterState,
}

/// (movie_id, cache_key, url)
pub(crate) type WorkItem = (u64, String, String);

pub(crate) struct PrefetchDone {
    pub movie_id: u64,
    pub result: Result<PathBuf, String>,
}

pub(crate) enum DetailState {
    Loading(u64),
    Ready(Box<MovieDetails>),
    Failed { id: u64, error: String },
}

pub(crate) struct DetailDone {
    pub id: u64,
    pub result: Result<MovieDetails, String>,
}

pub struct CinexApp {
    cfg: AppConfig,
    session: MovieSession,
    source: Arc<dyn MovieSource>,

    // one-time init guard
    did_init: bool,
    applied_dark: Option<bool>,

    // session fetches
    fetch_tx: Sender<(Ticket, Fetched)>,
    fetch_rx: Receiver<(Ticket, Fetched)>,

    // ui state
    view: View,
    search_input: String,
    login_user: String,
    login_pass: String,
    status: String,

    // detail panel
    selected: Option<u64>,
    detail: Option<DetailState>,
    detail_tx: Sender<DetailDone>,
    detail_rx: Receiver<DetailDone>,

    // poster plumbing
    posters: HashMap<u64, PosterSlot>,
    work_tx: Option<Sender<WorkItem>>,
    done_rx: Option<Receiver<PrefetchDone>>,
    posters_in_flight: usize,
}

impl CinexApp {
    pub fn new(cfg: AppConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = TmdbClient::from_config(&cfg)?;
        let store = PrefStore::open_or_memory(&cfg.prefs_db_path())?;
        Ok(Self::with_parts(cfg, Arc::new(client), store))
    }

    pub fn with_parts(cfg: AppConfig, source: Arc<dyn MovieSource>, store: PrefStore) -> Self {
        let session = MovieSession::new(store);
        let (fetch_tx, fetch_rx) = mpsc::channel();
        let (detail_tx, detail_rx) = mpsc::channel();
        let search_input = session.query().to_string();

        Self {
            cfg,
            session,
            source,
            did_init: false,
            applied_dark: None,
            fetch_tx,
            fetch_rx,
            view: View::Home,
            search_input,
            login_user: String::new(),
            login_pass: String::new(),
            status: String::new(),
            selected: None,
            detail: None,
            detail_tx,
            detail_rx,
            posters: HashMap::new(),
            work_tx: None,
            done_rx: None,
            posters_in_flight: 0,
        }
    }

    // ---- session plumbing ----
    fn dispatch(&self, ticket: Ticket) {
        debug!(seq = ticket.seq, fetch = ?ticket.fetch, "dispatch");
        let tx = self.fetch_tx.clone();
        let source = Arc::clone(&self.source);
        std::thread::spawn(move || {
            let fetched = ticket.fetch.run(source.as_ref());
            let _ = tx.send((ticket, fetched));
        });
    }

    fn dispatch_opt(&self, ticket: Option<Ticket>) {
        if let Some(t) = ticket {
            self.dispatch(t);
        }
    }

    fn poll_fetches(&mut self, ctx: &eg::Context) {
        let mut processed = 0usize;
        while processed < MAX_FETCH_MSGS_PER_FRAME {
            match self.fetch_rx.try_recv() {
                Ok((ticket, fetched)) => {
                    self.session.complete(ticket, fetched);
                    processed += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if processed > 0 {
            let shown: Vec<Movie> = self.session.displayed().to_vec();
            self.queue_posters(&shown);
            ctx.request_repaint();
        }
    }

    // ---- actions (called from the ui modules) ----
    pub(crate) fn do_search(&mut self) {
        let query = self.search_input.clone();
        let ticket = self.session.begin_search(&query, 1);
        if ticket.is_some() {
            self.view = View::Home;
        }
        self.dispatch_opt(ticket);
    }

    pub(crate) fn do_apply_filters(&mut self) {
        let ticket = self.session.begin_apply_filters();
        self.dispatch(ticket);
    }

    pub(crate) fn do_reset_filters(&mut self) {
        let ticket = self.session.begin_reset_filters();
        self.dispatch_opt(ticket);
    }

    pub(crate) fn do_load_more(&mut self) {
        let ticket = self.session.begin_load_more();
        self.dispatch_opt(ticket);
    }

    pub(crate) fn go_home(&mut self) {
        self.view = View::Home;
        self.search_input.clear();
        self.session.clear_search();
    }

    pub(crate) fn toggle_favorite(&mut self, movie: &Movie) {
        let now = self.session.toggle_favorite(movie);
        self.status = if now {
            format!("Added \"{}\" to favorites", movie.title)
        } else {
            format!("Removed \"{}\" from favorites", movie.title)
        };
    }

    pub(crate) fn login(&mut self) {
        let name = self.login_user.trim().to_string();
        if name.is_empty() {
            self.status = "Enter a username to log in.".into();
            return;
        }
        match self.session.store().set_username(&name) {
            Ok(()) => {
                info!(user = %name, "logged in");
                self.status = "Logged in!".into();
                self.login_pass.clear();
                self.view = View::Home;
            }
            Err(e) => self.status = format!("Login failed: {e}"),
        }
    }

    pub(crate) fn logout(&mut self) {
        if let Err(e) = self.session.store().clear_username() {
            self.status = format!("Logout failed: {e}");
        } else {
            self.status = "Logged out.".into();
        }
    }

    // ---- detail fetch ----
    pub(crate) fn select_movie(&mut self, id: u64) {
        if self.selected == Some(id) {
            return;
        }
        self.selected = Some(id);
        self.detail = Some(DetailState::Loading(id));

        let tx = self.detail_tx.clone();
        let source = Arc::clone(&self.source);
        std::thread::spawn(move || {
            let result = source.details(id).map_err(|e| e.to_string());
            let _ = tx.send(DetailDone { id, result });
        });
    }

    pub(crate) fn close_detail(&mut self) {
        self.selected = None;
        self.detail = None;
    }

    fn poll_detail(&mut self, ctx: &eg::Context) {
        while let Ok(done) = self.detail_rx.try_recv() {
            // ignore answers for a movie that is no longer selected
            if self.selected != Some(done.id) {
                continue;
            }
            self.detail = Some(match done.result {
                Ok(d) => DetailState::Ready(Box::new(d)),
                Err(error) => DetailState::Failed { id: done.id, error },
            });
            ctx.request_repaint();
        }
    }

    fn apply_theme(&mut self, ctx: &eg::Context) {
        let dark = self.session.dark_mode();
        if self.applied_dark != Some(dark) {
            ctx.set_visuals(if dark { eg::Visuals::dark() } else { eg::Visuals::light() });
            self.applied_dark = Some(dark);
        }
    }
}

// ========== App impl ==========
impl eframe::App for CinexApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        // First frame
        if !self.did_init {
            self.did_init = true;
            self.start_poster_workers();
            for ticket in self.session.begin_startup() {
                self.dispatch(ticket);
            }
        }

        self.apply_theme(ctx);
        self.poll_fetches(ctx);
        self.poll_prefetch_done(ctx);
        self.poll_detail(ctx);

        eg::TopBottomPanel::top("topbar").show(ctx, |ui| {
            self.ui_render_topbar(ui);
        });

        if self.selected.is_some() {
            self.ui_render_detail_panel(ctx);
        }

        eg::CentralPanel::default().show(ctx, |ui| match self.view {
            View::Home => self.ui_render_home(ui, ctx),
            View::Favorites => self.ui_render_favorites(ui, ctx),
            View::Login => self.ui_render_login(ui),
        });

        // keep polling while anything is in flight
        if self.session.loading()
            || self.posters_in_flight > 0
            || matches!(self.detail, Some(DetailState::Loading(_)))
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
