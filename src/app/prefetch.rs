// src/app/prefetch.rs
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use eframe::egui as eg;
use tracing::{debug, info, warn};

use super::cache::{self, POSTER_SIZE};
use super::{PosterSlot, PosterState, PrefetchDone, WorkItem};
use crate::model::Movie;

impl crate::app::CinexApp {
    /// Spin up the poster download pool. Jobs arrive later via `queue_posters`.
    pub(crate) fn start_poster_workers(&mut self) {
        if self.work_tx.is_some() {
            return;
        }

        let dir = cache::init_cache_dir(self.cfg.cache_dir_path());
        debug!(dir = %dir.display(), "poster cache dir");

        // Allow opting out instead of opting in.
        if std::env::var_os("CINEDEX_DISABLE_POSTERS").is_some() {
            info!("poster downloads disabled via CINEDEX_DISABLE_POSTERS");
            return;
        }

        // One shared HTTP client.
        let client = match reqwest::blocking::Client::builder()
            .user_agent("cinedex/posters")
            .timeout(Duration::from_secs(self.cfg.request_timeout_secs))
            .pool_max_idle_per_host(16)
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!("poster http client build failed: {e}");
                self.status = format!("Posters unavailable: {e}");
                return;
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<WorkItem>();
        let (done_tx, done_rx) = mpsc::channel::<PrefetchDone>();
        self.work_tx = Some(work_tx);
        self.done_rx = Some(done_rx);

        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..self.cfg.poster_workers {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);

            std::thread::spawn(move || loop {
                let job = match work_rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => break,
                };
                let Ok((movie_id, key, url)) = job else {
                    break;
                };

                let result: Result<PathBuf, String> = cache::download_poster_with_client(
                    &client,
                    &url,
                    &key,
                    super::RESIZE_MAX_W,
                    super::RESIZE_QUALITY,
                );

                let _ = done_tx.send(PrefetchDone { movie_id, result });
            });
        }
        debug!(workers = self.cfg.poster_workers, "poster workers started");
    }

    /// Make sure every movie in `movies` has a poster slot; queue downloads
    /// for the ones not already cached on disk.
    pub(crate) fn queue_posters(&mut self, movies: &[Movie]) {
        for m in movies {
            if self.posters.contains_key(&m.id) {
                continue;
            }
            let Some(url) = m
                .poster_path
                .as_deref()
                .and_then(|p| cache::poster_url(&self.cfg.image_base_url, POSTER_SIZE, p))
            else {
                continue;
            };

            let key = cache::url_to_cache_key(&url);
            let path = cache::find_cached_poster(&key);
            let state = if path.is_some() {
                PosterState::Cached
            } else {
                PosterState::Pending
            };

            if state == PosterState::Pending {
                let Some(tx) = &self.work_tx else {
                    continue; // no workers: leave it for a later run
                };
                if tx.send((m.id, key.clone(), url)).is_err() {
                    continue;
                }
                self.posters_in_flight += 1;
            }

            self.posters.insert(m.id, PosterSlot { key, path, tex: None, state });
        }
    }

    /// Poll download completions.
    pub(crate) fn poll_prefetch_done(&mut self, ctx: &eg::Context) {
        let mut drained = 0usize;

        while drained < super::MAX_DONE_PER_FRAME {
            let Some(rx) = &self.done_rx else {
                break;
            };

            match rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    self.posters_in_flight = self.posters_in_flight.saturating_sub(1);
                    let Some(slot) = self.posters.get_mut(&msg.movie_id) else {
                        continue;
                    };
                    match msg.result {
                        Ok(path) => {
                            slot.path = Some(path);
                            slot.state = PosterState::Cached; // uploaded lazily during paint
                        }
                        Err(e) => {
                            debug!(movie = msg.movie_id, "poster download failed: {e}");
                            slot.state = PosterState::Failed;
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }

        if drained > 0 {
            ctx.request_repaint();
        }
    }

    /// Upload the texture for one movie if its file is cached.
    /// Returns true if a texture was uploaded this call.
    pub(crate) fn try_upload_poster(&mut self, ctx: &eg::Context, movie_id: u64) -> bool {
        let Some(slot) = self.posters.get_mut(&movie_id) else {
            return false;
        };
        if slot.tex.is_some() || slot.state != PosterState::Cached {
            return false;
        }
        let Some(path) = slot.path.as_ref() else {
            return false;
        };
        match super::gfx::load_poster_texture(ctx, path, &slot.key) {
            Ok(tex) => {
                slot.tex = Some(tex);
                slot.state = PosterState::Ready;
                true
            }
            Err(e) => {
                debug!(movie = movie_id, "poster upload failed: {e}");
                slot.state = PosterState::Failed;
                false
            }
        }
    }

    pub(crate) fn poster_texture(&self, movie_id: u64) -> Option<&eg::TextureHandle> {
        self.posters.get(&movie_id).and_then(|s| s.tex.as_ref())
    }
}
