// src/app/detail.rs
use eframe::egui as eg;
use itertools::Itertools;

use super::DetailState;
use crate::model::MovieDetails;

const TOP_CAST: usize = 6;

impl crate::app::CinexApp {
    pub(crate) fn ui_render_detail_panel(&mut self, ctx: &eg::Context) {
        let Some(id) = self.selected else {
            return;
        };

        let screen_w: f32 = ctx.input(|i| i.screen_rect().width());
        let max_w: f32 = (screen_w * 0.45).clamp(320.0, 520.0);

        // Snapshot what we render so the closure can borrow self mutably for actions.
        let details: Option<MovieDetails> = match &self.detail {
            Some(DetailState::Ready(d)) if d.movie.id == id => Some((**d).clone()),
            _ => None,
        };
        let loading = matches!(&self.detail, Some(DetailState::Loading(lid)) if *lid == id);
        let failed: Option<String> = match &self.detail {
            Some(DetailState::Failed { id: fid, error }) if *fid == id => Some(error.clone()),
            _ => None,
        };

        if details.is_some() {
            self.try_upload_poster(ctx, id);
        }

        let mut close = false;
        let mut toggle_fav = false;

        eg::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(360.0)
            .min_width(280.0)
            .max_width(max_w)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.heading("Details");
                    ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    });
                });
                ui.separator();

                if let Some(error) = &failed {
                    let err_color = ui.visuals().error_fg_color;
                    ui.colored_label(err_color, "Couldn't load details.");
                    ui.label(error);
                    return;
                }
                let Some(d) = &details else {
                    if loading {
                        ui.horizontal(|ui| {
                            ui.add(eg::Spinner::new());
                            ui.label("Loading details…");
                        });
                    } else {
                        ui.weak("Select a movie to see details.");
                    }
                    return;
                };

                eg::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    // Poster preview
                    let avail_w = ui.available_width().clamp(120.0, 342.0);
                    let poster_size = eg::vec2(avail_w, avail_w * 1.5);
                    let (rect, _resp) = ui.allocate_exact_size(poster_size, eg::Sense::hover());
                    super::gfx::paint_poster(ui.painter(), rect, self.poster_texture(id));

                    ui.add_space(6.0);
                    ui.heading(d.movie.title_line());
                    if let Some(tag) = d.tagline.as_deref().filter(|t| !t.is_empty()) {
                        ui.label(eg::RichText::new(tag).italics());
                    }

                    ui.add_space(4.0);
                    ui.horizontal_wrapped(|ui| {
                        if let Some(date) = d.movie.release_date.as_deref().filter(|s| !s.is_empty()) {
                            ui.label(format!("Released {date}"));
                            ui.separator();
                        }
                        if let Some(rt) = d.runtime_label() {
                            ui.label(rt);
                            ui.separator();
                        }
                        ui.label(format!("★ {:.1}", d.movie.vote_average));
                    });

                    if !d.genres.is_empty() {
                        ui.horizontal_wrapped(|ui| {
                            let chip_bg = ui.visuals().faint_bg_color;
                            for g in &d.genres {
                                ui.label(eg::RichText::new(&g.name).small().background_color(chip_bg));
                            }
                        });
                    }

                    ui.add_space(6.0);
                    if let Some(dir) = d.director() {
                        ui.label(format!("Director: {}", dir.name));
                    }
                    let cast = d.top_cast(TOP_CAST);
                    if !cast.is_empty() {
                        ui.label(format!("Cast: {}", cast.iter().map(|c| c.name.as_str()).join(", ")));
                    }

                    ui.add_space(6.0);
                    match d.movie.overview.as_deref().filter(|s| !s.trim().is_empty()) {
                        Some(text) => {
                            ui.label(text);
                        }
                        None => {
                            ui.weak("No overview available.");
                        }
                    }

                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if let Some(url) = d.trailer_url() {
                            ui.hyperlink_to("▶ Watch trailer", url);
                        }
                        let fav = self.session.is_favorite(id);
                        let label = if fav { "♥ Remove favorite" } else { "♡ Add to favorites" };
                        if ui.button(label).clicked() {
                            toggle_fav = true;
                        }
                    });
                });
            });

        if toggle_fav {
            if let Some(d) = &details {
                let snapshot = self.session.favorite_snapshot(d);
                self.toggle_favorite(&snapshot);
            }
        }
        if close {
            self.close_detail();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::CinexApp;
    use crate::config::AppConfig;
    use crate::error::ApiError;
    use crate::model::{FilterParams, Genre, Movie, MoviePage};
    use crate::prefs::PrefStore;
    use crate::tmdb::MovieSource;

    struct Offline;

    impl MovieSource for Offline {
        fn trending(&self) -> Result<Vec<Movie>, ApiError> {
            Err(ApiError::Other("offline".into()))
        }
        fn search(&self, _: &str, _: u32, _: &FilterParams) -> Result<MoviePage, ApiError> {
            Err(ApiError::Other("offline".into()))
        }
        fn discover(&self, _: u32, _: &FilterParams) -> Result<MoviePage, ApiError> {
            Err(ApiError::Other("offline".into()))
        }
        fn details(&self, _: u64) -> Result<MovieDetails, ApiError> {
            Err(ApiError::Other("offline".into()))
        }
        fn genres(&self) -> Result<Vec<Genre>, ApiError> {
            Err(ApiError::Other("offline".into()))
        }
    }

    fn app() -> CinexApp {
        CinexApp::with_parts(AppConfig::default(), Arc::new(Offline), PrefStore::in_memory().unwrap())
    }

    fn render(app: &mut CinexApp) {
        let ctx = eg::Context::default();
        let _ = ctx.run(eg::RawInput::default(), |ctx| app.ui_render_detail_panel(ctx));
    }

    fn details(id: u64) -> MovieDetails {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": "Heat",
            "release_date": "1995-12-15",
            "runtime": 170,
            "genres": [{"id": 80, "name": "Crime"}, {"id": 18, "name": "Drama"}],
            "credits": {"cast": [{"name": "Al Pacino"}], "crew": [{"name": "Michael Mann", "job": "Director"}]},
            "videos": {"results": [{"key": "abc", "site": "YouTube", "type": "Trailer"}]}
        }))
        .unwrap()
    }

    #[test]
    fn panel_renders_every_detail_state() {
        let mut app = app();
        app.selected = Some(949);

        app.detail = Some(DetailState::Loading(949));
        render(&mut app);

        // a loading marker for another movie is not this movie's spinner
        app.detail = Some(DetailState::Loading(1));
        render(&mut app);

        app.detail = Some(DetailState::Failed { id: 949, error: "HTTP 404".into() });
        render(&mut app);

        app.detail = Some(DetailState::Ready(Box::new(details(949))));
        render(&mut app);

        assert_eq!(app.selected, Some(949));
        assert!(!app.session.is_favorite(949));
    }
}
