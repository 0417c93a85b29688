// src/app/ui.rs
pub mod filters;
pub mod grid;
pub mod topbar;

use eframe::egui as eg;

use super::View;
use crate::model::Movie;

impl crate::app::CinexApp {
    // ---------- HOME ----------
    pub(crate) fn ui_render_home(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        self.ui_render_filters(ui);
        ui.separator();

        let movies: Vec<Movie> = self.session.displayed().to_vec();
        ui.horizontal(|ui| {
            ui.heading(self.session.list_title());
            if !movies.is_empty() {
                ui.label(eg::RichText::new(format!("{} shown", movies.len())).weak());
            }
        });
        ui.add_space(4.0);

        eg::ScrollArea::vertical()
            .id_source("home_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                if movies.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        if self.session.loading() {
                            ui.add(eg::Spinner::new().size(24.0));
                        } else {
                            ui.heading("No movies found");
                            if let Some(err) = self.session.last_error() {
                                let err_color = ui.visuals().error_fg_color;
                                ui.colored_label(err_color, err);
                            }
                        }
                    });
                    return;
                }

                self.ui_render_movie_grid(ui, ctx, &movies, "home");

                if self.session.can_load_more() {
                    ui.add_space(12.0);
                    ui.vertical_centered(|ui| {
                        let loading = self.session.loading();
                        let label = if loading { "Loading…" } else { "Load More" };
                        if ui.add_enabled(!loading, eg::Button::new(label)).clicked() {
                            self.do_load_more();
                        }
                        if loading {
                            ui.add(eg::Spinner::new());
                        }
                        ui.label(
                            eg::RichText::new(format!(
                                "Page {} of {}",
                                self.session.page(),
                                self.session.total_pages()
                            ))
                            .weak(),
                        );
                    });
                    ui.add_space(12.0);
                }
            });
    }

    // ---------- FAVORITES ----------
    pub(crate) fn ui_render_favorites(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let movies: Vec<Movie> = self.session.favorites().to_vec();
        self.queue_posters(&movies);

        ui.heading(format!("Favorites ({})", movies.len()));
        ui.add_space(4.0);

        if movies.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label("No favorites yet. Use the ♡ on a poster to add one.");
            });
            return;
        }

        eg::ScrollArea::vertical()
            .id_source("favorites_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                self.ui_render_movie_grid(ui, ctx, &movies, "favorites");
            });
    }

    // ---------- LOGIN ----------
    pub(crate) fn ui_render_login(&mut self, ui: &mut eg::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Login");
            ui.add_space(12.0);

            ui.add(
                eg::TextEdit::singleline(&mut self.login_user)
                    .hint_text("Username")
                    .desired_width(240.0),
            );
            let pass = ui.add(
                eg::TextEdit::singleline(&mut self.login_pass)
                    .password(true)
                    .hint_text("Password")
                    .desired_width(240.0),
            );
            let enter = pass.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter));

            ui.add_space(8.0);
            if ui.button("Login").clicked() || enter {
                self.login();
            }
            if ui.small_button("Cancel").clicked() {
                self.view = View::Home;
            }
        });
    }
}
