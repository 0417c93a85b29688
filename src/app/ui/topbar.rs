// src/app/ui/topbar.rs
use super::super::View;
use eframe::egui as eg;

impl crate::app::CinexApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            // Title doubles as "home": clears the search and shows trending again
            if ui
                .add(eg::Label::new(eg::RichText::new("🎬 Cinedex").heading()).sense(eg::Sense::click()))
                .on_hover_text("Back to trending")
                .clicked()
            {
                self.go_home();
            }

            ui.separator();

            // Views
            if ui.selectable_label(self.view == View::Home, "Home").clicked() {
                self.go_home();
            }
            let fav_label = format!("Favorites ({})", self.session.favorites().len());
            if ui.selectable_label(self.view == View::Favorites, fav_label).clicked() {
                self.view = View::Favorites;
            }

            ui.separator();

            // Search
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search movies…")
                    .desired_width(220.0),
            );
            let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter));
            let can_search = !self.search_input.trim().is_empty();
            let clicked = ui
                .add_enabled(can_search, eg::Button::new("Search"))
                .clicked();
            if enter || clicked {
                self.do_search();
            }

            ui.separator();

            // Theme
            let mut dark = self.session.dark_mode();
            if ui
                .checkbox(&mut dark, "Dark")
                .on_hover_text("Dark mode (remembered between runs)")
                .changed()
            {
                self.session.set_dark_mode(dark);
            }

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                match self.session.store().username() {
                    Some(name) => {
                        if ui.small_button("Logout").clicked() {
                            self.logout();
                        }
                        ui.label(format!("👤 {name}"));
                    }
                    None => {
                        if ui.selectable_label(self.view == View::Login, "Login").clicked() {
                            self.view = View::Login;
                        }
                    }
                }

                if self.session.loading() {
                    ui.add(eg::Spinner::new());
                }
                if !self.status.is_empty() {
                    ui.label(eg::RichText::new(&self.status).italics().weak());
                }
            });
        });
    }
}
