// src/app/ui/filters.rs
use chrono::Datelike;
use eframe::egui as eg;

use crate::model::Genre;

const OLDEST_YEAR: i32 = 1900;

/// Newest first, from the current year back to 1900.
pub fn year_choices(current_year: i32) -> Vec<i32> {
    (OLDEST_YEAR..=current_year.max(OLDEST_YEAR)).rev().collect()
}

impl crate::app::CinexApp {
    // ---------- FILTER PANEL ----------
    pub(crate) fn ui_render_filters(&mut self, ui: &mut eg::Ui) {
        let genres: Vec<Genre> = self.session.genres().to_vec();
        let years = year_choices(chrono::Local::now().year());
        let mut apply = false;
        let mut reset = false;

        let header = if self.session.is_filtered() {
            "Filters (applied)"
        } else {
            "Filters"
        };

        eg::CollapsingHeader::new(header)
            .id_source("filters_panel")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    let filters = self.session.filters_mut();

                    // Genre
                    ui.label("Genre:");
                    let genre_text = filters
                        .genre
                        .and_then(|id| genres.iter().find(|g| g.id == id))
                        .map(|g| g.name.clone())
                        .unwrap_or_else(|| "Any genre".into());
                    eg::ComboBox::from_id_source("genre_combo")
                        .selected_text(genre_text)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut filters.genre, None, "Any genre");
                            for g in &genres {
                                ui.selectable_value(&mut filters.genre, Some(g.id), &g.name);
                            }
                        });

                    ui.separator();

                    // Year
                    ui.label("Year:");
                    let year_text = filters
                        .year
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "Any year".into());
                    eg::ComboBox::from_id_source("year_combo")
                        .selected_text(year_text)
                        .height(320.0)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut filters.year, None, "Any year");
                            for y in &years {
                                ui.selectable_value(&mut filters.year, Some(*y), y.to_string());
                            }
                        });

                    ui.separator();

                    // Rating
                    ui.label("Min rating:");
                    ui.add(
                        eg::Slider::new(&mut filters.min_rating, 0.0..=10.0)
                            .step_by(0.5)
                            .fixed_decimals(1),
                    );
                });

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let can_apply = !self.session.filters().is_empty();
                    if ui
                        .add_enabled(can_apply, eg::Button::new("Apply Filters"))
                        .clicked()
                    {
                        apply = true;
                    }
                    if ui.button("Reset").clicked() {
                        reset = true;
                    }
                });
            });

        if apply {
            self.do_apply_filters();
        } else if reset {
            self.do_reset_filters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_run_newest_first_down_to_1900() {
        let years = year_choices(2024);
        assert_eq!(years.first(), Some(&2024));
        assert_eq!(years.last(), Some(&1900));
        assert_eq!(years.len(), 125);
    }

    #[test]
    fn a_clock_before_1900_still_offers_one_year() {
        assert_eq!(year_choices(1850), vec![1900]);
    }
}
