use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::{self, RichText, Ui, vec2};

use crate::filter::{SizeBucket, TimeWindow};
use crate::util::short_symbol;

use super::super::ViewModel;
use super::super::render_utils::category_color;

const SEARCH_RESULT_ROWS: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        ui.separator();
        ui.add_space(4.0);

        let mut auto_rotating = self.session.interaction().auto_rotating();
        if ui
            .checkbox(&mut auto_rotating, "Auto-rotate")
            .on_hover_text("Slowly orbit the graph while nothing is hovered. Turning it on releases the focus.")
            .changed()
        {
            self.session.toggle_auto_rotate();
        }

        let focused = self.session.interaction().focus().is_some();
        if ui
            .add_enabled(focused, egui::Button::new("Reset view"))
            .on_hover_text("Release the focused node and stop following it.")
            .clicked()
        {
            self.session.reset_view();
        }

        ui.checkbox(&mut self.show_fps_bar, "Show FPS");

        ui.separator();
        self.draw_search(ui);

        ui.separator();
        egui::ScrollArea::vertical()
            .id_salt("filter_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| self.draw_filters(ui));
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (symbol or name)")
            .on_hover_text("Fuzzy-highlight matching nodes; click a result to focus it.");
        ui.text_edit_singleline(&mut self.search);

        let Some(matches) = self.cached_search_matches() else {
            return;
        };

        if matches.is_empty() {
            ui.small("No matching entities.");
            return;
        }

        let graph = Arc::clone(self.session.graph());
        let mut ids = matches.iter().copied().collect::<Vec<_>>();
        ids.sort_unstable();

        let mut focus_request = None;
        for &id in ids.iter().take(SEARCH_RESULT_ROWS) {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let label = format!("{}  {}", short_symbol(&node.symbol), node.name);
            if ui.link(label).on_hover_text(node.category.as_str()).clicked() {
                focus_request = Some(id);
            }
        }
        if ids.len() > SEARCH_RESULT_ROWS {
            ui.small(format!("... and {} more", ids.len() - SEARCH_RESULT_ROWS));
        }

        if let Some(id) = focus_request {
            self.session.click(id);
        }
    }

    fn draw_filters(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(4.0);

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for node in self.session.graph().nodes() {
            *counts.entry(node.category.clone()).or_default() += 1;
        }

        ui.horizontal(|ui| {
            ui.label(RichText::new("Categories").strong());
            if ui.small_button("Select all").clicked() {
                self.session.select_all_categories();
            }
        });

        let mut toggled = None;
        for (category, count) in &counts {
            let mut selected = self.session.filter().is_category_selected(category);
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(10.0, 10.0), egui::Sense::hover());
                ui.painter()
                    .circle_filled(swatch.center(), 4.0, category_color(category));
                if ui
                    .checkbox(&mut selected, format!("{category} ({count})"))
                    .changed()
                {
                    toggled = Some(category.clone());
                }
            });
        }
        if let Some(category) = toggled {
            self.session.toggle_category(&category);
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Market cap").strong());
        let mut bucket = self.session.filter().size_bucket();
        ui.horizontal_wrapped(|ui| {
            for option in SizeBucket::ALL {
                ui.selectable_value(&mut bucket, option, option.label());
            }
        });
        if bucket != self.session.filter().size_bucket() {
            self.session.set_size_bucket(bucket);
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Min correlation").strong());
        let mut threshold = self.session.filter().min_correlation();
        let slider = ui
            .add(egui::Slider::new(&mut threshold, 0.0..=1.0).step_by(0.05))
            .on_hover_text("Hide links weaker than this strength.");
        if slider.changed() {
            self.session.set_correlation_threshold(threshold);
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Time window").strong());
        let mut window = self.session.filter().time_window();
        ui.horizontal(|ui| {
            for option in TimeWindow::ALL {
                ui.selectable_value(&mut window, option, option.label());
            }
        });
        if window != self.session.filter().time_window() {
            self.session.set_time_window(window);
        }

        ui.add_space(8.0);
        let active = self.session.filter().active_filters();
        if active.is_empty() {
            ui.small("No active filters.");
        } else {
            ui.label(RichText::new("Active filters").strong());
            for label in active.labels() {
                ui.small(label);
            }
        }
    }
}
