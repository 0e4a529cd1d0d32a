use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout};

use crate::market::Snapshot;
use crate::session::{SessionConfig, VisualizationSession};

use super::super::{ViewModel, ViewScratch};

impl ViewModel {
    pub(in crate::app) fn new(config: SessionConfig, source: String) -> Self {
        Self {
            session: VisualizationSession::new(config),
            source,
            search: String::new(),
            search_match_cache: None,
            node_scales: Vec::new(),
            view_scratch: ViewScratch::default(),
            reload_error: None,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        if !self.session.replace_snapshot(snapshot) {
            return;
        }

        self.node_scales.clear();
        self.node_scales.resize(self.session.graph().node_count(), 1.0);
        self.search_match_cache = None;
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("stock-graph");
                    ui.separator();
                    ui.label(format!("source: {}", self.source));
                    ui.label(format!("nodes: {}", self.session.graph().node_count()));
                    ui.label(format!("edges: {}", self.session.graph().edge_count()));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload snapshot"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    if let Some(error) = &self.reload_error {
                        ui.colored_label(egui::Color32::from_rgb(255, 85, 85), "reload failed")
                            .on_hover_text(error.as_str());
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
