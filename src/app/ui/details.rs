use std::sync::Arc;

use eframe::egui::{Color32, RichText, Ui};

use crate::filter::SizeClass;
use crate::util::{format_size, short_symbol};

use super::super::ViewModel;
use super::super::render_utils::category_color;

const STRONGEST_LINKS: usize = 8;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        let interaction = self.session.interaction();
        let focus = interaction.focus().map(|focus| focus.node);
        let Some(id) = interaction.hovered().or(focus) else {
            ui.label("Hover a node to inspect it, click it to focus the camera.");
            return;
        };

        let graph = Arc::clone(self.session.graph());
        let Some(node) = graph.node(id) else {
            ui.label("The node is no longer part of the current snapshot.");
            return;
        };

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(short_symbol(&node.symbol))
                    .strong()
                    .size(18.0)
                    .color(category_color(&node.category)),
            );
            if focus == Some(id) {
                ui.small("focused");
            }
        });
        if !node.name.is_empty() {
            ui.label(node.name.as_str());
        }
        ui.small(format!("{}  ·  entity #{}", node.symbol, node.entity_id));
        ui.add_space(6.0);

        let size_class = match self.session.classify(node.size_metric) {
            SizeClass::Small => "small",
            SizeClass::Mid => "mid",
            SizeClass::Large => "large",
        };
        ui.label(format!("Category: {}", node.category));
        ui.label(format!("Size: {} ({size_class})", format_size(node.size_metric)));
        match node.prediction {
            Some(prediction) => {
                let color = if prediction > 0.0 {
                    Color32::from_rgb(74, 222, 128)
                } else {
                    Color32::from_rgb(248, 113, 113)
                };
                ui.colored_label(color, format!("Signal: {:+.1}%", prediction * 100.0));
            }
            None => {
                ui.label("Signal: n/a");
            }
        }
        ui.label(format!("Links: {}", graph.degree(id)));
        if !self.session.is_node_visible(id) {
            ui.small("Hidden by the current filters.");
        }

        ui.separator();
        ui.label(RichText::new("Strongest correlations").strong());
        let links = graph.strongest_links(id, STRONGEST_LINKS);
        if links.is_empty() {
            ui.label("No correlations for this node.");
            return;
        }

        let mut focus_request = None;
        for edge in links {
            let Some(other) = edge.other(id).and_then(|other| graph.node(other)) else {
                continue;
            };
            let label = format!(
                "{}  {:.2}  [{}]",
                short_symbol(&other.symbol),
                edge.strength,
                other.category
            );
            if ui.link(label).on_hover_text(other.name.as_str()).clicked() {
                focus_request = Some(other.id);
            }
        }

        if let Some(other) = focus_request {
            self.session.click(other);
        }
    }
}
