use eframe::egui::{self, Pos2, Ui};

use crate::graph::NodeId;

use super::super::{ProjectedNode, ViewModel};

const ORBIT_RADIANS_PER_POINT: f32 = 0.006;

impl ViewModel {
    pub(in crate::app) fn handle_camera_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
        self.session.dolly(factor);
    }

    pub(in crate::app) fn handle_camera_orbit(&mut self, response: &egui::Response) {
        if !response.dragged_by(egui::PointerButton::Primary)
            && !response.dragged_by(egui::PointerButton::Secondary)
        {
            return;
        }

        let delta = response.drag_delta();
        self.session.orbit(
            -delta.x * ORBIT_RADIANS_PER_POINT,
            delta.y * ORBIT_RADIANS_PER_POINT,
        );
    }

    /// Nearest visible node under the pointer; on overlap the one closest to
    /// the camera wins.
    pub(in crate::app) fn hovered_node(
        projected: &[Option<ProjectedNode>],
        pointer: Option<Pos2>,
    ) -> Option<NodeId> {
        let pointer = pointer?;
        projected
            .iter()
            .enumerate()
            .filter_map(|(id, node)| {
                let node = node.as_ref()?;
                (node.screen.distance(pointer) <= node.radius.max(4.0)).then_some((id, node.depth))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub(in crate::app) fn apply_pointer(&mut self, hovered: Option<NodeId>, clicked: bool) {
        match hovered {
            Some(id) if self.session.interaction().hovered() != Some(id) => {
                self.session.pointer_enter(id);
            }
            None if self.session.interaction().hovered().is_some() => {
                self.session.pointer_leave();
            }
            _ => {}
        }

        if clicked && let Some(id) = hovered {
            self.session.click(id);
        }
    }
}
