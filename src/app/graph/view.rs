use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::{Graph, Node, NodeId};
use crate::interaction::{EdgeEmphasis, NodeEmphasis, approach_scale, target_scale};
use crate::util::{format_size, short_symbol};

use super::super::render_utils::{
    Projection, blend_color, category_color, circle_visible, dim_color, draw_background, edge_stroke,
};
use super::super::{ProjectedNode, SearchMatchCache, ViewModel};

const NODE_RADIUS: f32 = 2.0;
const MIN_SCREEN_RADIUS: f32 = 2.5;
const MAX_SCREEN_RADIUS: f32 = 40.0;
const STRONG_LINK: f32 = 0.7;
const FOCUS_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

pub(in crate::app) fn search_matches(graph: &Graph, query: &str) -> HashSet<NodeId> {
    let matcher = SkimMatcherV2::default();
    graph
        .nodes()
        .iter()
        .filter(|node| {
            fuzzy_match_score(&matcher, short_symbol(&node.symbol), query).is_some()
                || fuzzy_match_score(&matcher, &node.name, query).is_some()
        })
        .map(|node| node.id)
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<NodeId>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let revision = self.session.revision();
        if let Some(cached) = &self.search_match_cache
            && cached.revision == revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(search_matches(self.session.graph(), query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    fn update_node_scales(&mut self, graph: &Graph, time: f64) -> bool {
        let interaction = self.session.interaction();
        self.node_scales.resize(graph.node_count(), 1.0);

        let mut animating = false;
        for (node, scale) in graph.nodes().iter().zip(self.node_scales.iter_mut()) {
            let target = target_scale(interaction.node_emphasis(node.id), node.prediction, time);
            let next = approach_scale(*scale, target);
            animating |= (next - *scale).abs() > 1e-3;
            *scale = next;
        }
        animating
    }

    fn project_nodes(&mut self, rect: Rect, graph: &Graph) {
        let projection = Projection::new(&self.session.pose(), rect);
        let scratch = &mut self.view_scratch;

        scratch.projected.clear();
        scratch.draw_order.clear();
        for node in graph.nodes() {
            let projected = self
                .session
                .is_node_visible(node.id)
                .then(|| projection.project(node.position))
                .flatten()
                .map(|(screen, depth, pixels_per_unit)| {
                    let scale = self.node_scales.get(node.id).copied().unwrap_or(1.0);
                    ProjectedNode {
                        screen,
                        depth,
                        radius: (NODE_RADIUS * scale * pixels_per_unit)
                            .clamp(MIN_SCREEN_RADIUS, MAX_SCREEN_RADIUS),
                    }
                })
                .filter(|projected| circle_visible(rect, projected.screen, projected.radius));

            if projected.is_some() {
                scratch.draw_order.push(node.id);
            }
            scratch.projected.push(projected);
        }

        let projected = &scratch.projected;
        scratch.draw_order.sort_by(|a, b| {
            let depth = |id: &NodeId| projected[*id].map_or(0.0, |node| node.depth);
            depth(b).total_cmp(&depth(a))
        });
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect);

        self.handle_camera_zoom(ui, &response);
        self.handle_camera_orbit(&response);

        let (dt, time) = ui.input(|input| (input.stable_dt.min(0.1), input.time));
        let camera_moving = self.session.advance_frame(dt);

        let graph = Arc::clone(self.session.graph());
        if graph.node_count() == 0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The current snapshot has no entities.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        let scales_animating = self.update_node_scales(&graph, time);
        self.project_nodes(rect, &graph);

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|position| rect.contains(*position));
        let hovered = Self::hovered_node(&self.view_scratch.projected, pointer);
        self.apply_pointer(hovered, response.clicked_by(egui::PointerButton::Primary));
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let search_matches = self.cached_search_matches();
        self.draw_edges(&painter, &graph);
        self.draw_nodes(&painter, &graph, search_matches.as_deref());
        self.draw_tooltips(&painter, &graph);

        let interaction = self.session.interaction();
        if let Some(id) = interaction.hovered()
            && let Some(node) = graph.node(id)
        {
            let prediction = node
                .prediction
                .map_or_else(|| "n/a".to_owned(), |value| format!("{:+.1}%", value * 100.0));
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  size {}  |  signal {}  |  links {}",
                    short_symbol(&node.symbol),
                    node.category,
                    format_size(node.size_metric),
                    prediction,
                    interaction.neighbors().len()
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if camera_moving || scales_animating || response.dragged() {
            ui.ctx().request_repaint();
        }
    }

    fn draw_edges(&self, painter: &Painter, graph: &Graph) {
        let interaction = self.session.interaction();
        let visibility = self.session.visibility();
        let projected = &self.view_scratch.projected;

        for (edge, visible) in graph.edges().iter().zip(&visibility.edges) {
            if !visible {
                continue;
            }
            let (Some(Some(start)), Some(Some(end))) =
                (projected.get(edge.source), projected.get(edge.target))
            else {
                continue;
            };

            let base = if edge.strength > STRONG_LINK {
                Color32::WHITE
            } else {
                Color32::from_gray(0x44)
            };
            let stroke = match interaction.edge_emphasis(edge) {
                EdgeEmphasis::Active => edge_stroke(1.8, blend_color(base, Color32::WHITE, 0.5), (edge.strength * 0.9).max(0.35)),
                EdgeEmphasis::Normal => edge_stroke(1.0, base, edge.strength * 0.4),
                EdgeEmphasis::Dimmed => edge_stroke(1.0, base, 0.02),
            };
            painter.line_segment([start.screen, end.screen], stroke);
        }
    }

    fn draw_nodes(&self, painter: &Painter, graph: &Graph, search_matches: Option<&HashSet<NodeId>>) {
        let interaction = self.session.interaction();
        let focused = interaction.focus().map(|focus| focus.node);

        for &id in &self.view_scratch.draw_order {
            let (Some(node), Some(projected)) = (graph.node(id), self.view_scratch.projected[id]) else {
                continue;
            };

            let emphasis = interaction.node_emphasis(id);
            let base = category_color(&node.category);
            let color = match emphasis {
                NodeEmphasis::Dimmed => dim_color(base, emphasis.intensity()),
                _ => blend_color(base, Color32::WHITE, (emphasis.intensity() - 0.5).max(0.0) * 0.6),
            };

            if node.prediction.is_some_and(|value| value < -0.2) {
                painter.circle_stroke(projected.screen, projected.radius, Stroke::new(1.4, color));
            } else {
                painter.circle_filled(projected.screen, projected.radius, color);
            }

            if emphasis == NodeEmphasis::Emphasized {
                painter.circle_stroke(
                    projected.screen,
                    projected.radius + 3.0,
                    Stroke::new(1.2, color.gamma_multiply(0.6)),
                );
            }
            if focused == Some(id) {
                painter.circle_stroke(projected.screen, projected.radius + 5.0, Stroke::new(1.6, FOCUS_COLOR));
            }
            if search_matches.is_some_and(|matches| matches.contains(&id)) {
                painter.circle_stroke(projected.screen, projected.radius + 2.0, Stroke::new(1.4, SEARCH_COLOR));
            }
        }
    }

    fn draw_tooltips(&self, painter: &Painter, graph: &Graph) {
        let interaction = self.session.interaction();
        let Some(hovered) = interaction.hovered() else {
            return;
        };

        for &id in &self.view_scratch.draw_order {
            if !interaction.node_emphasis(id).shows_label() {
                continue;
            }
            let (Some(node), Some(projected)) = (graph.node(id), self.view_scratch.projected[id]) else {
                continue;
            };
            draw_tooltip(painter, node, projected, id == hovered);
        }
    }
}

fn draw_tooltip(painter: &Painter, node: &Node, projected: ProjectedNode, hovered: bool) {
    let (font, alpha) = if hovered { (13.0, 235) } else { (11.0, 150) };
    let mut text = short_symbol(&node.symbol).to_owned();
    if hovered {
        if !node.name.is_empty() {
            text.push('\n');
            text.push_str(&node.name);
        }
        if let Some(prediction) = node.prediction {
            let arrow = if prediction > 0.0 { '▲' } else { '▼' };
            text.push_str(&format!("\n{arrow} {:+.1}%", prediction * 100.0));
        }
    }

    let galley = painter.layout_no_wrap(text, FontId::proportional(font), Color32::from_white_alpha(alpha));
    let offset = if hovered { 20.0 } else { 8.0 };
    let anchor = projected.screen - vec2(galley.size().x * 0.5, projected.radius + offset + galley.size().y);
    let frame = Rect::from_min_size(anchor, galley.size()).expand(5.0);

    painter.rect_filled(frame, 4.0, Color32::from_black_alpha(if hovered { 225 } else { 150 }));
    painter.rect_stroke(
        frame,
        4.0,
        Stroke::new(1.0, category_color(&node.category).gamma_multiply(0.7)),
        egui::StrokeKind::Outside,
    );
    painter.galley(anchor, galley, Color32::WHITE);
}
