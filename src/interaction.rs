use std::collections::HashSet;

use crate::geometry::Vec3;
use crate::graph::{Edge, Graph, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEmphasis {
    Emphasized,
    Related,
    Normal,
    Dimmed,
}

impl NodeEmphasis {
    pub fn intensity(self) -> f32 {
        match self {
            Self::Emphasized => 1.0,
            Self::Related => 0.75,
            Self::Normal => 0.5,
            Self::Dimmed => 0.1,
        }
    }

    pub fn shows_label(self) -> bool {
        matches!(self, Self::Emphasized | Self::Related)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEmphasis {
    Active,
    Normal,
    Dimmed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Focus {
    pub node: NodeId,
    pub position: Vec3,
}

#[derive(Clone, Debug)]
pub struct InteractionState {
    hovered: Option<NodeId>,
    neighbors: HashSet<NodeId>,
    focus: Option<Focus>,
    auto_rotating: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InteractionState {
    pub fn new(auto_rotating: bool) -> Self {
        Self {
            hovered: None,
            neighbors: HashSet::new(),
            focus: None,
            auto_rotating,
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn neighbors(&self) -> &HashSet<NodeId> {
        &self.neighbors
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    pub fn focus_position(&self) -> Option<Vec3> {
        self.focus.map(|focus| focus.position)
    }

    pub fn auto_rotating(&self) -> bool {
        self.auto_rotating
    }

    /// Hover always suppresses idle rotation, whatever the stored flag says.
    pub fn auto_rotation_active(&self) -> bool {
        self.auto_rotating && self.hovered.is_none()
    }

    pub fn pointer_enter(&mut self, graph: &Graph, id: NodeId) -> bool {
        if !graph.contains(id) || self.hovered == Some(id) {
            return false;
        }

        self.hovered = Some(id);
        self.refresh_neighbors(graph);
        true
    }

    pub fn pointer_leave(&mut self) -> bool {
        if self.hovered.is_none() {
            return false;
        }

        self.hovered = None;
        self.neighbors.clear();
        true
    }

    pub fn click(&mut self, graph: &Graph, id: NodeId) -> bool {
        let Some(position) = graph.position(id) else {
            return false;
        };

        self.focus = Some(Focus { node: id, position });
        self.auto_rotating = false;
        true
    }

    pub fn reset_view(&mut self) {
        self.focus = None;
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.auto_rotating = !self.auto_rotating;
        if self.auto_rotating {
            self.focus = None;
        }
    }

    pub fn node_emphasis(&self, id: NodeId) -> NodeEmphasis {
        match self.hovered {
            None => NodeEmphasis::Normal,
            Some(hovered) if hovered == id => NodeEmphasis::Emphasized,
            Some(_) if self.neighbors.contains(&id) => NodeEmphasis::Related,
            Some(_) => NodeEmphasis::Dimmed,
        }
    }

    pub fn edge_emphasis(&self, edge: &Edge) -> EdgeEmphasis {
        match self.hovered {
            None => EdgeEmphasis::Normal,
            Some(hovered) if edge.touches(hovered) => EdgeEmphasis::Active,
            Some(_) => EdgeEmphasis::Dimmed,
        }
    }

    /// Re-anchors the state on a freshly published graph. Ids that no longer
    /// exist fall back to the idle/unfocused defaults.
    pub fn reconcile(&mut self, graph: &Graph) {
        match self.hovered {
            Some(id) if graph.contains(id) => self.refresh_neighbors(graph),
            Some(_) => {
                self.hovered = None;
                self.neighbors.clear();
            }
            None => self.neighbors.clear(),
        }

        self.focus = self.focus.and_then(|focus| {
            graph.position(focus.node).map(|position| Focus {
                node: focus.node,
                position,
            })
        });
    }

    fn refresh_neighbors(&mut self, graph: &Graph) {
        self.neighbors.clear();
        if let Some(id) = self.hovered {
            self.neighbors.extend(graph.neighbors(id).iter().copied());
        }
    }
}

const HOVER_SCALE: f32 = 1.5;
const PULSE_AMPLITUDE: f32 = 0.1;
const PULSE_RATE: f32 = 3.0;
const SCALE_APPROACH: f32 = 0.1;

pub fn target_scale(emphasis: NodeEmphasis, prediction: Option<f32>, time_secs: f64) -> f32 {
    let mut scale = if emphasis == NodeEmphasis::Emphasized {
        HOVER_SCALE
    } else {
        1.0
    };
    if prediction.is_some_and(|value| value > 0.5) {
        scale += (time_secs as f32 * PULSE_RATE).sin() * PULSE_AMPLITUDE;
    }
    scale
}

pub fn approach_scale(current: f32, target: f32) -> f32 {
    current + (target - current) * SCALE_APPROACH
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::vec3;
    use crate::graph::tests::{edge, node, triangle};

    fn placed_triangle() -> Graph {
        let mut nodes = vec![node(0, "A"), node(1, "A"), node(2, "B")];
        nodes[0].position = vec3(1.0, 2.0, 3.0);
        nodes[1].position = vec3(-4.0, 0.0, 8.0);
        nodes[2].position = vec3(0.0, -9.0, 1.0);
        Graph::new(
            nodes,
            vec![edge(0, 1, 0.8), edge(0, 2, 0.5), edge(1, 2, 0.3)],
        )
    }

    #[test]
    fn hover_derives_neighbors() {
        let graph = triangle();
        let mut state = InteractionState::default();

        assert!(state.pointer_enter(&graph, 0));
        assert_eq!(state.neighbors(), &HashSet::from([1, 2]));

        assert!(state.pointer_enter(&graph, 2));
        assert_eq!(state.neighbors(), &HashSet::from([0, 1]));

        assert!(state.pointer_leave());
        assert_eq!(state.hovered(), None);
        assert!(state.neighbors().is_empty());
    }

    #[test]
    fn hovering_isolated_node_has_no_neighbors() {
        let graph = Graph::new(vec![node(0, "A"), node(1, "A"), node(2, "B")], vec![edge(0, 1, 0.9)]);
        let mut state = InteractionState::default();
        state.pointer_enter(&graph, 2);
        assert!(state.neighbors().is_empty());
        assert_eq!(state.node_emphasis(0), NodeEmphasis::Dimmed);
        assert_eq!(state.edge_emphasis(&graph.edges()[0]), EdgeEmphasis::Dimmed);
    }

    #[test]
    fn unknown_hover_target_is_ignored() {
        let graph = triangle();
        let mut state = InteractionState::default();
        assert!(!state.pointer_enter(&graph, 17));
        assert_eq!(state.hovered(), None);
    }

    #[test]
    fn classification_follows_hover() {
        let graph = Graph::new(
            vec![node(0, "A"), node(1, "A"), node(2, "B"), node(3, "B")],
            vec![edge(0, 1, 0.8), edge(2, 3, 0.4)],
        );
        let mut state = InteractionState::default();
        for id in 0..4 {
            assert_eq!(state.node_emphasis(id), NodeEmphasis::Normal);
        }
        assert_eq!(state.edge_emphasis(&graph.edges()[0]), EdgeEmphasis::Normal);

        state.pointer_enter(&graph, 0);
        assert_eq!(state.node_emphasis(0), NodeEmphasis::Emphasized);
        assert_eq!(state.node_emphasis(1), NodeEmphasis::Related);
        assert_eq!(state.node_emphasis(2), NodeEmphasis::Dimmed);
        assert_eq!(state.edge_emphasis(&graph.edges()[0]), EdgeEmphasis::Active);
        assert_eq!(state.edge_emphasis(&graph.edges()[1]), EdgeEmphasis::Dimmed);
    }

    #[test]
    fn intensity_is_strictly_ordered() {
        assert!(NodeEmphasis::Emphasized.intensity() > NodeEmphasis::Related.intensity());
        assert!(NodeEmphasis::Related.intensity() > NodeEmphasis::Normal.intensity());
        assert!(NodeEmphasis::Normal.intensity() > NodeEmphasis::Dimmed.intensity());
    }

    #[test]
    fn click_focuses_and_stops_rotation() {
        let graph = placed_triangle();
        let mut state = InteractionState::default();
        assert!(state.auto_rotating());

        assert!(state.click(&graph, 1));
        let first = state.focus_position();
        assert_eq!(first, Some(vec3(-4.0, 0.0, 8.0)));
        assert!(!state.auto_rotating());

        state.click(&graph, 1);
        assert_eq!(state.focus_position(), first);
    }

    #[test]
    fn focus_survives_pointer_leave() {
        let graph = placed_triangle();
        let mut state = InteractionState::default();
        state.pointer_enter(&graph, 2);
        state.click(&graph, 2);
        state.pointer_leave();
        assert_eq!(state.focus().map(|focus| focus.node), Some(2));
    }

    #[test]
    fn reset_and_rotation_toggle_release_focus() {
        let graph = placed_triangle();
        let mut state = InteractionState::default();

        state.click(&graph, 0);
        state.reset_view();
        assert_eq!(state.focus_position(), None);

        state.click(&graph, 0);
        state.toggle_auto_rotate();
        assert!(state.auto_rotating());
        assert_eq!(state.focus_position(), None);

        state.click(&graph, 0);
        state.toggle_auto_rotate();
        state.toggle_auto_rotate();
        assert!(!state.auto_rotating());
        assert_eq!(state.focus_position(), None);
    }

    #[test]
    fn hover_suppresses_auto_rotation() {
        let graph = triangle();
        let mut state = InteractionState::default();
        assert!(state.auto_rotation_active());
        state.pointer_enter(&graph, 1);
        assert!(state.auto_rotating());
        assert!(!state.auto_rotation_active());
        state.pointer_leave();
        assert!(state.auto_rotation_active());
    }

    #[test]
    fn reconcile_drops_missing_ids() {
        let large = Graph::new((0..5).map(|id| node(id, "A")).collect(), vec![edge(3, 4, 0.9)]);
        let small = Graph::new((0..3).map(|id| node(id, "A")).collect(), vec![edge(0, 1, 0.9)]);
        let mut state = InteractionState::default();
        state.pointer_enter(&large, 3);
        state.click(&large, 4);

        state.reconcile(&small);
        assert_eq!(state.hovered(), None);
        assert!(state.neighbors().is_empty());
        assert_eq!(state.focus(), None);
    }

    #[test]
    fn reconcile_refreshes_surviving_ids() {
        let before = placed_triangle();
        let after = Graph::new(
            vec![node(0, "A"), node(1, "A"), node(2, "B")],
            vec![edge(2, 1, 0.7)],
        );
        let mut state = InteractionState::default();
        state.pointer_enter(&before, 1);
        state.click(&before, 1);

        state.reconcile(&after);
        assert_eq!(state.hovered(), Some(1));
        assert_eq!(state.neighbors(), &HashSet::from([2]));
        assert_eq!(state.focus_position(), Some(Vec3::ZERO));
    }

    #[test]
    fn hovered_nodes_grow_and_bullish_nodes_pulse() {
        assert_eq!(target_scale(NodeEmphasis::Emphasized, None, 0.0), HOVER_SCALE);
        assert_eq!(target_scale(NodeEmphasis::Dimmed, Some(-1.0), 0.4), 1.0);
        let pulsing = target_scale(NodeEmphasis::Normal, Some(1.0), 0.5);
        assert!((pulsing - (1.0 + (1.5f32).sin() * 0.1)).abs() < 1e-6);

        let mut scale = 1.0;
        for _ in 0..200 {
            scale = approach_scale(scale, HOVER_SCALE);
        }
        assert!((scale - HOVER_SCALE).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_emphasis_is_exclusive(hover in proptest::option::of(0usize..3), id in 0usize..3) {
            let graph = triangle();
            let mut state = InteractionState::default();
            if let Some(hover) = hover {
                state.pointer_enter(&graph, hover);
            }

            let emphasis = state.node_emphasis(id);
            let emphasized = state.hovered() == Some(id);
            let related = state.neighbors().contains(&id) && !emphasized;
            prop_assert_eq!(emphasis == NodeEmphasis::Emphasized, emphasized);
            prop_assert_eq!(emphasis == NodeEmphasis::Related, related);
            prop_assert_eq!(
                emphasis == NodeEmphasis::Dimmed,
                state.hovered().is_some() && !emphasized && !related
            );
        }
    }
}
