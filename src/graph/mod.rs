use std::collections::HashSet;

use tracing::warn;

use crate::geometry::Vec3;

mod layout;
mod synth;

pub use layout::layout;
pub use synth::synthesize;

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub entity_id: i64,
    pub name: String,
    pub symbol: String,
    pub category: String,
    pub size_metric: f64,
    pub prediction: Option<f32>,
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub strength: f32,
}

impl Edge {
    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }

    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if self.source == id {
            Some(self.target)
        } else if self.target == id {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn pair_key(&self) -> (NodeId, NodeId) {
        pair_key(self.source, self.target)
    }
}

pub(crate) fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<NodeId>>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let (edges, dropped) = sanitize_edges(nodes.len(), edges);
        debug_assert_eq!(dropped, 0, "graph construction produced invalid edges");
        if dropped > 0 {
            warn!(dropped, "dropped invalid edges while building graph");
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            adjacency[edge.source].push(edge.target);
            adjacency[edge.target].push(edge.source);
        }

        Self {
            nodes,
            edges,
            adjacency,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(id).map(|node| node.position)
    }

    /// Edges touching `id`, strongest first.
    pub fn strongest_links(&self, id: NodeId, limit: usize) -> Vec<Edge> {
        let mut links = self
            .edges
            .iter()
            .filter(|edge| edge.touches(id))
            .copied()
            .collect::<Vec<_>>();
        links.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        links.truncate(limit);
        links
    }

    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|node| seen.insert(node.category.as_str()))
            .map(|node| node.category.clone())
            .collect()
    }
}

/// Drops self-loops, repeated unordered pairs (first occurrence wins),
/// dangling endpoints and strengths outside `[0, 1]`. Returns the kept edges
/// and the number dropped.
pub(crate) fn sanitize_edges(node_count: usize, edges: Vec<Edge>) -> (Vec<Edge>, usize) {
    let total = edges.len();
    let mut seen = HashSet::with_capacity(total);
    let kept = edges
        .into_iter()
        .filter(|edge| {
            edge.source != edge.target
                && edge.source < node_count
                && edge.target < node_count
                && (0.0..=1.0).contains(&edge.strength)
                && seen.insert(edge.pair_key())
        })
        .collect::<Vec<_>>();
    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node(id: NodeId, category: &str) -> Node {
        Node {
            id,
            entity_id: id as i64,
            name: format!("Node {id}"),
            symbol: format!("N{id}.NS"),
            category: category.to_owned(),
            size_metric: id as f64,
            prediction: None,
            position: Vec3::ZERO,
        }
    }

    pub(crate) fn edge(source: NodeId, target: NodeId, strength: f32) -> Edge {
        Edge {
            source,
            target,
            strength,
        }
    }

    pub(crate) fn triangle() -> Graph {
        Graph::new(
            vec![node(0, "A"), node(1, "A"), node(2, "B")],
            vec![edge(0, 1, 0.8), edge(0, 2, 0.5), edge(1, 2, 0.3)],
        )
    }

    #[test]
    fn sanitize_drops_self_loops_duplicates_and_dangling() {
        let (kept, dropped) = sanitize_edges(
            3,
            vec![
                edge(0, 1, 0.9),
                edge(1, 0, 0.4),
                edge(2, 2, 0.7),
                edge(1, 5, 0.7),
                edge(1, 2, 1.5),
                edge(1, 2, 0.6),
            ],
        );
        assert_eq!(dropped, 4);
        assert_eq!(kept, vec![edge(0, 1, 0.9), edge(1, 2, 0.6)]);
    }

    #[test]
    fn neighbors_are_symmetric() {
        let graph = triangle();
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.neighbors(2), &[0, 1]);
        assert!(graph.neighbors(9).is_empty());
        assert_eq!(graph.degree(1), 2);
    }

    #[test]
    fn strongest_links_are_sorted() {
        let graph = triangle();
        let links = graph.strongest_links(2, 5);
        assert_eq!(links, vec![edge(0, 2, 0.5), edge(1, 2, 0.3)]);
        assert_eq!(graph.strongest_links(0, 1), vec![edge(0, 1, 0.8)]);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let graph = triangle();
        assert_eq!(graph.categories(), vec!["A".to_owned(), "B".to_owned()]);
    }
}
