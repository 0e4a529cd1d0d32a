use std::collections::{HashMap, HashSet};
use std::ops::{Range, RangeInclusive};

use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::geometry::Vec3;
use crate::market::Entity;

use super::{Edge, Graph, Node, NodeId, layout, pair_key};

pub const CROSS_CATEGORY_PROBABILITY: f64 = 0.4;

const SAME_CATEGORY_LINKS: RangeInclusive<usize> = 3..=5;
const CROSS_CATEGORY_LINKS: RangeInclusive<usize> = 1..=2;
const SAME_CATEGORY_STRENGTH: Range<f32> = 0.6..1.0;
const CROSS_CATEGORY_STRENGTH: Range<f32> = 0.3..0.7;

struct CategoryIndex {
    grouped: Vec<NodeId>,
    range_of: Vec<Range<usize>>,
    slot_of: Vec<usize>,
}

impl CategoryIndex {
    fn build(nodes: &[Node]) -> Self {
        let mut order: Vec<&str> = Vec::new();
        let mut members: HashMap<&str, Vec<NodeId>> = HashMap::new();
        for node in nodes {
            let entry = members.entry(node.category.as_str()).or_insert_with(|| {
                order.push(node.category.as_str());
                Vec::new()
            });
            entry.push(node.id);
        }

        let mut grouped = Vec::with_capacity(nodes.len());
        let mut range_of = vec![0..0; nodes.len()];
        let mut slot_of = vec![0; nodes.len()];
        for category in order {
            let ids = members.remove(category).unwrap_or_default();
            let range = grouped.len()..grouped.len() + ids.len();
            for (slot, &id) in range.clone().zip(&ids) {
                range_of[id] = range.clone();
                slot_of[id] = slot;
            }
            grouped.extend(ids);
        }

        Self {
            grouped,
            range_of,
            slot_of,
        }
    }

    fn peer_count(&self, id: NodeId) -> usize {
        self.range_of[id].len().saturating_sub(1)
    }

    fn sample_peers<R: Rng + ?Sized>(&self, id: NodeId, amount: usize, rng: &mut R) -> Vec<NodeId> {
        let start = self.range_of[id].start;
        let own = self.slot_of[id];
        index::sample(rng, self.peer_count(id), amount.min(self.peer_count(id)))
            .into_iter()
            .map(|offset| {
                let slot = start + offset;
                if slot >= own { slot + 1 } else { slot }
            })
            .map(|slot| self.grouped[slot])
            .collect()
    }

    fn outside_count(&self, id: NodeId) -> usize {
        self.grouped.len() - self.range_of[id].len()
    }

    fn sample_outside<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Option<NodeId> {
        let outside = self.outside_count(id);
        if outside == 0 {
            return None;
        }

        let range = &self.range_of[id];
        let mut slot = rng.gen_range(0..outside);
        if slot >= range.start {
            slot += range.len();
        }
        self.grouped.get(slot).copied()
    }
}

struct EdgeSet {
    edges: Vec<Edge>,
    pairs: HashSet<(NodeId, NodeId)>,
}

impl EdgeSet {
    fn contains(&self, a: NodeId, b: NodeId) -> bool {
        self.pairs.contains(&pair_key(a, b))
    }

    fn insert(&mut self, source: NodeId, target: NodeId, strength: f32) {
        if source != target && self.pairs.insert(pair_key(source, target)) {
            self.edges.push(Edge {
                source,
                target,
                strength,
            });
        }
    }
}

/// Builds the correlation graph for an entity snapshot.
pub fn synthesize<R: Rng + ?Sized>(entities: &[Entity], rng: &mut R) -> Graph {
    let mut nodes = entities
        .iter()
        .enumerate()
        .map(|(id, entity)| Node {
            id,
            entity_id: entity.id,
            name: entity.name.clone(),
            symbol: entity.symbol.clone(),
            category: entity.category.clone(),
            size_metric: entity.size_metric,
            prediction: entity.prediction,
            position: Vec3::ZERO,
        })
        .collect::<Vec<_>>();

    let categories = CategoryIndex::build(&nodes);
    let mut set = EdgeSet {
        edges: Vec::new(),
        pairs: HashSet::new(),
    };
    let mut same_links = 0usize;
    let mut cross_links = 0usize;

    for id in 0..nodes.len() {
        let wanted = rng.gen_range(SAME_CATEGORY_LINKS);
        for target in categories.sample_peers(id, wanted, rng) {
            if set.contains(id, target) {
                continue;
            }
            let strength = rng.gen_range(SAME_CATEGORY_STRENGTH);
            set.insert(id, target, strength);
            same_links += 1;
        }

        if rng.gen_bool(CROSS_CATEGORY_PROBABILITY) {
            let wanted = rng.gen_range(CROSS_CATEGORY_LINKS);
            for _ in 0..wanted {
                let Some(target) = categories.sample_outside(id, rng) else {
                    break;
                };
                if set.contains(id, target) {
                    continue;
                }
                let strength = rng.gen_range(CROSS_CATEGORY_STRENGTH);
                set.insert(id, target, strength);
                cross_links += 1;
            }
        }
    }

    let positions = layout(&nodes);
    for (node, position) in nodes.iter_mut().zip(positions) {
        node.position = position;
    }

    debug!(
        nodes = nodes.len(),
        edges = set.edges.len(),
        same_links,
        cross_links,
        "synthesized correlation graph"
    );

    Graph::new(nodes, set.edges)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn entities(categories: &[&str]) -> Vec<Entity> {
        categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                Entity::new(index as i64, format!("E{index}"), format!("E{index}.NS"), *category, 1.0)
            })
            .collect()
    }

    fn same_category_links_from(graph: &Graph, id: NodeId) -> usize {
        let category = &graph.nodes()[id].category;
        graph
            .edges()
            .iter()
            .filter(|edge| edge.source == id && &graph.nodes()[edge.target].category == category)
            .count()
    }

    fn category_strategy() -> impl Strategy<Value = Vec<&'static str>> {
        proptest::collection::vec(
            prop_oneof![Just("Finance"), Just("Energy"), Just("Pharma"), Just("Telecom")],
            0..80,
        )
    }

    #[test]
    fn empty_and_single_entity_graphs_have_no_edges() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty = synthesize(&[], &mut rng);
        assert_eq!(empty.node_count(), 0);
        assert_eq!(empty.edge_count(), 0);

        let single = synthesize(&entities(&["Finance"]), &mut rng);
        assert_eq!(single.node_count(), 1);
        assert_eq!(single.edge_count(), 0);
    }

    #[test]
    fn node_ids_follow_entity_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let input = entities(&["Finance", "Energy", "Finance"]);
        let graph = synthesize(&input, &mut rng);
        for (index, node) in graph.nodes().iter().enumerate() {
            assert_eq!(node.id, index);
            assert_eq!(node.symbol, input[index].symbol);
            assert_eq!(node.category, input[index].category);
        }
    }

    #[test]
    fn lone_category_member_only_gets_cross_links() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut categories = vec!["Finance"; 12];
        categories.push("Telecom");
        let graph = synthesize(&entities(&categories), &mut rng);
        assert_eq!(same_category_links_from(&graph, 12), 0);
        for edge in graph.edges().iter().filter(|edge| edge.source == 12) {
            assert!((0.3..0.7).contains(&edge.strength));
        }
    }

    #[test]
    fn single_category_graph_has_only_strong_links() {
        let mut rng = StdRng::seed_from_u64(4);
        let graph = synthesize(&entities(&["Energy"; 20]), &mut rng);
        assert!(graph.edge_count() > 0);
        for edge in graph.edges() {
            assert!((0.6..1.0).contains(&edge.strength));
        }
    }

    #[test]
    fn same_seed_gives_same_graph() {
        let input = entities(&["Finance", "Energy", "Finance", "Pharma", "Energy", "Finance"]);
        let first = synthesize(&input, &mut StdRng::seed_from_u64(42));
        let second = synthesize(&input, &mut StdRng::seed_from_u64(42));
        assert_eq!(first.edges(), second.edges());
    }

    #[test]
    fn peer_sampling_stays_in_category_and_skips_self() {
        let input = entities(&["A", "B", "A", "C", "A", "A", "B"]);
        let graph = synthesize(&input, &mut StdRng::seed_from_u64(7));
        let categories = CategoryIndex::build(graph.nodes());
        let mut rng = StdRng::seed_from_u64(8);
        let mut hits: HashSet<NodeId> = HashSet::new();
        for _ in 0..200 {
            let peers = categories.sample_peers(2, 5, &mut rng);
            assert_eq!(peers.len(), 3);
            assert_eq!(peers.iter().collect::<HashSet<_>>().len(), 3);
            for &peer in &peers {
                assert_ne!(peer, 2);
                assert_eq!(graph.nodes()[peer].category, "A");
                hits.insert(peer);
            }
        }
        assert_eq!(hits, HashSet::from([0, 4, 5]));
        assert!(categories.sample_peers(3, 4, &mut rng).is_empty());
    }

    #[test]
    fn about_forty_percent_of_nodes_start_cross_category_links() {
        let categories = ["Finance", "Energy", "Pharma", "Telecom"];
        let input = entities(&categories.repeat(100));
        let graph = synthesize(&input, &mut StdRng::seed_from_u64(11));

        let cross = graph
            .edges()
            .iter()
            .filter(|edge| graph.nodes()[edge.source].category != graph.nodes()[edge.target].category)
            .collect::<Vec<_>>();
        let originators = cross.iter().map(|edge| edge.source).collect::<HashSet<_>>();
        let share = originators.len() as f64 / input.len() as f64;

        assert!((0.3..=0.5).contains(&share), "cross-category share {share}");
        assert!(cross.iter().any(|edge| (0.3..0.7).contains(&edge.strength)));
    }

    #[test]
    fn outside_sampling_never_hits_own_category() {
        let input = entities(&["A", "B", "A", "C", "B", "A"]);
        let graph = synthesize(&input, &mut StdRng::seed_from_u64(5));
        let categories = CategoryIndex::build(graph.nodes());
        let mut rng = StdRng::seed_from_u64(6);
        let mut hits: HashMap<NodeId, usize> = HashMap::new();
        for _ in 0..600 {
            let target = categories.sample_outside(0, &mut rng).unwrap();
            assert_ne!(graph.nodes()[target].category, "A");
            *hits.entry(target).or_default() += 1;
        }
        assert_eq!(hits.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_synthesized_graph_holds_invariants(
            categories in category_strategy(),
            seed in any::<u64>()
        ) {
            let input = entities(&categories);
            let graph = synthesize(&input, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(graph.node_count(), input.len());

            let mut pairs = HashSet::new();
            for edge in graph.edges() {
                prop_assert_ne!(edge.source, edge.target);
                prop_assert!(pairs.insert(edge.pair_key()), "duplicate pair {:?}", edge.pair_key());
                prop_assert!((0.0..=1.0).contains(&edge.strength));

                let same = graph.nodes()[edge.source].category == graph.nodes()[edge.target].category;
                if same {
                    prop_assert!((0.6..1.0).contains(&edge.strength));
                } else {
                    prop_assert!((0.3..0.7).contains(&edge.strength));
                }
            }

            for node in graph.nodes() {
                let peers = graph
                    .nodes()
                    .iter()
                    .filter(|other| other.id != node.id && other.category == node.category)
                    .count();
                prop_assert!(same_category_links_from(&graph, node.id) <= peers.min(5));

                let cross = graph
                    .edges()
                    .iter()
                    .filter(|edge| edge.source == node.id)
                    .filter(|edge| graph.nodes()[edge.target].category != node.category)
                    .count();
                prop_assert!(cross <= 2);
            }

            if let Some(first) = graph.nodes().first() {
                let peers = graph
                    .nodes()
                    .iter()
                    .filter(|other| other.id != 0 && other.category == first.category)
                    .count();
                prop_assert!(same_category_links_from(&graph, 0) >= peers.min(3));
            }
        }
    }
}
