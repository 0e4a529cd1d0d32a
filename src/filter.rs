use std::collections::BTreeSet;

use crate::graph::{Edge, Graph, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Mid,
    Large,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeBucket {
    #[default]
    All,
    Small,
    Mid,
    Large,
}

impl SizeBucket {
    pub const ALL: [Self; 4] = [Self::All, Self::Small, Self::Mid, Self::Large];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Small => "Small",
            Self::Mid => "Mid",
            Self::Large => "Large",
        }
    }

    pub fn matches(self, class: SizeClass) -> bool {
        match self {
            Self::All => true,
            Self::Small => class == SizeClass::Small,
            Self::Mid => class == SizeClass::Mid,
            Self::Large => class == SizeClass::Large,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeWindow {
    OneMonth,
    ThreeMonths,
    #[default]
    OneYear,
    FiveYears,
}

impl TimeWindow {
    pub const ALL: [Self; 4] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::OneYear,
        Self::FiveYears,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
        }
    }
}

pub trait SizeClassifier {
    fn classify(&self, size: f64) -> SizeClass;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdClassifier {
    small_below: f64,
    large_from: f64,
}

impl ThresholdClassifier {
    pub fn new(small_below: f64, large_from: f64) -> Self {
        Self {
            small_below: small_below.min(large_from),
            large_from: large_from.max(small_below),
        }
    }
}

impl SizeClassifier for ThresholdClassifier {
    fn classify(&self, size: f64) -> SizeClass {
        if size < self.small_below {
            SizeClass::Small
        } else if size >= self.large_from {
            SizeClass::Large
        } else {
            SizeClass::Mid
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TercileClassifier {
    cutoffs: ThresholdClassifier,
}

impl TercileClassifier {
    pub fn from_sizes(sizes: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted = sizes
            .into_iter()
            .filter(|size| size.is_finite())
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);

        if sorted.is_empty() {
            return Self {
                cutoffs: ThresholdClassifier::new(0.0, 0.0),
            };
        }

        let at = |thirds: usize| sorted[(sorted.len() * thirds / 3).min(sorted.len() - 1)];

        Self {
            cutoffs: ThresholdClassifier::new(at(1), at(2)),
        }
    }

    pub fn for_graph(graph: &Graph) -> Self {
        Self::from_sizes(graph.nodes().iter().map(|node| node.size_metric))
    }
}

impl SizeClassifier for TercileClassifier {
    fn classify(&self, size: f64) -> SizeClass {
        self.cutoffs.classify(size)
    }
}

/// Active filter settings. Categories are tracked as the set the user has
/// switched off, so a category seen for the first time starts selected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    known_categories: BTreeSet<String>,
    hidden_categories: BTreeSet<String>,
    size_bucket: SizeBucket,
    min_correlation: f32,
    time_window: TimeWindow,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveFilters {
    pub selected_categories: Option<(usize, usize)>,
    pub size_bucket: Option<SizeBucket>,
    pub min_correlation: Option<f32>,
}

impl ActiveFilters {
    pub fn is_empty(&self) -> bool {
        self.selected_categories.is_none()
            && self.size_bucket.is_none()
            && self.min_correlation.is_none()
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some((selected, known)) = self.selected_categories {
            labels.push(format!("{selected}/{known} categories"));
        }
        if let Some(bucket) = self.size_bucket {
            labels.push(format!("{} size", bucket.label().to_lowercase()));
        }
        if let Some(threshold) = self.min_correlation {
            labels.push(format!("correlation ≥ {threshold:.2}"));
        }
        labels
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Visibility {
    pub nodes: Vec<bool>,
    pub edges: Vec<bool>,
    pub visible_nodes: usize,
    pub visible_edges: usize,
}

impl FilterState {
    pub fn size_bucket(&self) -> SizeBucket {
        self.size_bucket
    }

    pub fn min_correlation(&self) -> f32 {
        self.min_correlation
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        !self.hidden_categories.contains(category)
    }

    pub fn selected_categories(&self) -> BTreeSet<String> {
        self.known_categories
            .iter()
            .filter(|category| self.is_category_selected(category))
            .cloned()
            .collect()
    }

    pub fn toggle_category(&mut self, category: &str) {
        if !self.hidden_categories.remove(category) {
            self.hidden_categories.insert(category.to_owned());
        }
    }

    pub fn select_all_categories(&mut self) {
        self.hidden_categories.clear();
    }

    pub fn set_size_bucket(&mut self, bucket: SizeBucket) {
        self.size_bucket = bucket;
    }

    pub fn set_correlation_threshold(&mut self, threshold: f32) {
        if threshold.is_nan() {
            return;
        }
        self.min_correlation = threshold.clamp(0.0, 1.0);
    }

    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.time_window = window;
    }

    pub fn sync_categories(&mut self, graph: &Graph) {
        self.known_categories = graph.categories().into_iter().collect();
        let known = &self.known_categories;
        self.hidden_categories.retain(|category| known.contains(category));
    }

    pub fn is_node_visible(&self, node: &Node, classifier: &dyn SizeClassifier) -> bool {
        self.is_category_selected(&node.category)
            && self
                .size_bucket
                .matches(classifier.classify(node.size_metric))
    }

    pub fn is_edge_visible(&self, edge: &Edge, node_visible: &[bool]) -> bool {
        edge.strength >= self.min_correlation
            && node_visible.get(edge.source).copied().unwrap_or(false)
            && node_visible.get(edge.target).copied().unwrap_or(false)
    }

    pub fn visibility(&self, graph: &Graph, classifier: &dyn SizeClassifier) -> Visibility {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| self.is_node_visible(node, classifier))
            .collect::<Vec<_>>();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| self.is_edge_visible(edge, &nodes))
            .collect::<Vec<_>>();

        Visibility {
            visible_nodes: nodes.iter().filter(|visible| **visible).count(),
            visible_edges: edges.iter().filter(|visible| **visible).count(),
            nodes,
            edges,
        }
    }

    pub fn active_filters(&self) -> ActiveFilters {
        let known = self.known_categories.len();
        let selected = self.selected_categories().len();

        ActiveFilters {
            selected_categories: (selected < known).then_some((selected, known)),
            size_bucket: (self.size_bucket != SizeBucket::All).then_some(self.size_bucket),
            min_correlation: (self.min_correlation > 0.0).then_some(self.min_correlation),
        }
    }
}
