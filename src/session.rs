use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::camera::{self, CameraController, CameraPose, Smoothing};
use crate::filter::{
    FilterState, SizeBucket, SizeClass, SizeClassifier, TercileClassifier, ThresholdClassifier,
    TimeWindow, Visibility,
};
use crate::graph::{Graph, NodeId, synthesize};
use crate::interaction::InteractionState;
use crate::market::Snapshot;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub seed: Option<u64>,
    pub smoothing: Smoothing,
    /// `(small_below, large_from)`; terciles of the snapshot when absent.
    pub size_cutoffs: Option<(f64, f64)>,
    pub auto_rotate: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            smoothing: Smoothing::default(),
            size_cutoffs: None,
            auto_rotate: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SizePolicy {
    Fixed(ThresholdClassifier),
    Terciles(TercileClassifier),
}

impl SizeClassifier for SizePolicy {
    fn classify(&self, size: f64) -> SizeClass {
        match self {
            Self::Fixed(classifier) => classifier.classify(size),
            Self::Terciles(classifier) => classifier.classify(size),
        }
    }
}

pub struct VisualizationSession {
    graph: Arc<Graph>,
    revision: Option<u64>,
    rng: StdRng,
    interaction: InteractionState,
    filter: FilterState,
    size_policy: SizePolicy,
    fixed_cutoffs: Option<ThresholdClassifier>,
    visibility: Visibility,
    camera: CameraController,
    pose: CameraPose,
}

impl VisualizationSession {
    pub fn new(config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let fixed_cutoffs = config
            .size_cutoffs
            .map(|(small_below, large_from)| ThresholdClassifier::new(small_below, large_from));
        let graph = Arc::new(Graph::default());
        let size_policy = match fixed_cutoffs {
            Some(cutoffs) => SizePolicy::Fixed(cutoffs),
            None => SizePolicy::Terciles(TercileClassifier::for_graph(&graph)),
        };

        Self {
            graph,
            revision: None,
            rng,
            interaction: InteractionState::new(config.auto_rotate),
            filter: FilterState::default(),
            size_policy,
            fixed_cutoffs,
            visibility: Visibility::default(),
            camera: CameraController::new(config.smoothing),
            pose: CameraPose::default(),
        }
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn classify(&self, size: f64) -> SizeClass {
        self.size_policy.classify(size)
    }

    pub fn is_node_visible(&self, id: NodeId) -> bool {
        self.visibility.nodes.get(id).copied().unwrap_or(false)
    }

    pub fn replace_snapshot(&mut self, snapshot: &Snapshot) -> bool {
        if self.revision == Some(snapshot.revision) {
            debug!(revision = snapshot.revision, "snapshot already published");
            return false;
        }

        let graph = Arc::new(synthesize(&snapshot.entities, &mut self.rng));
        self.interaction.reconcile(&graph);
        self.filter.sync_categories(&graph);
        self.size_policy = match self.fixed_cutoffs {
            Some(cutoffs) => SizePolicy::Fixed(cutoffs),
            None => SizePolicy::Terciles(TercileClassifier::for_graph(&graph)),
        };

        info!(
            revision = snapshot.revision,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "published graph snapshot"
        );

        self.graph = graph;
        self.revision = Some(snapshot.revision);
        self.refresh_visibility();
        true
    }

    pub fn pointer_enter(&mut self, id: NodeId) -> bool {
        self.interaction.pointer_enter(&self.graph, id)
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.interaction.pointer_leave()
    }

    pub fn click(&mut self, id: NodeId) -> bool {
        self.interaction.click(&self.graph, id)
    }

    pub fn reset_view(&mut self) {
        self.interaction.reset_view();
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.interaction.toggle_auto_rotate();
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.filter.toggle_category(category);
        self.refresh_visibility();
    }

    pub fn select_all_categories(&mut self) {
        self.filter.select_all_categories();
        self.refresh_visibility();
    }

    pub fn set_size_bucket(&mut self, bucket: SizeBucket) {
        self.filter.set_size_bucket(bucket);
        self.refresh_visibility();
    }

    pub fn set_correlation_threshold(&mut self, threshold: f32) {
        self.filter.set_correlation_threshold(threshold);
        self.refresh_visibility();
    }

    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.filter.set_time_window(window);
    }

    pub fn advance_frame(&mut self, dt: f32) -> bool {
        let before = self.pose;
        if let Some(target) = self.interaction.focus_position() {
            self.pose = self.camera.advance(self.pose, Some(target), dt);
        } else if self.interaction.auto_rotation_active() {
            self.pose = self.camera.auto_rotate(self.pose, dt);
        }
        self.pose != before
    }

    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.pose = camera::orbit(self.pose, yaw_delta, pitch_delta);
    }

    pub fn dolly(&mut self, factor: f32) {
        self.pose = camera::dolly(self.pose, factor);
    }

    fn refresh_visibility(&mut self) {
        self.visibility = self.filter.visibility(&self.graph, &self.size_policy);
    }
}
