use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::anyhow;
use eframe::egui::{self, Context, Pos2};
use tracing::{error, info};

use crate::graph::NodeId;
use crate::market::{BuiltinProvider, EntityProvider, JsonFileProvider, Snapshot};
use crate::session::{SessionConfig, VisualizationSession};

mod graph;
mod render_utils;
mod ui;

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub entities: Option<PathBuf>,
    pub session: SessionConfig,
}

type SharedProvider = Arc<Mutex<Box<dyn EntityProvider>>>;
type LoadResult = Result<Snapshot, String>;

pub struct StockGraphApp {
    session_config: SessionConfig,
    provider: SharedProvider,
    source: String,
    next_revision: u64,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    session: VisualizationSession,
    source: String,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    node_scales: Vec<f32>,
    view_scratch: ViewScratch,
    reload_error: Option<String>,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    revision: Option<u64>,
    matches: Arc<HashSet<NodeId>>,
}

#[derive(Default)]
struct ViewScratch {
    projected: Vec<Option<ProjectedNode>>,
    draw_order: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug)]
struct ProjectedNode {
    screen: Pos2,
    depth: f32,
    radius: f32,
}

impl StockGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let provider: Box<dyn EntityProvider> = match config.entities {
            Some(path) => Box::new(JsonFileProvider::new(path)),
            None => Box::new(BuiltinProvider::new(config.session.seed)),
        };
        let source = provider.describe();
        let provider = Arc::new(Mutex::new(provider));
        let rx = Self::spawn_load(&provider, 0);

        Self {
            session_config: config.session,
            provider,
            source,
            next_revision: 1,
            state: AppState::Loading { rx },
            reload_rx: None,
        }
    }

    fn spawn_load(provider: &SharedProvider, revision: u64) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::clone(provider);

        thread::spawn(move || {
            let result = provider
                .lock()
                .map_err(|_| anyhow!("entity provider lock poisoned"))
                .and_then(|mut provider| provider.fetch())
                .map(|entities| Snapshot::new(revision, entities))
                .map_err(|error| {
                    error!(revision, "snapshot load failed: {error:#}");
                    format!("{error:#}")
                });
            let _ = tx.send(result);
        });

        rx
    }

    fn next_load(&mut self) -> Receiver<LoadResult> {
        let revision = self.next_revision;
        self.next_revision += 1;
        Self::spawn_load(&self.provider, revision)
    }

    fn ready_state(&self, snapshot: &Snapshot) -> AppState {
        let mut model = ViewModel::new(self.session_config, self.source.clone());
        model.apply_snapshot(snapshot);
        AppState::Ready(Box::new(model))
    }
}

impl eframe::App for StockGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(snapshot) => self.ready_state(&snapshot),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading market snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load market snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    transition = Some(AppState::Loading { rx: self.next_load() });
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(snapshot)) => {
                            info!(revision = snapshot.revision, entities = snapshot.len(), "reloaded snapshot");
                            model.reload_error = None;
                            model.apply_snapshot(&snapshot);
                        }
                        Ok(Err(error)) => {
                            model.reload_error = Some(error);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.reload_error = Some("Background load worker disconnected".to_owned());
                        }
                    }
                }

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(self.next_load());
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
