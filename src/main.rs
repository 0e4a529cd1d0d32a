mod app;
mod camera;
mod filter;
mod geometry;
mod graph;
mod interaction;
mod market;
mod session;
mod util;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::app::ViewerConfig;
use crate::camera::Smoothing;
use crate::session::SessionConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum SmoothingMode {
    #[default]
    Exponential,
    Linear,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with entity records; the builtin NSE list when omitted.
    #[arg(long)]
    entities: Option<PathBuf>,

    /// Seed for edge synthesis and the builtin provider.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = SmoothingMode::Exponential)]
    smoothing: SmoothingMode,

    /// Camera convergence rate per second.
    #[arg(long, default_value_t = 2.0, value_parser = parse_positive_rate)]
    smoothing_rate: f32,

    /// Sizes below this are "small" (requires --large-from).
    #[arg(long, requires = "large_from")]
    small_below: Option<f64>,

    /// Sizes from this up are "large" (requires --small-below).
    #[arg(long, requires = "small_below")]
    large_from: Option<f64>,

    #[arg(long)]
    no_auto_rotate: bool,
}

fn parse_positive_rate(value: &str) -> Result<f32, String> {
    let rate = value
        .parse::<f32>()
        .map_err(|error| format!("invalid rate `{value}`: {error}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be a positive number, got `{value}`"))
    }
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        let smoothing = match self.smoothing {
            SmoothingMode::Exponential => Smoothing::Exponential {
                rate: self.smoothing_rate,
            },
            SmoothingMode::Linear => Smoothing::Linear {
                rate: self.smoothing_rate,
            },
        };

        ViewerConfig {
            entities: self.entities,
            session: SessionConfig {
                seed: self.seed,
                smoothing,
                size_cutoffs: self.small_below.zip(self.large_from),
                auto_rotate: !self.no_auto_rotate,
            },
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "stock-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::StockGraphApp::new(cc, config)))),
    )
}
