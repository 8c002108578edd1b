mod app;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pharma_flow::config::DashboardConfig;

use crate::app::ActiveView;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Product catalog as JSON; the built-in demo catalog is used when absent.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Dashboard tuning as JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the synthetic data sources. Overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// View shown on startup.
    #[arg(long, value_enum, default_value_t = ActiveView::Bubbles)]
    view: ActiveView,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pharma_flow=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "pharma-flow",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::DashboardApp::new(
                cc,
                args.catalog.clone(),
                config,
                args.view,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run dashboard window: {error}"))
}
