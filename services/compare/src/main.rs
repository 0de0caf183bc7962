//! Comparison chart generator
//!
//! Interpolates scattered CAPE samples from two model runs, aligns them with
//! a gridded reference and a radar composite, and writes a multi-panel
//! chart plus a JSON summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use compare::RunConfig;
use compare_common::BoundingBox;

/// CAPE comparison chart generator
#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(about = "Compare scattered CAPE fields against reference and radar data")]
struct Args {
    /// Run configuration (YAML); built-in defaults when omitted
    #[arg(short, long, env = "COMPARE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the inputs named by the default configuration
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Output directory for the chart and summary
    #[arg(short, long, default_value = "out", env = "COMPARE_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Display extent as "min_lon,min_lat,max_lon,max_lat"
    #[arg(long)]
    extent: Option<String>,

    /// Worker threads for panel computation
    #[arg(long, env = "COMPARE_THREADS")]
    threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);
    if args.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = match &args.config {
        Some(path) => RunConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default().resolve_paths(&args.input_dir),
    }
    .apply_env();
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if let Some(extent) = &args.extent {
        let bbox = BoundingBox::from_extent_string(extent).context("Invalid --extent")?;
        config.display.extent = [bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y];
    }

    info!(
        panels = config.panels.len(),
        inputs = config.points.len(),
        output = %args.output_dir.display(),
        "Starting comparison"
    );

    let output = compare::run(&config, &args.output_dir).context("Comparison failed")?;

    info!(
        chart = %output.chart.display(),
        summary = %output.summary_path.display(),
        failed_panels = output.summary.failed_panels(),
        "Done"
    );
    Ok(())
}
