//! The comparison pipeline.
//!
//! ```text
//! CSV inputs ──► merge ──► derived channels ──► channel statistics
//!                  │
//!                  └──► scattered panels ──┐
//! reference.json ──► reference panel ──────┼──► Canvas ──► chart.png
//! radar.cmax ──► radar panel ──────────────┘        └────► summary.json
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use compare_common::{BoundingBox, CompareError, Lattice, PaletteSet};
use grid_processor::{DisplayLattice, GridInterpolator};
use pointset::{histogram, merge, CsvReader, DisplayRange, PointSet};
use renderer::{parse_hex, Canvas, Rgba};
use tracing::{info, warn};

use crate::config::{HistogramConfig, PointSource, RunConfig};
use crate::panels::{render_all, PanelContext};
use crate::summary::{ChannelReport, PanelReport, PanelStatus, RunSummary, StageError};

pub const CHART_FILE: &str = "cape_maps.png";
pub const SUMMARY_FILE: &str = "summary.json";

/// Files written by a run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub chart: PathBuf,
    pub summary_path: PathBuf,
    pub summary: RunSummary,
}

/// Run the comparison and write the chart and summary into `output_dir`.
///
/// Panel failures are recorded in the summary and leave their slot empty;
/// only configuration and output errors fail the run.
pub fn run(config: &RunConfig, output_dir: &Path) -> Result<RunOutput, CompareError> {
    config.validate()?;
    std::fs::create_dir_all(output_dir)
        .map_err(|e| CompareError::Io(format!("{}: {}", output_dir.display(), e)))?;

    let user_palettes = config
        .palettes
        .as_ref()
        .map(|path| load_palette_set(path))
        .transpose()?;
    let background = background_color(&config.background)?;

    let lattice = Lattice::linspace(
        config.lattice.lon,
        config.lattice.lat,
        (config.lattice.width, config.lattice.height),
    )?;
    let display = DisplayLattice::new(
        &config.display.bbox(),
        config.display.width,
        config.display.height,
        config.display.projection,
    )?
    .with_method(config.display.method);

    let points = load_points(config);
    let points_extent = points.as_ref().ok().and_then(|p| {
        BoundingBox::enclosing(p.lon().iter().copied().zip(p.lat().iter().copied()))
    });
    if let Some(extent) = &points_extent {
        if !extent.intersects(&display.bbox()) {
            let display_bbox = display.bbox();
            warn!(?extent, display = ?display_bbox, "Point samples lie outside the display");
        }
    }
    let channels = match &points {
        Ok(points) => channel_reports(points, config),
        Err(e) => {
            warn!(code = e.code(), error = %e, "Point inputs unavailable");
            Vec::new()
        }
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|e| CompareError::config(format!("thread pool: {}", e)))?;

    let interpolator = GridInterpolator::new(config.interpolation.clone());
    let ctx = PanelContext {
        points: &points,
        lattice: &lattice,
        display: &display,
        interpolator: &interpolator,
        user_palettes: user_palettes.as_ref(),
        quantiles: config.statistics.quantiles,
    };
    let results = render_all(&config.panels, &ctx, &pool);

    let mut canvas = Canvas::new(config.layout(), background)?;
    let mut reports = Vec::with_capacity(results.len());
    for (slot, (panel, result)) in config.panels.iter().zip(&results).enumerate() {
        match result {
            Ok(rendered) => {
                canvas.draw_panel(slot, &rendered.image)?;
                reports.push(PanelReport {
                    slot,
                    title: panel.title.clone(),
                    status: PanelStatus::Ok,
                    code: None,
                    message: None,
                    valid_cells: rendered.grid.valid_count(),
                    value_range: rendered.grid.value_range(),
                    display_range: Some(rendered.range),
                });
            }
            Err(e) => reports.push(PanelReport::failed(slot, &panel.title, e)),
        }
    }

    let chart = output_dir.join(CHART_FILE);
    canvas.save(&chart)?;

    let (width, height) = canvas.layout().canvas_size();
    let summary = RunSummary {
        generated_at: Utc::now(),
        chart: chart.clone(),
        width,
        height,
        samples: points.as_ref().map(PointSet::len).unwrap_or(0),
        points_extent,
        points_error: points.as_ref().err().map(StageError::from),
        channels,
        panels: reports,
    };
    let summary_path = output_dir.join(SUMMARY_FILE);
    summary.write(&summary_path)?;

    info!(
        chart = %chart.display(),
        panels = summary.panels.len(),
        failed = summary.failed_panels(),
        "Comparison complete"
    );

    Ok(RunOutput {
        chart,
        summary_path,
        summary,
    })
}

fn load_palette_set(path: &Path) -> Result<PaletteSet, CompareError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CompareError::Io(format!("{}: {}", path.display(), e)))?;
    PaletteSet::from_json(&json)
}

fn background_color(hex: &str) -> Result<[u8; 4], CompareError> {
    let [r, g, b] = parse_hex(hex)?;
    Ok(Rgba::new(r, g, b, 1.0).to_rgba8())
}

fn read_source(source: &PointSource) -> Result<PointSet, CompareError> {
    CsvReader::default()
        .with_fields(&[source.field.as_str()])
        .read_path(&source.path)?
        .rename_channel(&source.field, source.channel_name())
}

/// Read, merge and extend the scattered inputs.
pub fn load_points(config: &RunConfig) -> Result<PointSet, CompareError> {
    let mut sources = config.points.iter();
    let first = sources
        .next()
        .ok_or_else(|| CompareError::insufficient_data("no point inputs configured"))?;

    let mut merged = read_source(first)?;
    for source in sources {
        merged = merge(merged, read_source(source)?)?;
    }
    for derived in &config.derived {
        merged = merged.with_derived(&derived.name, derived.op, &derived.a, &derived.b)?;
    }

    info!(
        samples = merged.len(),
        channels = ?merged.channel_names(),
        "Prepared point set"
    );
    Ok(merged)
}

/// Histogram settings for `channel`, derived channels first.
fn histogram_config(config: &RunConfig, channel: &str) -> Option<HistogramConfig> {
    config
        .derived
        .iter()
        .find(|d| d.name == channel)
        .and_then(|d| d.histogram)
        .or_else(|| {
            config
                .statistics
                .histograms
                .iter()
                .find(|h| h.channel == channel)
                .map(|h| h.histogram)
        })
}

/// Quantile range of every channel plus the configured histograms.
///
/// Statistics that cannot be computed are left out of the report.
pub fn channel_reports(points: &PointSet, config: &RunConfig) -> Vec<ChannelReport> {
    let (lower, upper) = config.statistics.quantiles;
    points
        .channels()
        .iter()
        .map(|channel| {
            let finite: Vec<f64> = channel
                .values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            let display_range = DisplayRange::from_quantiles(&finite, lower, upper).ok();
            let histogram = histogram_config(config, &channel.name)
                .and_then(|h| histogram(&finite, h.bins, h.range(&finite)?).ok());
            ChannelReport {
                name: channel.name.clone(),
                samples: finite.len(),
                display_range,
                histogram,
            }
        })
        .collect()
}
