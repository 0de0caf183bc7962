//! CAPE comparison charts.
//!
//! Library side of the `compare` binary: run configuration, per-panel
//! computation and the pipeline that composites panels onto one canvas and
//! writes the run summary.

pub mod config;
pub mod panels;
pub mod run;
pub mod summary;

pub use config::{
    ChannelHistogram, DerivedChannel, DisplayConfig, HistogramConfig, LatticeConfig, PanelConfig, PanelSource,
    PointSource, RadarConfig, RunConfig, Scale, StatisticsConfig,
};
pub use panels::{render_all, render_panel, PanelContext, RenderedPanel};
pub use run::{load_points, run, RunOutput, CHART_FILE, SUMMARY_FILE};
pub use summary::{ChannelReport, PanelReport, PanelStatus, RunSummary};
