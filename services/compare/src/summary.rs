//! Machine-readable run summary written next to the chart.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use compare_common::{BoundingBox, CompareError};
use pointset::{DisplayRange, Histogram};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Ok,
    Failed,
}

/// Outcome of one panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelReport {
    pub slot: usize,
    pub title: String,
    pub status: PanelStatus,
    /// Error kind, e.g. `FormatError`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub valid_cells: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_range: Option<DisplayRange>,
}

impl PanelReport {
    pub fn failed(slot: usize, title: &str, err: &CompareError) -> Self {
        Self {
            slot,
            title: title.to_string(),
            status: PanelStatus::Failed,
            code: Some(err.code().to_string()),
            message: Some(err.to_string()),
            valid_cells: 0,
            value_range: None,
            display_range: None,
        }
    }
}

/// Statistics of one merged or derived channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelReport {
    pub name: String,
    pub samples: usize,
    /// Quantile limits of the finite values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_range: Option<DisplayRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Histogram>,
}

/// Error that kept the point set from being built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageError {
    pub code: String,
    pub message: String,
}

impl From<&CompareError> for StageError {
    fn from(err: &CompareError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub chart: PathBuf,
    pub width: usize,
    pub height: usize,
    /// Rows of the merged point set
    pub samples: usize,
    /// Extent of the merged samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_extent: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_error: Option<StageError>,
    pub channels: Vec<ChannelReport>,
    pub panels: Vec<PanelReport>,
}

impl RunSummary {
    pub fn failed_panels(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| p.status == PanelStatus::Failed)
            .count()
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), CompareError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| CompareError::Io(format!("{}: {}", path.display(), e)))
    }
}
