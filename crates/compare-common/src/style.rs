//! Palette configuration schema.
//!
//! Palettes are described by anchors at raw physical break points
//! (e.g. dBZ or J/kg). Positions in `[0, 1]` are obtained by dividing each
//! break point by the largest one, so the first break must be 0 and the
//! last one is the ramp maximum.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::CompareError;

fn default_alpha() -> f64 {
    1.0
}

/// One anchor of a palette at a raw break point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    /// Hex color, "#rrggbb"
    pub color: String,

    /// Physical break point
    pub value: f64,

    /// Opacity in [0, 1]
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

/// A named palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Unit label for display
    #[serde(default)]
    pub units: Option<String>,

    pub anchors: Vec<AnchorSpec>,
}

impl PaletteConfig {
    /// Parse a palette from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CompareError> {
        serde_json::from_str(json).map_err(|e| CompareError::config(e.to_string()))
    }

    /// Load a palette from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CompareError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The largest break point, used to normalize positions.
    pub fn max_value(&self) -> Option<f64> {
        self.anchors.iter().map(|a| a.value).reduce(f64::max)
    }

    /// Anchor positions normalized to [0, 1] by the ramp maximum.
    pub fn positions(&self) -> Result<Vec<f64>, CompareError> {
        let max = self
            .max_value()
            .ok_or_else(|| CompareError::config(format!("palette '{}' has no anchors", self.name)))?;
        if !(max > 0.0) || !max.is_finite() {
            return Err(CompareError::config(format!(
                "palette '{}' maximum break point must be positive, got {}",
                self.name, max
            )));
        }
        Ok(self.anchors.iter().map(|a| a.value / max).collect())
    }

    pub fn colors(&self) -> Vec<&str> {
        self.anchors.iter().map(|a| a.color.as_str()).collect()
    }

    pub fn alphas(&self) -> Vec<f64> {
        self.anchors.iter().map(|a| a.alpha).collect()
    }
}

/// Reference to a palette: either a built-in name or an inline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteRef {
    Named(String),
    Inline(PaletteConfig),
}

/// A collection of palettes loaded from one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaletteSet {
    pub palettes: HashMap<String, PaletteConfig>,
}

impl PaletteSet {
    pub fn from_json(json: &str) -> Result<Self, CompareError> {
        serde_json::from_str(json).map_err(|e| CompareError::config(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&PaletteConfig> {
        self.palettes.get(name)
    }
}
