//! Configuration for the grid processor.

use serde::{Deserialize, Serialize};

/// Sampling method used when aligning a grid onto another lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values, cell-like look).
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            _ => Self::Bilinear,
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Configuration for scattered-point interpolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolatorConfig {
    /// Minimum number of distinct usable samples.
    pub min_points: usize,

    /// Interpolate lattice rows on the rayon pool.
    pub parallel: bool,
}

impl Default for InterpolatorConfig {
    fn default() -> Self {
        Self {
            min_points: 3,
            parallel: true,
        }
    }
}

impl InterpolatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("INTERPOLATION_MIN_POINTS") {
            if let Ok(n) = val.parse() {
                config.min_points = n;
            }
        }

        if let Ok(val) = std::env::var("INTERPOLATION_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        // A triangle needs three vertices
        if self.min_points < 3 {
            return Err("min_points must be >= 3".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InterpolatorConfig::default();
        assert_eq!(config.min_points, 3);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = InterpolatorConfig {
            min_points: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(InterpolationMethod::from_str("NEAREST"), InterpolationMethod::Nearest);
        assert_eq!(InterpolationMethod::from_str("bilinear"), InterpolationMethod::Bilinear);
        assert_eq!(InterpolationMethod::from_str("other"), InterpolationMethod::Bilinear);
    }

    #[test]
    fn test_method_yaml_name() {
        let method: InterpolationMethod = serde_json::from_str("\"nearest\"").unwrap();
        assert_eq!(method, InterpolationMethod::Nearest);
        assert_eq!(method.to_string(), "nearest");
    }
}
