//! Run configuration.
//!
//! A run is described by a YAML document. Every section has defaults that
//! reproduce the standard CAPE chart (1D and 3D model CAPE, the ERA5
//! reference and the radar composite on a 2x2 canvas), so an empty document
//! is a valid configuration. Relative input paths are resolved against a
//! base directory, normally the directory holding the YAML file.

use std::env;
use std::path::{Path, PathBuf};

use compare_common::{BoundingBox, CompareError, PaletteRef};
use grid_processor::{DisplayProjection, InterpolationMethod, InterpolatorConfig};
use pointset::DeriveOp;
use radar_parser::{DEFAULT_CELL_SIZE, DEFAULT_SITE};
use renderer::palettes;
use renderer::PanelLayout;
use serde::{Deserialize, Serialize};

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Scattered CSV inputs, merged on exact coordinates
    pub points: Vec<PointSource>,

    /// Lattice the scattered samples are interpolated onto
    pub lattice: LatticeConfig,

    /// Shared display lattice of every panel
    pub display: DisplayConfig,

    /// Channels computed from the merged point set
    pub derived: Vec<DerivedChannel>,

    /// Panels, drawn into canvas slots in order
    pub panels: Vec<PanelConfig>,

    pub statistics: StatisticsConfig,

    pub interpolation: InterpolatorConfig,

    /// JSON file with additional named palettes
    pub palettes: Option<PathBuf>,

    /// Canvas background as a hex color
    pub background: String,

    /// Pixels between panels
    pub gap: usize,

    /// Worker threads for panel computation (rayon default when unset)
    pub threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            points: vec![
                PointSource::new("1d_convective_params.csv", "CAPE", "CAPE1D"),
                PointSource::new("3d_convective_params.csv", "CAPE", "CAPE3D"),
            ],
            lattice: LatticeConfig::default(),
            display: DisplayConfig::default(),
            derived: vec![
                DerivedChannel {
                    name: "diff".to_string(),
                    op: DeriveOp::Difference,
                    a: "CAPE1D".to_string(),
                    b: "CAPE3D".to_string(),
                    histogram: Some(HistogramConfig {
                        bins: 50,
                        min: Some(-50.0),
                        max: Some(50.0),
                    }),
                },
                DerivedChannel {
                    name: "rel_err".to_string(),
                    op: DeriveOp::relative_error(),
                    a: "CAPE1D".to_string(),
                    b: "CAPE3D".to_string(),
                    histogram: Some(HistogramConfig {
                        bins: 50,
                        min: Some(0.0),
                        max: Some(10.0),
                    }),
                },
            ],
            panels: vec![
                PanelConfig::scattered("CAPE 1D", "CAPE1D"),
                PanelConfig::scattered("CAPE 3D", "CAPE3D"),
                PanelConfig {
                    title: "CAPE ERA5".to_string(),
                    source: PanelSource::Reference {
                        path: PathBuf::from("era5_cape.json"),
                        variable: default_reference_variable(),
                    },
                    palette: PaletteRef::Named(palettes::PIVOTAL_CAPE.to_string()),
                    scale: Scale::Palette,
                    levels: Some(100),
                },
                PanelConfig {
                    title: "RADAR".to_string(),
                    source: PanelSource::Radar {
                        path: PathBuf::from("imgw_radar.cmax"),
                        geometry: RadarConfig::default(),
                    },
                    palette: PaletteRef::Named(palettes::RADAR_REFLECTIVITY.to_string()),
                    scale: Scale::Palette,
                    levels: None,
                },
            ],
            statistics: StatisticsConfig::default(),
            interpolation: InterpolatorConfig::default(),
            palettes: None,
            background: "#ffffff".to_string(),
            gap: 8,
            threads: None,
        }
    }
}

impl RunConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CompareError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| CompareError::config(format!("invalid run configuration: {}", e)))
    }

    /// Load a YAML file; relative paths in it resolve against its directory.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CompareError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_yaml_str(&yaml)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_paths(base))
    }

    /// Apply environment overrides.
    ///
    /// `COMPARE_THREADS` sets the worker count; the interpolation settings
    /// honor `INTERPOLATION_MIN_POINTS` and `INTERPOLATION_PARALLEL`.
    pub fn apply_env(mut self) -> Self {
        if let Ok(val) = env::var("COMPARE_THREADS") {
            if let Ok(n) = val.parse() {
                self.threads = Some(n);
            }
        }
        if let Ok(val) = env::var("INTERPOLATION_MIN_POINTS") {
            if let Ok(n) = val.parse() {
                self.interpolation.min_points = n;
            }
        }
        if let Ok(val) = env::var("INTERPOLATION_PARALLEL") {
            self.interpolation.parallel = val.to_lowercase() == "true" || val == "1";
        }
        self
    }

    /// Prefix every relative input path with `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for source in &mut self.points {
            join(&mut source.path);
        }
        for panel in &mut self.panels {
            match &mut panel.source {
                PanelSource::Reference { path, .. } | PanelSource::Radar { path, .. } => join(path),
                PanelSource::Scattered { .. } => {}
            }
        }
        if let Some(p) = self.palettes.as_mut() {
            join(p);
        }
        self
    }

    /// Check settings that do not depend on input files.
    pub fn validate(&self) -> Result<(), CompareError> {
        self.interpolation
            .validate()
            .map_err(CompareError::config)?;
        self.display.bbox().validate()?;
        if self.display.width == 0 || self.display.height == 0 {
            return Err(CompareError::config(format!(
                "display size {}x{}",
                self.display.width, self.display.height
            )));
        }
        if self.panels.is_empty() {
            return Err(CompareError::config("no panels configured"));
        }
        if self.threads == Some(0) {
            return Err(CompareError::config("threads must be >= 1"));
        }
        let (lower, upper) = self.statistics.quantiles;
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower > upper {
            return Err(CompareError::config(format!(
                "invalid quantile pair ({}, {})",
                lower, upper
            )));
        }
        let histograms = self
            .derived
            .iter()
            .filter_map(|d| d.histogram.as_ref().map(|h| (d.name.as_str(), h)))
            .chain(
                self.statistics
                    .histograms
                    .iter()
                    .map(|h| (h.channel.as_str(), &h.histogram)),
            );
        for (channel, histogram) in histograms {
            if histogram.bins == 0 {
                return Err(CompareError::config(format!(
                    "histogram of '{}' needs at least one bin",
                    channel
                )));
            }
            if let (Some(min), Some(max)) = (histogram.min, histogram.max) {
                if !(min < max) {
                    return Err(CompareError::config(format!(
                        "histogram of '{}': min {} is not below max {}",
                        channel, min, max
                    )));
                }
            }
        }
        for panel in &self.panels {
            if let Scale::Fixed { min, max } = panel.scale {
                if !(min < max) {
                    return Err(CompareError::config(format!(
                        "panel '{}': scale min {} is not below max {}",
                        panel.title, min, max
                    )));
                }
            }
        }
        Ok(())
    }

    /// Canvas layout fitting the configured panels, two per row.
    pub fn layout(&self) -> PanelLayout {
        let columns = self.panels.len().clamp(1, 2);
        PanelLayout {
            rows: self.panels.len().div_ceil(columns).max(1),
            columns,
            panel_width: self.display.width,
            panel_height: self.display.height,
            gap: self.gap,
        }
    }
}

/// One scattered CSV input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSource {
    pub path: PathBuf,

    /// Column to read
    pub field: String,

    /// Channel name after loading (defaults to the column name)
    #[serde(default)]
    pub channel: Option<String>,
}

impl PointSource {
    pub fn new(path: impl Into<PathBuf>, field: &str, channel: &str) -> Self {
        Self {
            path: path.into(),
            field: field.to_string(),
            channel: Some(channel.to_string()),
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.as_deref().unwrap_or(&self.field)
    }
}

/// Regular lon/lat interpolation lattice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub lon: (f64, f64),
    pub lat: (f64, f64),
    pub width: usize,
    pub height: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            lon: (14.1, 23.9),
            lat: (49.1, 54.9),
            width: 491,
            height: 291,
        }
    }
}

/// Display lattice shared by all panels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub extent: [f64; 4],
    pub width: usize,
    pub height: usize,
    pub projection: DisplayProjection,
    pub method: InterpolationMethod,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            extent: [13.5, 48.75, 24.5, 55.25],
            width: 550,
            height: 500,
            projection: DisplayProjection::Mercator,
            method: InterpolationMethod::Bilinear,
        }
    }
}

impl DisplayConfig {
    pub fn bbox(&self) -> BoundingBox {
        let [min_x, min_y, max_x, max_y] = self.extent;
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }
}

/// A channel derived from two merged channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedChannel {
    pub name: String,

    #[serde(flatten)]
    pub op: DeriveOp,

    pub a: String,
    pub b: String,

    /// Histogram reported in the run summary
    #[serde(default)]
    pub histogram: Option<HistogramConfig>,
}

/// Fixed-width histogram; open bounds follow the finite data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    pub bins: usize,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl HistogramConfig {
    /// Histogram range over `finite`, or `None` when a bound is open and
    /// there are no values.
    pub fn range(&self, finite: &[f64]) -> Option<(f64, f64)> {
        let min = match self.min {
            Some(min) => min,
            None => finite.iter().copied().reduce(f64::min)?,
        };
        let max = match self.max {
            Some(max) => max,
            None => finite.iter().copied().reduce(f64::max)?,
        };
        Some((min, max))
    }
}

/// Histogram of a merged point channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelHistogram {
    pub channel: String,

    #[serde(flatten)]
    pub histogram: HistogramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Quantile pair used for quantile display ranges
    pub quantiles: (f64, f64),

    /// Histograms of input channels, e.g. displacement components
    pub histograms: Vec<ChannelHistogram>,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            quantiles: (0.01, 0.99),
            histograms: Vec::new(),
        }
    }
}

/// One canvas panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    pub title: String,

    pub source: PanelSource,

    #[serde(default = "default_palette")]
    pub palette: PaletteRef,

    #[serde(default)]
    pub scale: Scale,

    /// Quantize the color ramp into this many bands
    #[serde(default)]
    pub levels: Option<usize>,
}

fn default_palette() -> PaletteRef {
    PaletteRef::Named(palettes::PIVOTAL_CAPE.to_string())
}

impl PanelConfig {
    /// Interpolated merged channel with the CAPE palette.
    pub fn scattered(title: &str, channel: &str) -> Self {
        Self {
            title: title.to_string(),
            source: PanelSource::Scattered {
                channel: channel.to_string(),
            },
            palette: default_palette(),
            scale: Scale::Palette,
            levels: None,
        }
    }
}

/// Where a panel's field comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelSource {
    /// Channel of the merged point set, interpolated onto the lattice
    Scattered { channel: String },

    /// Gridded reference, JSON or NetCDF (`.nc`)
    Reference {
        path: PathBuf,
        #[serde(default = "default_reference_variable")]
        variable: String,
    },

    /// Rainbow radar product
    Radar {
        path: PathBuf,
        #[serde(default)]
        geometry: RadarConfig,
    },
}

fn default_reference_variable() -> String {
    grid_processor::reference::DEFAULT_VARIABLE.to_string()
}

/// Native grid layout of radar products.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Cell size in meters
    pub cell_size: f64,

    /// Site used when the product carries none
    pub site: (f64, f64),

    /// Treat the first data row as the northern edge
    pub flip_rows: bool,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            site: DEFAULT_SITE,
            flip_rows: false,
        }
    }
}

/// How panel values map onto the color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// From zero to the palette's last break point
    #[default]
    Palette,

    /// Between the configured quantiles of the panel's valid values
    Quantiles,

    /// Explicit limits
    Fixed { min: f64, max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reproduces_standard_chart() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.panels.len(), 4);
        assert_eq!(config.layout().slots(), 4);
        assert_eq!(config.lattice.width, 491);
        assert_eq!(config.lattice.height, 291);
        assert_eq!(config.points[1].channel_name(), "CAPE3D");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RunConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.panels.len(), 4);
        assert_eq!(config.derived.len(), 2);
        assert_eq!(config.statistics.quantiles, (0.01, 0.99));
    }

    #[test]
    fn test_parse_panels_and_derived() {
        let yaml = r#"
derived:
  - name: err
    op: relative_error
    cap: 50.0
    a: A
    b: B
panels:
  - title: Error
    source:
      kind: scattered
      channel: err
    scale:
      fixed:
        min: 0.0
        max: 5.0
  - title: Radar
    source:
      kind: radar
      path: scan.cmax
      geometry:
        flip_rows: true
    palette: radar_reflectivity
"#;
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.derived[0].op, DeriveOp::RelativeError { cap: 50.0 });
        assert_eq!(config.panels[0].scale, Scale::Fixed { min: 0.0, max: 5.0 });
        match &config.panels[1].source {
            PanelSource::Radar { geometry, .. } => {
                assert!(geometry.flip_rows);
                assert_eq!(geometry.cell_size, DEFAULT_CELL_SIZE);
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(config.layout().rows, 1);
    }

    #[test]
    fn test_resolve_paths() {
        let config = RunConfig::default().resolve_paths(Path::new("/data"));
        assert_eq!(
            config.points[0].path,
            PathBuf::from("/data/1d_convective_params.csv")
        );
        match &config.panels[3].source {
            PanelSource::Radar { path, .. } => {
                assert_eq!(path, &PathBuf::from("/data/imgw_radar.cmax"))
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = RunConfig::default();
        config.statistics.quantiles = (0.9, 0.1);
        assert_eq!(config.validate().unwrap_err().code(), "ConfigError");

        let mut config = RunConfig::default();
        config.panels.clear();
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.interpolation.min_points = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_channel_histograms() {
        let yaml = r#"
statistics:
  histograms:
    - channel: xHorizontalDisplacement
      bins: 50
    - channel: CAPE1D
      bins: 20
      min: 0.0
"#;
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        let histograms = &config.statistics.histograms;
        assert_eq!(histograms.len(), 2);
        assert_eq!(histograms[0].channel, "xHorizontalDisplacement");
        assert_eq!(histograms[0].histogram.min, None);
        assert_eq!(histograms[1].histogram.min, Some(0.0));
        assert_eq!(config.statistics.quantiles, (0.01, 0.99));
        assert!(config.validate().is_ok());

        // Open bounds follow the data
        assert_eq!(
            histograms[0].histogram.range(&[3.0, -2.0, 7.5]),
            Some((-2.0, 7.5))
        );
        assert_eq!(histograms[1].histogram.range(&[3.0, 9.0]), Some((0.0, 9.0)));
        assert_eq!(histograms[0].histogram.range(&[]), None);
    }

    #[test]
    fn test_validate_rejects_bad_histogram() {
        let mut config = RunConfig::default();
        config.statistics.histograms.push(ChannelHistogram {
            channel: "CAPE1D".to_string(),
            histogram: HistogramConfig {
                bins: 0,
                min: None,
                max: None,
            },
        });
        assert_eq!(config.validate().unwrap_err().code(), "ConfigError");
    }

    #[test]
    fn test_reference_variable_defaults_to_cape() {
        let yaml = r#"
panels:
  - title: ERA5
    source:
      kind: reference
      path: era5_cape.nc
  - title: ERA5 CIN
    source:
      kind: reference
      path: era5_cin.nc
      variable: cin
"#;
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        let variables: Vec<&str> = config
            .panels
            .iter()
            .filter_map(|p| match &p.source {
                PanelSource::Reference { variable, .. } => Some(variable.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(variables, vec!["cape", "cin"]);
    }

    #[test]
    fn test_unknown_panel_kind() {
        let yaml = "panels:\n  - title: x\n    source:\n      kind: satellite\n";
        assert_eq!(
            RunConfig::from_yaml_str(yaml).unwrap_err().code(),
            "ConfigError"
        );
    }
}
