//! Anchor-based continuous color maps.
//!
//! A [`ColorMap`] is an ordered list of anchors, each carrying a position in
//! `[0, 1]`, an RGB color and its own alpha. Sampling interpolates R, G, B
//! and A independently between the two anchors bracketing `t`. Two anchors
//! at the same position form a hard step; the later anchor wins at the step.
//!
//! Maps are validated once at construction and usually converted to a
//! [`ColorLut`] before rendering.

use compare_common::PaletteConfig;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Default lookup table size.
pub const DEFAULT_LUT_SIZE: usize = 256;

/// Color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Channel-wise linear blend, `t = 0` gives `self`.
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// 8-bit channels, rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Parse `#rrggbb` or `rrggbb` into channels in `[0, 1]`.
pub fn parse_hex(hex: &str) -> Result<[f64; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(RenderError::color_map(format!("invalid hex color '{}'", hex)));
    }

    let channel = |range: std::ops::Range<usize>| -> Result<f64> {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f64 / 255.0)
            .map_err(|_| RenderError::color_map(format!("invalid hex color '{}'", hex)))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// One anchor of a color map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAnchor {
    pub position: f64,
    pub color: Rgba,
}

/// Fluent construction of a [`ColorMap`].
///
/// ```
/// use renderer::ColorMapBuilder;
///
/// let map = ColorMapBuilder::new()
///     .anchor("#ffffff", 0.0, 0.0)
///     .anchor("#0707c8", 1.0, 1.0)
///     .build()
///     .unwrap();
/// assert_eq!(map.sample(0.0).a, 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColorMapBuilder {
    name: Option<String>,
    anchors: Vec<(String, f64, f64)>,
}

impl ColorMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an anchor. Validation is deferred to [`build`](Self::build).
    pub fn anchor(mut self, hex: impl Into<String>, position: f64, alpha: f64) -> Self {
        self.anchors.push((hex.into(), position, alpha));
        self
    }

    pub fn build(self) -> Result<ColorMap> {
        let mut anchors = Vec::with_capacity(self.anchors.len());
        for (hex, position, alpha) in &self.anchors {
            let [r, g, b] = parse_hex(hex)?;
            anchors.push(ColorAnchor {
                position: *position,
                color: Rgba::new(r, g, b, *alpha),
            });
        }
        ColorMap::new(self.name.unwrap_or_else(|| "custom".to_string()), anchors)
    }
}

/// A validated continuous color map.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    name: String,
    anchors: Vec<ColorAnchor>,
}

impl ColorMap {
    /// Validate anchors into a map.
    ///
    /// Requires at least two anchors, finite non-decreasing positions
    /// starting at exactly 0.0 and ending at exactly 1.0, and alphas in
    /// `[0, 1]`.
    pub fn new(name: impl Into<String>, anchors: Vec<ColorAnchor>) -> Result<Self> {
        let name = name.into();
        if anchors.len() < 2 {
            return Err(RenderError::color_map(format!(
                "'{}' needs at least 2 anchors, got {}",
                name,
                anchors.len()
            )));
        }
        if let Some(a) = anchors.iter().find(|a| !a.position.is_finite()) {
            return Err(RenderError::color_map(format!(
                "'{}' has non-finite position {}",
                name, a.position
            )));
        }
        if anchors.windows(2).any(|w| w[1].position < w[0].position) {
            return Err(RenderError::color_map(format!(
                "'{}' positions must be non-decreasing",
                name
            )));
        }
        let first = anchors[0].position;
        let last = anchors[anchors.len() - 1].position;
        if first != 0.0 || last != 1.0 {
            return Err(RenderError::color_map(format!(
                "'{}' positions must start at 0.0 and end at 1.0, got {} and {}",
                name, first, last
            )));
        }
        if let Some(a) = anchors
            .iter()
            .find(|a| !(a.color.a >= 0.0 && a.color.a <= 1.0))
        {
            return Err(RenderError::color_map(format!(
                "'{}' alpha {} is outside [0, 1]",
                name, a.color.a
            )));
        }
        Ok(Self { name, anchors })
    }

    /// Build from parallel lists of hex colors, positions and alphas.
    pub fn from_lists<S: AsRef<str>>(hex: &[S], positions: &[f64], alphas: &[f64]) -> Result<Self> {
        if hex.len() != positions.len() || hex.len() != alphas.len() {
            return Err(RenderError::color_map(format!(
                "anchor lists differ in length: {} colors, {} positions, {} alphas",
                hex.len(),
                positions.len(),
                alphas.len()
            )));
        }
        hex.iter()
            .zip(positions)
            .zip(alphas)
            .fold(ColorMapBuilder::new(), |builder, ((h, &p), &a)| {
                builder.anchor(h.as_ref(), p, a)
            })
            .build()
    }

    /// Build from a palette defined at raw break points.
    pub fn from_palette(palette: &PaletteConfig) -> Result<Self> {
        let positions = palette
            .positions()
            .map_err(|e| RenderError::color_map(e.to_string()))?;
        let mut map = Self::from_lists(&palette.colors(), &positions, &palette.alphas())?;
        map.name = palette.name.clone();
        Ok(map)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn anchors(&self) -> &[ColorAnchor] {
        &self.anchors
    }

    /// Color at `t`.
    ///
    /// `t <= 0` and NaN give the first anchor, `t >= 1` the last.
    pub fn sample(&self, t: f64) -> Rgba {
        let last = self.anchors.len() - 1;
        if t.is_nan() || t <= 0.0 {
            return self.anchors[0].color;
        }
        if t >= 1.0 {
            return self.anchors[last].color;
        }

        // First anchor strictly beyond t; anchors[0] is at 0.0 and the last at 1.0
        let upper = self
            .anchors
            .partition_point(|a| a.position <= t)
            .clamp(1, last);
        let lo = &self.anchors[upper - 1];
        let hi = &self.anchors[upper];
        let span = hi.position - lo.position;
        if span <= 0.0 {
            return hi.color;
        }
        lo.color.lerp(&hi.color, (t - lo.position) / span)
    }

    /// Precompute an `n`-entry 8-bit lookup table.
    pub fn to_lut(&self, n: usize) -> Result<ColorLut> {
        if n < 2 {
            return Err(RenderError::color_map(format!(
                "lookup table needs at least 2 entries, got {}",
                n
            )));
        }
        let entries = (0..n)
            .map(|i| self.sample(i as f64 / (n - 1) as f64).to_rgba8())
            .collect();
        Ok(ColorLut { entries })
    }
}

/// Immutable RGBA8 lookup table over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLut {
    entries: Vec<[u8; 4]>,
}

impl ColorLut {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }

    /// Entry for a normalized value; out-of-range values clamp, NaN maps to
    /// the first entry.
    #[inline]
    pub fn lookup(&self, t: f64) -> [u8; 4] {
        let n = self.entries.len();
        if t.is_nan() || t <= 0.0 {
            return self.entries[0];
        }
        let index = ((t * n as f64) as usize).min(n - 1);
        self.entries[index]
    }
}

/// Linear mapping of data values onto `[0, 1]`.
///
/// With `levels` set, the range is split into that many equal bands and
/// every value takes the color of its band center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
    #[serde(default)]
    pub levels: Option<usize>,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Result<Self> {
        let norm = Self {
            vmin,
            vmax,
            levels: None,
        };
        norm.validate()?;
        Ok(norm)
    }

    pub fn with_levels(mut self, levels: usize) -> Result<Self> {
        self.levels = Some(levels);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.vmin.is_finite() || !self.vmax.is_finite() || self.vmax <= self.vmin {
            return Err(RenderError::InvalidNormalize(format!(
                "range [{}, {}] must be finite and increasing",
                self.vmin, self.vmax
            )));
        }
        if self.levels == Some(0) {
            return Err(RenderError::InvalidNormalize(
                "levels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalized position of `value`, clamped to `[0, 1]`.
    pub fn apply(&self, value: f64) -> f64 {
        let t = ((value - self.vmin) / (self.vmax - self.vmin)).clamp(0.0, 1.0);
        match self.levels {
            Some(levels) => {
                let band = ((t * levels as f64).floor() as usize).min(levels - 1);
                (band as f64 + 0.5) / levels as f64
            }
            None => t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_anchor() -> ColorMap {
        ColorMapBuilder::new()
            .anchor("#000000", 0.0, 0.0)
            .anchor("#ffffff", 1.0, 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff0000").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(parse_hex("00FF00").unwrap(), [0.0, 1.0, 0.0]);
        assert!(parse_hex("#GGGGGG").is_err());
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("#ffé000").is_err());
    }

    #[test]
    fn test_sample_midpoint() {
        let c = two_anchor().sample(0.5);
        assert!((c.r - 0.5).abs() < 1e-12);
        assert!((c.a - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_step_is_right_continuous() {
        let map = ColorMapBuilder::new()
            .anchor("#000000", 0.0, 1.0)
            .anchor("#000000", 0.5, 1.0)
            .anchor("#ffffff", 0.5, 1.0)
            .anchor("#ffffff", 1.0, 1.0)
            .build()
            .unwrap();
        assert_eq!(map.sample(0.4999).r, 0.0);
        assert_eq!(map.sample(0.5).r, 1.0);
    }

    #[test]
    fn test_lut_endpoints() {
        let lut = two_anchor().to_lut(DEFAULT_LUT_SIZE).unwrap();
        assert_eq!(lut.len(), 256);
        assert_eq!(lut.lookup(0.0), [0, 0, 0, 0]);
        assert_eq!(lut.lookup(1.0), [255, 255, 255, 255]);
        assert_eq!(lut.lookup(f64::NAN), [0, 0, 0, 0]);
        assert_eq!(lut.lookup(7.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_normalize_levels() {
        let norm = Normalize::new(0.0, 4000.0).unwrap().with_levels(100).unwrap();
        assert!((norm.apply(0.0) - 0.005).abs() < 1e-12);
        assert!((norm.apply(39.0) - 0.005).abs() < 1e-12);
        assert!((norm.apply(4000.0) - 0.995).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_rejects_empty_range() {
        assert!(Normalize::new(1.0, 1.0).is_err());
        assert!(Normalize::new(0.0, 1.0).unwrap().with_levels(0).is_err());
    }
}
