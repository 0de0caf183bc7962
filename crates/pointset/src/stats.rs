//! Statistics over value channels.

use compare_common::CompareError;
use serde::{Deserialize, Serialize};

/// The q-th quantile of `values`, ignoring NaN.
///
/// Uses linear interpolation between the order statistics surrounding
/// position `q * (n - 1)`.
pub fn quantile(values: &[f64], q: f64) -> Result<f64, CompareError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(CompareError::config(format!(
            "quantile must be within [0, 1], got {}",
            q
        )));
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Err(CompareError::insufficient_data(
            "cannot compute a quantile of an empty channel",
        ));
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Ok(sorted[lo]);
    }
    let frac = pos - lo as f64;

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Value limits used to scale a field onto a color map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    pub fn new(min: f64, max: f64) -> Result<Self, CompareError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(CompareError::config(format!(
                "invalid display range [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Limits from two quantiles, robust to outliers (e.g. 0.01 / 0.99).
    pub fn from_quantiles(values: &[f64], lower: f64, upper: f64) -> Result<Self, CompareError> {
        if lower > upper {
            return Err(CompareError::config(format!(
                "lower quantile {} exceeds upper quantile {}",
                lower, upper
            )));
        }
        Self::new(quantile(values, lower)?, quantile(values, upper)?)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Shorthand for [`Histogram::compute`].
pub fn histogram(values: &[f64], bins: usize, range: (f64, f64)) -> Result<Histogram, CompareError> {
    Histogram::compute(values, bins, range)
}

/// Fixed-width histogram over a closed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Count `values` into `bins` equal bins over `[min, max]`.
    ///
    /// Bins are half-open except the last, which includes `max`. Values
    /// outside the range and NaN are not counted.
    pub fn compute(values: &[f64], bins: usize, range: (f64, f64)) -> Result<Self, CompareError> {
        let (min, max) = range;
        if bins == 0 {
            return Err(CompareError::config("histogram needs at least one bin"));
        }
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(CompareError::config(format!(
                "invalid histogram range [{}, {}]",
                min, max
            )));
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0u64; bins];
        for &v in values {
            if !(v >= min && v <= max) {
                continue;
            }
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Self { min, max, counts })
    }

    /// Left edges of every bin followed by the right edge of the last one.
    pub fn edges(&self) -> Vec<f64> {
        let bins = self.counts.len();
        let width = (self.max - self.min) / bins as f64;
        (0..=bins).map(|i| self.min + width * i as f64).collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(quantile(&values, 1.0).unwrap(), 4.0);
        assert_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert!((quantile(&values, 0.25).unwrap() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_ignores_nan() {
        let values = [f64::NAN, 10.0, f64::NAN, 20.0];
        assert_eq!(quantile(&values, 0.5).unwrap(), 15.0);
    }

    #[test]
    fn test_quantile_at_infinite_order_statistic() {
        let values = [1.0, f64::INFINITY];
        assert_eq!(quantile(&values, 1.0).unwrap(), f64::INFINITY);
        assert_eq!(quantile(&[f64::NEG_INFINITY, 0.0], 0.0).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_quantile_errors() {
        assert!(matches!(
            quantile(&[], 0.5),
            Err(CompareError::InsufficientData(_))
        ));
        assert!(matches!(
            quantile(&[1.0], 1.5),
            Err(CompareError::Config(_))
        ));
    }

    #[test]
    fn test_display_range_from_quantiles_trims_outliers() {
        let mut values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        values.push(1.0e6);
        let range = DisplayRange::from_quantiles(&values, 0.01, 0.99).unwrap();
        assert!(range.min >= 0.0 && range.min < 2.0);
        assert!(range.max < 1000.0);
    }

    #[test]
    fn test_histogram_last_bin_closed() {
        let hist = Histogram::compute(&[-50.0, 0.0, 49.9, 50.0, 51.0, f64::NAN], 50, (-50.0, 50.0))
            .unwrap();
        assert_eq!(hist.counts.len(), 50);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[25], 1);
        assert_eq!(hist.counts[49], 2);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.edges().len(), 51);
    }
}
