//! Elementwise derived channels.

use compare_common::CompareError;
use serde::{Deserialize, Serialize};

/// Relative error reported when the reference is zero but the difference is not.
pub const DEFAULT_RELATIVE_ERROR_CAP: f64 = 100.0;

/// Binary operation producing a derived channel from channels `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeriveOp {
    /// `b - a`
    Difference,

    /// `|b - a| / a` in percent, with `a` as the reference.
    ///
    /// A zero reference yields 0 when the difference is also zero and `cap`
    /// otherwise: no baseline means maximal disagreement rather than an
    /// unbounded value.
    RelativeError {
        #[serde(default = "default_cap")]
        cap: f64,
    },
}

fn default_cap() -> f64 {
    DEFAULT_RELATIVE_ERROR_CAP
}

impl DeriveOp {
    pub fn relative_error() -> Self {
        DeriveOp::RelativeError {
            cap: DEFAULT_RELATIVE_ERROR_CAP,
        }
    }

    fn apply(&self, a: f64, b: f64) -> f64 {
        match *self {
            DeriveOp::Difference => b - a,
            DeriveOp::RelativeError { cap } => {
                let diff = (b - a).abs();
                if a == 0.0 {
                    if diff == 0.0 {
                        0.0
                    } else {
                        cap
                    }
                } else {
                    diff / a * 100.0
                }
            }
        }
    }
}

/// Apply `op` elementwise to two channels of equal length.
pub fn derive(op: DeriveOp, channel_a: &[f64], channel_b: &[f64]) -> Result<Vec<f64>, CompareError> {
    if channel_a.len() != channel_b.len() {
        return Err(CompareError::schema(format!(
            "cannot derive from channels of different lengths ({} vs {})",
            channel_a.len(),
            channel_b.len()
        )));
    }
    Ok(channel_a
        .iter()
        .zip(channel_b)
        .map(|(&a, &b)| op.apply(a, b))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_is_b_minus_a() {
        let out = derive(DeriveOp::Difference, &[10.0, 20.0], &[12.0, 18.0]).unwrap();
        assert_eq!(out, vec![2.0, -2.0]);
    }

    #[test]
    fn test_relative_error_percent() {
        let out = derive(DeriveOp::relative_error(), &[10.0, 20.0], &[12.0, 18.0]).unwrap();
        assert!((out[0] - 20.0).abs() < 1e-9);
        assert!((out[1] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_error_zero_reference() {
        let op = DeriveOp::RelativeError { cap: 250.0 };
        let out = derive(op, &[0.0, 0.0, -0.0], &[0.0, 5.0, -3.0]).unwrap();
        assert_eq!(out, vec![0.0, 250.0, 250.0]);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_length_mismatch_is_schema_error() {
        let err = derive(DeriveOp::Difference, &[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CompareError::Schema(_)));
    }

    #[test]
    fn test_op_from_yaml_shape() {
        let op: DeriveOp = serde_json::from_str(r#"{"op": "relative_error"}"#).unwrap();
        assert_eq!(op, DeriveOp::relative_error());
    }
}
