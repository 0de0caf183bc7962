//! Sampling gridded data at arbitrary positions.

pub mod interpolation;

pub use interpolation::{bilinear_sample, nearest_sample, sample};
