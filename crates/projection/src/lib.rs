//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! All projections use a spherical Earth.

pub mod azimuthal;
pub mod mercator;

pub use azimuthal::AzimuthalEquidistant;
pub use mercator::Mercator;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_229.0;

/// A map projection between geographic degrees and planar meters.
pub trait Projection {
    /// Geographic (lon, lat) in degrees to projected (x, y) in meters.
    ///
    /// Returns `None` where the projection is undefined.
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Projected (x, y) in meters to geographic (lon, lat) in degrees.
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}

/// Wrap a longitude difference in radians into [-π, π].
pub(crate) fn wrap_pi(mut dlon: f64) -> f64 {
    use std::f64::consts::PI;
    while dlon > PI {
        dlon -= 2.0 * PI;
    }
    while dlon < -PI {
        dlon += 2.0 * PI;
    }
    dlon
}
