//! Scattered-point interpolation onto a regular lattice.
//!
//! Samples are triangulated (Delaunay) in their own coordinate frame; each
//! lattice node takes the barycentric blend of the three vertices of the
//! triangle containing it. Nodes outside the convex hull of the samples are
//! left without data, so the result never extrapolates and never leaves the
//! range of the enclosing vertex values.

use std::collections::HashSet;

use compare_common::{Grid, Lattice};
use pointset::PointSet;
use rayon::prelude::*;
use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};
use tracing::{debug, info};

use crate::config::InterpolatorConfig;
use crate::error::{GridProcessorError, Result};

/// Triangulation vertex carrying the sample value.
#[derive(Debug, Clone, Copy)]
struct SampleVertex {
    position: Point2<f64>,
    value: f64,
}

impl HasPosition for SampleVertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// A triangulated field ready to be sampled at arbitrary positions.
pub struct TriangulatedField {
    triangulation: DelaunayTriangulation<SampleVertex>,
    field: String,
}

impl std::fmt::Debug for TriangulatedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangulatedField")
            .field("field", &self.field)
            .field("vertices", &self.triangulation.num_vertices())
            .field("triangles", &self.triangulation.num_inner_faces())
            .finish()
    }
}

impl TriangulatedField {
    /// Triangulate one channel of a point set.
    ///
    /// Samples whose value is not finite are skipped. Of several samples at
    /// the same coordinate only the first is kept.
    pub fn build(points: &PointSet, field: &str, config: &InterpolatorConfig) -> Result<Self> {
        config.validate().map_err(GridProcessorError::config_error)?;

        let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(points.len());
        let mut vertices = Vec::with_capacity(points.len());
        let mut skipped = 0usize;
        let mut duplicates = 0usize;

        for sample in points.samples(field)? {
            if !sample.value.is_finite() {
                skipped += 1;
                continue;
            }
            let key = ((sample.lon + 0.0).to_bits(), (sample.lat + 0.0).to_bits());
            if !seen.insert(key) {
                duplicates += 1;
                continue;
            }
            vertices.push(SampleVertex {
                position: Point2::new(sample.lon, sample.lat),
                value: sample.value,
            });
        }

        if skipped > 0 {
            debug!(field = %field, skipped, "Skipped samples with non-finite values");
        }
        if duplicates > 0 {
            debug!(field = %field, duplicates, "Dropped samples at duplicate coordinates");
        }

        if vertices.len() < config.min_points {
            return Err(GridProcessorError::insufficient_data(format!(
                "field '{}' has {} usable samples, need at least {}",
                field,
                vertices.len(),
                config.min_points
            )));
        }

        let count = vertices.len();
        let triangulation = DelaunayTriangulation::<SampleVertex>::bulk_load(vertices)
            .map_err(|e| {
                GridProcessorError::invalid_input(format!(
                    "cannot triangulate field '{}': {:?}",
                    field, e
                ))
            })?;

        if triangulation.num_inner_faces() == 0 {
            return Err(GridProcessorError::insufficient_data(format!(
                "field '{}': all {} samples are collinear",
                field, count
            )));
        }

        debug!(
            field = %field,
            vertices = triangulation.num_vertices(),
            triangles = triangulation.num_inner_faces(),
            "Built triangulation"
        );

        Ok(Self {
            triangulation,
            field: field.to_string(),
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn num_vertices(&self) -> usize {
        self.triangulation.num_vertices()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangulation.num_inner_faces()
    }

    /// Value at (x, y), or `None` outside the convex hull.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        self.triangulation
            .barycentric()
            .interpolate(|v| v.data().value, Point2::new(x, y))
    }

    /// Sample every node of `lattice`.
    pub fn to_grid(&self, lattice: &Lattice, parallel: bool) -> Grid {
        let row = |y: f64| -> Vec<Option<f64>> {
            let barycentric = self.triangulation.barycentric();
            lattice
                .x
                .values()
                .iter()
                .map(|&x| barycentric.interpolate(|v| v.data().value, Point2::new(x, y)))
                .collect()
        };

        let rows: Vec<Vec<Option<f64>>> = if parallel {
            lattice.y.values().par_iter().map(|&y| row(y)).collect()
        } else {
            lattice.y.values().iter().map(|&y| row(y)).collect()
        };

        // Rows come back in lattice order, matching the row-major node walk
        let mut cells = rows.into_iter().flatten();
        Grid::from_fn(lattice.clone(), |_, _| cells.next().flatten())
    }
}

/// Interpolator from scattered samples to regular lattices.
#[derive(Debug, Clone, Default)]
pub struct GridInterpolator {
    config: InterpolatorConfig,
}

impl GridInterpolator {
    pub fn new(config: InterpolatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpolatorConfig {
        &self.config
    }

    /// Interpolate one channel of `points` onto `lattice`.
    pub fn interpolate(&self, points: &PointSet, field: &str, lattice: &Lattice) -> Result<Grid> {
        let triangulated = TriangulatedField::build(points, field, &self.config)?;
        let grid = triangulated.to_grid(lattice, self.config.parallel);

        info!(
            field = %field,
            samples = triangulated.num_vertices(),
            width = grid.width(),
            height = grid.height(),
            valid = grid.valid_count(),
            "Interpolated scattered samples"
        );
        Ok(grid)
    }
}

/// Interpolate with the default configuration.
pub fn interpolate(points: &PointSet, field: &str, lattice: &Lattice) -> Result<Grid> {
    GridInterpolator::default().interpolate(points, field, lattice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointset::{CoordinateFrame, Sample};

    fn points(samples: &[(f64, f64, f64)]) -> PointSet {
        let samples: Vec<Sample> = samples
            .iter()
            .map(|&(lon, lat, value)| Sample { lon, lat, value })
            .collect();
        PointSet::from_samples(CoordinateFrame::Geographic, "v", &samples).unwrap()
    }

    fn unit_square() -> PointSet {
        points(&[
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 10.0),
            (0.0, 1.0, 20.0),
            (1.0, 1.0, 30.0),
        ])
    }

    #[test]
    fn test_linear_field_reproduced() {
        // v = 10x + 20y is linear, so every triangle reproduces it exactly
        let field = TriangulatedField::build(&unit_square(), "v", &InterpolatorConfig::default())
            .unwrap();
        let v = field.sample(0.25, 0.5).unwrap();
        assert!((v - 12.5).abs() < 1e-9, "got {}", v);
    }

    #[test]
    fn test_outside_hull_is_none() {
        let field = TriangulatedField::build(&unit_square(), "v", &InterpolatorConfig::default())
            .unwrap();
        assert!(field.sample(1.5, 0.5).is_none());
        assert!(field.sample(-0.01, -0.01).is_none());
    }

    #[test]
    fn test_two_points_insufficient() {
        let err = interpolate(
            &points(&[(0.0, 0.0, 1.0), (1.0, 1.0, 2.0)]),
            "v",
            &Lattice::linspace((0.0, 1.0), (0.0, 1.0), (3, 3)).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, GridProcessorError::InsufficientData(_)));
    }

    #[test]
    fn test_collinear_insufficient() {
        let err = TriangulatedField::build(
            &points(&[(0.0, 0.0, 1.0), (1.0, 1.0, 2.0), (2.0, 2.0, 3.0), (3.0, 3.0, 4.0)]),
            "v",
            &InterpolatorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GridProcessorError::InsufficientData(_)));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let set = points(&[
            (0.0, 0.0, 5.0),
            (0.0, 0.0, 99.0),
            (1.0, 0.0, 5.0),
            (0.0, 1.0, 5.0),
        ]);
        let field = TriangulatedField::build(&set, "v", &InterpolatorConfig::default()).unwrap();
        assert_eq!(field.num_vertices(), 3);
        assert!((field.sample(0.0, 0.0).unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_nan_values_skipped() {
        let set = points(&[
            (0.0, 0.0, 1.0),
            (1.0, 0.0, f64::NAN),
            (0.0, 1.0, 1.0),
            (1.0, 1.0, 1.0),
        ]);
        let field = TriangulatedField::build(&set, "v", &InterpolatorConfig::default()).unwrap();
        assert_eq!(field.num_vertices(), 3);
    }

    #[test]
    fn test_missing_field_is_common_error() {
        let err = TriangulatedField::build(&unit_square(), "w", &InterpolatorConfig::default())
            .unwrap_err();
        assert!(matches!(err, GridProcessorError::Common(_)));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let lattice = Lattice::linspace((0.0, 1.0), (0.0, 1.0), (7, 5)).unwrap();
        let field = TriangulatedField::build(&unit_square(), "v", &InterpolatorConfig::default())
            .unwrap();
        assert_eq!(field.to_grid(&lattice, true), field.to_grid(&lattice, false));
    }
}
