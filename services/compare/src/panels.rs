//! Per-panel computation.
//!
//! Each panel turns its source into a grid on the shared display lattice
//! and colorizes it. Panels are independent: they run on a rayon pool and
//! every panel yields its own `Result`.

use compare_common::{CompareError, Grid, Lattice, PaletteSet};
use grid_processor::{
    align_geographic, align_projected, load_reference_variable, DisplayLattice, GridInterpolator,
};
use pointset::{DisplayRange, PointSet};
use radar_parser::RadarGeometry;
use rayon::prelude::*;
use rayon::ThreadPool;
use renderer::{colorize, palettes, Normalize, RgbaImage, DEFAULT_LUT_SIZE};
use tracing::{info, warn};

use crate::config::{PanelConfig, PanelSource, RadarConfig, Scale};

/// Shared inputs of all panels of a run.
pub struct PanelContext<'a> {
    /// Merged point set, or the error that prevented building it
    pub points: &'a Result<PointSet, CompareError>,
    pub lattice: &'a Lattice,
    pub display: &'a DisplayLattice,
    pub interpolator: &'a GridInterpolator,
    pub user_palettes: Option<&'a PaletteSet>,
    pub quantiles: (f64, f64),
}

/// A computed panel.
#[derive(Debug, Clone)]
pub struct RenderedPanel {
    /// Field on the display lattice
    pub grid: Grid,
    pub image: RgbaImage,
    /// Value limits mapped onto the color ramp
    pub range: DisplayRange,
}

/// Compute every panel on `pool`, preserving order.
pub fn render_all(
    panels: &[PanelConfig],
    ctx: &PanelContext<'_>,
    pool: &ThreadPool,
) -> Vec<Result<RenderedPanel, CompareError>> {
    pool.install(|| {
        panels
            .par_iter()
            .enumerate()
            .map(|(slot, panel)| {
                let result = render_panel(panel, ctx);
                match &result {
                    Ok(rendered) => info!(
                        slot,
                        title = %panel.title,
                        valid = rendered.grid.valid_count(),
                        "Panel ready"
                    ),
                    Err(e) => warn!(
                        slot,
                        title = %panel.title,
                        code = e.code(),
                        error = %e,
                        "Panel failed"
                    ),
                }
                result
            })
            .collect()
    })
}

/// Compute and colorize one panel.
pub fn render_panel(
    panel: &PanelConfig,
    ctx: &PanelContext<'_>,
) -> Result<RenderedPanel, CompareError> {
    let grid = field_grid(&panel.source, ctx)?;

    let palette = palettes::resolve(&panel.palette, ctx.user_palettes)?;
    let (map, palette_norm) = palettes::load(&palette)?;

    let mut norm = match panel.scale {
        Scale::Palette => palette_norm,
        Scale::Fixed { min, max } => Normalize::new(min, max)?,
        Scale::Quantiles => {
            let values: Vec<f64> = grid.cells().iter().flatten().copied().collect();
            let (lower, upper) = ctx.quantiles;
            let range = DisplayRange::from_quantiles(&values, lower, upper)?;
            Normalize::new(range.min, range.max)?
        }
    };
    if let Some(levels) = panel.levels {
        norm = norm.with_levels(levels)?;
    }

    let lut = map.to_lut(DEFAULT_LUT_SIZE)?;
    let image = colorize(&grid, &lut, &norm);
    Ok(RenderedPanel {
        grid,
        image,
        range: DisplayRange::new(norm.vmin, norm.vmax)?,
    })
}

/// The panel's field resampled onto the display lattice.
pub fn field_grid(source: &PanelSource, ctx: &PanelContext<'_>) -> Result<Grid, CompareError> {
    match source {
        PanelSource::Scattered { channel } => {
            let points = ctx.points.as_ref().map_err(|e| e.clone())?;
            let native = ctx.interpolator.interpolate(points, channel, ctx.lattice)?;
            Ok(align_geographic(&native, ctx.display)?)
        }
        PanelSource::Reference { path, variable } => {
            let native = load_reference_variable(path, variable)?;
            Ok(align_geographic(&native, ctx.display)?)
        }
        PanelSource::Radar { path, geometry } => {
            let product = radar_parser::decode_file(path)?;
            let geometry = radar_geometry(geometry);
            let native = product.into_grid(&geometry)?;
            let proj = geometry.projection(&product);
            Ok(align_projected(&native, &proj, ctx.display)?)
        }
    }
}

fn radar_geometry(config: &RadarConfig) -> RadarGeometry {
    let (lon, lat) = config.site;
    RadarGeometry::default()
        .with_cell_size(config.cell_size)
        .with_default_site(lon, lat)
        .with_flip_rows(config.flip_rows)
}
