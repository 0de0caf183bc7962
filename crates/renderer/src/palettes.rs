//! Built-in palettes.
//!
//! Each palette is defined at raw physical break points; positions are the
//! break points divided by the ramp maximum.

use compare_common::{AnchorSpec, PaletteConfig, PaletteRef, PaletteSet};

use crate::colormap::{ColorMap, Normalize};
use crate::error::{RenderError, Result};

pub const RADAR_REFLECTIVITY: &str = "radar_reflectivity";
pub const METEOLOGIX_PRECIPITATION: &str = "meteologix_precipitation";
pub const PIVOTAL_CAPE: &str = "pivotal_cape";

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 3] = [RADAR_REFLECTIVITY, METEOLOGIX_PRECIPITATION, PIVOTAL_CAPE];

fn palette(
    name: &str,
    description: &str,
    units: Option<&str>,
    colors: &[&str],
    breaks: &[f64],
    alpha: impl Fn(usize) -> f64,
) -> PaletteConfig {
    PaletteConfig {
        name: name.to_string(),
        description: description.to_string(),
        units: units.map(str::to_string),
        anchors: colors
            .iter()
            .zip(breaks)
            .enumerate()
            .map(|(i, (color, &value))| AnchorSpec {
                color: color.to_string(),
                value,
                alpha: alpha(i),
            })
            .collect(),
    }
}

/// Radar reflectivity, 0–65 dBZ. Fully transparent at 0 dBZ.
pub fn radar_reflectivity() -> PaletteConfig {
    palette(
        RADAR_REFLECTIVITY,
        "Radar reflectivity",
        Some("dBZ"),
        &[
            "#ffffff", "#0707c8", "#1261ff", "#00b4ff", "#3ccdff", "#78e6ff", "#bbf2ff",
            "#ffffff", "#fff799", "#ffee33", "#ffcb1a", "#ff7300", "#ff1e00", "#c80000",
            "#af0014", "#960028", "#be0078", "#d6119b", "#ee23be", "#f646d2", "#ff69e6",
            "#ffffff",
        ],
        &[
            0.0, 5.0, 8.0, 11.0, 14.0, 17.0, 20.0, 23.0, 28.0, 31.0, 33.0, 34.0, 37.0, 40.0,
            44.0, 47.0, 50.0, 53.0, 56.0, 59.0, 62.0, 65.0,
        ],
        |i| if i == 0 { 0.0 } else { 1.0 },
    )
}

/// Meteologix-style ramp, 0–5000.
pub fn meteologix_precipitation() -> PaletteConfig {
    palette(
        METEOLOGIX_PRECIPITATION,
        "Meteologix ramp",
        None,
        &[
            "#1e7800", "#449900", "#68ac06", "#8cc00d", "#b1d414", "#d5e81b", "#fafc22",
            "#fad024", "#faa427", "#fb7929", "#fb4d2c", "#fc222f", "#fc2256", "#fc227e",
            "#fc22a6", "#fc22ce", "#fc22f6", "#fc41f7", "#fc61f8", "#fd80f9", "#fda0fb",
            "#febffc", "#fedffd",
        ],
        &[
            0.0, 20.0, 40.0, 100.0, 200.0, 300.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0,
            1600.0, 1800.0, 2000.0, 2200.0, 2400.0, 2800.0, 3200.0, 3600.0, 4000.0, 4500.0,
            5000.0,
        ],
        |_| 1.0,
    )
}

/// Pivotal-style CAPE ramp, 0–4000 J/kg, with steps every 1000.
pub fn pivotal_cape() -> PaletteConfig {
    palette(
        PIVOTAL_CAPE,
        "Pivotal CAPE",
        Some("J/kg"),
        &[
            "#ffffff", "#696969", "#37536a", "#a7c8ce", "#e9dd96", "#e16f02", "#dc4110",
            "#8b0950", "#73088a",
        ],
        &[0.0, 900.0, 1000.0, 1900.0, 2000.0, 2900.0, 3000.0, 3900.0, 4000.0],
        |_| 1.0,
    )
}

/// Built-in palette by name.
pub fn builtin(name: &str) -> Option<PaletteConfig> {
    match name {
        RADAR_REFLECTIVITY => Some(radar_reflectivity()),
        METEOLOGIX_PRECIPITATION => Some(meteologix_precipitation()),
        PIVOTAL_CAPE => Some(pivotal_cape()),
        _ => None,
    }
}

/// Resolve a palette reference against user palettes, then built-ins.
pub fn resolve(reference: &PaletteRef, user: Option<&PaletteSet>) -> Result<PaletteConfig> {
    match reference {
        PaletteRef::Inline(config) => Ok(config.clone()),
        PaletteRef::Named(name) => user
            .and_then(|set| set.get(name).cloned())
            .or_else(|| builtin(name))
            .ok_or_else(|| RenderError::UnknownPalette(name.clone())),
    }
}

/// Color map plus the data range of its break points.
pub fn load(palette: &PaletteConfig) -> Result<(ColorMap, Normalize)> {
    let map = ColorMap::from_palette(palette)?;
    let vmax = palette
        .max_value()
        .ok_or_else(|| RenderError::color_map(format!("palette '{}' is empty", palette.name)))?;
    Ok((map, Normalize::new(0.0, vmax)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for name in BUILTIN_NAMES {
            let palette = builtin(name).unwrap();
            assert!(ColorMap::from_palette(&palette).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_radar_zero_is_transparent() {
        let (map, norm) = load(&radar_reflectivity()).unwrap();
        assert_eq!(norm.vmax, 65.0);
        assert_eq!(map.sample(norm.apply(0.0)).a, 0.0);
        assert_eq!(map.sample(norm.apply(5.0)).a, 1.0);
    }

    #[test]
    fn test_unknown_palette() {
        let reference = PaletteRef::Named("viridis".to_string());
        assert!(matches!(
            resolve(&reference, None),
            Err(RenderError::UnknownPalette(_))
        ));
    }
}
