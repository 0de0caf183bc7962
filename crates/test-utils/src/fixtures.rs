//! Common test fixtures.

/// Bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Extent covered by the CAPE model exports
    pub const MODEL_DOMAIN: (f64, f64, f64, f64) = (14.1, 49.1, 23.9, 54.9);

    /// Display extent of the comparison chart
    pub const DISPLAY: (f64, f64, f64, f64) = (13.5, 48.75, 24.5, 55.25);

    /// Unit square
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);
}

/// Radar site and native grid parameters.
pub mod radar {
    /// Site longitude in degrees
    pub const SITE_LON: f64 = 19.0926;

    /// Site latitude in degrees
    pub const SITE_LAT: f64 = 52.3469;

    /// Native cell size in meters
    pub const CELL_SIZE: f64 = 1000.0;

    /// Half-width of the native grid in meters
    pub const HALF_EXTENT: f64 = 450_000.0;

    /// Reflectivity range of the composite product (dBZ)
    pub const DBZ_MIN: f64 = 0.0;
    pub const DBZ_MAX: f64 = 65.0;
}

/// Inline palette definitions in the configuration schema.
pub mod palettes {
    /// Two-anchor palette with a transparent lower end
    pub const TWO_ANCHOR_JSON: &str = r##"{
        "name": "test",
        "anchors": [
            {"color": "#000000", "value": 0.0, "alpha": 0.0},
            {"color": "#ffffff", "value": 10.0}
        ]
    }"##;
}
