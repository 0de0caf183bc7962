//! Synthetic scattered samples and gridded references.
//!
//! Generators are deterministic so that tests can assert on exact values.

use crate::fixtures::bbox::MODEL_DOMAIN;

/// Simple deterministic hash for reproducible jitter.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Smooth CAPE-like field in J/kg (roughly 0 to 3000).
pub fn cape_field(lon: f64, lat: f64) -> f64 {
    1500.0 + 1000.0 * (lon.to_radians() * 8.0).sin() * (lat.to_radians() * 6.0).cos()
        + 20.0 * (lon - 14.0)
}

/// Scattered samples over the model domain as (lon, lat, value).
///
/// Nodes of an `nx` x `ny` lattice are jittered by up to a quarter cell so
/// the set is irregular but still covers the domain evenly. Values follow
/// [`cape_field`].
///
/// # Example
///
/// ```
/// use test_utils::scattered_points;
///
/// let points = scattered_points(10, 5);
/// assert_eq!(points.len(), 50);
/// ```
pub fn scattered_points(nx: usize, ny: usize) -> Vec<(f64, f64, f64)> {
    let (min_lon, min_lat, max_lon, max_lat) = MODEL_DOMAIN;
    let dx = (max_lon - min_lon) / nx.max(1) as f64;
    let dy = (max_lat - min_lat) / ny.max(1) as f64;

    let mut points = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            let h = simple_hash(col as u32, row as u32, 17);
            let jx = ((h & 0xffff) as f64 / 65535.0 - 0.5) * 0.5;
            let jy = ((h >> 16) as f64 / 65535.0 - 0.5) * 0.5;
            let lon = min_lon + (col as f64 + 0.5 + jx) * dx;
            let lat = min_lat + (row as f64 + 0.5 + jy) * dy;
            points.push((lon, lat, cape_field(lon, lat)));
        }
    }
    points
}

/// [`scattered_points`] as CSV text with `Lon`, `Lat` and `field` columns.
pub fn scattered_csv(field: &str, nx: usize, ny: usize) -> String {
    let mut out = format!("Lon,Lat,{}\n", field);
    for (lon, lat, value) in scattered_points(nx, ny) {
        out.push_str(&format!("{:.6},{:.6},{:.3}\n", lon, lat, value));
    }
    out
}

/// Gridded reference document on a regular lon/lat lattice.
///
/// Latitudes are written north to south, as model exports usually are, and
/// values are stored packed (`value = raw * 0.5 + 100`). Cells where
/// `fill(col, row)` is true hold the fill value -9999.
pub fn reference_json(
    nx: usize,
    ny: usize,
    fill: impl Fn(usize, usize) -> bool,
) -> String {
    let (min_lon, min_lat, max_lon, max_lat) = MODEL_DOMAIN;
    let step = |lo: f64, hi: f64, n: usize, i: usize| {
        if n <= 1 {
            lo
        } else {
            lo + (hi - lo) * i as f64 / (n - 1) as f64
        }
    };

    let lons: Vec<f64> = (0..nx).map(|i| step(min_lon, max_lon, nx, i)).collect();
    let lats: Vec<f64> = (0..ny).map(|j| step(max_lat, min_lat, ny, j)).collect();

    let rows: Vec<String> = lats
        .iter()
        .enumerate()
        .map(|(row, &lat)| {
            let cells: Vec<String> = lons
                .iter()
                .enumerate()
                .map(|(col, &lon)| {
                    if fill(col, row) {
                        "-9999".to_string()
                    } else {
                        format!("{:.4}", (cape_field(lon, lat) - 100.0) / 0.5)
                    }
                })
                .collect();
            format!("[{}]", cells.join(","))
        })
        .collect();

    let join = |v: &[f64]| {
        v.iter()
            .map(|x| format!("{:.6}", x))
            .collect::<Vec<_>>()
            .join(",")
    };

    format!(
        r#"{{"longitude":[{}],"latitude":[{}],"values":[{}],"scale_factor":0.5,"add_offset":100.0,"fill_value":-9999}}"#,
        join(&lons),
        join(&lats),
        rows.join(",")
    )
}
