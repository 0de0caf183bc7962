//! Coordinate joins between point sets.

use std::collections::HashMap;

use compare_common::CompareError;
use tracing::debug;

use crate::points::{Channel, PointSet};

/// Hashable key for an exact coordinate match.
///
/// Adding 0.0 folds -0.0 into +0.0 so both compare equal, as they do as floats.
fn coordinate_key(lon: f64, lat: f64) -> (u64, u64) {
    ((lon + 0.0).to_bits(), (lat + 0.0).to_bits())
}

/// Inner-join two point sets on exact (lon, lat) equality.
///
/// The result carries the value channels of both inputs for matched
/// coordinates only, in the order of `a`. Samples without a partner in the
/// other set are dropped. Duplicate coordinates produce one row per matching
/// pair.
///
/// Fails with a schema error when the coordinate frames differ or a value
/// channel name appears in both inputs.
pub fn merge(a: PointSet, b: PointSet) -> Result<PointSet, CompareError> {
    if a.frame() != b.frame() {
        return Err(CompareError::schema(format!(
            "cannot merge point sets in different coordinate frames ({:?} vs {:?})",
            a.frame(),
            b.frame()
        )));
    }
    if let Some(name) = a
        .channel_names()
        .into_iter()
        .find(|name| b.has_channel(name))
    {
        return Err(CompareError::schema(format!(
            "channel '{}' exists in both inputs; rename one before merging",
            name
        )));
    }

    let mut index: HashMap<(u64, u64), Vec<usize>> = HashMap::with_capacity(b.len());
    for (row, (&lon, &lat)) in b.lon().iter().zip(b.lat()).enumerate() {
        index.entry(coordinate_key(lon, lat)).or_default().push(row);
    }

    let mut pairs = Vec::with_capacity(a.len().min(b.len()));
    for (row_a, (&lon, &lat)) in a.lon().iter().zip(a.lat()).enumerate() {
        if let Some(rows_b) = index.get(&coordinate_key(lon, lat)) {
            pairs.extend(rows_b.iter().map(|&row_b| (row_a, row_b)));
        }
    }

    debug!(
        left = a.len(),
        right = b.len(),
        matched = pairs.len(),
        "Merged point sets on coordinates"
    );

    let (frame, lon_a, lat_a, channels_a) = a.into_parts();
    let (_, _, _, channels_b) = b.into_parts();

    let lon = pairs.iter().map(|&(ra, _)| lon_a[ra]).collect();
    let lat = pairs.iter().map(|&(ra, _)| lat_a[ra]).collect();

    let pick = |channels: Vec<Channel>, left: bool| -> Vec<Channel> {
        channels
            .into_iter()
            .map(|c| Channel {
                values: pairs
                    .iter()
                    .map(|&(ra, rb)| c.values[if left { ra } else { rb }])
                    .collect(),
                name: c.name,
            })
            .collect()
    };

    let mut channels = pick(channels_a, true);
    channels.extend(pick(channels_b, false));

    Ok(PointSet::from_parts(frame, lon, lat, channels))
}
