//! Point set data model.

use compare_common::CompareError;
use serde::{Deserialize, Serialize};

use crate::derive::{derive, DeriveOp};

/// Coordinate frame shared by all samples of a point set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinateFrame {
    /// Longitude/latitude in degrees
    #[default]
    Geographic,

    /// Projected coordinates in meters, identified by name
    Projected { name: String },
}

/// Names of the coordinate columns in tabular input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateColumns {
    pub lon: String,
    pub lat: String,
}

impl Default for CoordinateColumns {
    fn default() -> Self {
        Self {
            lon: "Lon".to_string(),
            lat: "Lat".to_string(),
        }
    }
}

/// One scattered measurement of a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub values: Vec<f64>,
}

/// Untyped numeric table, as read from tabular input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Channel>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. All columns must have the same length and unique names.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), CompareError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(CompareError::schema(format!("duplicate column '{}'", name)));
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(CompareError::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    first.values.len()
                )));
            }
        }
        self.columns.push(Channel { name, values });
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }
}

/// An ordered set of scattered samples with named value channels.
///
/// Coordinates are always finite. Every channel has exactly one value per
/// sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    frame: CoordinateFrame,
    lon: Vec<f64>,
    lat: Vec<f64>,
    channels: Vec<Channel>,
}

impl PointSet {
    /// Create a point set with coordinates and no value channels.
    pub fn new(frame: CoordinateFrame, lon: Vec<f64>, lat: Vec<f64>) -> Result<Self, CompareError> {
        if lon.len() != lat.len() {
            return Err(CompareError::schema(format!(
                "coordinate columns differ in length ({} vs {})",
                lon.len(),
                lat.len()
            )));
        }
        if let Some(row) = lon
            .iter()
            .zip(&lat)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(CompareError::schema(format!(
                "non-finite coordinate at row {}",
                row
            )));
        }
        Ok(Self {
            frame,
            lon,
            lat,
            channels: Vec::new(),
        })
    }

    /// Build a geographic point set from a table.
    ///
    /// The coordinate columns are required; every other column becomes a
    /// value channel.
    pub fn from_table(table: Table, columns: &CoordinateColumns) -> Result<Self, CompareError> {
        let mut lon = None;
        let mut lat = None;
        let mut rest = Vec::new();

        for column in table.columns {
            if column.name == columns.lon {
                lon = Some(column.values);
            } else if column.name == columns.lat {
                lat = Some(column.values);
            } else {
                rest.push(column);
            }
        }

        let lon = lon.ok_or_else(|| {
            CompareError::schema(format!("missing coordinate column '{}'", columns.lon))
        })?;
        let lat = lat.ok_or_else(|| {
            CompareError::schema(format!("missing coordinate column '{}'", columns.lat))
        })?;

        let mut points = Self::new(CoordinateFrame::Geographic, lon, lat)?;
        for channel in rest {
            points = points.with_channel(channel.name, channel.values)?;
        }
        Ok(points)
    }

    /// Build a point set with a single channel from samples.
    pub fn from_samples(
        frame: CoordinateFrame,
        name: impl Into<String>,
        samples: &[Sample],
    ) -> Result<Self, CompareError> {
        let lon = samples.iter().map(|s| s.lon).collect();
        let lat = samples.iter().map(|s| s.lat).collect();
        let values = samples.iter().map(|s| s.value).collect();
        Self::new(frame, lon, lat)?.with_channel(name, values)
    }

    pub(crate) fn from_parts(
        frame: CoordinateFrame,
        lon: Vec<f64>,
        lat: Vec<f64>,
        channels: Vec<Channel>,
    ) -> Self {
        Self {
            frame,
            lon,
            lat,
            channels,
        }
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.iter().any(|c| c.name == name)
    }

    /// Values of a named channel.
    pub fn channel(&self, name: &str) -> Result<&[f64], CompareError> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| {
                CompareError::schema(format!(
                    "channel '{}' not found (available: {})",
                    name,
                    self.channel_names().join(", ")
                ))
            })
    }

    /// Add a value channel.
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, CompareError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CompareError::schema("channel name must not be empty"));
        }
        if self.has_channel(&name) {
            return Err(CompareError::schema(format!("channel '{}' already exists", name)));
        }
        if values.len() != self.len() {
            return Err(CompareError::schema(format!(
                "channel '{}' has {} values for {} samples",
                name,
                values.len(),
                self.len()
            )));
        }
        self.channels.push(Channel { name, values });
        Ok(self)
    }

    /// Add a channel computed from two existing channels.
    pub fn with_derived(
        self,
        name: impl Into<String>,
        op: DeriveOp,
        channel_a: &str,
        channel_b: &str,
    ) -> Result<Self, CompareError> {
        let values = derive(op, self.channel(channel_a)?, self.channel(channel_b)?)?;
        self.with_channel(name, values)
    }

    /// Keep only the named channels, in the given order.
    pub fn select(mut self, names: &[&str]) -> Result<Self, CompareError> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let idx = self
                .channels
                .iter()
                .position(|c| c.name == *name)
                .ok_or_else(|| CompareError::schema(format!("channel '{}' not found", name)))?;
            selected.push(self.channels.swap_remove(idx));
        }
        self.channels = selected;
        Ok(self)
    }

    pub fn rename_channel(mut self, from: &str, to: &str) -> Result<Self, CompareError> {
        if from != to && self.has_channel(to) {
            return Err(CompareError::schema(format!("channel '{}' already exists", to)));
        }
        let channel = self
            .channels
            .iter_mut()
            .find(|c| c.name == from)
            .ok_or_else(|| CompareError::schema(format!("channel '{}' not found", from)))?;
        channel.name = to.to_string();
        Ok(self)
    }

    /// Samples of one channel, in order.
    pub fn samples<'a>(
        &'a self,
        field: &str,
    ) -> Result<impl Iterator<Item = Sample> + 'a, CompareError> {
        let values = self.channel(field)?;
        Ok(self
            .lon
            .iter()
            .zip(&self.lat)
            .zip(values)
            .map(|((&lon, &lat), &value)| Sample { lon, lat, value }))
    }

    pub(crate) fn into_parts(self) -> (CoordinateFrame, Vec<f64>, Vec<f64>, Vec<Channel>) {
        (self.frame, self.lon, self.lat, self.channels)
    }
}
