//! CSV input for scattered samples.

use std::io::Read;
use std::path::Path;

use compare_common::CompareError;
use tracing::{debug, info};

use crate::points::{CoordinateColumns, PointSet, Table};

fn csv_error(err: csv::Error) -> CompareError {
    if err.is_io_error() {
        CompareError::Io(err.to_string())
    } else {
        CompareError::format(format!("CSV error: {}", err))
    }
}

/// Reads tabular samples with a header row.
///
/// The coordinate columns are always required. When `fields` are given,
/// only those columns are kept and each must be numeric; otherwise every
/// other column that parses as numbers becomes a channel and the rest are
/// ignored. Empty cells in value columns read as NaN.
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    columns: CoordinateColumns,
    fields: Option<Vec<String>>,
    delimiter: Option<u8>,
}

impl CsvReader {
    pub fn new(columns: CoordinateColumns) -> Self {
        Self {
            columns,
            fields: None,
            delimiter: None,
        }
    }

    pub fn with_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.as_ref().to_string()).collect());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<PointSet, CompareError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| CompareError::Io(format!("{}: {}", path.display(), e)))?;
        let points = self.read(file)?;
        info!(
            path = %path.display(),
            samples = points.len(),
            channels = ?points.channel_names(),
            "Loaded point set"
        );
        Ok(points)
    }

    pub fn read<R: Read>(&self, input: R) -> Result<PointSet, CompareError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter.unwrap_or(b','))
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers = reader.headers().map_err(csv_error)?.clone();
        let find = |name: &str| headers.iter().position(|h| h == name);

        let lon_idx = find(&self.columns.lon).ok_or_else(|| {
            CompareError::schema(format!("missing coordinate column '{}'", self.columns.lon))
        })?;
        let lat_idx = find(&self.columns.lat).ok_or_else(|| {
            CompareError::schema(format!("missing coordinate column '{}'", self.columns.lat))
        })?;

        // (column index, name, strict)
        let wanted: Vec<(usize, String, bool)> = match &self.fields {
            Some(fields) => fields
                .iter()
                .filter(|f| **f != self.columns.lon && **f != self.columns.lat)
                .map(|f| {
                    find(f)
                        .map(|idx| (idx, f.clone(), true))
                        .ok_or_else(|| CompareError::schema(format!("missing column '{}'", f)))
                })
                .collect::<Result<_, _>>()?,
            None => headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != lon_idx && *idx != lat_idx)
                .map(|(idx, name)| (idx, name.to_string(), false))
                .collect(),
        };

        let mut lon = Vec::new();
        let mut lat = Vec::new();
        let mut values: Vec<Option<Vec<f64>>> = vec![Some(Vec::new()); wanted.len()];

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let coord = |idx: usize, name: &str| -> Result<f64, CompareError> {
                record
                    .get(idx)
                    .and_then(|cell| cell.parse::<f64>().ok())
                    .ok_or_else(|| {
                        CompareError::schema(format!(
                            "row {}: column '{}' is not a number",
                            row + 1,
                            name
                        ))
                    })
            };
            lon.push(coord(lon_idx, &self.columns.lon)?);
            lat.push(coord(lat_idx, &self.columns.lat)?);

            for ((idx, name, strict), slot) in wanted.iter().zip(values.iter_mut()) {
                let Some(column) = slot.as_mut() else {
                    continue;
                };
                let cell = record.get(*idx).unwrap_or("");
                let parsed = if cell.is_empty() {
                    Some(f64::NAN)
                } else {
                    cell.parse::<f64>().ok()
                };
                match parsed {
                    Some(v) => column.push(v),
                    None if *strict => {
                        return Err(CompareError::schema(format!(
                            "row {}: column '{}' is not a number ('{}')",
                            row + 1,
                            name,
                            cell
                        )));
                    }
                    None => {
                        debug!(column = %name, row = row + 1, "Ignoring non-numeric column");
                        *slot = None;
                    }
                }
            }
        }

        let mut table = Table::new();
        table.push_column(self.columns.lon.clone(), lon)?;
        table.push_column(self.columns.lat.clone(), lat)?;
        for ((_, name, _), column) in wanted.into_iter().zip(values) {
            if let Some(column) = column {
                table.push_column(name, column)?;
            }
        }

        PointSet::from_table(table, &self.columns)
    }
}
