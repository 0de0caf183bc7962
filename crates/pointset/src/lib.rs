//! Scattered sample sets.
//!
//! A [`PointSet`] holds irregularly positioned samples sharing one
//! coordinate frame: a longitude column, a latitude column and any number of
//! named value channels. This crate provides:
//!
//! - **Input**: [`CsvReader`] for tabular files
//! - **Joins**: [`merge`] (inner join on exact coordinates)
//! - **Derived channels**: [`derive`] with [`DeriveOp`]
//! - **Statistics**: [`quantile`], [`DisplayRange`], [`Histogram`]

pub mod derive;
pub mod merge;
pub mod points;
pub mod reader;
pub mod stats;

pub use derive::{derive, DeriveOp, DEFAULT_RELATIVE_ERROR_CAP};
pub use merge::merge;
pub use points::{Channel, CoordinateColumns, CoordinateFrame, PointSet, Sample, Table};
pub use reader::CsvReader;
pub use stats::{histogram, quantile, DisplayRange, Histogram};
