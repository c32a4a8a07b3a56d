#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fixed-resolution spatial binning.
//!
//! [`GridBounds`] is computed once over the whole record set. Each period
//! then gets a fresh [`SpatialGrid`] over those bounds, is filled with the
//! period's records, and reduced to per-bin category counts.

pub mod bounds;
pub mod grid;
pub mod matrix;

pub use bounds::{GridBounds, GridDimensions, latitude_to_row, longitude_to_column};
pub use grid::{CategoryCounts, GridAggregate, SpatialGrid};
pub use matrix::BinMatrix;

/// Errors that can occur while building a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Records must be located before binning.
    #[error("Record {0} has no coordinates")]
    NoCoordinates(String),

    /// Bounds cannot be computed from an empty or unlocated record set.
    #[error("No located records to compute grid bounds from")]
    NoLocatedRecords,

    #[error("Grid dimensions must be positive, got {rows}x{cols}")]
    ZeroDimension { rows: usize, cols: usize },

    #[error("Bin ({row}, {col}) is outside the grid")]
    OutOfRange { row: usize, col: usize },
}
