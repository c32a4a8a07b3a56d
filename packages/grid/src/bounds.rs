//! Grid extents and coordinate-to-bin mapping.

use callgrid_incident_models::IncidentRecord;
use serde::{Deserialize, Serialize};

use crate::GridError;

pub const DEFAULT_ROWS: usize = 15;
pub const DEFAULT_COLS: usize = 15;

/// Bounding rectangle of every located record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GridBounds {
    /// Scans `records` once. Records without coordinates are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NoLocatedRecords`] if no record has coordinates.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a IncidentRecord>,
    ) -> Result<Self, GridError> {
        records
            .into_iter()
            .filter_map(|r| r.coordinates)
            .fold(None, |bounds: Option<Self>, c| {
                Some(bounds.map_or(
                    Self {
                        min_latitude: c.latitude,
                        max_latitude: c.latitude,
                        min_longitude: c.longitude,
                        max_longitude: c.longitude,
                    },
                    |b| Self {
                        min_latitude: b.min_latitude.min(c.latitude),
                        max_latitude: b.max_latitude.max(c.latitude),
                        min_longitude: b.min_longitude.min(c.longitude),
                        max_longitude: b.max_longitude.max(c.longitude),
                    },
                ))
            })
            .ok_or(GridError::NoLocatedRecords)
    }
}

/// Number of rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridDimensions {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridDimensions {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// # Errors
    ///
    /// Returns [`GridError::ZeroDimension`] if either dimension is zero.
    pub const fn validate(self) -> Result<Self, GridError> {
        if self.rows == 0 || self.cols == 0 {
            Err(GridError::ZeroDimension {
                rows: self.rows,
                cols: self.cols,
            })
        } else {
            Ok(self)
        }
    }
}

/// `floor((value - min) / ((max - min) / bins))`, clamped to `0..bins`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bin_from_min(value: f64, min: f64, max: f64, bins: usize) -> usize {
    let last = bins.saturating_sub(1);
    let step = (max - min) / bins as f64;
    let index = ((value - min) / step).floor();
    if index.is_nan() || index <= 0.0 {
        0
    } else {
        (index as usize).min(last)
    }
}

/// Row of `latitude`. Latitude grows northward while rows grow downward, so
/// `max_latitude` lands in row 0 and `min_latitude` in the last row.
#[must_use]
pub fn latitude_to_row(latitude: f64, bounds: &GridBounds, rows: usize) -> usize {
    let last = rows.saturating_sub(1);
    if latitude >= bounds.max_latitude {
        0
    } else if latitude <= bounds.min_latitude {
        last
    } else {
        last - bin_from_min(latitude, bounds.min_latitude, bounds.max_latitude, rows)
    }
}

/// Column of `longitude`: `min_longitude` in column 0, `max_longitude` in the
/// last column.
#[must_use]
pub fn longitude_to_column(longitude: f64, bounds: &GridBounds, cols: usize) -> usize {
    let last = cols.saturating_sub(1);
    if longitude <= bounds.min_longitude {
        0
    } else if longitude >= bounds.max_longitude {
        last
    } else {
        bin_from_min(longitude, bounds.min_longitude, bounds.max_longitude, cols)
    }
}
