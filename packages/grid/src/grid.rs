//! Per-period binning and category aggregation.

use callgrid_incident_models::{IncidentRecord, SEVERITY_CODES};

use crate::GridError;
use crate::bounds::{GridBounds, GridDimensions, latitude_to_row, longitude_to_column};
use crate::matrix::BinMatrix;

/// Counts per category code for one bin.
pub type CategoryCounts = [u32; SEVERITY_CODES];

/// A rectangular partition of [`GridBounds`] holding the records of one
/// period. Built by repeated [`SpatialGrid::insert`], then read with
/// [`SpatialGrid::aggregate`].
#[derive(Debug, Clone)]
pub struct SpatialGrid<'a> {
    bounds: GridBounds,
    bins: BinMatrix<Vec<&'a IncidentRecord>>,
}

impl<'a> SpatialGrid<'a> {
    /// # Errors
    ///
    /// Returns [`GridError::ZeroDimension`] if either dimension is zero.
    pub fn new(bounds: GridBounds, dimensions: GridDimensions) -> Result<Self, GridError> {
        let dimensions = dimensions.validate()?;
        if bounds.min_latitude >= bounds.max_latitude || bounds.min_longitude >= bounds.max_longitude
        {
            log::debug!("Degenerate grid bounds {bounds:?}; collapsed axes map to bin 0");
        }
        Ok(Self {
            bounds,
            bins: BinMatrix::new(dimensions.rows, dimensions.cols),
        })
    }

    /// Bin `(row, col)` for a coordinate.
    #[must_use]
    pub fn locate(&self, latitude: f64, longitude: f64) -> (usize, usize) {
        (
            latitude_to_row(latitude, &self.bounds, self.bins.rows()),
            longitude_to_column(longitude, &self.bounds, self.bins.cols()),
        )
    }

    /// Appends `record` to its bin and returns the bin.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NoCoordinates`] if the record is not located.
    pub fn insert(&mut self, record: &'a IncidentRecord) -> Result<(usize, usize), GridError> {
        let coordinates = record
            .coordinates
            .ok_or_else(|| GridError::NoCoordinates(record.record_id.clone()))?;
        let (row, col) = self.locate(coordinates.latitude, coordinates.longitude);
        self.bins
            .get_mut(row, col)
            .ok_or(GridError::OutOfRange { row, col })?
            .push(record);
        Ok((row, col))
    }

    /// Records in bin `(row, col)` in insertion order.
    #[cfg(test)]
    fn records_at(&self, row: usize, col: usize) -> Option<&[&'a IncidentRecord]> {
        self.bins.get(row, col).map(Vec::as_slice)
    }

    /// Counts per bin per category code. Unknown categories stay in their
    /// bin but are not counted.
    #[must_use]
    pub fn aggregate(&self) -> GridAggregate {
        let mut uncounted = 0;
        let counts = self.bins.map(|records| {
            let mut counts: CategoryCounts = [0; SEVERITY_CODES];
            for record in records {
                match record.severity.code() {
                    Some(code) => counts[code] += 1,
                    None => uncounted += 1,
                }
            }
            counts
        });
        GridAggregate { counts, uncounted }
    }
}

/// Per-category counts of one [`SpatialGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridAggregate {
    counts: BinMatrix<CategoryCounts>,
    uncounted: u32,
}

impl GridAggregate {
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.counts.rows()
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.counts.cols()
    }

    #[cfg(test)]
    fn counts_at(&self, row: usize, col: usize) -> Option<&CategoryCounts> {
        self.counts.get(row, col)
    }

    /// Sum of every counted category in every bin.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().flatten().sum()
    }

    /// Records binned with an unknown category.
    #[must_use]
    pub const fn uncounted(&self) -> u32 {
        self.uncounted
    }

    /// Counts flattened row-major, then by category.
    pub fn flattened(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.values().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use callgrid_incident_models::{Coordinates, Severity};
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn record(
        id: &str,
        occurred_at: NaiveDateTime,
        latitude: f64,
        longitude: f64,
        severity: Severity,
    ) -> IncidentRecord {
        IncidentRecord {
            record_id: id.to_string(),
            occurred_at,
            severity,
            district: None,
            description: "Private Tow".to_string(),
            call_number: None,
            incident_location: None,
            call_location: None,
            coordinates: Some(Coordinates::new(latitude, longitude)),
        }
    }

    fn scenario_bounds() -> GridBounds {
        GridBounds {
            min_latitude: 39.30,
            max_latitude: 39.31,
            min_longitude: -76.61,
            max_longitude: -76.60,
        }
    }

    #[test]
    fn two_by_two_scenario() {
        let first = record("1", at(9, 0), 39.30, -76.60, Severity::Medium);
        let second = record("2", at(9, 30), 39.31, -76.61, Severity::Medium);

        let mut grid = SpatialGrid::new(scenario_bounds(), GridDimensions::new(2, 2)).unwrap();
        assert_eq!(grid.insert(&first).unwrap(), (1, 1));
        assert_eq!(grid.insert(&second).unwrap(), (0, 0));

        let aggregate = grid.aggregate();
        assert_eq!(aggregate.counts_at(1, 1), Some(&[0, 0, 1, 0]));
        assert_eq!(aggregate.counts_at(0, 0), Some(&[0, 0, 1, 0]));
        assert_eq!(aggregate.counts_at(0, 1), Some(&[0, 0, 0, 0]));
        assert_eq!(aggregate.total(), 2);
        assert_eq!(aggregate.flattened().count(), 2 * 2 * SEVERITY_CODES);
    }

    #[test]
    fn unknown_category_is_binned_but_not_counted() {
        let known = record("1", at(9, 0), 39.30, -76.60, Severity::High);
        let unknown = record("2", at(9, 5), 39.30, -76.60, Severity::Unknown);

        let mut grid = SpatialGrid::new(scenario_bounds(), GridDimensions::new(2, 2)).unwrap();
        grid.insert(&known).unwrap();
        grid.insert(&unknown).unwrap();

        assert_eq!(grid.records_at(1, 1).unwrap().len(), 2);
        assert_eq!(grid.records_at(1, 1).unwrap()[1].record_id, "2");
        let aggregate = grid.aggregate();
        assert_eq!(aggregate.total(), 1);
        assert_eq!(aggregate.uncounted(), 1);
    }

    #[test]
    fn rejects_unlocated_record() {
        let mut unlocated = record("7", at(9, 0), 0.0, 0.0, Severity::Low);
        unlocated.coordinates = None;
        let mut grid = SpatialGrid::new(scenario_bounds(), GridDimensions::default()).unwrap();
        assert!(matches!(
            grid.insert(&unlocated),
            Err(GridError::NoCoordinates(id)) if id == "7"
        ));
        let aggregate = grid.aggregate();
        assert_eq!(aggregate.total() + aggregate.uncounted(), 0);
    }

    #[test]
    fn rejects_zero_dimension() {
        assert!(matches!(
            SpatialGrid::new(scenario_bounds(), GridDimensions::new(3, 0)),
            Err(GridError::ZeroDimension { rows: 3, cols: 0 })
        ));
    }

    #[test]
    fn flattened_order_is_row_then_category() {
        let bottom_right = record("1", at(9, 0), 39.30, -76.60, Severity::NonEmergency);
        let top_left = record("2", at(9, 0), 39.31, -76.61, Severity::High);
        let mut grid = SpatialGrid::new(scenario_bounds(), GridDimensions::new(2, 2)).unwrap();
        grid.insert(&bottom_right).unwrap();
        grid.insert(&top_left).unwrap();

        let flat: Vec<u32> = grid.aggregate().flattened().collect();
        assert_eq!(flat[3], 1);
        assert_eq!(flat[3 * SEVERITY_CODES], 1);
        assert_eq!(flat.iter().sum::<u32>(), 2);
    }
}
