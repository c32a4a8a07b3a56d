//! Output row rendering.
//!
//! One row per non-empty window:
//!
//! ```text
//! start,end,rows,cols,total,temperature,perceived,humidity,precipitation,c(0,0,0),c(0,0,1),...
//! ```
//!
//! Counts are flattened row-major, then by category. Absent weather values
//! render as the literal `null`.

use callgrid_grid::{GridAggregate, GridBounds};
use callgrid_weather_models::{WeatherField, WeatherWindow};
use chrono::NaiveDateTime;

/// Timestamp layout of the window columns.
pub const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Token written for an absent weather value.
pub const NULL_TOKEN: &str = "null";

/// One rendered period.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub rows: usize,
    pub cols: usize,
    /// Sum of every counted category.
    pub total: u32,
    /// Weather values in [`WeatherField::ALL`] order.
    pub weather: [Option<f64>; 4],
    /// Per-bin per-category counts, row-major then category.
    pub counts: Vec<u32>,
    /// Records binned with an unknown category.
    pub uncounted: u32,
}

impl ReportRow {
    #[must_use]
    pub fn render(&self) -> String {
        let mut fields = vec![
            self.start.format(ROW_TIMESTAMP_FORMAT).to_string(),
            self.end.format(ROW_TIMESTAMP_FORMAT).to_string(),
            self.rows.to_string(),
            self.cols.to_string(),
            self.total.to_string(),
        ];
        fields.extend(
            self.weather
                .iter()
                .map(|value| value.map_or_else(|| NULL_TOKEN.to_string(), format_decimal)),
        );
        fields.extend(self.counts.iter().map(ToString::to_string));
        fields.join(",")
    }
}

/// Decimal rendering shared by rows and the bounds header. Whole values keep
/// their fraction digit (`41.0`, not `41`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

/// Builds [`ReportRow`]s from a window and its grid aggregate.
pub struct ReportAssembler;

impl ReportAssembler {
    #[must_use]
    pub fn assemble(window: &WeatherWindow, aggregate: &GridAggregate) -> ReportRow {
        ReportRow {
            start: window.start,
            end: window.end,
            rows: aggregate.rows(),
            cols: aggregate.cols(),
            total: aggregate.total(),
            weather: WeatherField::ALL.map(|field| window.get(field)),
            counts: aggregate.flattened().collect(),
            uncounted: aggregate.uncounted(),
        }
    }
}

/// `Min Lat,<v>,Max Lat,<v>,Min Long,<v>,Max Long,<v>`
#[must_use]
pub fn render_bounds_header(bounds: &GridBounds) -> String {
    format!(
        "Min Lat,{},Max Lat,{},Min Long,{},Max Long,{}",
        format_decimal(bounds.min_latitude),
        format_decimal(bounds.max_latitude),
        format_decimal(bounds.min_longitude),
        format_decimal(bounds.max_longitude)
    )
}

#[cfg(test)]
mod tests {
    use callgrid_grid::{GridDimensions, SpatialGrid};
    use callgrid_incident_models::{Coordinates, IncidentRecord, Severity};
    use chrono::NaiveDate;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn record(latitude: f64, longitude: f64) -> IncidentRecord {
        IncidentRecord {
            record_id: "1".to_string(),
            occurred_at: at(9, 0),
            severity: Severity::Medium,
            district: None,
            description: "Private Tow".to_string(),
            call_number: None,
            incident_location: None,
            call_location: None,
            coordinates: Some(Coordinates::new(latitude, longitude)),
        }
    }

    fn bounds() -> GridBounds {
        GridBounds {
            min_latitude: 39.3,
            max_latitude: 39.31,
            min_longitude: -76.61,
            max_longitude: -76.6,
        }
    }

    #[test]
    fn renders_scenario_row() {
        let records = [record(39.3, -76.6), record(39.31, -76.61)];
        let mut grid = SpatialGrid::new(bounds(), GridDimensions::new(2, 2)).unwrap();
        for r in &records {
            grid.insert(r).unwrap();
        }
        let window = WeatherWindow::empty(at(6, 0), at(12, 0))
            .with(WeatherField::Temperature, Some(41.5))
            .with(WeatherField::RelativeHumidity, Some(80.0));

        let row = ReportAssembler::assemble(&window, &grid.aggregate());
        assert_eq!(row.total, 2);
        assert_eq!(
            row.render(),
            "2019-01-15T06:00,2019-01-15T12:00,2,2,2,41.5,null,80.0,null,\
             0,0,1,0,0,0,0,0,0,0,0,0,0,0,1,0"
        );
    }

    #[test]
    fn whole_weather_values_keep_fraction_digit() {
        let row = ReportRow {
            start: at(0, 0),
            end: at(6, 0),
            rows: 1,
            cols: 1,
            total: 0,
            weather: [Some(41.0), Some(-3.0), None, Some(0.0)],
            counts: vec![0, 0, 0, 0],
            uncounted: 0,
        };
        assert_eq!(
            row.render(),
            "2019-01-15T00:00,2019-01-15T06:00,1,1,0,41.0,-3.0,null,0.0,0,0,0,0"
        );
        assert_eq!(format_decimal(36.55), "36.55");
    }

    #[test]
    fn bounds_header() {
        assert_eq!(
            render_bounds_header(&bounds()),
            "Min Lat,39.3,Max Lat,39.31,Min Long,-76.61,Max Long,-76.6"
        );
    }
}
