//! End-to-end run: parse, aggregate, bin, render, write.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use callgrid_grid::{GridBounds, GridDimensions, SpatialGrid};
use callgrid_incident::read_incident_file;
use callgrid_incident_models::IncidentRecord;
use callgrid_weather::read_station_file;
use callgrid_weather::window::WeatherWindowAggregator;
use callgrid_weather_models::WeatherWindow;

use crate::ReportError;
use crate::config::PipelineConfig;
use crate::diagnostics::Diagnostics;
use crate::join;
use crate::row::{ReportAssembler, ReportRow, render_bounds_header};

/// Rendered-in-memory result of joining records with windows.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Bounds shared by every period's grid. `None` when nothing was
    /// located.
    pub bounds: Option<GridBounds>,
    pub rows: Vec<ReportRow>,
    /// Records skipped for lack of coordinates.
    pub unlocated: usize,
}

impl Report {
    /// Output lines, bounds header first if requested.
    #[must_use]
    pub fn lines(&self, bounds_header: bool) -> Vec<String> {
        let header = self
            .bounds
            .as_ref()
            .filter(|_| bounds_header)
            .map(render_bounds_header);
        header
            .into_iter()
            .chain(self.rows.iter().map(ReportRow::render))
            .collect()
    }
}

/// Bins `records` per window and renders one row per non-empty window.
///
/// Bounds are computed once over every located record; each window gets a
/// fresh grid over those bounds.
///
/// # Errors
///
/// * [`ReportError::UnmatchedRecord`] if a located record falls in no window
/// * [`ReportError::Grid`] if `dimensions` has a zero side
pub fn build_report(
    records: &[IncidentRecord],
    windows: &[WeatherWindow],
    dimensions: GridDimensions,
) -> Result<Report, ReportError> {
    let dimensions = dimensions.validate()?;

    let mut located: Vec<&IncidentRecord> =
        records.iter().filter(|r| r.coordinates.is_some()).collect();
    located.sort_by_key(|r| r.occurred_at);
    let unlocated = records.len() - located.len();

    let Ok(bounds) = GridBounds::from_records(located.iter().copied()) else {
        log::warn!("No located records to bin");
        return Ok(Report {
            bounds: None,
            rows: Vec::new(),
            unlocated,
        });
    };
    log::debug!("Grid bounds: {bounds:?}");

    let rows = join::assign(&located, windows)?
        .into_iter()
        .map(|batch| -> Result<ReportRow, ReportError> {
            let mut grid = SpatialGrid::new(bounds, dimensions)?;
            for record in batch.records {
                grid.insert(record)?;
            }
            Ok(ReportAssembler::assemble(batch.window, &grid.aggregate()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Report {
        bounds: Some(bounds),
        rows,
        unlocated,
    })
}

/// Writes `lines` to `path`, creating parent directories. Appends when
/// `append` is set, truncates otherwise.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the file cannot be written.
pub fn write_lines(path: &Path, lines: &[String], append: bool) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(io_err)?;

    let mut contents = lines.join("\n");
    contents.push('\n');
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    Ok(())
}

/// Outcome of [`run`].
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub output: PathBuf,
    pub diagnostics: Diagnostics,
}

/// Runs the whole pipeline for `config`.
///
/// Every row is rendered before the output file is opened, so a fatal
/// error leaves the file untouched.
///
/// # Errors
///
/// Propagates input, aggregation, join and write errors.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary, ReportError> {
    let filter = config.resolve_filter()?;
    let incidents = read_incident_file(&config.paths.incidents, &config.parser, Some(&filter))?;
    let observations = read_station_file(&config.paths.weather)?;

    let windows =
        WeatherWindowAggregator::new(config.weather.clone()).generate(&observations.observations)?;
    let report = build_report(&incidents.records, &windows, config.grid)?;

    let diagnostics = Diagnostics::collect(
        incidents.stats,
        observations.stats,
        windows.len(),
        &report,
    );
    diagnostics.log();

    let output = config.output_path();
    let lines = report.lines(config.output.bounds_header);
    if lines.is_empty() {
        log::warn!("Nothing to write to {}", output.display());
    } else {
        write_lines(&output, &lines, config.output.append)?;
        log::info!("Wrote {} lines to {}", lines.len(), output.display());
    }

    Ok(PipelineSummary {
        output,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use callgrid_incident_models::{Coordinates, Severity};
    use callgrid_weather_models::WeatherField;
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(
        id: &str,
        occurred_at: NaiveDateTime,
        coordinates: Option<(f64, f64)>,
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
            coordinates: coordinates.map(|(lat, lon)| Coordinates::new(lat, lon)),
        }
    }

    fn windows() -> Vec<WeatherWindow> {
        vec![
            WeatherWindow::empty(at(1, 0), at(1, 6)).with(WeatherField::Temperature, Some(40.0)),
            WeatherWindow::empty(at(1, 6), at(1, 12)),
            WeatherWindow::empty(at(1, 12), at(1, 18)),
        ]
    }

    #[test]
    fn counts_round_trip() {
        let records = [
            record("1", at(1, 1), Some((39.30, -76.60)), Severity::Low),
            record("2", at(1, 2), Some((39.31, -76.61)), Severity::High),
            record("3", at(1, 3), Some((39.305, -76.605)), Severity::Unknown),
            record("4", at(1, 13), Some((39.30, -76.61)), Severity::Medium),
            record("5", at(1, 14), None, Severity::Medium),
        ];

        let report = build_report(&records, &windows(), GridDimensions::new(3, 3)).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.unlocated, 1);

        let known_located = records
            .iter()
            .filter(|r| r.coordinates.is_some() && r.severity.code().is_some())
            .count();
        let counted: u32 = report.rows.iter().flat_map(|r| r.counts.iter()).sum();
        let totals: u32 = report.rows.iter().map(|r| r.total).sum();
        assert_eq!(counted as usize, known_located);
        assert_eq!(totals as usize, known_located);
        assert_eq!(report.rows[0].uncounted, 1);
    }

    #[test]
    fn rows_follow_window_order() {
        let records = [
            record("late", at(1, 13), Some((39.30, -76.60)), Severity::Low),
            record("early", at(1, 1), Some((39.31, -76.61)), Severity::Low),
        ];
        let report = build_report(&records, &windows(), GridDimensions::new(2, 2)).unwrap();
        assert_eq!(report.rows[0].start, at(1, 0));
        assert_eq!(report.rows[0].weather[0], Some(40.0));
        assert_eq!(report.rows[1].start, at(1, 12));
    }

    #[test]
    fn unmatched_record_fails_build() {
        let records = [record("x", at(2, 1), Some((39.30, -76.60)), Severity::Low)];
        assert!(matches!(
            build_report(&records, &windows(), GridDimensions::new(2, 2)),
            Err(ReportError::UnmatchedRecord { .. })
        ));
    }

    #[test]
    fn nothing_located_is_empty_report() {
        let records = [record("1", at(1, 1), None, Severity::Low)];
        let report = build_report(&records, &windows(), GridDimensions::default()).unwrap();
        assert!(report.rows.is_empty());
        assert!(report.bounds.is_none());
        assert!(report.lines(true).is_empty());
    }

    #[test]
    fn bounds_header_is_first_line() {
        let records = [record("1", at(1, 1), Some((39.30, -76.60)), Severity::Low)];
        let report = build_report(&records, &windows(), GridDimensions::new(1, 1)).unwrap();
        let lines = report.lines(true);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Min Lat,39.3,"));
        assert!(lines[1].starts_with("2019-01-01T00:00,2019-01-01T06:00,1,1,1,40.0,"));
        assert_eq!(report.lines(false).len(), 1);
    }

    #[test]
    fn write_lines_appends() {
        let dir = std::env::temp_dir().join("callgrid_report_append_test");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("nested").join("out.csv");

        write_lines(&path, &["a".to_string()], true).unwrap();
        write_lines(&path, &["b".to_string(), "c".to_string()], true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\nc\n");

        write_lines(&path, &["d".to_string()], false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "d\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn run_end_to_end() {
        let dir = std::env::temp_dir().join("callgrid_pipeline_run_test");
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();

        let incidents = dir.join("calls.csv");
        std::fs::write(
            &incidents,
            "recordId,callDateTime,priority,district,description,callNumber,incidentLocation,location\n\
             1,01/15/2019 09:00:00 AM,Medium,ND,Private Tow,P1,400 WINSTON AV,\"400 WINSTON AV\n\
             BALTIMORE, MD\n\
             (39.30, -76.60)\"\n\
             2,01/15/2019 09:30:00 AM,Medium,ND,Private Tow,P2,500 WINSTON AV,\"500 WINSTON AV\n\
             BALTIMORE, MD\n\
             (39.31, -76.61)\"\n",
        )
        .unwrap();
        let weather = dir.join("weather.csv");
        std::fs::write(
            &weather,
            "station,valid,lon,lat,tmpf,relh,feel,p01i\n\
             BWI,2019-01-15 08:54,-76.68,39.17,41.0,80.0,36.5,null\n",
        )
        .unwrap();

        let mut config = PipelineConfig::default();
        config.paths.incidents = incidents;
        config.paths.weather = weather;
        config.paths.output = Some(dir.join("out.csv"));
        config.grid = GridDimensions::new(2, 2);

        let summary = run(&config).unwrap();
        assert_eq!(summary.diagnostics.rows, 1);
        assert_eq!(summary.diagnostics.total_counted, 2);

        let written = std::fs::read_to_string(dir.join("out.csv")).unwrap();
        assert_eq!(
            written,
            "2019-01-15T06:00,2019-01-15T12:00,2,2,2,41.0,36.5,80.0,null,\
             0,0,1,0,0,0,0,0,0,0,0,0,0,0,1,0\n"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn run_fails_without_touching_output() {
        let dir = std::env::temp_dir().join("callgrid_pipeline_unmatched_test");
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();

        let incidents = dir.join("calls.csv");
        std::fs::write(
            &incidents,
            "header\n\
             1,01/20/2019 09:00:00 AM,Low,ND,Private Tow,P1,400 WINSTON AV,\"400 WINSTON AV\n\
             BALTIMORE, MD\n\
             (39.30, -76.60)\"\n",
        )
        .unwrap();
        let weather = dir.join("weather.csv");
        std::fs::write(
            &weather,
            "station,valid,lon,lat,tmpf\nBWI,2019-01-15 08:54,-76.68,39.17,41.0\n",
        )
        .unwrap();

        let mut config = PipelineConfig::default();
        config.paths.incidents = incidents;
        config.paths.weather = weather;
        config.paths.output = Some(dir.join("out.csv"));

        assert!(matches!(
            run(&config),
            Err(ReportError::UnmatchedRecord { .. })
        ));
        assert!(!dir.join("out.csv").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
