#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weather station ingestion and windowed aggregation.
//!
//! [`observation`] parses the mesonet CSV into [`StationObservation`]s and
//! [`window`] buckets them into fixed-length [`WeatherWindow`]s, merging
//! stations by preference.

pub mod observation;
pub mod window;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use callgrid_weather_models::{StationObservation, WeatherField, WeatherWindow};

use crate::observation::{ParsedObservations, parse_observations};

/// Errors that can occur while reading or aggregating weather data.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// I/O error (file open/read).
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File being read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Window length is zero or longer than [`window::MAX_WINDOW_HOURS`].
    #[error("Invalid window length: {0} hours")]
    InvalidWindow(u32),
}

/// Reads lines from `reader`, replacing invalid UTF-8 and stripping `\r`.
///
/// A line with bad bytes then fails field parsing and is dropped on its own
/// instead of failing the whole read.
fn read_lossy_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    reader
        .split(b'\n')
        .map(|chunk| {
            chunk.map(|bytes| {
                let line = String::from_utf8_lossy(&bytes);
                line.strip_suffix('\r').unwrap_or(&line).to_string()
            })
        })
        .collect()
}

/// Parses a station observation file. The first line is a header.
///
/// # Errors
///
/// Returns [`WeatherError::Io`] if the file cannot be opened or read.
pub fn read_station_file(path: &Path) -> Result<ParsedObservations, WeatherError> {
    let io_err = |source| WeatherError::Io {
        path: path.display().to_string(),
        source,
    };

    log::info!("Parsing weather observations {}", path.display());
    let file = File::open(path).map_err(io_err)?;
    let lines = read_lossy_lines(BufReader::new(file)).map_err(io_err)?;

    let parsed = parse_observations(lines);
    log::info!(
        "Parsed {} observation lines: {} kept, {} dropped",
        parsed.stats.lines,
        parsed.stats.parsed,
        parsed.stats.dropped
    );

    Ok(parsed)
}
