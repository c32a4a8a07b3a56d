//! ASOS station observation parsing.
//!
//! The mesonet CSV (`format=onlycomma`, `latlon=yes`, `missing=null`) has one
//! observation per line:
//!
//! ```text
//! station,valid,lon,lat,tmpf,relh,feel,p01i
//! BWI,2019-01-15 09:54,-76.6840,39.1733,41.00,80.52,36.81,0.00
//! ```
//!
//! Temperature is required. The three trailing fields are parsed
//! independently and become `None` when absent or unparseable.

use callgrid_weather_models::StationObservation;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Timestamp layout of the mesonet export.
pub const STATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Station, timestamp, longitude, latitude, temperature.
pub const MIN_STATION_FIELDS: usize = 5;

/// Why an observation line was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservationSkip {
    #[error("expected at least 5 fields, found {found}")]
    TooFewFields { found: usize },
    #[error("empty station identifier")]
    MissingStation,
    #[error("unparseable timestamp {0:?}")]
    BadTimestamp(String),
    #[error("unparseable {field} {value:?}")]
    BadNumber { field: &'static str, value: String },
}

/// Diagnostic counters for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ObservationStats {
    /// Lines read, header excluded.
    pub lines: u64,
    pub parsed: u64,
    pub dropped: u64,
}

/// Parsed observations in file order.
#[derive(Debug, Clone, Default)]
pub struct ParsedObservations {
    pub observations: Vec<StationObservation>,
    pub stats: ObservationStats,
}

fn required(tokens: &[&str], index: usize, field: &'static str) -> Result<f64, ObservationSkip> {
    let raw = tokens[index].trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ObservationSkip::BadNumber {
            field,
            value: raw.to_string(),
        })
}

fn optional(tokens: &[&str], index: usize) -> Option<f64> {
    tokens
        .get(index)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses one observation line.
///
/// # Errors
///
/// Returns an [`ObservationSkip`] if a required field is missing or
/// malformed.
pub fn parse_observation_line(line: &str) -> Result<StationObservation, ObservationSkip> {
    let tokens: Vec<&str> = line.split(',').collect();
    if tokens.len() < MIN_STATION_FIELDS {
        return Err(ObservationSkip::TooFewFields {
            found: tokens.len(),
        });
    }

    let station = tokens[0].trim();
    if station.is_empty() {
        return Err(ObservationSkip::MissingStation);
    }

    let observed_at = NaiveDateTime::parse_from_str(tokens[1].trim(), STATION_TIMESTAMP_FORMAT)
        .map_err(|_| ObservationSkip::BadTimestamp(tokens[1].trim().to_string()))?;

    Ok(StationObservation {
        station: station.to_string(),
        observed_at,
        longitude: required(&tokens, 2, "longitude")?,
        latitude: required(&tokens, 3, "latitude")?,
        temperature_f: required(&tokens, 4, "temperature")?,
        relative_humidity: optional(&tokens, 5),
        perceived_temperature_f: optional(&tokens, 6),
        hourly_precipitation_in: optional(&tokens, 7),
    })
}

/// Parses every line after the header. Malformed lines are dropped and
/// counted.
pub fn parse_observations<I, S>(lines: I) -> ParsedObservations
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedObservations::default();

    for (index, line) in lines.into_iter().enumerate().skip(1) {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        parsed.stats.lines += 1;
        match parse_observation_line(line) {
            Ok(observation) => {
                parsed.stats.parsed += 1;
                parsed.observations.push(observation);
            }
            Err(reason) => {
                parsed.stats.dropped += 1;
                log::debug!("Dropped observation on line {}: {reason}", index + 1);
            }
        }
    }

    parsed
}
