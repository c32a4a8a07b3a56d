//! Field-level parsing helpers for the call-for-service export.
//!
//! Timestamp and coordinate parsing shared by the record parser. Every
//! helper returns `None` on malformed input; the caller decides whether that
//! drops the record.

use callgrid_incident_models::Coordinates;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout of the export: `01/15/2019 09:05:00 PM`.
pub const CALL_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Character that closes a logical record.
pub const RECORD_TERMINATOR: char = '"';

/// Order of the two numbers inside a `(a, b)` coordinate line.
///
/// Historical exports have not agreed on this, so it is configuration
/// rather than a constant. The current public export writes latitude
/// first, e.g. `(39.316763, -76.595269)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    /// `(latitude, longitude)`
    #[default]
    LatLong,
    /// `(longitude, latitude)`
    LongLat,
}

impl CoordinateOrder {
    /// Builds coordinates from the two numbers in the order they were read.
    #[must_use]
    pub const fn assemble(self, first: f64, second: f64) -> Coordinates {
        match self {
            Self::LatLong => Coordinates::new(first, second),
            Self::LongLat => Coordinates::new(second, first),
        }
    }
}

/// Parses a call timestamp in [`CALL_TIMESTAMP_FORMAT`].
#[must_use]
pub fn parse_call_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), CALL_TIMESTAMP_FORMAT).ok()
}

/// Whether `line` closes the record under construction.
#[must_use]
pub fn is_terminated(line: &str) -> bool {
    line.trim_end().ends_with(RECORD_TERMINATOR)
}

/// Removes one trailing [`RECORD_TERMINATOR`], if present.
#[must_use]
pub fn strip_terminator(s: &str) -> &str {
    let trimmed = s.trim_end();
    trimmed.strip_suffix(RECORD_TERMINATOR).unwrap_or(trimmed)
}

/// Parses a coordinate line such as `(39.316763, -76.595269)"`.
///
/// The first number is the text between the opening parenthesis and the
/// first comma, the second the text between that comma and the closing
/// parenthesis. Returns `None` if either is missing, unparseable, or not
/// finite.
#[must_use]
pub fn parse_coordinate_line(line: &str, order: CoordinateOrder) -> Option<Coordinates> {
    let body = strip_terminator(line).trim_start().strip_prefix('(')?;
    let (first, rest) = body.split_once(',')?;
    let (second, _) = rest.split_once(')')?;

    let first = first.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let second = second.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;

    Some(order.assemble(first, second))
}

/// Trims whitespace and stray quotes, mapping an empty result to `None`.
#[must_use]
pub fn clean_field(s: &str) -> Option<String> {
    let cleaned = s.trim().trim_matches(RECORD_TERMINATOR).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
