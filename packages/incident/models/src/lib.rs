#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record types and call severity codes.
//!
//! An [`IncidentRecord`] is one reconstructed call for service. Records are
//! produced by the tolerant parser in `callgrid_incident` and never mutated
//! afterwards; the filter, the spatial grid and the exporters only read them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Number of severity levels that carry a category code.
pub const SEVERITY_CODES: usize = 4;

/// Call priority as published by the dispatch system.
///
/// The four published levels map to the category codes `0..=3`. Any other
/// label parses to [`Severity::Unknown`], which has no code and is never
/// counted per category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
)]
pub enum Severity {
    /// Code 0
    #[serde(rename = "Non-Emergency")]
    #[strum(serialize = "Non-Emergency")]
    NonEmergency,
    /// Code 1
    #[serde(rename = "Low")]
    #[strum(serialize = "Low")]
    Low,
    /// Code 2
    #[serde(rename = "Medium")]
    #[strum(serialize = "Medium")]
    Medium,
    /// Code 3
    #[serde(rename = "High")]
    #[strum(serialize = "High")]
    High,
    /// Any label outside the published set.
    #[serde(rename = "Unknown")]
    #[strum(disabled)]
    Unknown,
}

impl Severity {
    /// Maps a raw priority label to a severity.
    ///
    /// Matching is exact and case-sensitive. Unrecognized labels map to
    /// [`Severity::Unknown`] rather than failing.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Unknown)
    }

    /// Returns the category code, or `None` for [`Severity::Unknown`].
    #[must_use]
    pub const fn code(self) -> Option<usize> {
        match self {
            Self::NonEmergency => Some(0),
            Self::Low => Some(1),
            Self::Medium => Some(2),
            Self::High => Some(3),
            Self::Unknown => None,
        }
    }

    /// The label as it appears in the source data.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NonEmergency => "Non-Emergency",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns every coded severity, in code order.
    #[must_use]
    pub const fn coded() -> &'static [Self] {
        &[Self::NonEmergency, Self::Low, Self::Medium, Self::High]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether either component is exactly zero.
    ///
    /// Source exports write `0` for a missing geocode, so a zero component
    /// is suspicious. A genuine equator or prime-meridian point looks the
    /// same; callers decide whether to treat it as missing.
    #[must_use]
    pub fn has_zero_component(&self) -> bool {
        self.latitude == 0.0 || self.longitude == 0.0
    }
}

/// One call for service reassembled from the raw export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Record identifier from the export.
    pub record_id: String,
    /// When the call was received (local time, no zone in the source).
    pub occurred_at: NaiveDateTime,
    /// Call priority.
    pub severity: Severity,
    /// Police district code (e.g. "ND", "SW").
    pub district: Option<String>,
    /// Short call description (e.g. "SILENT ALARM", "Private Tow").
    pub description: String,
    /// Dispatch call number.
    pub call_number: Option<String>,
    /// Block-level incident location (e.g. "400 WINSTON AV").
    pub incident_location: Option<String>,
    /// Free-text call location, reassembled across continuation lines.
    pub call_location: Option<String>,
    /// Point location. `None` when the export has no coordinate line.
    pub coordinates: Option<Coordinates>,
}

impl IncidentRecord {
    /// Latitude, if the record is located.
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    /// Longitude, if the record is located.
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_exactly() {
        assert_eq!(Severity::from_label("Non-Emergency"), Severity::NonEmergency);
        assert_eq!(Severity::from_label("Low"), Severity::Low);
        assert_eq!(Severity::from_label("Medium"), Severity::Medium);
        assert_eq!(Severity::from_label("High"), Severity::High);
    }

    #[test]
    fn label_matching_is_case_sensitive() {
        assert_eq!(Severity::from_label("high"), Severity::Unknown);
        assert_eq!(Severity::from_label("HIGH"), Severity::Unknown);
        assert_eq!(Severity::from_label(""), Severity::Unknown);
        assert_eq!(Severity::from_label("Emergency"), Severity::Unknown);
    }

    #[test]
    fn unknown_label_does_not_round_trip() {
        assert_eq!(Severity::from_label("Unknown"), Severity::Unknown);
        assert!(Severity::Unknown.code().is_none());
    }

    #[test]
    fn codes_are_dense_and_ordered() {
        let codes: Vec<usize> = Severity::coded()
            .iter()
            .map(|severity| severity.code().unwrap())
            .collect();
        assert_eq!(codes, (0..SEVERITY_CODES).collect::<Vec<_>>());
    }

    #[test]
    fn zero_component_detection() {
        assert!(Coordinates::new(0.0, -76.6).has_zero_component());
        assert!(Coordinates::new(39.3, 0.0).has_zero_component());
        assert!(!Coordinates::new(39.3, -76.6).has_zero_component());
    }
}
