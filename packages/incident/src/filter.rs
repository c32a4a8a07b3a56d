//! Declarative record filter.
//!
//! A [`RecordFilter`] is a conjunction of independently optional clauses.
//! Every clause defaults to accepting everything, so
//! `RecordFilter::default()` passes every record. Filters deserialize from
//! the `[filter]` table of a pipeline config or a preset file.

use std::collections::BTreeSet;

use callgrid_incident_models::{IncidentRecord, Severity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Inclusive range of degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange {
    pub min: f64,
    pub max: f64,
}

impl CoordinateRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Predicate over [`IncidentRecord`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordFilter {
    /// Accepted severities. `None` accepts all, [`Severity::Unknown`]
    /// included.
    pub severities: Option<BTreeSet<Severity>>,
    /// Exclusive lower time bound.
    pub start: Option<NaiveDateTime>,
    /// Exclusive upper time bound.
    pub end: Option<NaiveDateTime>,
    /// Reject records without coordinates.
    pub require_coordinate: bool,
    /// When coordinates are required, treat a zero latitude or longitude
    /// as missing. The export writes `0` for failed geocodes; this is a
    /// heuristic, not a property of the data.
    pub zero_is_missing: bool,
    /// Inclusive latitude range. Unlocated records fail it.
    pub latitude: Option<CoordinateRange>,
    /// Inclusive longitude range. Unlocated records fail it.
    pub longitude: Option<CoordinateRange>,
    /// When non-empty, the description must be one of these (exact match).
    pub description_whitelist: BTreeSet<String>,
    /// Descriptions that are always rejected (exact match).
    pub description_blacklist: BTreeSet<String>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            severities: None,
            start: None,
            end: None,
            require_coordinate: false,
            zero_is_missing: true,
            latitude: None,
            longitude: None,
            description_whitelist: BTreeSet::new(),
            description_blacklist: BTreeSet::new(),
        }
    }
}

impl RecordFilter {
    /// Restricts accepted severities.
    #[must_use]
    pub fn with_severities(mut self, severities: impl IntoIterator<Item = Severity>) -> Self {
        self.severities = Some(severities.into_iter().collect());
        self
    }

    /// Restricts to records strictly between `start` and `end`.
    #[must_use]
    pub const fn between(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Requires located records.
    #[must_use]
    pub const fn requiring_coordinates(mut self) -> Self {
        self.require_coordinate = true;
        self
    }

    /// Restricts to a bounding box.
    #[must_use]
    pub const fn within(mut self, latitude: CoordinateRange, longitude: CoordinateRange) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Adds descriptions to the whitelist.
    #[must_use]
    pub fn allowing<S: Into<String>>(mut self, descriptions: impl IntoIterator<Item = S>) -> Self {
        self.description_whitelist
            .extend(descriptions.into_iter().map(Into::into));
        self
    }

    /// Adds descriptions to the blacklist.
    #[must_use]
    pub fn denying<S: Into<String>>(mut self, descriptions: impl IntoIterator<Item = S>) -> Self {
        self.description_blacklist
            .extend(descriptions.into_iter().map(Into::into));
        self
    }

    /// Whether `record` satisfies every configured clause.
    #[must_use]
    pub fn passes(&self, record: &IncidentRecord) -> bool {
        self.passes_severity(record)
            && self.passes_time(record)
            && self.passes_coordinates(record)
            && self.passes_description(record)
    }

    fn passes_severity(&self, record: &IncidentRecord) -> bool {
        self.severities
            .as_ref()
            .is_none_or(|accepted| accepted.contains(&record.severity))
    }

    fn passes_time(&self, record: &IncidentRecord) -> bool {
        self.start.is_none_or(|start| record.occurred_at > start)
            && self.end.is_none_or(|end| record.occurred_at < end)
    }

    fn passes_coordinates(&self, record: &IncidentRecord) -> bool {
        if self.require_coordinate {
            match record.coordinates {
                None => return false,
                Some(c) if self.zero_is_missing && c.has_zero_component() => return false,
                Some(_) => {}
            }
        }

        let latitude_ok = self
            .latitude
            .is_none_or(|range| record.latitude().is_some_and(|lat| range.contains(lat)));
        let longitude_ok = self
            .longitude
            .is_none_or(|range| record.longitude().is_some_and(|lng| range.contains(lng)));

        latitude_ok && longitude_ok
    }

    fn passes_description(&self, record: &IncidentRecord) -> bool {
        (self.description_whitelist.is_empty()
            || self.description_whitelist.contains(&record.description))
            && !self.description_blacklist.contains(&record.description)
    }
}
