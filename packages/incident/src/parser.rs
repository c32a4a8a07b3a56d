//! Multi-line record reconstruction.
//!
//! The export wraps its last column (the call location) in quotes and lets
//! it spill over several physical lines:
//!
//! ```text
//! 1500123,01/15/2019 09:05:00 PM,Medium,ND,SILENT ALARM,P190150123,400 WINSTON AV,"400 WINSTON AV
//! BALTIMORE, MD
//! (39.316763, -76.595269)"
//! ```
//!
//! Parsing is a fold: a [`ParserState`] is threaded through the lines and
//! each line yields the next state plus zero or more [`ParseOutcome`]s. A
//! record that fails to parse becomes [`ParseOutcome::Skip`] and the parser
//! ignores the rest of its lines.

use callgrid_incident_models::{Coordinates, IncidentRecord, Severity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::filter::RecordFilter;
use crate::parsing::{
    CoordinateOrder, clean_field, is_terminated, parse_call_timestamp, parse_coordinate_line,
    strip_terminator,
};

/// Minimum number of comma-separated tokens on a primary line: id,
/// timestamp, priority, district, description.
pub const MIN_PRIMARY_FIELDS: usize = 5;

/// Knobs for line classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    /// Marker token identifying a location continuation line.
    pub city_marker: String,
    /// Order of the numbers on a coordinate line.
    pub coordinate_order: CoordinateOrder,
    /// Lines shorter than this are never primary lines.
    pub min_primary_len: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            city_marker: "BALTIMORE".to_string(),
            coordinate_order: CoordinateOrder::default(),
            min_primary_len: 30,
        }
    }
}

/// How a physical line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace only; ignored.
    Blank,
    /// Starts a record: id, timestamp, priority, description, ...
    Primary,
    /// Continues the free-text call location.
    Location,
    /// `(a, b)` coordinate pair.
    Coordinates,
}

/// Why a logical record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// Primary line with too few tokens.
    #[error("expected at least 5 fields, found {found}")]
    TooFewFields { found: usize },
    /// Timestamp did not match the export format.
    #[error("unparseable timestamp {0:?}")]
    BadTimestamp(String),
    /// Coordinate line did not contain two numbers.
    #[error("unparseable coordinate line {0:?}")]
    BadCoordinates(String),
    /// Continuation line with no primary line before it.
    #[error("continuation line without a record")]
    Orphaned,
    /// A new primary line arrived before the previous record terminated.
    #[error("record {0} was never terminated")]
    Unterminated(String),
}

/// Result of completing a logical record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Record(IncidentRecord),
    Skip(SkipReason),
}

/// Fields of the record under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    record_id: String,
    occurred_at: NaiveDateTime,
    severity: Severity,
    district: Option<String>,
    description: String,
    call_number: Option<String>,
    incident_location: Option<String>,
    call_location: Option<String>,
    coordinates: Option<Coordinates>,
}

impl PartialRecord {
    fn from_primary(line: &str) -> Result<Self, SkipReason> {
        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() < MIN_PRIMARY_FIELDS {
            return Err(SkipReason::TooFewFields {
                found: tokens.len(),
            });
        }

        let occurred_at = parse_call_timestamp(tokens[1])
            .ok_or_else(|| SkipReason::BadTimestamp(tokens[1].trim().to_string()))?;

        let call_location = if tokens.len() > 7 {
            clean_field(strip_terminator(&tokens[7..].join(",")))
        } else {
            None
        };

        Ok(Self {
            record_id: tokens[0].trim().to_string(),
            occurred_at,
            severity: Severity::from_label(tokens[2].trim()),
            district: clean_field(tokens[3]),
            description: tokens[4].trim().to_string(),
            call_number: tokens.get(5).and_then(|t| clean_field(t)),
            incident_location: tokens.get(6).and_then(|t| clean_field(t)),
            call_location,
            coordinates: None,
        })
    }

    fn append_location(&mut self, line: &str) {
        let fragment = strip_terminator(line).trim();
        if fragment.is_empty() {
            return;
        }
        self.call_location = Some(match self.call_location.take() {
            Some(existing) => format!("{existing} {fragment}"),
            None => fragment.to_string(),
        });
    }

    fn finish(self) -> IncidentRecord {
        IncidentRecord {
            record_id: self.record_id,
            occurred_at: self.occurred_at,
            severity: self.severity,
            district: self.district,
            description: self.description,
            call_number: self.call_number,
            incident_location: self.incident_location,
            call_location: self.call_location,
            coordinates: self.coordinates,
        }
    }
}

/// The fold accumulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParserState {
    /// Between records.
    #[default]
    Idle,
    /// Collecting lines for a record.
    Building(Box<PartialRecord>),
    /// The current record failed; ignore lines until it terminates.
    Discarding,
}

impl ParserState {
    /// Feeds one physical line and returns the next state along with any
    /// records completed or dropped by it.
    #[must_use]
    pub fn feed(self, line: &str, options: &ParserOptions) -> (Self, Vec<ParseOutcome>) {
        let mut outcomes = Vec::new();

        let next = match (classify(line, options), self) {
            (LineKind::Blank, state) => return (state, outcomes),
            (LineKind::Primary, previous) => {
                if let Self::Building(partial) = previous {
                    outcomes.push(ParseOutcome::Skip(SkipReason::Unterminated(
                        partial.record_id,
                    )));
                }
                match PartialRecord::from_primary(line) {
                    Ok(partial) => Self::Building(Box::new(partial)),
                    Err(reason) => {
                        outcomes.push(ParseOutcome::Skip(reason));
                        Self::Discarding
                    }
                }
            }
            (LineKind::Location, Self::Building(mut partial)) => {
                partial.append_location(line);
                Self::Building(partial)
            }
            (LineKind::Coordinates, Self::Building(mut partial)) => {
                match parse_coordinate_line(line, options.coordinate_order) {
                    Some(coordinates) => {
                        partial.coordinates = Some(coordinates);
                        Self::Building(partial)
                    }
                    None => {
                        outcomes.push(ParseOutcome::Skip(SkipReason::BadCoordinates(
                            line.trim().to_string(),
                        )));
                        Self::Discarding
                    }
                }
            }
            (LineKind::Location | LineKind::Coordinates, Self::Idle) => {
                outcomes.push(ParseOutcome::Skip(SkipReason::Orphaned));
                Self::Discarding
            }
            (LineKind::Location | LineKind::Coordinates, Self::Discarding) => Self::Discarding,
        };

        if !is_terminated(line) {
            return (next, outcomes);
        }

        if let Self::Building(partial) = next {
            outcomes.push(ParseOutcome::Record(partial.finish()));
        }
        (Self::Idle, outcomes)
    }

    /// Closes the fold at end of input.
    #[must_use]
    pub fn finish(self) -> Option<ParseOutcome> {
        match self {
            Self::Building(partial) => Some(ParseOutcome::Skip(SkipReason::Unterminated(
                partial.record_id,
            ))),
            Self::Idle | Self::Discarding => None,
        }
    }
}

/// Classifies a physical line.
#[must_use]
pub fn classify(line: &str, options: &ParserOptions) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.len() >= options.min_primary_len
        && trimmed.split(',').count() >= MIN_PRIMARY_FIELDS
    {
        LineKind::Primary
    } else if !options.city_marker.is_empty() && trimmed.contains(options.city_marker.as_str()) {
        LineKind::Location
    } else {
        LineKind::Coordinates
    }
}

/// Diagnostic counters for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Physical lines read, header excluded.
    pub lines: u64,
    /// Logical records that parsed successfully.
    pub completed: u64,
    /// Records that passed the filter and were kept.
    pub emitted: u64,
    /// Records that parsed but were rejected by the filter.
    pub filtered_out: u64,
    /// Logical records dropped as malformed.
    pub dropped: u64,
    /// Kept records with an unrecognized priority.
    pub unknown_severity: u64,
    /// Kept records with a zero latitude or longitude.
    pub zero_coordinates: u64,
}

/// Parsed, filtered and time-sorted records.
#[derive(Debug, Clone, Default)]
pub struct ParsedIncidents {
    pub records: Vec<IncidentRecord>,
    pub stats: ParseStats,
}

/// Reconstructs [`IncidentRecord`]s from export lines.
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    options: ParserOptions,
}

impl RecordParser {
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses every line after the header, keeps the records that pass
    /// `filter`, and returns them sorted by timestamp.
    pub fn parse<I, S>(&self, lines: I, filter: Option<&RecordFilter>) -> ParsedIncidents
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = ParseStats::default();
        let mut records = Vec::new();
        let mut state = ParserState::default();
        let mut line_number = 1;

        for line in lines.into_iter().skip(1) {
            line_number += 1;
            stats.lines += 1;
            let (next, outcomes) = state.feed(line.as_ref(), &self.options);
            state = next;
            for outcome in outcomes {
                collect(outcome, line_number, filter, &mut records, &mut stats);
            }
        }
        if let Some(outcome) = state.finish() {
            collect(outcome, line_number, filter, &mut records, &mut stats);
        }

        records.sort_by_key(|r| r.occurred_at);

        ParsedIncidents { records, stats }
    }
}

fn collect(
    outcome: ParseOutcome,
    line_number: usize,
    filter: Option<&RecordFilter>,
    records: &mut Vec<IncidentRecord>,
    stats: &mut ParseStats,
) {
    match outcome {
        ParseOutcome::Record(record) => {
            stats.completed += 1;
            if filter.is_some_and(|f| !f.passes(&record)) {
                stats.filtered_out += 1;
                return;
            }
            stats.emitted += 1;
            if record.severity == Severity::Unknown {
                stats.unknown_severity += 1;
            }
            if record.coordinates.is_some_and(|c| c.has_zero_component()) {
                stats.zero_coordinates += 1;
            }
            records.push(record);
        }
        ParseOutcome::Skip(reason) => {
            stats.dropped += 1;
            log::debug!("Dropped record ending near line {line_number}: {reason}");
        }
    }
}
