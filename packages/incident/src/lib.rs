#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Call-for-service ingestion.
//!
//! Reassembles [`IncidentRecord`]s from the multi-line export with
//! [`parser::RecordParser`], narrows them with a declarative
//! [`filter::RecordFilter`], and ships a handful of named filter presets.

pub mod filter;
pub mod parser;
pub mod parsing;
pub mod presets;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use callgrid_incident_models::{Coordinates, IncidentRecord, Severity};

use crate::filter::RecordFilter;
use crate::parser::{ParsedIncidents, ParserOptions, RecordParser};

/// Errors that can occur while reading an incident export.
#[derive(Debug, thiserror::Error)]
pub enum IncidentError {
    /// I/O error (file open/read).
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File being read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Preset lookup failed.
    #[error("Unknown filter preset: {0}")]
    UnknownPreset(String),
}

/// Reads lines from `reader`, replacing invalid UTF-8 and stripping `\r`.
///
/// # Errors
///
/// Returns the underlying I/O error if a read fails.
pub fn read_lossy_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
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

/// Parses an incident export file.
///
/// The first line is treated as a header and skipped. Records are filtered
/// with `filter` (if any) and returned sorted by timestamp.
///
/// # Errors
///
/// Returns [`IncidentError::Io`] if the file cannot be opened or read.
pub fn read_incident_file(
    path: &Path,
    options: &ParserOptions,
    filter: Option<&RecordFilter>,
) -> Result<ParsedIncidents, IncidentError> {
    let io_err = |source| IncidentError::Io {
        path: path.display().to_string(),
        source,
    };

    log::info!("Parsing incident export {}", path.display());
    let file = File::open(path).map_err(io_err)?;
    let lines = read_lossy_lines(BufReader::new(file)).map_err(io_err)?;

    let parsed = RecordParser::new(options.clone()).parse(lines, filter);
    let stats = &parsed.stats;
    log::info!(
        "Parsed {} lines: {} records kept, {} filtered out, {} dropped as malformed",
        stats.lines,
        stats.emitted,
        stats.filtered_out,
        stats.dropped
    );
    if stats.dropped > 0 {
        log::warn!("{} malformed records were dropped", stats.dropped);
    }

    Ok(parsed)
}

/// Resolves a preset id to its filter.
///
/// # Errors
///
/// Returns [`IncidentError::UnknownPreset`] if no preset has that id.
pub fn preset_filter(id: &str) -> Result<RecordFilter, IncidentError> {
    presets::find_preset(id)
        .map(|p| p.filter)
        .ok_or_else(|| IncidentError::UnknownPreset(id.to_string()))
}
