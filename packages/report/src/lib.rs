#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid-by-window summary table.
//!
//! Joins time-sorted incident records against weather windows, bins each
//! window's records on a fresh [`callgrid_grid::SpatialGrid`], and renders
//! one row per non-empty window. [`pipeline::run`] drives the whole thing
//! from a [`config::PipelineConfig`].

pub mod config;
pub mod diagnostics;
pub mod export;
pub mod join;
pub mod pipeline;
pub mod row;

use callgrid_grid::GridError;
use callgrid_incident::IncidentError;
use callgrid_incident_models::IncidentRecord;
use callgrid_weather::WeatherError;
use chrono::NaiveDateTime;

/// Errors that can occur while building or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Incident(#[from] IncidentError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Grid(#[from] GridError),

    /// A record falls outside every weather window. The windows do not
    /// cover the incident time range.
    #[error("Record {record_id} at {occurred_at} falls in no weather window")]
    UnmatchedRecord {
        record_id: String,
        occurred_at: NaiveDateTime,
    },

    /// Config file failed to parse.
    #[error("Invalid config {path}: {source}")]
    Config {
        path: String,
        source: toml::de::Error,
    },

    /// I/O error (file read/write).
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ReportError {
    pub(crate) fn unmatched(record: &IncidentRecord) -> Self {
        Self::UnmatchedRecord {
            record_id: record.record_id.clone(),
            occurred_at: record.occurred_at,
        }
    }
}
