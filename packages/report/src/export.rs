//! Filtered record export.

use std::io::Write;
use std::path::Path;

use callgrid_incident_models::IncidentRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ReportError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON array.
    Json,
    /// One flat row per record with a header.
    Csv,
}

impl ExportFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.to_ascii_lowercase().parse().ok())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    record_id: &'a str,
    occurred_at: String,
    severity: &'static str,
    severity_code: Option<usize>,
    district: Option<&'a str>,
    description: &'a str,
    call_number: Option<&'a str>,
    incident_location: Option<&'a str>,
    call_location: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl<'a> From<&'a IncidentRecord> for CsvRow<'a> {
    fn from(record: &'a IncidentRecord) -> Self {
        Self {
            record_id: &record.record_id,
            occurred_at: record.occurred_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            severity: record.severity.label(),
            severity_code: record.severity.code(),
            district: record.district.as_deref(),
            description: &record.description,
            call_number: record.call_number.as_deref(),
            incident_location: record.incident_location.as_deref(),
            call_location: record.call_location.as_deref(),
            latitude: record.latitude(),
            longitude: record.longitude(),
        }
    }
}

/// Writes `records` to `writer`.
///
/// # Errors
///
/// Returns [`ReportError::Json`] or [`ReportError::Csv`] on serialization
/// or write failure.
pub fn write_records<W: Write>(
    records: &[IncidentRecord],
    format: ExportFormat,
    writer: W,
) -> Result<(), ReportError> {
    match format {
        ExportFormat::Json => serde_json::to_writer_pretty(writer, records)?,
        ExportFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            for record in records {
                csv.serialize(CsvRow::from(record))?;
            }
            csv.flush().map_err(csv::Error::from)?;
        }
    }
    Ok(())
}

/// Writes `records` to a new file at `path`.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the file cannot be created, otherwise
/// propagates [`write_records`] errors.
pub fn export_records(
    records: &[IncidentRecord],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = std::fs::File::create(path).map_err(io_err)?;
    write_records(records, format, std::io::BufWriter::new(file))?;
    log::info!(
        "Exported {} records as {format} to {}",
        records.len(),
        path.display()
    );
    Ok(())
}
