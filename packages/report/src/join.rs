//! Assignment of records to weather windows.

use callgrid_incident_models::IncidentRecord;
use callgrid_weather_models::WeatherWindow;

use crate::ReportError;

/// The records falling in one window.
#[derive(Debug, Clone)]
pub struct WindowBatch<'r, 'w> {
    pub window: &'w WeatherWindow,
    pub records: Vec<&'r IncidentRecord>,
}

/// Splits time-sorted `records` over chronological, non-overlapping
/// `windows`. A record belongs to the window with
/// `start <= occurred_at < end`. Windows without records are left out.
///
/// # Errors
///
/// Returns [`ReportError::UnmatchedRecord`] for the first record that falls
/// in no window.
pub fn assign<'r, 'w>(
    records: &[&'r IncidentRecord],
    windows: &'w [WeatherWindow],
) -> Result<Vec<WindowBatch<'r, 'w>>, ReportError> {
    let mut remaining = records.iter().copied().peekable();
    let mut batches = Vec::new();

    for window in windows {
        let mut batch = Vec::new();
        while let Some(record) = remaining.next_if(|r| r.occurred_at < window.end) {
            if !window.contains(record.occurred_at) {
                return Err(ReportError::unmatched(record));
            }
            batch.push(record);
        }
        if !batch.is_empty() {
            batches.push(WindowBatch {
                window,
                records: batch,
            });
        }
    }

    match remaining.next() {
        Some(record) => Err(ReportError::unmatched(record)),
        None => Ok(batches),
    }
}
