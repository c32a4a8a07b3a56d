//! Run totals for spotting silent drops.

use callgrid_incident::parser::ParseStats;
use callgrid_weather::observation::ObservationStats;
use serde::Serialize;

use crate::pipeline::Report;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub incidents: ParseStats,
    pub observations: ObservationStats,
    pub weather_windows: usize,
    /// Kept records without coordinates, excluded from binning.
    pub unlocated: usize,
    pub rows: usize,
    /// Sum of every row's total.
    pub total_counted: u64,
    /// Binned records with an unknown category.
    pub uncounted: u64,
}

impl Diagnostics {
    #[must_use]
    pub fn collect(
        incidents: ParseStats,
        observations: ObservationStats,
        weather_windows: usize,
        report: &Report,
    ) -> Self {
        Self {
            incidents,
            observations,
            weather_windows,
            unlocated: report.unlocated,
            rows: report.rows.len(),
            total_counted: report.rows.iter().map(|r| u64::from(r.total)).sum(),
            uncounted: report.rows.iter().map(|r| u64::from(r.uncounted)).sum(),
        }
    }

    pub fn log(&self) {
        let incidents = &self.incidents;
        log::info!(
            "Incidents: {} lines, {} parsed, {} kept, {} filtered out, {} malformed",
            incidents.lines,
            incidents.completed,
            incidents.emitted,
            incidents.filtered_out,
            incidents.dropped
        );
        log::info!(
            "Kept records with zero coordinates: {}, unknown category: {}",
            incidents.zero_coordinates,
            incidents.unknown_severity
        );
        log::info!(
            "Observations: {} parsed, {} dropped, {} weather windows",
            self.observations.parsed,
            self.observations.dropped,
            self.weather_windows
        );
        log::info!(
            "Rows written: {}, total counted: {}, uncounted (unknown category): {}",
            self.rows,
            self.total_counted,
            self.uncounted
        );
        if self.unlocated > 0 {
            log::warn!(
                "{} kept records had no coordinates and were not binned",
                self.unlocated
            );
        }
        let binned = self.total_counted + self.uncounted;
        let located = self.incidents.emitted.saturating_sub(self.unlocated as u64);
        if binned != located {
            log::warn!("Binned {binned} records but kept {located} located records");
        }
    }
}
