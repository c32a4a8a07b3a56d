//! Fixed-length weather windows.
//!
//! Observations are bucketed into `[start, start + window_hours)` windows
//! on a fixed step grid anchored at the first observation (or midnight of
//! its day). Windows without observations are skipped, never emitted with
//! empty fields.

use std::collections::BTreeMap;

use callgrid_weather_models::{StationObservation, WeatherField, WeatherWindow};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::WeatherError;

/// Longest accepted window, one leap year.
pub const MAX_WINDOW_HOURS: u32 = 24 * 366;

/// How per-station readings are combined into one window value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The first preferred station that reported the field supplies it (the
    /// mean of its readings in the window). Falls back to the mean over
    /// every station when no preferred station reported.
    #[default]
    Preferred,
    /// Mean over every station's readings. Null only when no station at all
    /// reported the field.
    Pooled,
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowOptions {
    /// Window length in hours. Should divide 24.
    pub window_hours: u32,
    /// Anchor the step grid at midnight of the first observation's day.
    pub align_to_midnight: bool,
    /// Stations in order of preference.
    pub station_preference: Vec<String>,
    pub merge_policy: MergePolicy,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            window_hours: 6,
            align_to_midnight: true,
            station_preference: vec!["DMH".to_string(), "BWI".to_string()],
            merge_policy: MergePolicy::default(),
        }
    }
}

/// Builds [`WeatherWindow`]s from station observations.
#[derive(Debug, Clone, Default)]
pub struct WeatherWindowAggregator {
    options: WindowOptions,
}

impl WeatherWindowAggregator {
    #[must_use]
    pub const fn new(options: WindowOptions) -> Self {
        Self { options }
    }

    /// Generates non-empty windows in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::InvalidWindow`] if `window_hours` is zero or
    /// longer than [`MAX_WINDOW_HOURS`].
    pub fn generate(
        &self,
        observations: &[StationObservation],
    ) -> Result<Vec<WeatherWindow>, WeatherError> {
        let hours = self.options.window_hours;
        if hours == 0 || hours > MAX_WINDOW_HOURS {
            return Err(WeatherError::InvalidWindow(hours));
        }
        if 24 % hours != 0 {
            log::warn!("Window size of {hours}h does not divide 24; windows will drift across days");
        }
        let step = Duration::hours(i64::from(hours));

        let mut sorted: Vec<&StationObservation> = observations.iter().collect();
        sorted.sort_by_key(|o| o.observed_at);

        let Some(first) = sorted.first() else {
            return Ok(Vec::new());
        };

        let mut start = if self.options.align_to_midnight {
            first.observed_at.date().and_time(NaiveTime::MIN)
        } else {
            first.observed_at
        };
        let mut end = start + step;

        let mut windows = Vec::new();
        let mut bucket: Vec<&StationObservation> = Vec::new();

        for observation in sorted {
            if observation.observed_at >= end {
                if !bucket.is_empty() {
                    windows.push(self.summarize(start, end, &bucket));
                    bucket.clear();
                }
                while observation.observed_at >= end {
                    start = end;
                    end = start + step;
                }
            }
            bucket.push(observation);
        }
        if !bucket.is_empty() {
            windows.push(self.summarize(start, end, &bucket));
        }

        log::info!(
            "Aggregated {} observations into {} {hours}h weather windows",
            observations.len(),
            windows.len()
        );

        Ok(windows)
    }

    fn summarize(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        bucket: &[&StationObservation],
    ) -> WeatherWindow {
        let mut by_station: BTreeMap<&str, Vec<&StationObservation>> = BTreeMap::new();
        for observation in bucket {
            by_station
                .entry(observation.station.as_str())
                .or_default()
                .push(observation);
        }

        WeatherField::ALL
            .into_iter()
            .fold(WeatherWindow::empty(start, end), |window, field| {
                let value = match self.options.merge_policy {
                    MergePolicy::Preferred => self
                        .preferred_mean(&by_station, field)
                        .or_else(|| mean(bucket.iter().filter_map(|o| field.read(o)))),
                    MergePolicy::Pooled => mean(bucket.iter().filter_map(|o| field.read(o))),
                };
                window.with(field, value)
            })
    }

    /// Mean of the first preferred station that reported `field`.
    fn preferred_mean(
        &self,
        by_station: &BTreeMap<&str, Vec<&StationObservation>>,
        field: WeatherField,
    ) -> Option<f64> {
        self.options
            .station_preference
            .iter()
            .filter_map(|station| by_station.get(station.as_str()))
            .find_map(|readings| mean(readings.iter().filter_map(|o| field.read(o))))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}
