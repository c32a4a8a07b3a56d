#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weather station observation and aggregated window types.
//!
//! Observations come from ASOS stations (one reading per line of the
//! mesonet CSV). Windows are fixed-length time buckets summarizing every
//! observation that fell inside them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One reading from one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationObservation {
    /// Station identifier (e.g. `"BWI"`).
    pub station: String,
    /// Observation time (local, as published).
    pub observed_at: NaiveDateTime,
    pub longitude: f64,
    pub latitude: f64,
    /// Air temperature in °F.
    pub temperature_f: f64,
    /// Relative humidity in percent.
    pub relative_humidity: Option<f64>,
    /// Apparent temperature (wind chill / heat index) in °F.
    pub perceived_temperature_f: Option<f64>,
    /// One-hour precipitation in inches.
    pub hourly_precipitation_in: Option<f64>,
}

/// Selects one aggregated weather value.
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
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeatherField {
    Temperature,
    PerceivedTemperature,
    RelativeHumidity,
    HourlyPrecipitation,
}

impl WeatherField {
    /// Every field, in output column order.
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::PerceivedTemperature,
        Self::RelativeHumidity,
        Self::HourlyPrecipitation,
    ];

    /// Accessor reading this field from an observation.
    #[must_use]
    pub fn accessor(self) -> fn(&StationObservation) -> Option<f64> {
        match self {
            Self::Temperature => |o| Some(o.temperature_f),
            Self::PerceivedTemperature => |o| o.perceived_temperature_f,
            Self::RelativeHumidity => |o| o.relative_humidity,
            Self::HourlyPrecipitation => |o| o.hourly_precipitation_in,
        }
    }

    /// Reads this field from an observation.
    #[must_use]
    pub fn read(self, observation: &StationObservation) -> Option<f64> {
        (self.accessor())(observation)
    }
}

/// Aggregated weather over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherWindow {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
    pub temperature_f: Option<f64>,
    pub perceived_temperature_f: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub hourly_precipitation_in: Option<f64>,
}

impl WeatherWindow {
    /// Creates a window with every field unset.
    #[must_use]
    pub const fn empty(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            temperature_f: None,
            perceived_temperature_f: None,
            relative_humidity: None,
            hourly_precipitation_in: None,
        }
    }

    /// Returns the window with `field` set to `value`.
    #[must_use]
    pub const fn with(mut self, field: WeatherField, value: Option<f64>) -> Self {
        match field {
            WeatherField::Temperature => self.temperature_f = value,
            WeatherField::PerceivedTemperature => self.perceived_temperature_f = value,
            WeatherField::RelativeHumidity => self.relative_humidity = value,
            WeatherField::HourlyPrecipitation => self.hourly_precipitation_in = value,
        }
        self
    }

    /// Reads one aggregated field.
    #[must_use]
    pub const fn get(&self, field: WeatherField) -> Option<f64> {
        match field {
            WeatherField::Temperature => self.temperature_f,
            WeatherField::PerceivedTemperature => self.perceived_temperature_f,
            WeatherField::RelativeHumidity => self.relative_humidity,
            WeatherField::HourlyPrecipitation => self.hourly_precipitation_in,
        }
    }

    /// Whether `at` falls in `[start, end)`.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn observation() -> StationObservation {
        StationObservation {
            station: "BWI".to_string(),
            observed_at: at(3),
            longitude: -76.68,
            latitude: 39.17,
            temperature_f: 41.0,
            relative_humidity: Some(80.5),
            perceived_temperature_f: None,
            hourly_precipitation_in: Some(0.02),
        }
    }

    #[test]
    fn accessors_read_matching_fields() {
        let obs = observation();
        assert_eq!(WeatherField::Temperature.read(&obs), Some(41.0));
        assert_eq!(WeatherField::RelativeHumidity.read(&obs), Some(80.5));
        assert_eq!(WeatherField::PerceivedTemperature.read(&obs), None);
        assert_eq!(WeatherField::HourlyPrecipitation.read(&obs), Some(0.02));
    }

    #[test]
    fn window_set_and_get() {
        let mut window = WeatherWindow::empty(at(0), at(6));
        for (i, field) in WeatherField::ALL.into_iter().enumerate() {
            assert!(window.get(field).is_none());
            window = window.with(field, Some(f64::from(u8::try_from(i).unwrap())));
        }
        for (i, field) in WeatherField::ALL.into_iter().enumerate() {
            assert_eq!(window.get(field), Some(f64::from(u8::try_from(i).unwrap())));
        }
    }

    #[test]
    fn window_is_half_open() {
        let window = WeatherWindow::empty(at(0), at(6));
        assert!(window.contains(at(0)));
        assert!(window.contains(at(5)));
        assert!(!window.contains(at(6)));
        assert_eq!(window.end - window.start, Duration::hours(6));
    }

    #[test]
    fn field_names() {
        assert_eq!(WeatherField::HourlyPrecipitation.to_string(), "hourly_precipitation");
        assert_eq!(
            "perceived_temperature".parse::<WeatherField>().unwrap(),
            WeatherField::PerceivedTemperature
        );
    }
}
