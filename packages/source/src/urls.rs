//! Public dataset URLs.

use chrono::{Datelike as _, NaiveDate};
use reqwest::Url;

use crate::SourceError;

/// Baltimore 911 calls for service, full CSV export.
pub const CRIME_DATA_BASE_URL: &str = "https://data.baltimorecity.gov/api/views/xviu-ezkt/rows.csv";

/// Iowa Environmental Mesonet ASOS download endpoint.
pub const WEATHER_DATA_BASE_URL: &str = "https://mesonet.agron.iastate.edu/cgi-bin/request/asos.py";

/// Default stations: Downtown/Inner Harbor and BWI airport.
pub const DEFAULT_STATIONS: &[&str] = &["DMH", "BWI"];

/// Temperature, relative humidity, feels-like, one-hour precipitation.
pub const WEATHER_FIELDS: &[&str] = &["tmpf", "relh", "feel", "p01i"];

/// First day of the published call data.
pub const WEATHER_START: &str = "2013-06-30";

/// Default file names under the data directory.
pub const CRIME_DATA_FILE_NAME: &str = "911_Police_Calls_for_Service.csv";
pub const WEATHER_DATA_FILE_NAME: &str = "weather.csv";

fn parse(base: &str) -> Result<Url, SourceError> {
    Url::parse(base).map_err(|e| SourceError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })
}

/// URL of the full incident export.
///
/// # Errors
///
/// Returns [`SourceError::InvalidUrl`] if the base URL does not parse.
pub fn crime_data_url() -> Result<Url, SourceError> {
    let mut url = parse(CRIME_DATA_BASE_URL)?;
    url.query_pairs_mut().append_pair("accessType", "DOWNLOAD");
    Ok(url)
}

/// URL of the ASOS observations for `stations` between `start` and `end`
/// inclusive, as comma-only CSV with coordinates and `null` for missing
/// values.
///
/// # Errors
///
/// Returns [`SourceError::InvalidUrl`] if the base URL does not parse.
pub fn weather_data_url<S: AsRef<str>>(
    stations: &[S],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Url, SourceError> {
    let mut url = parse(WEATHER_DATA_BASE_URL)?;
    {
        let mut query = url.query_pairs_mut();
        for station in stations {
            query.append_pair("station", station.as_ref());
        }
        for field in WEATHER_FIELDS {
            query.append_pair("data", field);
        }
        query
            .append_pair("year1", &start.year().to_string())
            .append_pair("month1", &start.month().to_string())
            .append_pair("day1", &start.day().to_string())
            .append_pair("year2", &end.year().to_string())
            .append_pair("month2", &end.month().to_string())
            .append_pair("day2", &end.day().to_string())
            .append_pair("tz", "America/New_York")
            .append_pair("format", "onlycomma")
            .append_pair("latlon", "yes")
            .append_pair("missing", "null")
            .append_pair("trace", "null")
            .append_pair("direct", "no")
            .append_pair("report_type", "1")
            .append_pair("report_type", "2");
    }
    Ok(url)
}
