//! `callgrid download`

use std::path::PathBuf;
use std::time::Duration;

use callgrid_cli_utils::{IndicatifProgress, MultiProgress};
use callgrid_source::urls::{
    CRIME_DATA_FILE_NAME, DEFAULT_STATIONS, WEATHER_DATA_FILE_NAME, WEATHER_START, crime_data_url,
    weather_data_url,
};
use chrono::NaiveDate;
use clap::Args;

#[derive(Args)]
pub struct DownloadArgs {
    /// Directory to save both files in
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Comma-separated ASOS station identifiers
    #[arg(long, value_delimiter = ',')]
    stations: Vec<String>,
    /// First day of weather observations
    #[arg(long, default_value = WEATHER_START)]
    start: NaiveDate,
    /// Last day of weather observations (default: today)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Skip the incident export
    #[arg(long)]
    skip_incidents: bool,
    /// Skip the weather observations
    #[arg(long)]
    skip_weather: bool,
    /// Connect timeout in seconds
    #[arg(long, default_value = "100")]
    connect_timeout: u64,
    /// Read timeout in seconds
    #[arg(long, default_value = "1000")]
    read_timeout: u64,
}

pub async fn run(
    multi: &MultiProgress,
    args: &DownloadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let connect_timeout = Duration::from_secs(args.connect_timeout);
    let read_timeout = Duration::from_secs(args.read_timeout);

    if !args.skip_incidents {
        let url = crime_data_url()?;
        let progress = IndicatifProgress::download_bar(multi, "incidents");
        callgrid_source::fetch(
            url.as_str(),
            &args.data_dir.join(CRIME_DATA_FILE_NAME),
            connect_timeout,
            read_timeout,
            &progress,
        )
        .await?;
    }

    if !args.skip_weather {
        let stations: Vec<String> = if args.stations.is_empty() {
            DEFAULT_STATIONS.iter().map(ToString::to_string).collect()
        } else {
            args.stations.clone()
        };
        let end = args.end.unwrap_or_else(|| chrono::Local::now().date_naive());
        if end < args.start {
            return Err(format!("--end {end} is before --start {}", args.start).into());
        }

        log::info!(
            "Weather stations {} from {} to {end}",
            stations.join(","),
            args.start
        );
        let url = weather_data_url(&stations, args.start, end)?;
        let progress = IndicatifProgress::download_bar(multi, "weather");
        callgrid_source::fetch(
            url.as_str(),
            &args.data_dir.join(WEATHER_DATA_FILE_NAME),
            connect_timeout,
            read_timeout,
            &progress,
        )
        .await?;
    }

    Ok(())
}
