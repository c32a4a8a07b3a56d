//! `callgrid format` and `callgrid export`

use std::path::PathBuf;

use callgrid_cli_utils::{MultiProgress, stage_spinner};
use callgrid_grid::GridDimensions;
use callgrid_incident::read_incident_file;
use callgrid_report::config::PipelineConfig;
use callgrid_report::export::{ExportFormat, export_records};
use callgrid_report::pipeline;
use callgrid_weather::window::MergePolicy;
use clap::Args;

/// Options shared by every command that reads the config file.
#[derive(Args)]
pub struct ConfigArgs {
    /// Config file (default: `callgrid.toml` if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Filter preset id (see `callgrid presets`); replaces `[filter]`
    #[arg(long)]
    preset: Option<String>,
    /// Incident export to read
    #[arg(long)]
    incidents: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let mut config = PipelineConfig::load_or_default(self.config.as_deref())?;
        if let Some(preset) = &self.preset {
            config.preset = Some(preset.clone());
        }
        if let Some(incidents) = &self.incidents {
            config.paths.incidents.clone_from(incidents);
        }
        Ok(config)
    }
}

#[derive(Args)]
pub struct FormatArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Station observation CSV to read
    #[arg(long)]
    weather: Option<PathBuf>,
    /// Output table (default: derived from grid size and preset)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,
    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,
    /// Weather window length in hours
    #[arg(long)]
    window_hours: Option<u32>,
    /// Start windows at the first observation instead of midnight
    #[arg(long)]
    no_align: bool,
    /// Average all stations instead of preferring stations in order
    #[arg(long)]
    pooled: bool,
    /// Write a bounds line before the rows
    #[arg(long)]
    bounds_header: bool,
    /// Replace the output file instead of appending to it
    #[arg(long)]
    overwrite: bool,
}

impl FormatArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(weather) = &self.weather {
            config.paths.weather.clone_from(weather);
        }
        if let Some(output) = &self.output {
            config.paths.output = Some(output.clone());
        }
        config.grid = GridDimensions::new(
            self.rows.unwrap_or(config.grid.rows),
            self.cols.unwrap_or(config.grid.cols),
        );
        if let Some(hours) = self.window_hours {
            config.weather.window_hours = hours;
        }
        if self.no_align {
            config.weather.align_to_midnight = false;
        }
        if self.pooled {
            config.weather.merge_policy = MergePolicy::Pooled;
        }
        if self.bounds_header {
            config.output.bounds_header = true;
        }
        if self.overwrite {
            config.output.append = false;
        }
    }
}

pub fn run_format(
    multi: &MultiProgress,
    args: &FormatArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = args.config.load()?;
    args.apply(&mut config);
    log::debug!("Effective config: {config:?}");
    if let Some(preset) = &config.preset {
        log::info!("Using filter preset '{preset}'");
    }

    let spinner = stage_spinner(multi, "Formatting");
    let summary = pipeline::run(&config);
    spinner.finish_and_clear();
    let summary = summary?;

    println!(
        "Wrote {} rows ({} incidents counted) to {}",
        summary.diagnostics.rows,
        summary.diagnostics.total_counted,
        summary.output.display()
    );
    Ok(())
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// File to write
    #[arg(long)]
    output: PathBuf,
    /// `json` or `csv` (default: from the output extension, else json)
    #[arg(long)]
    format: Option<ExportFormat>,
}

pub fn run_export(args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config.load()?;
    let filter = config.resolve_filter()?;
    let parsed = read_incident_file(&config.paths.incidents, &config.parser, Some(&filter))?;

    let format = args
        .format
        .or_else(|| ExportFormat::from_path(&args.output))
        .unwrap_or(ExportFormat::Json);
    export_records(&parsed.records, format, &args.output)?;

    println!(
        "Exported {} records to {}",
        parsed.records.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct ExportCli {
        #[command(flatten)]
        args: ExportArgs,
    }

    #[test]
    fn parses_export_format_flag() {
        let cli =
            ExportCli::try_parse_from(["export", "--output", "out.json", "--format", "csv"])
                .unwrap();
        assert_eq!(cli.args.format, Some(ExportFormat::Csv));
        assert_eq!(cli.args.output, PathBuf::from("out.json"));
    }

    #[test]
    fn rejects_unknown_export_format() {
        assert!(
            ExportCli::try_parse_from(["export", "--output", "out.json", "--format", "xml"])
                .is_err()
        );
    }

    #[test]
    fn format_flags_override_config() {
        #[derive(Parser)]
        struct FormatCli {
            #[command(flatten)]
            args: FormatArgs,
        }

        let cli = FormatCli::try_parse_from([
            "format",
            "--rows",
            "4",
            "--window-hours",
            "12",
            "--pooled",
            "--overwrite",
        ])
        .unwrap();
        let mut config = PipelineConfig::default();
        cli.args.apply(&mut config);

        assert_eq!(config.grid.rows, 4);
        assert_eq!(config.grid.cols, PipelineConfig::default().grid.cols);
        assert_eq!(config.weather.window_hours, 12);
        assert_eq!(config.weather.merge_policy, MergePolicy::Pooled);
        assert!(!config.output.append);
    }
}
