//! Pipeline configuration (`callgrid.toml`).
//!
//! ```toml
//! preset = "tow"
//!
//! [paths]
//! incidents = "data/911_Police_Calls_for_Service.csv"
//! weather = "data/weather.csv"
//!
//! [grid]
//! rows = 15
//! cols = 15
//!
//! [weather]
//! window_hours = 6
//! station_preference = ["DMH", "BWI"]
//! ```
//!
//! Every table is optional and falls back to its defaults.

use std::path::{Path, PathBuf};

use callgrid_grid::GridDimensions;
use callgrid_incident::filter::RecordFilter;
use callgrid_incident::parser::ParserOptions;
use callgrid_weather::window::WindowOptions;
use serde::{Deserialize, Serialize};

use crate::ReportError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "callgrid.toml";

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Calls-for-service export.
    pub incidents: PathBuf,
    /// Station observation CSV.
    pub weather: PathBuf,
    /// Output table. Derived from the grid size and filter when unset.
    pub output: Option<PathBuf>,
    /// Directory for derived output names and downloads.
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            incidents: PathBuf::from("data/911_Police_Calls_for_Service.csv"),
            weather: PathBuf::from("data/weather.csv"),
            output: None,
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Output table options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputOptions {
    /// Write a bounds line before the rows.
    pub bounds_header: bool,
    /// Append to an existing file instead of replacing it.
    pub append: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            bounds_header: false,
            append: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Named filter preset. Replaces `[filter]` when set.
    pub preset: Option<String>,
    pub paths: PathsConfig,
    pub parser: ParserOptions,
    pub filter: RecordFilter,
    pub grid: GridDimensions,
    pub weather: WindowOptions,
    pub output: OutputOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preset: None,
            paths: PathsConfig::default(),
            parser: ParserOptions::default(),
            filter: RecordFilter::default().requiring_coordinates(),
            grid: GridDimensions::default(),
            weather: WindowOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Config`] if the document is malformed or has
    /// unknown keys.
    pub fn from_toml_str(toml_str: &str, origin: &str) -> Result<Self, ReportError> {
        toml::from_str(toml_str).map_err(|source| ReportError::Config {
            path: origin.to_string(),
            source,
        })
    }

    /// Loads `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if the file cannot be read or
    /// [`ReportError::Config`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents, &path.display().to_string())?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else the defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::load`] errors.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ReportError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// The filter in effect: the preset's if one is named, else `[filter]`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Incident`] if the preset does not exist.
    pub fn resolve_filter(&self) -> Result<RecordFilter, ReportError> {
        match &self.preset {
            Some(id) => Ok(callgrid_incident::preset_filter(id)?),
            None => Ok(self.filter.clone()),
        }
    }

    /// `[paths] output`, or `<data_dir>/Formatted_<rows>x<cols>_<label>_Data.csv`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.paths.output.clone().unwrap_or_else(|| {
            let label = self.preset.as_deref().unwrap_or("All");
            self.paths.data_dir.join(format!(
                "Formatted_{}x{}_{label}_Data.csv",
                self.grid.rows, self.grid.cols
            ))
        })
    }
}
