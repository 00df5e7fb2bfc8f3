//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.timeloc.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".timeloc.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Propagation settings.
    #[serde(default)]
    pub propagation: PropagationConfig,

    /// Rendering settings.
    #[serde(default)]
    pub render: RenderConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Prefix of the output images. Defaults to the dump format name.
    #[serde(default)]
    pub output_prefix: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Value propagation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Confidence given to an observed value; halved on the first hop.
    #[serde(default = "default_initial_weight")]
    pub initial_weight: u32,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            initial_weight: default_initial_weight(),
        }
    }
}

fn default_initial_weight() -> u32 {
    1024
}

/// Image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// First year on the time axis.
    #[serde(default = "default_start_year")]
    pub start_year: i64,

    /// Last year on the time axis.
    #[serde(default = "default_end_year")]
    pub end_year: i64,

    /// Image height in pixels.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Power applied to the time axis.
    #[serde(default = "default_time_exponent")]
    pub time_exponent: i32,

    /// Pixels per degree of longitude.
    #[serde(default = "default_longitude_resolution")]
    pub longitude_resolution: u32,

    /// Blue-channel increment per entity in a pixel.
    #[serde(default = "default_density_step")]
    pub density_step: u32,

    /// Degrees between vertical gridlines.
    #[serde(default = "default_longitude_grid_step")]
    pub longitude_grid_step: u32,

    /// First year with a horizontal gridline.
    #[serde(default)]
    pub grid_first_year: i64,

    /// Last year with a horizontal gridline.
    #[serde(default = "default_grid_last_year")]
    pub grid_last_year: i64,

    /// Years between horizontal gridlines.
    #[serde(default = "default_grid_year_step")]
    pub grid_year_step: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            rows: default_rows(),
            time_exponent: default_time_exponent(),
            longitude_resolution: default_longitude_resolution(),
            density_step: default_density_step(),
            longitude_grid_step: default_longitude_grid_step(),
            grid_first_year: 0,
            grid_last_year: default_grid_last_year(),
            grid_year_step: default_grid_year_step(),
        }
    }
}

fn default_start_year() -> i64 {
    -5000
}

fn default_end_year() -> i64 {
    2015
}

fn default_rows() -> usize {
    2001
}

fn default_time_exponent() -> i32 {
    8
}

fn default_longitude_resolution() -> u32 {
    10
}

fn default_density_step() -> u32 {
    10
}

fn default_longitude_grid_step() -> u32 {
    10
}

fn default_grid_last_year() -> i64 {
    2000
}

fn default_grid_year_step() -> u32 {
    100
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref prefix) = args.output {
            self.general.output_prefix = Some(prefix.display().to_string());
        }

        if let Some(weight) = args.initial_weight {
            self.propagation.initial_weight = weight;
        }

        if let Some(exponent) = args.time_exponent {
            self.render.time_exponent = exponent;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
