//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::ingest::DumpFormat;

/// Timeloc - where and when the world's knowledge sits
///
/// Reads a Wikidata or Freebase dump, fills in missing dates and longitudes
/// from linked entities and draws a longitude-by-time density map.
///
/// Examples:
///   timeloc wikidata-simple-statements.tsv
///   timeloc freebase-rdf-latest --source freebase -o maps/freebase
///   timeloc dump.tsv --initial-weight 256 --summary run.json --summary-format json
///   timeloc --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dump file to read
    ///
    /// Not required when using --init-config.
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Format of the dump
    #[arg(short, long, default_value = "wikidata", value_name = "FORMAT")]
    pub source: DumpFormat,

    /// Output prefix for the images
    ///
    /// Writes `<PREFIX>.png` and `<PREFIX>-grid.png`. Defaults to the
    /// format name.
    #[arg(short, long, value_name = "PREFIX")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .timeloc.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Confidence weight given to observed values
    ///
    /// Each neighbor receives half of it; sources whose share would be 1 or
    /// less do not contribute.
    #[arg(long, value_name = "WEIGHT", env = "TIMELOC_INITIAL_WEIGHT")]
    pub initial_weight: Option<u32>,

    /// Exponent of the time axis
    #[arg(long, value_name = "EXP")]
    pub time_exponent: Option<i32>,

    /// Write a run summary to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Summary format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub summary_format: OutputFormat,

    /// Do not show a progress spinner while reading
    #[arg(long)]
    pub no_progress: bool,

    /// Generate a default .timeloc.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        match self.input {
            Some(ref input) if !input.is_file() => {
                return Err(format!("Input dump does not exist: {}", input.display()));
            }
            None => return Err("An input dump is required".to_string()),
            _ => {}
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(exponent) = self.time_exponent {
            if exponent < 1 {
                return Err("Time exponent must be at least 1".to_string());
            }
        }

        if let Some(ref prefix) = self.output {
            if prefix.as_os_str().is_empty() {
                return Err("Output prefix must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(input: PathBuf) -> Args {
        Args {
            input: Some(input),
            source: DumpFormat::Wikidata,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            initial_weight: None,
            time_exponent: None,
            summary: None,
            summary_format: OutputFormat::Markdown,
            no_progress: false,
            init_config: false,
        }
    }

    fn dump_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn test_validation_accepts_existing_dump() {
        let dump = dump_file();
        assert!(make_args(dump.path().to_path_buf()).validate().is_ok());
    }

    #[test]
    fn test_validation_missing_dump() {
        let dir = tempfile::tempdir().unwrap();
        let args = make_args(dir.path().join("absent.tsv"));
        assert!(args.validate().is_err());

        // a directory is not a dump
        let args = make_args(dir.path().to_path_buf());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_init_config_needs_no_input() {
        let mut args = make_args(PathBuf::new());
        args.input = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let dump = dump_file();
        let mut args = make_args(dump.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_time_exponent() {
        let dump = dump_file();
        let mut args = make_args(dump.path().to_path_buf());
        args.time_exponent = Some(0);
        assert!(args.validate().is_err());

        args.time_exponent = Some(1);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "timeloc",
            "dump.nt",
            "--source",
            "freebase",
            "-o",
            "maps/fb",
            "--initial-weight",
            "64",
            "--summary-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("dump.nt")));
        assert_eq!(args.source, DumpFormat::Freebase);
        assert_eq!(args.output, Some(PathBuf::from("maps/fb")));
        assert_eq!(args.initial_weight, Some(64));
        assert_eq!(args.summary_format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_requires_input() {
        assert!(Args::try_parse_from(["timeloc"]).is_err());
        assert!(Args::try_parse_from(["timeloc", "--init-config"]).is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(PathBuf::from("dump.tsv"));
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
