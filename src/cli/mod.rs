//! CLI command definitions and handlers

mod analyze;
mod init;
mod query;

use crate::config::{load_config, AuditConfig};
use crate::reporters::OutputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub use analyze::AnalyzeOptions;

/// Parse and validate the per-folder sample size (1-100000)
fn parse_sample_size(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("sample size must be at least 1".to_string())
    } else if n > 100_000 {
        Err("sample size cannot exceed 100000".to_string())
    } else {
        Ok(n)
    }
}

/// xray-audit - Chest X-ray dataset inspection
///
/// Counts, validates, weights and samples a labeled image dataset laid out
/// as <root>/<subset>/<class>/<images>.
#[derive(Parser, Debug)]
#[command(name = "xray-audit")]
#[command(
    version,
    about = "Inspect a labeled chest X-ray dataset: structure checks, class statistics, class weights, image properties and charts",
    after_help = "\
Examples:
  xray-audit                                   Analyze the configured dataset
  xray-audit ./chest_xray analyze --no-chart   Analyze a specific folder, skip the chart
  xray-audit ./chest_xray validate --json      Structure check as JSON
  xray-audit stats                             Per-subset class counts
  xray-audit init                              Write a commented xray-audit.toml"
)]
pub struct Cli {
    /// Dataset root folder (default: dataset.path from the config)
    #[arg(global = true)]
    pub dataset: Option<PathBuf>,

    /// Config file (default: ./xray-audit.toml when present)
    #[arg(long, global = true, env = "XRAY_AUDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Disable emoji in output (cleaner for CI logs)
    #[arg(long, global = true)]
    pub no_emoji: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis: validation, statistics, weights, sampling, chart and report
    #[command(after_help = "\
Examples:
  xray-audit analyze                            Analyze the configured dataset
  xray-audit ./data analyze --sample-size 20    Sample 20 images per folder
  xray-audit analyze --format json              Print the report JSON to stdout
  xray-audit analyze --fail-on-invalid          Exit code 1 if folders are missing (CI mode)")]
    Analyze {
        /// Images sampled per subset/class folder (1-100000)
        #[arg(long, value_parser = parse_sample_size)]
        sample_size: Option<usize>,

        /// Folder for the chart and the JSON report
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Skip chart rendering
        #[arg(long)]
        no_chart: bool,

        /// Console output format: text or json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Exit with code 1 when the folder structure is invalid
        #[arg(long)]
        fail_on_invalid: bool,
    },

    /// Check the subset/class folder structure
    Validate {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with code 1 when the folder structure is invalid
        #[arg(long)]
        fail_on_invalid: bool,
    },

    /// Show per-subset class counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show inverse-frequency class weights
    Weights {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sample images and summarize their properties
    Sample {
        /// Images sampled per subset/class folder (1-100000)
        #[arg(long, value_parser = parse_sample_size)]
        sample_size: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a commented xray-audit.toml in the current directory
    Init,

    /// Show version information
    Version,
}

impl Cli {
    /// Load the configuration and apply the dataset argument.
    ///
    /// Returns the config file used, if any.
    pub fn load_config(&self) -> Result<(AuditConfig, Option<PathBuf>)> {
        let (mut config, source) = load_config(self.config.as_deref(), Path::new("."))?;
        if let Some(dataset) = &self.dataset {
            config.dataset.path = dataset.clone();
        }
        Ok((config, source))
    }

    /// Whether this invocation inspects the dataset (and so gets a log file)
    pub fn touches_dataset(&self) -> bool {
        !matches!(self.command, Some(Commands::Init) | Some(Commands::Version))
    }
}

/// Run the CLI with parsed arguments and the loaded configuration
pub fn run(cli: Cli, mut config: AuditConfig) -> Result<()> {
    let no_emoji = cli.no_emoji;
    match cli.command {
        Some(Commands::Init) => init::run(Path::new(".")),

        Some(Commands::Analyze {
            sample_size,
            output_dir,
            no_chart,
            format,
            fail_on_invalid,
        }) => {
            if let Some(n) = sample_size {
                config.sampling.sample_size = n;
            }
            if let Some(dir) = output_dir {
                config.output.output_dir = dir;
            }
            let options = AnalyzeOptions {
                format: format.parse::<OutputFormat>()?,
                no_chart,
                fail_on_invalid,
                no_emoji,
            };
            analyze::run(&config, &options)
        }

        Some(Commands::Validate {
            json,
            fail_on_invalid,
        }) => query::validate(&config, json, fail_on_invalid, no_emoji),

        Some(Commands::Stats { json }) => query::stats(&config, json, no_emoji),

        Some(Commands::Weights { json }) => query::weights(&config, json, no_emoji),

        Some(Commands::Sample { sample_size, json }) => {
            if let Some(n) = sample_size {
                config.sampling.sample_size = n;
            }
            query::sample(&config, json, no_emoji)
        }

        Some(Commands::Version) => {
            println!("xray-audit {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        None => analyze::run(
            &config,
            &AnalyzeOptions {
                no_emoji,
                ..AnalyzeOptions::default()
            },
        ),
    }
}

/// Exit with status 1 when `--fail-on-invalid` is set and the structure is invalid
fn check_structure_gate(fail_on_invalid: bool, structure_valid: bool) {
    if fail_on_invalid && !structure_valid {
        eprintln!("Failing due to --fail-on-invalid: dataset structure is invalid");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_size() {
        assert_eq!(parse_sample_size("1"), Ok(1));
        assert_eq!(parse_sample_size("100000"), Ok(100_000));
        assert!(parse_sample_size("0").is_err());
        assert!(parse_sample_size("100001").is_err());
        assert!(parse_sample_size("ten").is_err());
    }

    #[test]
    fn test_default_command_is_analyze() {
        let cli = Cli::try_parse_from(["xray-audit"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.dataset.is_none());
        assert!(cli.touches_dataset());
    }

    #[test]
    fn test_dataset_argument_before_subcommand() {
        let cli = Cli::try_parse_from(["xray-audit", "data", "stats", "--json"]).unwrap();
        assert_eq!(cli.dataset, Some(PathBuf::from("data")));
        assert!(matches!(cli.command, Some(Commands::Stats { json: true })));
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "xray-audit",
            "analyze",
            "--sample-size",
            "25",
            "--no-chart",
            "--format",
            "json",
            "--no-emoji",
        ])
        .unwrap();
        assert!(cli.no_emoji);
        match cli.command {
            Some(Commands::Analyze {
                sample_size,
                no_chart,
                format,
                fail_on_invalid,
                ..
            }) => {
                assert_eq!(sample_size, Some(25));
                assert!(no_chart);
                assert_eq!(format, "json");
                assert!(!fail_on_invalid);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["xray-audit", "sample", "--sample-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["xray-audit", "analyze", "--format", "sarif"]).is_err());
        assert!(Cli::try_parse_from(["xray-audit", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_init_and_version_skip_log_file() {
        assert!(!Cli::try_parse_from(["xray-audit", "init"]).unwrap().touches_dataset());
        assert!(!Cli::try_parse_from(["xray-audit", "version"]).unwrap().touches_dataset());
        assert!(Cli::try_parse_from(["xray-audit", "validate"]).unwrap().touches_dataset());
    }
}
