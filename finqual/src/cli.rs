//! Command-line definitions and configuration assembly.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use finqual_core::error::FinqualError;
use finqual_core::quality::{Dimension, QualityConfig};
use finqual_core::{LogFormat, Result};
use tracing::warn;

#[derive(Parser)]
#[command(name = "finqual")]
#[command(about = "Data quality checker for financial company records")]
#[command(version)]
#[command(long_about = "
finqual - Data quality checks for company-period records

Every record is checked along four dimensions:
- Completeness: critical columns that are empty, blank or NaN
- Consistency: company name casing, status values, currency codes
- Validity: year ranges, revenue range, date formats, industry codes
- Uniqueness: records sharing (providerkey, timevalue, fiscalperiodend)

EXAMPLES:
  finqual check --input sample25.csv
  finqual check -i sample25.json -o checked.csv --report quality.html
  finqual check -i sample25.csv --quality-threshold completeness:0.9,validity:0.8
  finqual catalog --config rules.json
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a record export and write flags and a summary
    Check(CheckArgs),
    /// Print the effective configuration and catalog as JSON
    Catalog(CatalogArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Input file (.json or .csv)
    #[arg(short, long, help = "Input file with one record per row (.json or .csv)")]
    pub input: PathBuf,

    /// Annotated output path
    #[arg(
        short,
        long,
        help = "Annotated output (.json or .csv), defaults to <input>_checked.<ext>"
    )]
    pub output: Option<PathBuf>,

    /// Summary output path
    #[arg(
        short,
        long,
        help = "Summary JSON path, defaults to <input>_quality_summary.json"
    )]
    pub summary: Option<PathBuf>,

    /// HTML report path
    #[arg(long, help = "Also render an HTML report to this path")]
    pub report: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, help = "JSON file with thresholds and catalog rules")]
    pub config: Option<PathBuf>,

    /// Quality threshold overrides (format: metric:value)
    #[arg(
        long,
        value_delimiter = ',',
        help = "Quality thresholds (completeness:0.95,consistency:0.9,validity:0.9,uniqueness:0.98)"
    )]
    pub quality_threshold: Vec<String>,

    /// Enable compression
    #[arg(long, help = "Compress annotated and summary outputs using Zstandard")]
    pub compress: bool,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Configuration file
    #[arg(short, long, help = "JSON file with thresholds and catalog rules")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

/// Log format choices on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Parsed quality threshold values from CLI arguments.
#[derive(Debug, Default, PartialEq)]
pub struct QualityThresholds {
    pub completeness: Option<f64>,
    pub consistency: Option<f64>,
    pub validity: Option<f64>,
    pub uniqueness: Option<f64>,
}

impl QualityThresholds {
    /// Applies every parsed override to a config.
    pub fn apply(&self, mut config: QualityConfig) -> QualityConfig {
        let overrides = [
            (Dimension::Completeness, self.completeness),
            (Dimension::Consistency, self.consistency),
            (Dimension::Validity, self.validity),
            (Dimension::Uniqueness, self.uniqueness),
        ];
        for (dimension, value) in overrides {
            if let Some(v) = value {
                config = config.with_threshold(dimension, v);
            }
        }
        config
    }
}

/// Parses quality thresholds from CLI arguments.
pub fn parse_quality_thresholds(thresholds: &[String]) -> QualityThresholds {
    let mut parsed = QualityThresholds::default();

    for threshold in thresholds {
        let Some((metric, value)) = threshold.split_once(':') else {
            warn!("Ignoring malformed quality threshold '{}'", threshold);
            continue;
        };
        let Ok(v) = value.trim().parse::<f64>() else {
            warn!("Invalid threshold value for {}: {}", metric, value);
            continue;
        };
        if !(0.0..=1.0).contains(&v) {
            warn!(
                "Threshold value {} for {} is outside valid range [0.0, 1.0]",
                v, metric
            );
        }
        let v = v.clamp(0.0, 1.0);
        match Dimension::from_name(metric) {
            Some(Dimension::Completeness) => parsed.completeness = Some(v),
            Some(Dimension::Consistency) => parsed.consistency = Some(v),
            Some(Dimension::Validity) => parsed.validity = Some(v),
            Some(Dimension::Uniqueness) => parsed.uniqueness = Some(v),
            None => warn!("Unknown quality metric: {}", metric),
        }
    }

    parsed
}

/// Loads the config file if given, otherwise the defaults.
pub async fn load_config(path: Option<&Path>) -> Result<QualityConfig> {
    let Some(path) = path else {
        return Ok(QualityConfig::default());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FinqualError::io(path, "read", e))?;
    let config: QualityConfig = serde_json::from_str(&content).map_err(|e| {
        FinqualError::serialization(format!("Invalid configuration in {}", path.display()), e)
    })?;

    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Sibling path of `input` named `<stem><suffix>.<extension>`.
pub fn sibling_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("records");
    input.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_quality_thresholds() {
        let parsed = parse_quality_thresholds(&args(&[
            "completeness:0.9",
            "Validity:0.75",
            "uniqueness:1.5",
        ]));

        assert_eq!(parsed.completeness, Some(0.9));
        assert_eq!(parsed.validity, Some(0.75));
        assert_eq!(parsed.uniqueness, Some(1.0));
        assert_eq!(parsed.consistency, None);
    }

    #[test]
    fn test_parse_quality_thresholds_ignores_bad_entries() {
        let parsed = parse_quality_thresholds(&args(&[
            "anomaly:0.5",
            "completeness:high",
            "consistency",
        ]));

        assert_eq!(parsed, QualityThresholds::default());
    }

    #[test]
    fn test_thresholds_apply_to_config() {
        let parsed = parse_quality_thresholds(&args(&["consistency:0.5"]));
        let config = parsed.apply(QualityConfig::default());

        assert_eq!(config.consistency_min, 0.5);
        assert_eq!(config.completeness_min, 0.95);
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling_path(Path::new("/data/sample25.csv"), "_checked", "csv"),
            PathBuf::from("/data/sample25_checked.csv")
        );
        assert_eq!(
            sibling_path(Path::new("sample25.json"), "_quality_summary", "json"),
            PathBuf::from("sample25_quality_summary.json")
        );
    }

    #[test]
    fn test_cli_parses_check_command() {
        let cli = Cli::try_parse_from([
            "finqual",
            "-vv",
            "check",
            "--input",
            "sample.csv",
            "--quality-threshold",
            "completeness:0.9,validity:0.8",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.log_format, LogFormatArg::Json);
        match cli.command {
            Command::Check(check) => {
                assert_eq!(check.input, PathBuf::from("sample.csv"));
                assert_eq!(check.quality_threshold.len(), 2);
                assert!(check.output.is_none());
            }
            Command::Catalog(_) => panic!("expected check command"),
        }
    }

    #[tokio::test]
    async fn test_load_config_defaults_without_file() {
        let config = load_config(None).await.unwrap();
        assert_eq!(config, QualityConfig::default());
    }
}
