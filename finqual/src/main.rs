//! Data quality checker for financial company record exports.
//!
//! Reads a JSON or CSV export, flags every record for completeness,
//! consistency, validity and uniqueness, and writes the annotated table, a
//! JSON summary and optionally an HTML report.

use clap::Parser;
use finqual::cli::{Cli, Command, load_config};
use finqual::{run_check, summary_block};
use finqual_core::error::FinqualError;
use finqual_core::{Result, init_logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format.into(),
    )?;

    finqual_core::initialize_summary_validator().map_err(|e| {
        FinqualError::configuration(format!("Failed to initialize summary validator: {}", e))
    })?;

    match &cli.command {
        Command::Check(args) => {
            info!("Starting data quality check of {}", args.input.display());
            let (report, outputs) = run_check(args).await.map_err(|e| {
                error!("Data quality check failed: {}", e);
                e
            })?;

            if !cli.global.quiet {
                print!("{}", summary_block(&report.summary));
                println!();
                println!("Annotated records: {}", outputs.annotated.display());
                println!("Summary: {}", outputs.summary.display());
                if let Some(path) = &outputs.report {
                    println!("Report: {}", path.display());
                }
            }
            Ok(())
        }
        Command::Catalog(args) => {
            let config = load_config(args.config.as_deref()).await?;
            // Compile to surface regex and range errors before printing
            finqual_core::QualityAnalyzer::new(config.clone())?;
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| FinqualError::serialization("configuration", e))?;
            println!("{}", json);
            Ok(())
        }
    }
}
