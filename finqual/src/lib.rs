//! Library module for the finqual binary.
//!
//! Loading, writing and report rendering around the `finqual-core` engine.
//! The binary entry point is in main.rs; everything it drives lives here so
//! integration tests can run a full check without spawning a process.

pub mod cli;
pub mod loader;
pub mod output;
pub mod report;

use std::fmt::Write as _;

use finqual_core::quality::{QualityAnalyzer, QualityReport, QualitySummary};
use finqual_core::Result;

use cli::{CheckArgs, load_config, parse_quality_thresholds, sibling_path};

/// Paths written by a check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutputs {
    pub annotated: std::path::PathBuf,
    pub summary: std::path::PathBuf,
    pub report: Option<std::path::PathBuf>,
}

/// Loads, checks and writes one record file.
pub async fn run_check(args: &CheckArgs) -> Result<(QualityReport, CheckOutputs)> {
    let config = load_config(args.config.as_deref()).await?;
    let config = parse_quality_thresholds(&args.quality_threshold).apply(config);
    let analyzer = QualityAnalyzer::new(config)?;

    let records = loader::load_records(&args.input).await?;
    let report = analyzer.analyze(&records)?;

    for violation in &report.summary.threshold_violations {
        tracing::warn!(
            "Quality violation: {} = {:.2}% (threshold: {:.2}%)",
            violation.metric,
            violation.actual * 100.0,
            violation.threshold * 100.0
        );
    }

    let input_extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("json")
        .to_ascii_lowercase();
    let outputs = CheckOutputs {
        annotated: args
            .output
            .clone()
            .unwrap_or_else(|| sibling_path(&args.input, "_checked", &input_extension)),
        summary: args
            .summary
            .clone()
            .unwrap_or_else(|| sibling_path(&args.input, "_quality_summary", "json")),
        report: args.report.clone(),
    };

    output::save_annotated(&report.records, &outputs.annotated, args.compress).await?;
    output::save_summary(&report.summary, &outputs.summary, args.compress).await?;
    if let Some(path) = &outputs.report {
        let title = format!("Data Quality Report: {}", args.input.display());
        report::save_html_report(&title, &report.summary, path).await?;
    }

    Ok((report, outputs))
}

/// Console summary block printed after a check.
pub fn summary_block(summary: &QualitySummary) -> String {
    let mut block = String::new();
    let _ = writeln!(block, "\n=== DATA QUALITY SUMMARY ===");
    let _ = writeln!(block, "Total Records: {}", summary.total_records);
    let _ = writeln!(block, "Records With Issues: {}", summary.records_with_issues);
    let _ = writeln!(
        block,
        "Overall Quality Score: {:.2}%",
        summary.overall_quality_score
    );
    let _ = writeln!(block, "Issue Rate Score: {:.2}%", summary.issue_rate_score);
    let _ = writeln!(block, "\nIssues by Category:");
    for (dimension, measure) in summary.quality_measures.iter() {
        let name = dimension.name();
        let mut label = name[..1].to_uppercase();
        label.push_str(&name[1..]);
        let _ = writeln!(
            block,
            "  {}: {} issues ({:.2}%)",
            label, measure.total_issues, measure.percentage
        );
    }
    if !summary.threshold_violations.is_empty() {
        let _ = writeln!(
            block,
            "\nThreshold violations: {}",
            summary
                .threshold_violations
                .iter()
                .map(|v| v.metric.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    block
}
