//! Aggregation of per-record flags into a [`QualitySummary`].

use std::collections::BTreeSet;

use chrono::Utc;

use crate::error::FinqualError;
use crate::models::{Column, FieldValue};
use crate::Result;

use super::catalog::SchemaCatalog;
use super::completeness::is_missing;
use super::config::QualityConfig;
use super::models::{
    AnnotatedRecord, ColumnMetadata, Dimension, DimensionSummary, QualityMeasures,
    QualitySummary, SUMMARY_FORMAT_VERSION, ThresholdViolation,
};
use super::uniqueness::UniquenessIndex;

/// Overall score from the share of records with at least one issue.
pub fn overall_quality_score(records_with_issues: u64, total_records: u64) -> f64 {
    if total_records == 0 {
        return 0.0;
    }
    100.0 * (1.0 - records_with_issues as f64 / total_records as f64)
}

/// Score from total issues over every possible record/dimension issue.
///
/// A record flagged on several dimensions counts once per dimension here,
/// which is why this figure is higher than [`overall_quality_score`] on
/// dirty data.
pub fn issue_rate_score(measures: &QualityMeasures, total_records: u64) -> f64 {
    let possible = total_records * Dimension::ALL.len() as u64;
    if possible == 0 {
        return 0.0;
    }
    (100.0 - measures.total_issues() as f64 / possible as f64 * 100.0).max(0.0)
}

/// Declared type label of source columns the catalog does not know.
pub const UNTYPED_COLUMN: &str = "untyped";

fn dimension_description(
    dimension: Dimension,
    catalog: &SchemaCatalog,
    key_columns: &[String],
) -> String {
    match dimension {
        Dimension::Completeness => format!(
            "Missing values in critical columns: [{}]",
            catalog
                .completeness_columns()
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Dimension::Consistency => {
            "Inconsistent formatting in company names, status types, or currency codes".to_string()
        }
        Dimension::Validity => "Invalid data ranges, formats, or values detected".to_string(),
        Dimension::Uniqueness if key_columns.is_empty() => {
            "Duplicate check skipped: no populated columns".to_string()
        }
        Dimension::Uniqueness => format!(
            "Duplicate records based on columns: [{}]",
            key_columns.join(", ")
        ),
    }
}

/// Observed shape and missing count over a sequence of cells.
fn observe<'a>(cells: impl Iterator<Item = Option<&'a FieldValue>>) -> (&'static str, u64) {
    let mut missing_count = 0_u64;
    let mut observed: Option<&'static str> = None;
    for value in cells {
        match value {
            Some(value) if !is_missing(Some(value)) => {
                observed = match observed {
                    None => Some(value.kind()),
                    Some(kind) if kind == value.kind() => Some(kind),
                    Some(_) => Some("mixed"),
                };
            }
            _ => missing_count += 1,
        }
    }
    (observed.unwrap_or("empty"), missing_count)
}

/// Metadata for the canonical columns, then extra columns by name.
fn column_metadata(annotated: &[AnnotatedRecord], catalog: &SchemaCatalog) -> Vec<ColumnMetadata> {
    let monitored = catalog.monitored_columns();

    let canonical = Column::ALL.iter().map(|&column| {
        let (observed_type, missing_count) =
            observe(annotated.iter().map(|entry| entry.record.get(column)));
        ColumnMetadata {
            name: column.name().to_string(),
            declared_type: catalog.declared_type(column).as_str().to_string(),
            monitored: monitored.contains(&column),
            observed_type: observed_type.to_string(),
            missing_count,
        }
    });

    let extra_names: BTreeSet<&str> = annotated
        .iter()
        .flat_map(|entry| entry.record.extras.keys())
        .map(String::as_str)
        .collect();
    let extras = extra_names.into_iter().map(|name| {
        let (observed_type, missing_count) =
            observe(annotated.iter().map(|entry| entry.record.extra(name)));
        ColumnMetadata {
            name: name.to_string(),
            declared_type: UNTYPED_COLUMN.to_string(),
            monitored: false,
            observed_type: observed_type.to_string(),
            missing_count,
        }
    });

    canonical.chain(extras).collect()
}

/// Reduces annotated records to a batch summary.
///
/// # Errors
/// Returns [`FinqualError::EmptyDataset`] when there are no records; rates
/// over an empty batch are undefined.
pub fn summarize(
    annotated: &[AnnotatedRecord],
    uniqueness: UniquenessIndex,
    catalog: &SchemaCatalog,
    config: &QualityConfig,
) -> Result<QualitySummary> {
    if annotated.is_empty() {
        return Err(FinqualError::EmptyDataset);
    }
    let total = annotated.len() as u64;

    let dimension_summary = |dimension: Dimension| {
        let count = annotated
            .iter()
            .filter(|entry| entry.flags.has_issue(dimension))
            .count() as u64;
        let summary =
            DimensionSummary::new(
            count,
            total,
            dimension_description(dimension, catalog, uniqueness.key_columns()),
        );
        tracing::info!(
            "{} check: {} issues found ({:.2}%)",
            capitalize(dimension.name()),
            summary.total_issues,
            summary.percentage
        );
        summary
    };

    let quality_measures = QualityMeasures {
        completeness: dimension_summary(Dimension::Completeness),
        consistency: dimension_summary(Dimension::Consistency),
        validity: dimension_summary(Dimension::Validity),
        uniqueness: dimension_summary(Dimension::Uniqueness),
    };

    let records_with_issues = annotated
        .iter()
        .filter(|entry| entry.flags.has_any_issue())
        .count() as u64;

    let mut threshold_violations = Vec::new();
    for (dimension, summary) in quality_measures.iter() {
        let threshold = config.threshold(dimension);
        let actual = summary.pass_rate();
        if actual < threshold {
            let violation = ThresholdViolation::new(dimension.name(), threshold, actual);
            tracing::warn!(
                "{} pass rate {:.4} below minimum {:.4} ({:?})",
                dimension,
                actual,
                threshold,
                violation.severity
            );
            threshold_violations.push(violation);
        }
    }

    Ok(QualitySummary {
        format_version: SUMMARY_FORMAT_VERSION.to_string(),
        total_records: total,
        records_with_issues,
        overall_quality_score: overall_quality_score(records_with_issues, total),
        issue_rate_score: issue_rate_score(&quality_measures, total),
        quality_measures,
        duplicate_groups: uniqueness.into_groups(),
        columns: column_metadata(annotated, catalog),
        threshold_violations,
        generated_at: Utc::now(),
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
