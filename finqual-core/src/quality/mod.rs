//! Data quality assessment module.
//!
//! This module evaluates financial company records along four dimensions:
//! - **Completeness**: critical cells that are absent, blank or NaN
//! - **Consistency**: name casing, status enumerations, currency codes
//! - **Validity**: year ranges, revenue range, date formats, industry codes
//! - **Uniqueness**: records sharing the catalog key
//!
//! Rules come from a [`SchemaCatalog`] compiled once from a serde
//! [`CatalogDefinition`]. Data problems are reported as issues on records,
//! never as errors.
//!
//! # Example
//! ```rust,ignore
//! use finqual_core::quality::{QualityAnalyzer, QualityConfig};
//!
//! let analyzer = QualityAnalyzer::new(QualityConfig::default())?;
//! let report = analyzer.analyze(&records)?;
//! println!("Quality score: {:.2}%", report.summary.overall_quality_score);
//! ```

mod aggregator;
mod analyzer;
mod annotator;
mod catalog;
mod completeness;
mod config;
mod consistency;
mod models;
mod uniqueness;
mod validity;

// Re-export public API
pub use aggregator::{UNTYPED_COLUMN, issue_rate_score, overall_quality_score, summarize};
pub use analyzer::QualityAnalyzer;
pub use annotator::{annotate_records, flag_record};
pub use catalog::{
    AcceptedValues, CatalogDefinition, ColumnDefinition, CompiledPattern, DataType,
    DateFormatRule, NumericRange, PatternRule, SchemaCatalog, YearRange,
};
pub use completeness::{evaluate_completeness, is_missing};
pub use config::{ConfigValidationError, DEFAULT_PARALLEL_MIN_RECORDS, QualityConfig};
pub use consistency::{evaluate_consistency, has_normalized_casing};
pub use models::{
    AnnotatedRecord, ColumnMetadata, Dimension, DimensionOutcome, DimensionSummary,
    DuplicateGroup, Issue, IssueFlags, KeyCell, QualityMeasures, QualityReport, QualitySummary,
    SUMMARY_FORMAT_VERSION, ThresholdViolation, ViolationSeverity,
};
pub use uniqueness::{UniquenessIndex, evaluate_uniqueness};
pub use validity::{YearReading, evaluate_validity, parse_calendar_date, read_year};
