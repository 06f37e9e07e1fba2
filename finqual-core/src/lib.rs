//! Core data quality engine for finqual.
//!
//! This crate evaluates financial company records for completeness,
//! consistency, validity and uniqueness, annotates every record with
//! per-dimension flags and reduces the flags to a batch summary. It does no
//! file I/O; loading, writing and report rendering live in the `finqual`
//! binary.
//!
//! # Architecture
//! - A serde [`quality::CatalogDefinition`] is compiled once into an
//!   immutable [`quality::SchemaCatalog`] and injected into every evaluator
//! - Evaluators are pure functions over a borrowed [`Record`]
//! - The uniqueness grouping runs over the full batch before any record is
//!   flagged

pub mod error;
pub mod logging;
pub mod models;
pub mod quality;
pub mod validation;

// Re-export commonly used types
pub use error::{FinqualError, Result};
pub use logging::{LogFormat, init_logging};
pub use models::{Column, FieldValue, Record};
pub use quality::{
    AnnotatedRecord, CatalogDefinition, Dimension, IssueFlags, QualityAnalyzer, QualityConfig,
    QualityReport, QualitySummary, SchemaCatalog,
};

pub use validation::{
    ValidationError, initialize_summary_validator, validate_and_parse_summary,
    validate_summary_output,
};
