//! Completeness evaluation for data quality assessment.
//!
//! A critical cell is missing when it is absent, an empty or whitespace-only
//! string, or a NaN number. Missing data is the condition being measured, so
//! this evaluator has no failure mode.

use crate::models::{FieldValue, Record};

use super::catalog::SchemaCatalog;
use super::models::{Dimension, DimensionOutcome};

/// Returns true if the cell counts as missing.
pub fn is_missing(value: Option<&FieldValue>) -> bool {
    value.is_none_or(FieldValue::is_blank)
}

/// Evaluates completeness of one record.
///
/// Every completeness-critical column of the catalog is inspected; each
/// missing one contributes an issue naming the column.
pub fn evaluate_completeness(record: &Record, catalog: &SchemaCatalog) -> DimensionOutcome {
    let mut outcome = DimensionOutcome::new(Dimension::Completeness);

    for &column in catalog.completeness_columns() {
        if is_missing(record.get(column)) {
            outcome.push(column, format!("missing value in column '{}'", column));
        }
    }

    outcome
}
