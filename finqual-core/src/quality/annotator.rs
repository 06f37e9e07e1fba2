//! Row annotation.
//!
//! Applies the four evaluators to every record. The uniqueness index is
//! built over the whole batch first; per-row work after that is independent,
//! so large batches fan out with rayon. Output order always matches input
//! order.

use rayon::prelude::*;

use crate::models::Record;

use super::catalog::SchemaCatalog;
use super::completeness::evaluate_completeness;
use super::consistency::evaluate_consistency;
use super::models::{AnnotatedRecord, IssueFlags};
use super::uniqueness::{UniquenessIndex, evaluate_uniqueness};
use super::validity::evaluate_validity;

/// Flags for one record given a prebuilt uniqueness index.
pub fn flag_record(
    index: usize,
    record: &Record,
    catalog: &SchemaCatalog,
    uniqueness: &UniquenessIndex,
) -> IssueFlags {
    IssueFlags::from_outcomes([
        evaluate_completeness(record, catalog),
        evaluate_consistency(record, catalog),
        evaluate_validity(record, catalog),
        evaluate_uniqueness(index, uniqueness),
    ])
}

/// Annotates every record and returns the uniqueness index used.
///
/// With `parallel` set the per-row pass runs on the rayon pool. Each record
/// writes only its own slot, so the result is identical to a sequential run.
pub fn annotate_records(
    records: &[Record],
    catalog: &SchemaCatalog,
    parallel: bool,
) -> (Vec<AnnotatedRecord>, UniquenessIndex) {
    let uniqueness = UniquenessIndex::build(records, catalog);

    let annotate = |(index, record): (usize, &Record)| AnnotatedRecord {
        record: record.clone(),
        flags: flag_record(index, record, catalog, &uniqueness),
    };

    let annotated: Vec<AnnotatedRecord> = if parallel {
        tracing::debug!("Annotating {} records in parallel", records.len());
        records.par_iter().enumerate().map(annotate).collect()
    } else {
        tracing::debug!("Annotating {} records sequentially", records.len());
        records.iter().enumerate().map(annotate).collect()
    };

    (annotated, uniqueness)
}
