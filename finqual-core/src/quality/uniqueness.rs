//! Uniqueness analysis for data quality assessment.
//!
//! Unlike the other dimensions, uniqueness needs the whole record set: the
//! catalog key is grouped across every record before any single record can
//! be flagged. Flagging is symmetric, so every member of a duplicate group
//! carries the same finding.
//!
//! Key columns with no populated cell anywhere in the batch are left out of
//! the key. When none of the catalog key columns is populated, records are
//! grouped by every populated column instead, extras included.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Column, FieldValue, Record};

use super::catalog::SchemaCatalog;
use super::models::{Dimension, DimensionOutcome, DuplicateGroup, Issue, KeyCell};

/// A column taking part in the grouping key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyColumn {
    Canonical(Column),
    Extra(String),
}

impl KeyColumn {
    fn name(&self) -> &str {
        match self {
            KeyColumn::Canonical(column) => column.name(),
            KeyColumn::Extra(name) => name,
        }
    }

    fn cell<'a>(&self, record: &'a Record) -> Option<&'a FieldValue> {
        match self {
            KeyColumn::Canonical(column) => record.present(*column),
            KeyColumn::Extra(name) => record.extra(name).filter(|v| !v.is_blank()),
        }
    }
}

/// Key of one record: canonical text per key column, `None` when missing.
type RecordKey = Vec<Option<String>>;

fn record_key(record: &Record, columns: &[KeyColumn]) -> RecordKey {
    columns
        .iter()
        .map(|column| column.cell(record).map(|v| v.as_text().into_owned()))
        .collect()
}

/// Picks the columns to group by for this batch.
fn effective_key(records: &[Record], catalog: &SchemaCatalog) -> Vec<KeyColumn> {
    let populated = |column: Column| records.iter().any(|r| r.present(column).is_some());

    let configured: Vec<KeyColumn> = catalog
        .uniqueness_key()
        .iter()
        .copied()
        .filter(|&column| populated(column))
        .map(KeyColumn::Canonical)
        .collect();
    if !configured.is_empty() {
        if configured.len() < catalog.uniqueness_key().len() {
            tracing::debug!(
                "Uniqueness key reduced to populated columns: {}",
                join_names(&configured)
            );
        }
        return configured;
    }

    let mut fallback: Vec<KeyColumn> = Column::ALL
        .iter()
        .copied()
        .filter(|&column| populated(column))
        .map(KeyColumn::Canonical)
        .collect();
    let extras: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.extras.iter())
        .filter(|(_, value)| !value.is_blank())
        .map(|(name, _)| name.as_str())
        .collect();
    fallback.extend(extras.into_iter().map(|name| KeyColumn::Extra(name.to_string())));

    if records.is_empty() {
        return fallback;
    }
    if fallback.is_empty() {
        tracing::warn!("No populated columns; skipping uniqueness check");
    } else {
        tracing::warn!(
            "None of the uniqueness key columns is populated; grouping by all populated columns: {}",
            join_names(&fallback)
        );
    }
    fallback
}

fn join_names(columns: &[KeyColumn]) -> String {
    columns
        .iter()
        .map(KeyColumn::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Duplicate-key grouping over a complete record set.
#[derive(Debug, Clone, Default)]
pub struct UniquenessIndex {
    /// Names of the columns the records were grouped by
    key_columns: Vec<String>,
    /// Group position for each record, `None` when its key is unique
    membership: Vec<Option<usize>>,
    /// Groups with more than one member, in order of first appearance
    groups: Vec<DuplicateGroup>,
}

impl UniquenessIndex {
    /// Groups all records by the catalog uniqueness key.
    ///
    /// Missing key cells compare equal to each other. With no usable key
    /// column every record is unique.
    pub fn build(records: &[Record], catalog: &SchemaCatalog) -> Self {
        let key_columns = effective_key(records, catalog);
        let mut membership = vec![None; records.len()];
        let mut groups = Vec::new();

        if key_columns.is_empty() {
            return Self {
                key_columns: Vec::new(),
                membership,
                groups,
            };
        }

        let mut slots: HashMap<RecordKey, usize> = HashMap::new();
        let mut buckets: Vec<(RecordKey, Vec<usize>)> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let key = record_key(record, &key_columns);
            if let Some(&slot) = slots.get(&key) {
                buckets[slot].1.push(index);
            } else {
                slots.insert(key.clone(), buckets.len());
                buckets.push((key, vec![index]));
            }
        }

        for (key, record_indices) in buckets {
            if record_indices.len() < 2 {
                continue;
            }
            let group_position = groups.len();
            for &index in &record_indices {
                membership[index] = Some(group_position);
            }
            groups.push(DuplicateGroup {
                key: key_columns
                    .iter()
                    .zip(key)
                    .map(|(column, value)| KeyCell {
                        column: column.name().to_string(),
                        value,
                    })
                    .collect(),
                size: record_indices.len(),
                record_indices,
            });
        }

        let index = Self {
            key_columns: key_columns.iter().map(|c| c.name().to_string()).collect(),
            membership,
            groups,
        };
        tracing::debug!(
            "Uniqueness grouping: {} duplicate groups covering {} records",
            index.groups.len(),
            index.duplicate_record_count()
        );
        index
    }

    /// Names of the columns records were grouped by; empty when skipped.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Group the record at `index` belongs to, if its key is duplicated.
    pub fn group_for(&self, index: usize) -> Option<&DuplicateGroup> {
        self.membership
            .get(index)
            .copied()
            .flatten()
            .and_then(|position| self.groups.get(position))
    }

    /// Duplicate groups in order of first appearance.
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Consumes the index, returning its groups.
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.groups
    }

    /// Number of records that share their key with another record.
    pub fn duplicate_record_count(&self) -> usize {
        self.groups.iter().map(|g| g.size).sum()
    }
}

/// Evaluates uniqueness of the record at `index` against a prebuilt index.
pub fn evaluate_uniqueness(index: usize, uniqueness: &UniquenessIndex) -> DimensionOutcome {
    let mut outcome = DimensionOutcome::new(Dimension::Uniqueness);

    if let Some(group) = uniqueness.group_for(index) {
        outcome.issues.push(Issue {
            dimension: Dimension::Uniqueness,
            column: None,
            description: format!(
                "duplicate key ({}) shared by {} records",
                group.key_label(),
                group.size
            ),
        });
    }

    outcome
}
