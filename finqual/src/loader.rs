//! Record loading from JSON and CSV exports.
//!
//! Headers are matched to the canonical columns ignoring case and
//! surrounding whitespace. Other columns are carried through as record
//! extras, except the flag and issue columns of an earlier check, which are
//! dropped so a checked file can be checked again.
//!
//! CSV cells spelled like a pandas missing value (`NaN`, `NA`, `NULL`, ...)
//! become the NaN missing marker in every column.

use std::collections::BTreeSet;
use std::path::Path;

use finqual_core::error::FinqualError;
use finqual_core::{Column, FieldValue, Record, Result};
use serde_json::{Map, Value};

use crate::output::{FLAG_COLUMNS, ISSUE_DETAILS_COLUMN};

/// Cell spellings read as missing, after pandas' default `na_values`.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Where a source header lands on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Canonical(Column),
    Extra(String),
    Skip,
}

fn target_for(header: &str) -> Target {
    if let Some(column) = Column::from_header(header) {
        return Target::Canonical(column);
    }
    let trimmed = header.trim();
    if trimmed.is_empty() || trimmed == ISSUE_DETAILS_COLUMN || FLAG_COLUMNS.contains(&trimmed) {
        Target::Skip
    } else {
        Target::Extra(trimmed.to_string())
    }
}

fn place(record: &mut Record, target: &Target, value: Option<FieldValue>) {
    match target {
        Target::Canonical(column) => record.set(*column, value),
        Target::Extra(name) => record.set_extra(name.clone(), value),
        Target::Skip => {}
    }
}

/// Supported input encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Array of objects
    Json,
    /// Header row followed by data rows
    Csv,
}

impl InputFormat {
    /// Detects the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(FinqualError::configuration(format!(
                "Unsupported input format for {} (expected .json or .csv)",
                path.display()
            ))),
        }
    }
}

/// Reads all records from a JSON or CSV file.
pub async fn load_records(path: &Path) -> Result<Vec<Record>> {
    let format = InputFormat::from_path(path)?;
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FinqualError::io(path, "read", e))?;

    let records = match format {
        InputFormat::Json => parse_json(&content)?,
        InputFormat::Csv => parse_csv(&content)?,
    };

    tracing::info!(
        "Loaded {} records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parses a JSON array of row objects.
pub fn parse_json(content: &str) -> Result<Vec<Record>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(content)
        .map_err(|e| FinqualError::serialization("JSON input is not an array of objects", e))?;

    let mut extra = BTreeSet::new();
    let records = rows
        .into_iter()
        .map(|row| {
            let mut record = Record::new();
            for (header, value) in row {
                let target = target_for(&header);
                if let Target::Extra(name) = &target {
                    extra.insert(name.clone());
                }
                place(&mut record, &target, json_cell(value));
            }
            record
        })
        .collect();

    log_extra_columns(&extra);
    Ok(records)
}

fn json_cell(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s)),
        Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
        other => Some(FieldValue::Text(other.to_string())),
    }
}

/// Parses CSV text with a header row.
pub fn parse_csv(content: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FinqualError::load_failed("CSV header row", e))?
        .clone();

    let targets: Vec<Target> = headers.iter().map(target_for).collect();
    let extra: BTreeSet<String> = targets
        .iter()
        .filter_map(|target| match target {
            Target::Extra(name) => Some(name.clone()),
            _ => None,
        })
        .collect();
    log_extra_columns(&extra);

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| FinqualError::load_failed(format!("CSV row {}", line + 1), e))?;
        let mut record = Record::new();
        for (cell, target) in row.iter().zip(&targets) {
            place(&mut record, target, csv_cell(cell));
        }
        records.push(record);
    }

    Ok(records)
}

/// Converts one CSV cell.
///
/// Empty cells are absent and missing markers become the NaN sentinel.
/// Numeric-looking cells become numbers unless they carry a leading zero
/// (identifiers such as `007`).
pub fn csv_cell(cell: &str) -> Option<FieldValue> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if MISSING_MARKERS.contains(&trimmed) {
        return Some(FieldValue::Number(f64::NAN));
    }
    if !has_identifier_zero(trimmed)
        && let Ok(number) = trimmed.parse::<f64>()
        && number.is_finite()
    {
        return Some(FieldValue::Number(number));
    }
    Some(FieldValue::Text(cell.to_string()))
}

fn has_identifier_zero(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut chars = digits.chars();
    chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

fn log_extra_columns(extra: &BTreeSet<String>) {
    if !extra.is_empty() {
        tracing::debug!(
            "Carrying {} unchecked columns through: {}",
            extra.len(),
            extra.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }
}
