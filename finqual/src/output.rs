//! File output for annotated records and the quality summary.
//!
//! Handles writing results to files with optional compression. Annotated
//! rows carry the canonical columns, then any extra source columns by name,
//! then the flag columns.

use std::collections::BTreeSet;
use std::path::Path;

use finqual_core::error::FinqualError;
use finqual_core::quality::{AnnotatedRecord, Dimension, QualitySummary};
use finqual_core::{Column, FieldValue, Result, validate_summary_output};
use serde_json::{Map, Value};

/// Flag columns appended to every annotated row, in output order.
pub const FLAG_COLUMNS: [&str; 5] = [
    "flag_completeness",
    "flag_consistency",
    "flag_validity",
    "flag_uniqueness",
    "flag_overall",
];

/// Column holding the joined issue descriptions.
pub const ISSUE_DETAILS_COLUMN: &str = "issue_details";

fn flag_values(entry: &AnnotatedRecord) -> [u8; 5] {
    let flags = &entry.flags;
    [
        u8::from(flags.has_issue(Dimension::Completeness)),
        u8::from(flags.has_issue(Dimension::Consistency)),
        u8::from(flags.has_issue(Dimension::Validity)),
        u8::from(flags.has_issue(Dimension::Uniqueness)),
        u8::from(flags.has_any_issue()),
    ]
}

/// Names of the extra source columns present on any record.
pub fn extra_columns(records: &[AnnotatedRecord]) -> Vec<&str> {
    records
        .iter()
        .flat_map(|entry| entry.record.extras.keys())
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn json_cell(value: Option<&FieldValue>) -> Value {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

/// Renders annotated records as a JSON array of flat row objects.
pub fn annotated_to_json(records: &[AnnotatedRecord]) -> Result<String> {
    let extras = extra_columns(records);
    let rows: Vec<Value> = records
        .iter()
        .map(|entry| {
            let mut row = Map::new();
            for column in Column::ALL {
                row.insert(column.name().to_string(), json_cell(entry.record.get(column)));
            }
            for &name in &extras {
                row.insert(name.to_string(), json_cell(entry.record.extra(name)));
            }
            for (name, flag) in FLAG_COLUMNS.iter().zip(flag_values(entry)) {
                row.insert((*name).to_string(), Value::from(flag));
            }
            row.insert(
                ISSUE_DETAILS_COLUMN.to_string(),
                Value::String(entry.flags.issue_details()),
            );
            Value::Object(row)
        })
        .collect();

    serde_json::to_string_pretty(&rows)
        .map_err(|e| FinqualError::serialization("annotated records", e))
}

/// Renders annotated records as CSV with a header row.
pub fn annotated_to_csv(records: &[AnnotatedRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let extras = extra_columns(records);
    let mut header: Vec<&str> = Vec::with_capacity(Column::ALL.len() + extras.len() + 6);
    for column in Column::ALL {
        header.push(column.name());
    }
    header.extend_from_slice(&extras);
    header.extend_from_slice(&FLAG_COLUMNS);
    header.push(ISSUE_DETAILS_COLUMN);
    writer
        .write_record(&header)
        .map_err(|e| FinqualError::report_failed("CSV header", e))?;

    let text = |value: Option<&FieldValue>| {
        value
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default()
    };
    for entry in records {
        let mut row: Vec<String> = Column::ALL
            .iter()
            .map(|&column| text(entry.record.get(column)))
            .chain(extras.iter().map(|&name| text(entry.record.extra(name))))
            .collect();
        row.extend(flag_values(entry).iter().map(ToString::to_string));
        row.push(entry.flags.issue_details());
        writer
            .write_record(&row)
            .map_err(|e| FinqualError::report_failed("CSV row", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| FinqualError::report_failed("CSV flush", e.into_error()))
}

/// Writes annotated records, choosing CSV or JSON from the extension.
pub async fn save_annotated(
    records: &[AnnotatedRecord],
    output_path: &Path,
    compress: bool,
) -> Result<()> {
    let is_csv = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let data = if is_csv {
        annotated_to_csv(records)?
    } else {
        annotated_to_json(records)?.into_bytes()
    };

    save_bytes(&data, output_path, compress).await?;
    tracing::info!(
        "Annotated records saved to {}",
        output_path.display()
    );
    Ok(())
}

/// Serializes the summary and validates it before writing.
pub fn summary_to_json(summary: &QualitySummary) -> Result<String> {
    let json_value = serde_json::to_value(summary)
        .map_err(|e| FinqualError::serialization("quality summary", e))?;

    validate_summary_output(&json_value)
        .map_err(|e| FinqualError::report_failed("Summary validation failed", e))?;
    tracing::debug!("Summary output validation passed");

    serde_json::to_string_pretty(&json_value)
        .map_err(|e| FinqualError::serialization("quality summary", e))
}

/// Saves the validated summary as pretty JSON.
pub async fn save_summary(
    summary: &QualitySummary,
    output_path: &Path,
    compress: bool,
) -> Result<()> {
    let json_data = summary_to_json(summary)?;
    save_bytes(json_data.as_bytes(), output_path, compress).await?;
    tracing::info!("Summary report saved to {}", output_path.display());
    Ok(())
}

async fn save_bytes(data: &[u8], output_path: &Path, compress: bool) -> Result<()> {
    if compress {
        #[cfg(feature = "compression")]
        {
            save_compressed(data, output_path).await
        }
        #[cfg(not(feature = "compression"))]
        {
            Err(FinqualError::configuration(
                "Compression not available. Compile with --features compression",
            ))
        }
    } else {
        save_plain(data, output_path).await
    }
}

/// Saves data to file.
pub async fn save_plain(data: &[u8], output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, data)
        .await
        .map_err(|e| FinqualError::io(output_path, "write to", e))
}

/// Saves Zstandard-compressed data.
#[cfg(feature = "compression")]
async fn save_compressed(data: &[u8], output_path: &Path) -> Result<()> {
    use std::io::Write;

    let mut encoder = zstd::Encoder::new(Vec::new(), 3)
        .map_err(|e| FinqualError::configuration(format!("Failed to create compressor: {}", e)))?;

    encoder
        .write_all(data)
        .map_err(|e| FinqualError::configuration(format!("Compression failed: {}", e)))?;

    let compressed_data = encoder.finish().map_err(|e| {
        FinqualError::configuration(format!("Compression finalization failed: {}", e))
    })?;

    tokio::fs::write(output_path, compressed_data)
        .await
        .map_err(|e| FinqualError::io(output_path, "write compressed file to", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use finqual_core::quality::{DimensionOutcome, IssueFlags};
    use finqual_core::Record;

    fn sample() -> Vec<AnnotatedRecord> {
        let mut validity = DimensionOutcome::new(Dimension::Validity);
        validity.push(Column::Revenue, "REVENUE -5 is below 0");
        vec![
            AnnotatedRecord {
                record: Record::new()
                    .with(Column::ProviderKey, "P1")
                    .with(Column::Revenue, 1.5e6),
                flags: IssueFlags::default(),
            },
            AnnotatedRecord {
                record: Record::new()
                    .with(Column::ProviderKey, "P2, Ltd")
                    .with(Column::Revenue, -5_i64),
                flags: IssueFlags::from_outcomes([validity]),
            },
        ]
    }

    #[test]
    fn test_annotated_json_output_columns() {
        let json = annotated_to_json(&sample()).unwrap();
        let rows: Vec<Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["providerkey"], "P1");
        assert_eq!(rows[0]["geonameen"], Value::Null);
        assert_eq!(rows[0]["flag_overall"], 0);
        assert_eq!(rows[1]["flag_validity"], 1);
        assert_eq!(rows[1]["flag_completeness"], 0);
        assert_eq!(rows[1]["flag_overall"], 1);
        assert_eq!(
            rows[1]["issue_details"],
            "[validity] REVENUE -5 is below 0"
        );
    }

    #[test]
    fn test_annotated_csv_output() {
        let bytes = annotated_to_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("timevalue,providerkey,"));
        assert!(header.ends_with("flag_overall,issue_details"));

        let first = lines.next().unwrap();
        assert!(first.contains("P1"));
        assert!(first.contains("1500000"));
        assert!(first.ends_with(",0,0,0,0,0,"));

        let second = lines.next().unwrap();
        assert!(second.contains("\"P2, Ltd\""));
        assert!(second.ends_with(",0,0,1,0,1,[validity] REVENUE -5 is below 0"));
    }

    #[test]
    fn test_extra_columns_written_after_canonical() {
        let mut records = sample();
        records[1].record = records[1]
            .record
            .clone()
            .with_extra("source", "manual")
            .with_extra("EBITDA", 7.5);

        let text = String::from_utf8(annotated_to_csv(&records).unwrap()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("unit_REVENUE,EBITDA,source,flag_completeness"));
        assert!(lines.next().unwrap().contains(",,,0,0,0,0,0,"));
        assert!(lines.next().unwrap().contains(",7.5,manual,0,0,1,0,1,"));

        let rows: Vec<Value> =
            serde_json::from_str(&annotated_to_json(&records).unwrap()).unwrap();
        assert_eq!(rows[0]["source"], Value::Null);
        assert_eq!(rows[1]["source"], "manual");
        assert_eq!(rows[1]["EBITDA"], 7.5);
    }

    #[tokio::test]
    async fn test_output_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checked.csv");

        save_annotated(&sample(), &path, false).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
    }

    #[cfg(not(feature = "compression"))]
    #[tokio::test]
    async fn test_output_compression_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checked.json.zst");

        let result = save_annotated(&sample(), &path, true).await;

        assert!(matches!(result, Err(FinqualError::Configuration { .. })));
    }
}
