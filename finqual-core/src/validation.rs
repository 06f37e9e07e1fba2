//! JSON Schema validation for the quality summary output format.
//!
//! Every summary written by the CLI is checked against an embedded JSON
//! Schema first, so downstream consumers can rely on the field set and on
//! the value shapes (numbers are never NaN, labels are plain strings).
//!
//! # Example
//! ```rust,ignore
//! use finqual_core::validation::{initialize_summary_validator, validate_summary_output};
//!
//! initialize_summary_validator()?;
//! let json_value = serde_json::to_value(&report.summary)?;
//! validate_summary_output(&json_value)?;
//! ```

use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

use crate::quality::QualitySummary;

/// JSON Schema validation errors with detailed field-level reporting
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema compilation failed during initialization
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// Validation failed with specific field errors
    #[error("Schema validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// Unsupported format version detected
    #[error("Unsupported format version '{version}'. Supported versions: {supported:?}")]
    UnsupportedVersion {
        version: String,
        supported: Vec<String>,
    },

    /// Counts in the summary contradict each other
    #[error("Inconsistent summary: {reason}")]
    InconsistentCounts { reason: String },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Supported format versions for backward compatibility
const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Embedded JSON Schema for v1.0 format validation
const SCHEMA_V1_0: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "finqual Quality Summary Format v1.0",
  "type": "object",
  "required": [
    "format_version",
    "total_records",
    "records_with_issues",
    "quality_measures",
    "overall_quality_score",
    "issue_rate_score",
    "duplicate_groups",
    "columns",
    "threshold_violations",
    "generated_at"
  ],
  "$defs": {
    "dimension": {
      "type": "object",
      "required": ["total_issues", "percentage", "description"],
      "properties": {
        "total_issues": { "type": "integer", "minimum": 0 },
        "percentage": { "type": "number", "minimum": 0, "maximum": 100 },
        "description": { "type": "string" }
      }
    },
    "score": { "type": "number", "minimum": 0, "maximum": 100 }
  },
  "properties": {
    "format_version": {
      "type": "string",
      "pattern": "^1\\.0$"
    },
    "total_records": { "type": "integer", "minimum": 1 },
    "records_with_issues": { "type": "integer", "minimum": 0 },
    "quality_measures": {
      "type": "object",
      "required": ["completeness", "consistency", "validity", "uniqueness"],
      "properties": {
        "completeness": { "$ref": "#/$defs/dimension" },
        "consistency": { "$ref": "#/$defs/dimension" },
        "validity": { "$ref": "#/$defs/dimension" },
        "uniqueness": { "$ref": "#/$defs/dimension" }
      },
      "additionalProperties": false
    },
    "overall_quality_score": { "$ref": "#/$defs/score" },
    "issue_rate_score": { "$ref": "#/$defs/score" },
    "duplicate_groups": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["key", "record_indices", "size"],
        "properties": {
          "key": {
            "type": "array",
            "minItems": 1,
            "items": {
              "type": "object",
              "required": ["column", "value"],
              "properties": {
                "column": { "type": "string", "minLength": 1 },
                "value": { "type": ["string", "null"] }
              }
            }
          },
          "record_indices": {
            "type": "array",
            "minItems": 2,
            "items": { "type": "integer", "minimum": 0 }
          },
          "size": { "type": "integer", "minimum": 2 }
        }
      }
    },
    "columns": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["name", "declared_type", "monitored", "observed_type", "missing_count"],
        "properties": {
          "name": { "type": "string", "minLength": 1 },
          "declared_type": { "type": "string" },
          "monitored": { "type": "boolean" },
          "observed_type": { "enum": ["number", "string", "mixed", "empty"] },
          "missing_count": { "type": "integer", "minimum": 0 }
        }
      }
    },
    "threshold_violations": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["metric", "threshold", "actual", "severity"],
        "properties": {
          "metric": { "enum": ["completeness", "consistency", "validity", "uniqueness"] },
          "threshold": { "type": "number", "minimum": 0, "maximum": 1 },
          "actual": { "type": "number", "minimum": 0, "maximum": 1 },
          "severity": { "enum": ["warning", "critical"] }
        }
      }
    },
    "generated_at": { "type": "string", "format": "date-time" }
  }
}"##;

/// Compiled JSON Schema instance (initialized once)
static COMPILED_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Initialize and compile the JSON Schema for validation
///
/// This function compiles the embedded JSON Schema and caches it for reuse.
/// It should be called once during application startup.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if the embedded schema is invalid.
pub fn initialize_summary_validator() -> Result<(), ValidationError> {
    let schema_json = get_schema_definition()?;

    let compiled = jsonschema::validator_for(&schema_json).map_err(|e| {
        ValidationError::SchemaCompilation {
            message: format!("Schema compilation error: {}", e),
        }
    })?;

    // Already set by an earlier call
    let _ = COMPILED_SCHEMA.set(compiled);

    Ok(())
}

/// Validate a quality summary JSON value against the JSON Schema
///
/// Checks the format version, the schema structure, and count relations the
/// schema cannot express (no dimension flags more records than exist).
///
/// # Errors
/// Returns detailed validation errors if the JSON doesn't conform.
pub fn validate_summary_output(json_value: &Value) -> Result<(), ValidationError> {
    let schema = COMPILED_SCHEMA
        .get()
        .ok_or_else(|| ValidationError::SchemaCompilation {
            message: "Schema validator not initialized. Call initialize_summary_validator() first."
                .to_string(),
        })?;

    validate_format_version(json_value)?;

    let errors: Vec<String> = schema
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ValidationError::ValidationFailed {
            error_count: errors.len(),
            errors,
        });
    }

    validate_count_constraints(json_value)?;

    Ok(())
}

/// Validate format version compatibility
///
/// Ensures the format_version field is present and supported.
fn validate_format_version(json_value: &Value) -> Result<(), ValidationError> {
    let version = json_value
        .get("format_version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ValidationError::ValidationFailed {
            error_count: 1,
            errors: vec!["Missing required field 'format_version'".to_string()],
        })?;

    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ValidationError::UnsupportedVersion {
            version: version.to_string(),
            supported: SUPPORTED_VERSIONS.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(())
}

fn validate_count_constraints(json_value: &Value) -> Result<(), ValidationError> {
    let count = |path: &str| {
        json_value
            .pointer(path)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    };
    let total = count("/total_records");

    let affected = count("/records_with_issues");
    if affected > total {
        return Err(ValidationError::InconsistentCounts {
            reason: format!(
                "records_with_issues {} exceeds total_records {}",
                affected, total
            ),
        });
    }

    for dimension in ["completeness", "consistency", "validity", "uniqueness"] {
        let issues = count(&format!("/quality_measures/{}/total_issues", dimension));
        if issues > total {
            return Err(ValidationError::InconsistentCounts {
                reason: format!(
                    "{} total_issues {} exceeds total_records {}",
                    dimension, issues, total
                ),
            });
        }
        if issues > affected {
            return Err(ValidationError::InconsistentCounts {
                reason: format!(
                    "{} total_issues {} exceeds records_with_issues {}",
                    dimension, issues, affected
                ),
            });
        }
    }

    Ok(())
}

/// Validate and load a quality summary from JSON
///
/// # Errors
/// Returns validation errors for malformed JSON or schema violations.
pub fn validate_and_parse_summary(json_str: &str) -> Result<QualitySummary, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;

    validate_summary_output(&json_value)?;

    let summary: QualitySummary = serde_json::from_value(json_value)?;

    Ok(summary)
}

/// Get the embedded JSON Schema as a parsed Value for external use
pub fn get_schema_definition() -> Result<Value, ValidationError> {
    serde_json::from_str(SCHEMA_V1_0).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}
