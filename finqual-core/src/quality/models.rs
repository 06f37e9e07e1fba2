//! Data quality result models.
//!
//! Per-record results ([`IssueFlags`]) and the batch-level
//! [`QualitySummary`]. Everything here is plain serde data: column types are
//! already string labels and timestamps are chrono values, so a serializer
//! never has to special-case a native representation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Column, Record};

/// Summary format version written into every [`QualitySummary`].
pub const SUMMARY_FORMAT_VERSION: &str = "1.0";

/// One of the four quality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Completeness,
    Consistency,
    Validity,
    Uniqueness,
}

impl Dimension {
    /// All dimensions in reporting order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Completeness,
        Dimension::Consistency,
        Dimension::Validity,
        Dimension::Uniqueness,
    ];

    /// Lower-case name of the dimension.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Completeness => "completeness",
            Dimension::Consistency => "consistency",
            Dimension::Validity => "validity",
            Dimension::Uniqueness => "uniqueness",
        }
    }

    /// Parses a dimension name, ignoring case.
    pub fn from_name(name: &str) -> Option<Dimension> {
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single finding on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Dimension the finding belongs to
    pub dimension: Dimension,
    /// Column the finding is about, if it concerns one column
    pub column: Option<Column>,
    /// Human readable description
    pub description: String,
}

impl Issue {
    /// Creates an issue tied to a column.
    pub fn new(dimension: Dimension, column: Column, description: impl Into<String>) -> Self {
        Self {
            dimension,
            column: Some(column),
            description: description.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.dimension, self.description)
    }
}

/// Result of one evaluator on one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionOutcome {
    pub dimension: Dimension,
    pub issues: Vec<Issue>,
}

impl DimensionOutcome {
    /// Creates an outcome with no issues.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            issues: Vec::new(),
        }
    }

    /// Records an issue against a column.
    pub fn push(&mut self, column: Column, description: impl Into<String>) {
        self.issues
            .push(Issue::new(self.dimension, column, description));
    }

    /// Returns true if the record fails this dimension.
    pub fn has_issue(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Per-record flags for all four dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueFlags {
    pub has_completeness_issue: bool,
    pub has_consistency_issue: bool,
    pub has_validity_issue: bool,
    pub has_uniqueness_issue: bool,
    /// All findings, grouped by dimension in reporting order
    pub issues: Vec<Issue>,
}

impl IssueFlags {
    /// Folds evaluator outcomes into one flag set.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = DimensionOutcome>) -> Self {
        let mut flags = Self::default();
        for outcome in outcomes {
            if outcome.has_issue() {
                *flags.flag_mut(outcome.dimension) = true;
            }
            flags.issues.extend(outcome.issues);
        }
        flags
    }

    /// Returns the flag for a dimension.
    pub fn has_issue(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Completeness => self.has_completeness_issue,
            Dimension::Consistency => self.has_consistency_issue,
            Dimension::Validity => self.has_validity_issue,
            Dimension::Uniqueness => self.has_uniqueness_issue,
        }
    }

    /// Returns true if any dimension is flagged.
    pub fn has_any_issue(&self) -> bool {
        Dimension::ALL.iter().any(|d| self.has_issue(*d))
    }

    /// Findings for one dimension.
    pub fn issues_for(&self, dimension: Dimension) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.dimension == dimension)
    }

    /// All finding descriptions joined into one detail string.
    pub fn issue_details(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn flag_mut(&mut self, dimension: Dimension) -> &mut bool {
        match dimension {
            Dimension::Completeness => &mut self.has_completeness_issue,
            Dimension::Consistency => &mut self.has_consistency_issue,
            Dimension::Validity => &mut self.has_validity_issue,
            Dimension::Uniqueness => &mut self.has_uniqueness_issue,
        }
    }
}

/// A record paired with its flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub record: Record,
    pub flags: IssueFlags,
}

/// One cell of a uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCell {
    pub column: String,
    /// Canonical text of the value, `None` when missing
    pub value: Option<String>,
}

/// Records sharing one uniqueness key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The colliding key
    pub key: Vec<KeyCell>,
    /// Zero-based positions of the members in the input
    pub record_indices: Vec<usize>,
    /// Number of members
    pub size: usize,
}

impl DuplicateGroup {
    /// Renders the key as `column=value` pairs.
    pub fn key_label(&self) -> String {
        self.key
            .iter()
            .map(|cell| {
                format!(
                    "{}={}",
                    cell.column,
                    cell.value.as_deref().unwrap_or("<missing>")
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Aggregate figures for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    /// Records flagged for this dimension
    pub total_issues: u64,
    /// Share of records flagged, 0-100
    pub percentage: f64,
    /// What the dimension checks
    pub description: String,
}

impl DimensionSummary {
    /// Builds a summary from a count over `total` records.
    ///
    /// `total` must be non-zero; the aggregator rejects empty batches first.
    pub fn new(total_issues: u64, total: u64, description: impl Into<String>) -> Self {
        Self {
            total_issues,
            percentage: 100.0 * total_issues as f64 / total as f64,
            description: description.into(),
        }
    }

    /// Share of records that passed, 0.0-1.0.
    pub fn pass_rate(&self) -> f64 {
        (1.0 - self.percentage / 100.0).clamp(0.0, 1.0)
    }
}

/// Per-dimension summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMeasures {
    pub completeness: DimensionSummary,
    pub consistency: DimensionSummary,
    pub validity: DimensionSummary,
    pub uniqueness: DimensionSummary,
}

impl QualityMeasures {
    /// Returns the summary for a dimension.
    pub fn get(&self, dimension: Dimension) -> &DimensionSummary {
        match dimension {
            Dimension::Completeness => &self.completeness,
            Dimension::Consistency => &self.consistency,
            Dimension::Validity => &self.validity,
            Dimension::Uniqueness => &self.uniqueness,
        }
    }

    /// Iterates summaries in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &DimensionSummary)> {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Sum of issue counts over all dimensions.
    pub fn total_issues(&self) -> u64 {
        self.iter().map(|(_, s)| s.total_issues).sum()
    }
}

/// Column-level metadata, all values pre-stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Canonical column name, or the source header of an extra column
    pub name: String,
    /// Type label declared in the catalog, `untyped` for extra columns
    pub declared_type: String,
    /// Whether any catalog rule inspects the column
    pub monitored: bool,
    /// Shape seen in the data: `number`, `string`, `mixed` or `empty`
    pub observed_type: String,
    /// Records where the cell is absent or blank
    pub missing_count: u64,
}

/// Severity level for threshold violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    /// Pass rate is below threshold but not critical
    Warning,
    /// Pass rate is significantly below threshold
    Critical,
}

/// A dimension whose pass rate fell below its configured minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    /// Dimension that violated its threshold
    pub metric: String,
    /// The configured minimum pass rate
    pub threshold: f64,
    /// The measured pass rate
    pub actual: f64,
    /// Severity of the violation
    pub severity: ViolationSeverity,
}

/// Pass rates below this fraction of the threshold are classified as critical.
const CRITICAL_SEVERITY_RATIO: f64 = 0.8;

impl ThresholdViolation {
    /// Creates a new threshold violation.
    ///
    /// # Severity Classification
    /// - Critical: actual value is below 80% of threshold
    /// - Warning: actual value is between 80% and 100% of threshold
    pub fn new(metric: impl Into<String>, threshold: f64, actual: f64) -> Self {
        let severity = if actual < threshold * CRITICAL_SEVERITY_RATIO {
            ViolationSeverity::Critical
        } else {
            ViolationSeverity::Warning
        };

        Self {
            metric: metric.into(),
            threshold,
            actual,
            severity,
        }
    }
}

/// Batch-level quality summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// Summary format version
    pub format_version: String,
    /// Number of records evaluated
    pub total_records: u64,
    /// Records with at least one flagged dimension
    pub records_with_issues: u64,
    /// Per-dimension figures
    pub quality_measures: QualityMeasures,
    /// 100 minus the percentage of records with any issue
    pub overall_quality_score: f64,
    /// 100 minus total issues over total possible issues
    pub issue_rate_score: f64,
    /// Duplicate key groups found by the uniqueness check
    pub duplicate_groups: Vec<DuplicateGroup>,
    /// Column metadata in table order
    pub columns: Vec<ColumnMetadata>,
    /// Dimensions below their configured pass rate
    pub threshold_violations: Vec<ThresholdViolation>,
    /// When the summary was produced
    pub generated_at: DateTime<Utc>,
}

/// Annotated records in input order plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub records: Vec<AnnotatedRecord>,
    pub summary: QualitySummary,
}
