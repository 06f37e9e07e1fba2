//! HTML report rendering.

use std::path::Path;

use askama::Template;
use finqual_core::error::FinqualError;
use finqual_core::quality::{ColumnMetadata, QualitySummary, ViolationSeverity};
use finqual_core::Result;

/// One row of the dimension table.
pub struct DimensionRow {
    pub name: String,
    pub total_issues: u64,
    pub percentage: String,
    pub description: String,
}

/// One row of the threshold violation table.
pub struct ViolationRow {
    pub metric: String,
    pub actual: String,
    pub threshold: String,
    pub severity: &'static str,
}

/// One row of the duplicate key table.
pub struct DuplicateRow {
    pub key: String,
    pub size: usize,
    /// One-based row numbers, matching a spreadsheet view of the input
    pub rows: String,
}

/// Askama view of a [`QualitySummary`].
#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate<'a> {
    pub title: String,
    pub generated_at: String,
    pub format_version: &'a str,
    pub total_records: u64,
    pub records_with_issues: u64,
    pub overall_score: String,
    pub issue_rate_score: String,
    pub dimensions: Vec<DimensionRow>,
    pub has_violations: bool,
    pub violations: Vec<ViolationRow>,
    pub has_duplicates: bool,
    pub duplicates: Vec<DuplicateRow>,
    pub columns: &'a [ColumnMetadata],
}

impl<'a> ReportTemplate<'a> {
    /// Builds the view, pre-formatting every number.
    pub fn new(title: impl Into<String>, summary: &'a QualitySummary) -> Self {
        let dimensions = summary
            .quality_measures
            .iter()
            .map(|(dimension, measure)| DimensionRow {
                name: dimension.name().to_string(),
                total_issues: measure.total_issues,
                percentage: format!("{:.2}", measure.percentage),
                description: measure.description.clone(),
            })
            .collect();

        let violations: Vec<ViolationRow> = summary
            .threshold_violations
            .iter()
            .map(|v| ViolationRow {
                metric: v.metric.clone(),
                actual: format!("{:.2}", v.actual * 100.0),
                threshold: format!("{:.2}", v.threshold * 100.0),
                severity: match v.severity {
                    ViolationSeverity::Warning => "warning",
                    ViolationSeverity::Critical => "critical",
                },
            })
            .collect();

        let duplicates: Vec<DuplicateRow> = summary
            .duplicate_groups
            .iter()
            .map(|g| DuplicateRow {
                key: g.key_label(),
                size: g.size,
                rows: g
                    .record_indices
                    .iter()
                    .map(|i| (i + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        Self {
            title: title.into(),
            generated_at: summary.generated_at.to_rfc3339(),
            format_version: &summary.format_version,
            total_records: summary.total_records,
            records_with_issues: summary.records_with_issues,
            overall_score: format!("{:.2}", summary.overall_quality_score),
            issue_rate_score: format!("{:.2}", summary.issue_rate_score),
            dimensions,
            has_violations: !violations.is_empty(),
            violations,
            has_duplicates: !duplicates.is_empty(),
            duplicates,
            columns: &summary.columns,
        }
    }
}

/// Renders the summary as a standalone HTML page.
pub fn render_html(title: &str, summary: &QualitySummary) -> Result<String> {
    ReportTemplate::new(title, summary)
        .render()
        .map_err(|e| FinqualError::report_failed("HTML template rendering", e))
}

/// Renders and writes the HTML report.
pub async fn save_html_report(title: &str, summary: &QualitySummary, path: &Path) -> Result<()> {
    let html = render_html(title, summary)?;
    tokio::fs::write(path, html)
        .await
        .map_err(|e| FinqualError::io(path, "write to", e))?;
    tracing::info!("HTML report saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finqual_core::models::Column;
    use finqual_core::{QualityAnalyzer, Record};

    fn summary() -> QualitySummary {
        let analyzer = QualityAnalyzer::with_defaults().unwrap();
        let records = vec![
            Record::new()
                .with(Column::ProviderKey, "P<1>")
                .with(Column::OperationStatusType, "PENDING"),
            Record::new().with(Column::ProviderKey, "P<1>"),
        ];
        analyzer.analyze(&records).unwrap().summary
    }

    #[test]
    fn test_report_template_sections() {
        let html = render_html("Sample 25", &summary()).unwrap();

        assert!(html.contains("<title>Sample 25</title>"));
        assert!(html.contains("Overall Quality Score: 0.00%"));
        assert!(html.contains("Threshold Violations"));
        assert!(html.contains("Duplicate Keys"));
        assert!(html.contains("<td>1, 2</td>"));
        assert!(html.contains("<td>completeness</td>"));
    }

    #[test]
    fn test_report_template_escapes_values() {
        let html = render_html("Sample", &summary()).unwrap();

        assert!(!html.contains("P<1>"));
        assert!(html.contains("P&#60;1&#62;") || html.contains("P&lt;1&gt;"));
    }

    #[test]
    fn test_report_template_clean_batch_has_no_violation_section() {
        let analyzer = QualityAnalyzer::new(
            finqual_core::QualityConfig::new()
                .with_completeness_min(0.0)
                .with_uniqueness_min(0.0)
                .with_consistency_min(0.0),
        )
        .unwrap();
        let records = vec![Record::new().with(Column::ProviderKey, "P1")];
        let summary = analyzer.analyze(&records).unwrap().summary;

        let html = render_html("Clean", &summary).unwrap();

        assert!(!html.contains("Threshold Violations"));
        assert!(!html.contains("Duplicate Keys"));
    }
}
