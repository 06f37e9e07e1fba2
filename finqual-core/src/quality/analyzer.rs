//! Quality analyzer facade.
//!
//! This module provides the main `QualityAnalyzer` that compiles the catalog
//! once and runs annotation and aggregation over a batch of records.

use crate::Result;
use crate::error::FinqualError;
use crate::models::Record;

use super::aggregator::summarize;
use super::annotator::annotate_records;
use super::catalog::SchemaCatalog;
use super::config::QualityConfig;
use super::models::QualityReport;

/// Quality analyzer for financial company records.
///
/// # Example
///
/// ```rust,ignore
/// use finqual_core::quality::{QualityAnalyzer, QualityConfig};
///
/// let analyzer = QualityAnalyzer::new(QualityConfig::default())?;
/// let report = analyzer.analyze(&records)?;
/// println!("Quality score: {:.2}%", report.summary.overall_quality_score);
/// ```
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    config: QualityConfig,
    catalog: SchemaCatalog,
}

impl QualityAnalyzer {
    /// Creates a new quality analyzer with the given configuration.
    ///
    /// # Errors
    /// Returns a configuration error if a threshold is out of range or the
    /// catalog definition does not compile.
    pub fn new(config: QualityConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| FinqualError::configuration(e.to_string()))?;
        let catalog = SchemaCatalog::new(config.catalog.clone())?;
        Ok(Self { config, catalog })
    }

    /// Creates a new quality analyzer with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(QualityConfig::default())
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Returns the compiled catalog.
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Annotates every record and summarizes the batch.
    ///
    /// Malformed values become issues; only an empty batch is an error.
    pub fn analyze(&self, records: &[Record]) -> Result<QualityReport> {
        if records.is_empty() {
            return Err(FinqualError::EmptyDataset);
        }

        tracing::info!("Running data quality checks on {} records", records.len());
        let parallel = records.len() >= self.config.parallel_min_records;
        let (annotated, uniqueness) = annotate_records(records, &self.catalog, parallel);

        let summary = summarize(&annotated, uniqueness, &self.catalog, &self.config)?;
        tracing::info!(
            "All data quality checks completed: {} of {} records affected",
            summary.records_with_issues,
            summary.total_records
        );

        Ok(QualityReport {
            records: annotated,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;
    use crate::quality::catalog::CatalogDefinition;

    fn record(provider: &str) -> Record {
        Record::new()
            .with(Column::TimeValue, 2022_i64)
            .with(Column::ProviderKey, provider)
            .with(Column::CompanyNameOfficial, "NORDIC SHIPPING AS")
            .with(Column::FiscalPeriodEnd, "2022-12-31")
            .with(Column::OperationStatusType, "ACTIVE")
            .with(Column::IpoStatusType, "PRIVATE")
            .with(Column::GeoNameEn, "Norway")
            .with(Column::IndustryCode, "5010 - Sea and coastal passenger water transport")
            .with(Column::Revenue, 8.1e7)
            .with(Column::UnitRevenue, "NOK")
    }

    #[test]
    fn test_analyzer_creation() {
        let config = QualityConfig::default();
        let analyzer = QualityAnalyzer::new(config.clone()).unwrap();

        assert_eq!(analyzer.config().completeness_min, config.completeness_min);
        assert_eq!(analyzer.catalog().uniqueness_key().len(), 3);
    }

    #[test]
    fn test_analyzer_rejects_invalid_config() {
        let config = QualityConfig {
            consistency_min: 2.0,
            ..QualityConfig::default()
        };
        assert!(matches!(
            QualityAnalyzer::new(config),
            Err(FinqualError::Configuration { .. })
        ));

        let catalog = CatalogDefinition {
            uniqueness_key: Vec::new(),
            ..CatalogDefinition::default()
        };
        assert!(QualityAnalyzer::new(QualityConfig::new().with_catalog(catalog)).is_err());
    }

    #[test]
    fn test_analyzer_empty_batch() {
        let analyzer = QualityAnalyzer::with_defaults().unwrap();

        assert!(matches!(
            analyzer.analyze(&[]),
            Err(FinqualError::EmptyDataset)
        ));
    }

    #[test]
    fn test_analyzer_clean_batch() {
        let analyzer = QualityAnalyzer::with_defaults().unwrap();
        let records = vec![record("N1"), record("N2"), record("N3")];

        let report = analyzer.analyze(&records).unwrap();

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.summary.total_records, 3);
        assert_eq!(report.summary.overall_quality_score, 100.0);
        assert!(report.summary.duplicate_groups.is_empty());
    }

    #[test]
    fn test_analyzer_reports_duplicate_groups() {
        let analyzer = QualityAnalyzer::with_defaults().unwrap();
        let records = vec![record("N1"), record("N2"), record("N1")];

        let report = analyzer.analyze(&records).unwrap();

        assert_eq!(report.summary.duplicate_groups.len(), 1);
        assert_eq!(report.summary.duplicate_groups[0].record_indices, vec![0, 2]);
        assert_eq!(report.summary.quality_measures.uniqueness.total_issues, 2);
    }

    #[test]
    fn test_analyzer_parallel_threshold_same_result() {
        let records: Vec<Record> = (0..50).map(|i| record(&format!("N{}", i % 40))).collect();

        let sequential = QualityAnalyzer::with_defaults()
            .unwrap()
            .analyze(&records)
            .unwrap();
        let parallel = QualityAnalyzer::new(QualityConfig::new().with_parallel_min_records(1))
            .unwrap()
            .analyze(&records)
            .unwrap();

        assert_eq!(sequential.records, parallel.records);
        assert_eq!(
            sequential.summary.quality_measures,
            parallel.summary.quality_measures
        );
    }

    #[test]
    fn test_violation_severity_assignment() {
        let analyzer = QualityAnalyzer::with_defaults().unwrap();
        let records = vec![
            record("N1").without(Column::Revenue),
            record("N2").without(Column::Revenue),
            record("N3").without(Column::Revenue),
            record("N4"),
            record("N5"),
        ];

        let report = analyzer.analyze(&records).unwrap();

        let completeness_violation = report
            .summary
            .threshold_violations
            .iter()
            .find(|v| v.metric == "completeness");

        assert!(completeness_violation.is_some());
    }
}
