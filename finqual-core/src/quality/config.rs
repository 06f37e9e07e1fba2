//! Quality assessment configuration.
//!
//! Minimum pass rates per dimension, the annotation fan-out threshold and
//! the catalog definition. Everything is serde data so the whole config can
//! come from a JSON file, with builder methods for programmatic overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::CatalogDefinition;
use super::models::Dimension;

/// Batches at or above this size are annotated in parallel by default.
pub const DEFAULT_PARALLEL_MIN_RECORDS: usize = 10_000;

/// Quality assessment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Minimum completeness pass rate (0.0-1.0)
    pub completeness_min: f64,
    /// Minimum consistency pass rate (0.0-1.0)
    pub consistency_min: f64,
    /// Minimum validity pass rate (0.0-1.0)
    pub validity_min: f64,
    /// Minimum uniqueness pass rate (0.0-1.0)
    pub uniqueness_min: f64,
    /// Record count from which per-row annotation fans out across threads
    pub parallel_min_records: usize,
    /// Column roles and rules
    pub catalog: CatalogDefinition,
}

/// Validation errors for quality configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("completeness_min must be between 0.0 and 1.0, got {0}")]
    InvalidCompleteness(f64),
    #[error("consistency_min must be between 0.0 and 1.0, got {0}")]
    InvalidConsistency(f64),
    #[error("validity_min must be between 0.0 and 1.0, got {0}")]
    InvalidValidity(f64),
    #[error("uniqueness_min must be between 0.0 and 1.0, got {0}")]
    InvalidUniqueness(f64),
    #[error("parallel_min_records must be at least 1")]
    InvalidParallelMinRecords,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            completeness_min: 0.95,
            consistency_min: 0.90,
            validity_min: 0.90,
            // 0.98 is strict: a handful of re-submitted periods trips it.
            uniqueness_min: 0.98,
            parallel_min_records: DEFAULT_PARALLEL_MIN_RECORDS,
            catalog: CatalogDefinition::default(),
        }
    }
}

fn clamp_threshold(name: &str, threshold: f64) -> f64 {
    if !(0.0..=1.0).contains(&threshold) {
        tracing::warn!(
            "{}_min {} clamped to valid range [0.0, 1.0]",
            name,
            threshold
        );
    }
    threshold.clamp(0.0, 1.0)
}

impl QualityConfig {
    /// Creates a new quality config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set completeness threshold.
    pub fn with_completeness_min(mut self, threshold: f64) -> Self {
        self.completeness_min = clamp_threshold("completeness", threshold);
        self
    }

    /// Builder method to set consistency threshold.
    pub fn with_consistency_min(mut self, threshold: f64) -> Self {
        self.consistency_min = clamp_threshold("consistency", threshold);
        self
    }

    /// Builder method to set validity threshold.
    pub fn with_validity_min(mut self, threshold: f64) -> Self {
        self.validity_min = clamp_threshold("validity", threshold);
        self
    }

    /// Builder method to set uniqueness threshold.
    pub fn with_uniqueness_min(mut self, threshold: f64) -> Self {
        self.uniqueness_min = clamp_threshold("uniqueness", threshold);
        self
    }

    /// Builder method to set the threshold of any dimension.
    pub fn with_threshold(self, dimension: Dimension, threshold: f64) -> Self {
        match dimension {
            Dimension::Completeness => self.with_completeness_min(threshold),
            Dimension::Consistency => self.with_consistency_min(threshold),
            Dimension::Validity => self.with_validity_min(threshold),
            Dimension::Uniqueness => self.with_uniqueness_min(threshold),
        }
    }

    /// Builder method to set the parallel annotation threshold.
    pub fn with_parallel_min_records(mut self, records: usize) -> Self {
        self.parallel_min_records = records.max(1);
        self
    }

    /// Builder method to replace the catalog definition.
    pub fn with_catalog(mut self, catalog: CatalogDefinition) -> Self {
        self.catalog = catalog;
        self
    }

    /// Minimum pass rate configured for a dimension.
    pub fn threshold(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Completeness => self.completeness_min,
            Dimension::Consistency => self.consistency_min,
            Dimension::Validity => self.validity_min,
            Dimension::Uniqueness => self.uniqueness_min,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any threshold is outside valid range. The catalog
    /// itself is validated when it is compiled.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.completeness_min) {
            return Err(ConfigValidationError::InvalidCompleteness(
                self.completeness_min,
            ));
        }
        if !(0.0..=1.0).contains(&self.consistency_min) {
            return Err(ConfigValidationError::InvalidConsistency(
                self.consistency_min,
            ));
        }
        if !(0.0..=1.0).contains(&self.validity_min) {
            return Err(ConfigValidationError::InvalidValidity(self.validity_min));
        }
        if !(0.0..=1.0).contains(&self.uniqueness_min) {
            return Err(ConfigValidationError::InvalidUniqueness(
                self.uniqueness_min,
            ));
        }
        if self.parallel_min_records == 0 {
            return Err(ConfigValidationError::InvalidParallelMinRecords);
        }
        Ok(())
    }
}
