//! Schema catalog for the record table.
//!
//! The catalog is the single place that says which columns are monitored and
//! how. A [`CatalogDefinition`] is plain serde data (so it can be loaded from
//! a config file); [`SchemaCatalog::new`] validates it and compiles its
//! patterns once. Evaluators only ever read columns from the compiled
//! catalog, so adding or removing a monitored column is a one-place change.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FinqualError;
use crate::models::Column;
use crate::Result;

/// Declared data type of a column.
///
/// Only the string label returned by [`DataType::as_str`] ever leaves the
/// core; summaries never carry this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Year or date used as the observation period
    Temporal,
    /// Free text
    String,
    /// Date written as text
    DateString,
    /// Value from a closed set
    Category,
    /// Floating point amount
    Float64,
    /// ISO-4217 style currency code
    CurrencyCode,
}

impl DataType {
    /// Canonical label of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Temporal => "temporal",
            DataType::String => "string",
            DataType::DateString => "date_string",
            DataType::Category => "category",
            DataType::Float64 => "float64",
            DataType::CurrencyCode => "currency_code",
        }
    }
}

/// Declared type of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub column: Column,
    pub data_type: DataType,
}

/// Closed set of accepted values for a column.
///
/// Stored values are upper-cased before comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedValues {
    pub column: Column,
    pub values: Vec<String>,
}

/// Regular-expression rule for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    pub column: Column,
    pub pattern: String,
    /// Human readable name of the expected format
    pub description: String,
}

/// Inclusive year range for a date-like column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRange {
    pub column: Column,
    pub min: i32,
    pub max: i32,
    /// When false, values that carry no readable year are left to other rules.
    #[serde(default)]
    pub require_year: bool,
}

/// Inclusive numeric range for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub column: Column,
    pub min: f64,
    pub max: f64,
}

/// Date-format rule for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFormatRule {
    pub column: Column,
    /// Accept yearless day-month values such as `30-Jun`
    #[serde(default)]
    pub allow_day_month: bool,
}

/// Serializable catalog content.
///
/// Missing sections fall back to the financial defaults, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDefinition {
    /// Declared column types
    pub columns: Vec<ColumnDefinition>,
    /// Columns that must be populated
    pub completeness: Vec<Column>,
    /// Columns expected in upper-case or title-case
    pub name_casing: Vec<Column>,
    /// Enumerated-value consistency rules
    pub accepted_values: Vec<AcceptedValues>,
    /// Pattern consistency rules
    pub consistency_patterns: Vec<PatternRule>,
    /// Year range validity rules
    pub year_ranges: Vec<YearRange>,
    /// Numeric range validity rules
    pub numeric_ranges: Vec<NumericRange>,
    /// Pattern validity rules
    pub validity_patterns: Vec<PatternRule>,
    /// chrono format strings recognised as calendar dates
    pub date_formats: Vec<String>,
    /// Date-format validity rules
    pub date_rules: Vec<DateFormatRule>,
    /// Columns forming the uniqueness key
    pub uniqueness_key: Vec<Column>,
}

impl Default for CatalogDefinition {
    fn default() -> Self {
        Self::financial()
    }
}

impl CatalogDefinition {
    /// Catalog for the company financials table.
    pub fn financial() -> Self {
        Self {
            columns: Column::ALL
                .iter()
                .map(|&column| ColumnDefinition {
                    column,
                    data_type: default_data_type(column),
                })
                .collect(),
            completeness: Column::ALL.to_vec(),
            name_casing: vec![Column::CompanyNameOfficial],
            accepted_values: vec![
                AcceptedValues {
                    column: Column::OperationStatusType,
                    values: ["ACTIVE", "INACTIVE", "DORMANT", "LIQUIDATION"]
                        .map(String::from)
                        .to_vec(),
                },
                AcceptedValues {
                    column: Column::IpoStatusType,
                    values: ["PUBLIC", "PRIVATE", "SUBSIDIARY"]
                        .map(String::from)
                        .to_vec(),
                },
            ],
            consistency_patterns: vec![PatternRule {
                column: Column::UnitRevenue,
                pattern: r"^[A-Z]{3}$".to_string(),
                description: "3-letter currency code".to_string(),
            }],
            year_ranges: vec![
                YearRange {
                    column: Column::TimeValue,
                    min: 1900,
                    max: 2030,
                    require_year: true,
                },
                YearRange {
                    column: Column::FiscalPeriodEnd,
                    min: 1900,
                    max: 2030,
                    require_year: false,
                },
            ],
            numeric_ranges: vec![NumericRange {
                column: Column::Revenue,
                min: 0.0,
                max: 1e15,
            }],
            validity_patterns: vec![PatternRule {
                column: Column::IndustryCode,
                pattern: r"^\d{4}\s*-\s*.+".to_string(),
                description: "4-digit industry code with description".to_string(),
            }],
            date_formats: [
                "%Y-%m-%d",
                "%Y/%m/%d",
                "%d-%b-%Y",
                "%d %b %Y",
                "%d/%m/%Y",
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
            ]
            .map(String::from)
            .to_vec(),
            date_rules: vec![DateFormatRule {
                column: Column::FiscalPeriodEnd,
                allow_day_month: true,
            }],
            uniqueness_key: vec![
                Column::ProviderKey,
                Column::TimeValue,
                Column::FiscalPeriodEnd,
            ],
        }
    }
}

fn default_data_type(column: Column) -> DataType {
    match column {
        Column::TimeValue => DataType::Temporal,
        Column::FiscalPeriodEnd => DataType::DateString,
        Column::OperationStatusType | Column::IpoStatusType => DataType::Category,
        Column::Revenue => DataType::Float64,
        Column::UnitRevenue => DataType::CurrencyCode,
        Column::ProviderKey
        | Column::CompanyNameOfficial
        | Column::GeoNameEn
        | Column::IndustryCode => DataType::String,
    }
}

/// A pattern rule with its regex compiled.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub column: Column,
    pub regex: Regex,
    pub description: String,
}

/// Day-month form such as `30-Jun`, without a year.
const DAY_MONTH_PATTERN: &str = r"^(\d{1,2})-(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)$";

/// Validated, compiled catalog shared by all evaluators.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    definition: CatalogDefinition,
    consistency_patterns: Vec<CompiledPattern>,
    validity_patterns: Vec<CompiledPattern>,
    day_month: Regex,
}

impl SchemaCatalog {
    /// Validates a definition and compiles its patterns.
    ///
    /// # Errors
    /// Returns a configuration error for an empty uniqueness key, inverted or
    /// non-finite ranges, empty accepted-value sets, or patterns that fail to
    /// compile.
    pub fn new(definition: CatalogDefinition) -> Result<Self> {
        if definition.uniqueness_key.is_empty() {
            return Err(FinqualError::configuration(
                "catalog uniqueness_key must name at least one column",
            ));
        }

        for range in &definition.year_ranges {
            if range.min > range.max {
                return Err(FinqualError::configuration(format!(
                    "year range for '{}' is inverted: {} > {}",
                    range.column, range.min, range.max
                )));
            }
        }

        for range in &definition.numeric_ranges {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(FinqualError::configuration(format!(
                    "numeric range for '{}' is invalid: [{}, {}]",
                    range.column, range.min, range.max
                )));
            }
        }

        for rule in &definition.accepted_values {
            if rule.values.is_empty() {
                return Err(FinqualError::configuration(format!(
                    "accepted value set for '{}' is empty",
                    rule.column
                )));
            }
        }

        if !definition.date_rules.is_empty() && definition.date_formats.is_empty() {
            return Err(FinqualError::configuration(
                "date rules are declared but no date formats are configured",
            ));
        }

        let consistency_patterns = compile_patterns(&definition.consistency_patterns)?;
        let validity_patterns = compile_patterns(&definition.validity_patterns)?;
        let day_month = Regex::new(DAY_MONTH_PATTERN).map_err(|e| {
            FinqualError::configuration(format!("day-month pattern failed to compile: {}", e))
        })?;

        tracing::debug!(
            "Schema catalog compiled: {} completeness columns, {} uniqueness key columns",
            definition.completeness.len(),
            definition.uniqueness_key.len()
        );

        Ok(Self {
            definition,
            consistency_patterns,
            validity_patterns,
            day_month,
        })
    }

    /// Compiles the financial default catalog.
    pub fn financial() -> Result<Self> {
        Self::new(CatalogDefinition::financial())
    }

    /// Returns the definition the catalog was built from.
    pub fn definition(&self) -> &CatalogDefinition {
        &self.definition
    }

    /// Columns that must be populated.
    pub fn completeness_columns(&self) -> &[Column] {
        &self.definition.completeness
    }

    /// Columns subject to the name casing rule.
    pub fn name_casing_columns(&self) -> &[Column] {
        &self.definition.name_casing
    }

    /// Enumerated-value rules.
    pub fn accepted_values(&self) -> &[AcceptedValues] {
        &self.definition.accepted_values
    }

    /// Compiled consistency pattern rules.
    pub fn consistency_patterns(&self) -> &[CompiledPattern] {
        &self.consistency_patterns
    }

    /// Year range rules.
    pub fn year_ranges(&self) -> &[YearRange] {
        &self.definition.year_ranges
    }

    /// Numeric range rules.
    pub fn numeric_ranges(&self) -> &[NumericRange] {
        &self.definition.numeric_ranges
    }

    /// Compiled validity pattern rules.
    pub fn validity_patterns(&self) -> &[CompiledPattern] {
        &self.validity_patterns
    }

    /// Recognised calendar date formats.
    pub fn date_formats(&self) -> &[String] {
        &self.definition.date_formats
    }

    /// Date-format rules.
    pub fn date_rules(&self) -> &[DateFormatRule] {
        &self.definition.date_rules
    }

    /// Columns forming the uniqueness key.
    pub fn uniqueness_key(&self) -> &[Column] {
        &self.definition.uniqueness_key
    }

    /// Matcher for yearless day-month values.
    pub(crate) fn day_month(&self) -> &Regex {
        &self.day_month
    }

    /// Declared type of a column, `string` when undeclared.
    pub fn declared_type(&self, column: Column) -> DataType {
        self.definition
            .columns
            .iter()
            .find(|c| c.column == column)
            .map_or(DataType::String, |c| c.data_type)
    }

    /// Columns the catalog mentions anywhere, in table order.
    pub fn monitored_columns(&self) -> Vec<Column> {
        let d = &self.definition;
        Column::ALL
            .iter()
            .copied()
            .filter(|column| {
                d.columns.iter().any(|c| c.column == *column)
                    || d.completeness.contains(column)
                    || d.name_casing.contains(column)
                    || d.accepted_values.iter().any(|r| r.column == *column)
                    || d.consistency_patterns.iter().any(|r| r.column == *column)
                    || d.year_ranges.iter().any(|r| r.column == *column)
                    || d.numeric_ranges.iter().any(|r| r.column == *column)
                    || d.validity_patterns.iter().any(|r| r.column == *column)
                    || d.date_rules.iter().any(|r| r.column == *column)
                    || d.uniqueness_key.contains(column)
            })
            .collect()
    }
}

fn compile_patterns(rules: &[PatternRule]) -> Result<Vec<CompiledPattern>> {
    rules
        .iter()
        .map(|rule| {
            let regex = Regex::new(&rule.pattern).map_err(|e| {
                FinqualError::configuration(format!(
                    "pattern for '{}' failed to compile: {}",
                    rule.column, e
                ))
            })?;
            Ok(CompiledPattern {
                column: rule.column,
                regex,
                description: rule.description.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_catalog_compiles() {
        let catalog = SchemaCatalog::financial().unwrap();

        assert_eq!(catalog.completeness_columns().len(), 10);
        assert_eq!(
            catalog.uniqueness_key(),
            &[Column::ProviderKey, Column::TimeValue, Column::FiscalPeriodEnd]
        );
        assert_eq!(catalog.accepted_values().len(), 2);
        assert_eq!(catalog.consistency_patterns().len(), 1);
        assert_eq!(catalog.validity_patterns().len(), 1);
    }

    #[test]
    fn test_declared_types_are_labels() {
        let catalog = SchemaCatalog::financial().unwrap();

        assert_eq!(catalog.declared_type(Column::Revenue).as_str(), "float64");
        assert_eq!(catalog.declared_type(Column::TimeValue).as_str(), "temporal");
        assert_eq!(
            catalog.declared_type(Column::UnitRevenue).as_str(),
            "currency_code"
        );
        assert_eq!(catalog.declared_type(Column::GeoNameEn).as_str(), "string");
    }

    #[test]
    fn test_undeclared_column_defaults_to_string() {
        let definition = CatalogDefinition {
            columns: Vec::new(),
            ..CatalogDefinition::financial()
        };
        let catalog = SchemaCatalog::new(definition).unwrap();

        assert_eq!(catalog.declared_type(Column::Revenue), DataType::String);
    }

    #[test]
    fn test_empty_uniqueness_key_rejected() {
        let definition = CatalogDefinition {
            uniqueness_key: Vec::new(),
            ..CatalogDefinition::financial()
        };

        assert!(matches!(
            SchemaCatalog::new(definition),
            Err(FinqualError::Configuration { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let definition = CatalogDefinition {
            validity_patterns: vec![PatternRule {
                column: Column::IndustryCode,
                pattern: "(unclosed".to_string(),
                description: "broken".to_string(),
            }],
            ..CatalogDefinition::financial()
        };

        let error = SchemaCatalog::new(definition).unwrap_err();
        assert!(error.to_string().contains("industrycode"));
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let years = CatalogDefinition {
            year_ranges: vec![YearRange {
                column: Column::TimeValue,
                min: 2030,
                max: 1900,
                require_year: true,
            }],
            ..CatalogDefinition::financial()
        };
        assert!(SchemaCatalog::new(years).is_err());

        let amounts = CatalogDefinition {
            numeric_ranges: vec![NumericRange {
                column: Column::Revenue,
                min: 0.0,
                max: f64::INFINITY,
            }],
            ..CatalogDefinition::financial()
        };
        assert!(SchemaCatalog::new(amounts).is_err());
    }

    #[test]
    fn test_empty_accepted_values_rejected() {
        let definition = CatalogDefinition {
            accepted_values: vec![AcceptedValues {
                column: Column::IpoStatusType,
                values: Vec::new(),
            }],
            ..CatalogDefinition::financial()
        };

        assert!(SchemaCatalog::new(definition).is_err());
    }

    #[test]
    fn test_partial_definition_uses_defaults() {
        let json = r#"{"uniqueness_key": ["providerkey"]}"#;
        let definition: CatalogDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(definition.uniqueness_key, vec![Column::ProviderKey]);
        assert_eq!(definition.completeness.len(), 10);
        assert_eq!(definition.year_ranges.len(), 2);
    }

    #[test]
    fn test_monitored_columns_follow_table_order() {
        let definition = CatalogDefinition {
            columns: Vec::new(),
            completeness: vec![Column::Revenue],
            name_casing: Vec::new(),
            accepted_values: Vec::new(),
            consistency_patterns: Vec::new(),
            year_ranges: Vec::new(),
            numeric_ranges: Vec::new(),
            validity_patterns: Vec::new(),
            date_formats: Vec::new(),
            date_rules: Vec::new(),
            uniqueness_key: vec![Column::ProviderKey],
        };
        let catalog = SchemaCatalog::new(definition).unwrap();

        assert_eq!(
            catalog.monitored_columns(),
            vec![Column::ProviderKey, Column::Revenue]
        );
    }

    #[test]
    fn test_day_month_matcher() {
        let catalog = SchemaCatalog::financial().unwrap();

        assert!(catalog.day_month().is_match("30-Jun"));
        assert!(catalog.day_month().is_match("1-Dec"));
        assert!(!catalog.day_month().is_match("30-June"));
        assert!(!catalog.day_month().is_match("2021-06-30"));
    }
}
