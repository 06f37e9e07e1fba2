//! Core data models for company-period records.
//!
//! A [`Record`] is a fixed, explicitly typed row: every monitored column is a
//! named field, and evaluators address cells through the closed [`Column`]
//! enum rather than by string lookup. Cells carry either text or a number;
//! loaders are responsible for mapping source cells onto these two shapes.
//! Source columns outside the canonical set ride along as extras so that
//! writers can reproduce the input table.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical column names of the company record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "timevalue")]
    TimeValue,
    #[serde(rename = "providerkey")]
    ProviderKey,
    #[serde(rename = "companynameofficial")]
    CompanyNameOfficial,
    #[serde(rename = "fiscalperiodend")]
    FiscalPeriodEnd,
    #[serde(rename = "operationstatustype")]
    OperationStatusType,
    #[serde(rename = "ipostatustype")]
    IpoStatusType,
    #[serde(rename = "geonameen")]
    GeoNameEn,
    #[serde(rename = "industrycode")]
    IndustryCode,
    #[serde(rename = "REVENUE")]
    Revenue,
    #[serde(rename = "unit_REVENUE")]
    UnitRevenue,
}

impl Column {
    /// All columns in source-table order.
    pub const ALL: [Column; 10] = [
        Column::TimeValue,
        Column::ProviderKey,
        Column::CompanyNameOfficial,
        Column::FiscalPeriodEnd,
        Column::OperationStatusType,
        Column::IpoStatusType,
        Column::GeoNameEn,
        Column::IndustryCode,
        Column::Revenue,
        Column::UnitRevenue,
    ];

    /// Returns the canonical header name of the column.
    pub fn name(&self) -> &'static str {
        match self {
            Column::TimeValue => "timevalue",
            Column::ProviderKey => "providerkey",
            Column::CompanyNameOfficial => "companynameofficial",
            Column::FiscalPeriodEnd => "fiscalperiodend",
            Column::OperationStatusType => "operationstatustype",
            Column::IpoStatusType => "ipostatustype",
            Column::GeoNameEn => "geonameen",
            Column::IndustryCode => "industrycode",
            Column::Revenue => "REVENUE",
            Column::UnitRevenue => "unit_REVENUE",
        }
    }

    /// Maps a source header onto a canonical column.
    ///
    /// Exact names win; otherwise the header is matched ignoring ASCII case
    /// and surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .iter()
            .find(|c| c.name() == header)
            .or_else(|| {
                Column::ALL
                    .iter()
                    .find(|c| c.name().eq_ignore_ascii_case(header))
            })
            .copied()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell value.
///
/// Numbers are kept as `f64` so that a NaN sentinel coming from a
/// spreadsheet export survives loading and is recognised as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric cell
    Number(f64),
    /// Text cell
    Text(String),
}

/// Largest magnitude rendered as an integer by [`FieldValue::as_text`].
const INTEGER_RENDER_LIMIT: f64 = 9.0e15;

impl FieldValue {
    /// Returns true for whitespace-only text and for NaN numbers.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(n) => n.is_nan(),
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Canonical text form of the value.
    ///
    /// Integral numbers render without a fractional part so that `2021.0`
    /// and `"2021"` compare equal in uniqueness keys and enum checks.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
            FieldValue::Number(n)
                if n.is_finite() && n.fract() == 0.0 && n.abs() < INTEGER_RENDER_LIMIT =>
            {
                Cow::Owned(format!("{}", *n as i64))
            }
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Interprets the value as a number, parsing text if needed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Short label of the stored shape, used in column metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// One company-period observation.
///
/// Every field is optional: a column absent from the source is simply
/// `None` on every record and surfaces as a completeness issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub timevalue: Option<FieldValue>,
    #[serde(default)]
    pub providerkey: Option<FieldValue>,
    #[serde(default)]
    pub companynameofficial: Option<FieldValue>,
    #[serde(default)]
    pub fiscalperiodend: Option<FieldValue>,
    #[serde(default)]
    pub operationstatustype: Option<FieldValue>,
    #[serde(default)]
    pub ipostatustype: Option<FieldValue>,
    #[serde(default)]
    pub geonameen: Option<FieldValue>,
    #[serde(default)]
    pub industrycode: Option<FieldValue>,
    #[serde(default, rename = "REVENUE")]
    pub revenue: Option<FieldValue>,
    #[serde(default, rename = "unit_REVENUE")]
    pub unit_revenue: Option<FieldValue>,
    /// Populated cells of non-canonical source columns, keyed by header
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw cell for a column.
    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.slot(column).as_ref()
    }

    /// Returns the cell for a column unless it is absent or blank.
    pub fn present(&self, column: Column) -> Option<&FieldValue> {
        self.get(column).filter(|v| !v.is_blank())
    }

    /// Replaces the cell for a column.
    pub fn set(&mut self, column: Column, value: Option<FieldValue>) {
        *self.slot_mut(column) = value;
    }

    /// Builder method to set a column value.
    pub fn with(mut self, column: Column, value: impl Into<FieldValue>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    /// Builder method to clear a column value.
    pub fn without(mut self, column: Column) -> Self {
        self.set(column, None);
        self
    }

    /// Returns the cell of a non-canonical column.
    pub fn extra(&self, name: &str) -> Option<&FieldValue> {
        self.extras.get(name)
    }

    /// Replaces the cell of a non-canonical column; `None` removes it.
    pub fn set_extra(&mut self, name: impl Into<String>, value: Option<FieldValue>) {
        let name = name.into();
        match value {
            Some(value) => {
                self.extras.insert(name, value);
            }
            None => {
                self.extras.remove(&name);
            }
        }
    }

    /// Builder method to set a non-canonical column value.
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set_extra(name, Some(value.into()));
        self
    }

    fn slot(&self, column: Column) -> &Option<FieldValue> {
        match column {
            Column::TimeValue => &self.timevalue,
            Column::ProviderKey => &self.providerkey,
            Column::CompanyNameOfficial => &self.companynameofficial,
            Column::FiscalPeriodEnd => &self.fiscalperiodend,
            Column::OperationStatusType => &self.operationstatustype,
            Column::IpoStatusType => &self.ipostatustype,
            Column::GeoNameEn => &self.geonameen,
            Column::IndustryCode => &self.industrycode,
            Column::Revenue => &self.revenue,
            Column::UnitRevenue => &self.unit_revenue,
        }
    }

    fn slot_mut(&mut self, column: Column) -> &mut Option<FieldValue> {
        match column {
            Column::TimeValue => &mut self.timevalue,
            Column::ProviderKey => &mut self.providerkey,
            Column::CompanyNameOfficial => &mut self.companynameofficial,
            Column::FiscalPeriodEnd => &mut self.fiscalperiodend,
            Column::OperationStatusType => &mut self.operationstatustype,
            Column::IpoStatusType => &mut self.ipostatustype,
            Column::GeoNameEn => &mut self.geonameen,
            Column::IndustryCode => &mut self.industrycode,
            Column::Revenue => &mut self.revenue,
            Column::UnitRevenue => &mut self.unit_revenue,
        }
    }
}
