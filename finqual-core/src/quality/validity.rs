//! Validity evaluation for data quality assessment.
//!
//! Checks that populated cells hold plausible values: years inside the
//! configured range, amounts inside their numeric bounds, dates in a known
//! format and codes matching their pattern. Format correctness and value
//! range are separate failure modes and reported separately. Unreadable
//! values become issues; nothing here returns an error.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::models::{FieldValue, Record};

use super::catalog::SchemaCatalog;
use super::models::{Dimension, DimensionOutcome};

/// Reference leap year used to validate yearless day-month values.
const DAY_MONTH_REFERENCE_YEAR: i32 = 2000;

/// What could be read as a year from a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearReading {
    /// An explicit year
    Year(i64),
    /// A valid date that carries no year, such as `30-Jun`
    NoYear,
    /// Neither a year nor a recognised date
    Unreadable,
}

/// Parses text as a calendar date using the given chrono formats.
pub fn parse_calendar_date(text: &str, formats: &[String]) -> Option<NaiveDate> {
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, format)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

/// Parses a yearless `day-Mon` value, rejecting days the month never has.
fn parse_day_month(text: &str, pattern: &Regex) -> Option<(u32, u32)> {
    let captures = pattern.captures(text)?;
    let day: u32 = captures.get(1)?.as_str().parse().ok()?;
    let month = month_number(captures.get(2)?.as_str())?;
    NaiveDate::from_ymd_opt(DAY_MONTH_REFERENCE_YEAR, month, day).map(|_| (day, month))
}

fn month_number(abbreviation: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS
        .iter()
        .position(|m| *m == abbreviation)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Reads the year component of a cell.
///
/// Numbers are truncated to an integer year. Text is tried as an integer
/// year, then as a calendar date, then as a yearless day-month value.
pub fn read_year(value: &FieldValue, catalog: &SchemaCatalog) -> YearReading {
    match value {
        FieldValue::Number(n) if n.is_finite() => YearReading::Year(n.trunc() as i64),
        FieldValue::Number(_) => YearReading::Unreadable,
        FieldValue::Text(text) => {
            let text = text.trim();
            if let Ok(year) = text.parse::<i64>() {
                return YearReading::Year(year);
            }
            if let Ok(number) = text.parse::<f64>() {
                return if number.is_finite() && number.fract() == 0.0 {
                    YearReading::Year(number as i64)
                } else {
                    YearReading::Unreadable
                };
            }
            if let Some(date) = parse_calendar_date(text, catalog.date_formats()) {
                return YearReading::Year(i64::from(date.year()));
            }
            if parse_day_month(text, catalog.day_month()).is_some() {
                return YearReading::NoYear;
            }
            YearReading::Unreadable
        }
    }
}

/// Evaluates validity of one record.
pub fn evaluate_validity(record: &Record, catalog: &SchemaCatalog) -> DimensionOutcome {
    let mut outcome = DimensionOutcome::new(Dimension::Validity);

    for rule in catalog.year_ranges() {
        let Some(value) = record.present(rule.column) else {
            continue;
        };
        match read_year(value, catalog) {
            YearReading::Year(year) if year < i64::from(rule.min) || year > i64::from(rule.max) => {
                outcome.push(
                    rule.column,
                    format!(
                        "{} year {} is outside [{}, {}]",
                        rule.column, year, rule.min, rule.max
                    ),
                );
            }
            YearReading::Year(_) => {}
            YearReading::NoYear if rule.require_year => {
                outcome.push(
                    rule.column,
                    format!("{} value '{}' carries no year", rule.column, value),
                );
            }
            YearReading::Unreadable if rule.require_year => {
                outcome.push(
                    rule.column,
                    format!(
                        "{} value '{}' is not a readable year or date",
                        rule.column, value
                    ),
                );
            }
            YearReading::NoYear | YearReading::Unreadable => {}
        }
    }

    for rule in catalog.numeric_ranges() {
        let Some(value) = record.present(rule.column) else {
            continue;
        };
        match value.as_number() {
            Some(amount) if amount.is_nan() => {
                outcome.push(
                    rule.column,
                    format!("{} value '{}' is not a number", rule.column, value),
                );
            }
            Some(amount) if amount < rule.min || amount > rule.max => {
                outcome.push(
                    rule.column,
                    format!(
                        "{} value {} is outside [{}, {}]",
                        rule.column, amount, rule.min, rule.max
                    ),
                );
            }
            Some(_) => {}
            None => {
                outcome.push(
                    rule.column,
                    format!("{} value '{}' is not numeric", rule.column, value),
                );
            }
        }
    }

    for rule in catalog.date_rules() {
        let Some(value) = record.present(rule.column) else {
            continue;
        };
        let text = value.as_text();
        let is_date = parse_calendar_date(&text, catalog.date_formats()).is_some()
            || (rule.allow_day_month && parse_day_month(&text, catalog.day_month()).is_some());
        if !is_date {
            outcome.push(
                rule.column,
                format!("{} value '{}' is not a valid date", rule.column, text),
            );
        }
    }

    for rule in catalog.validity_patterns() {
        let Some(value) = record.present(rule.column) else {
            continue;
        };
        let text = value.as_text();
        if !rule.regex.is_match(&text) {
            outcome.push(
                rule.column,
                format!(
                    "{} value '{}' does not match {}",
                    rule.column, text, rule.description
                ),
            );
        }
    }

    outcome
}
