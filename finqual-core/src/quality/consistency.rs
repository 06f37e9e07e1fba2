//! Consistency evaluation for data quality assessment.
//!
//! Checks formatting conventions on populated cells: company name casing,
//! enumerated status values and code patterns. Every sub-check runs even
//! after an earlier one fails so the issue list is complete. Missing cells
//! are skipped here; they are a completeness finding.

use crate::models::Record;

use super::catalog::SchemaCatalog;
use super::models::{Dimension, DimensionOutcome};

/// Returns true if the text has cased characters and none are lower-case.
fn is_upper_case(text: &str) -> bool {
    let mut cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Returns true if every cased run starts upper-case and continues lower-case.
///
/// Any uncased character (space, digit, punctuation) starts a new run, so
/// `"Acme Holdings (Uk) Ltd"` is title-case while `"ACME Holdings"` and
/// `"Acme holdings"` are not.
fn is_title_case(text: &str) -> bool {
    let mut cased = false;
    let mut previous_is_cased = false;
    for ch in text.chars() {
        if ch.is_uppercase() {
            if previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            cased = true;
        } else if ch.is_lowercase() {
            if !previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            cased = true;
        } else {
            previous_is_cased = false;
        }
    }
    cased
}

/// Returns true if a name is in one of the accepted normalized forms.
pub fn has_normalized_casing(name: &str) -> bool {
    is_upper_case(name) || is_title_case(name)
}

/// Evaluates consistency of one record.
pub fn evaluate_consistency(record: &Record, catalog: &SchemaCatalog) -> DimensionOutcome {
    let mut outcome = DimensionOutcome::new(Dimension::Consistency);

    for &column in catalog.name_casing_columns() {
        if let Some(value) = record.present(column) {
            let name = value.as_text();
            if !has_normalized_casing(&name) {
                outcome.push(
                    column,
                    format!("{} '{}' is neither upper-case nor title-case", column, name),
                );
            }
        }
    }

    for rule in catalog.accepted_values() {
        if let Some(value) = record.present(rule.column) {
            let normalized = value.as_text().to_uppercase();
            if !rule
                .values
                .iter()
                .any(|accepted| accepted.to_uppercase() == normalized)
            {
                outcome.push(
                    rule.column,
                    format!(
                        "{} value '{}' is not one of [{}]",
                        rule.column,
                        value,
                        rule.values.join(", ")
                    ),
                );
            }
        }
    }

    // Codes are compared upper-cased, like the enumerated values above.
    for rule in catalog.consistency_patterns() {
        if let Some(value) = record.present(rule.column) {
            let text = value.as_text();
            if !rule.regex.is_match(&text.to_uppercase()) {
                outcome.push(
                    rule.column,
                    format!(
                        "{} value '{}' is not a {}",
                        rule.column, text, rule.description
                    ),
                );
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn consistent_record() -> Record {
        Record::new()
            .with(Column::CompanyNameOfficial, "Acme Holdings Ltd")
            .with(Column::OperationStatusType, "ACTIVE")
            .with(Column::IpoStatusType, "PRIVATE")
            .with(Column::UnitRevenue, "USD")
    }

    #[test]
    fn test_consistency_clean_record() {
        let catalog = SchemaCatalog::financial().unwrap();
        let outcome = evaluate_consistency(&consistent_record(), &catalog);

        assert!(!outcome.has_issue());
    }

    #[test]
    fn test_consistency_operation_status_enum() {
        let catalog = SchemaCatalog::financial().unwrap();

        for status in ["ACTIVE", "INACTIVE", "DORMANT", "LIQUIDATION", "active"] {
            let record = consistent_record().with(Column::OperationStatusType, status);
            assert!(
                !evaluate_consistency(&record, &catalog).has_issue(),
                "{} should pass",
                status
            );
        }

        let record = consistent_record().with(Column::OperationStatusType, "PENDING");
        let outcome = evaluate_consistency(&record, &catalog);
        assert!(outcome.has_issue());
        assert_eq!(outcome.issues[0].column, Some(Column::OperationStatusType));
        assert!(outcome.issues[0].description.contains("PENDING"));
    }

    #[test]
    fn test_consistency_ipo_status_enum() {
        let catalog = SchemaCatalog::financial().unwrap();

        let record = consistent_record().with(Column::IpoStatusType, "SUBSIDIARY");
        assert!(!evaluate_consistency(&record, &catalog).has_issue());

        let record = consistent_record().with(Column::IpoStatusType, "LISTED");
        assert!(evaluate_consistency(&record, &catalog).has_issue());
    }

    #[test]
    fn test_consistency_currency_code_pattern() {
        let catalog = SchemaCatalog::financial().unwrap();

        for code in ["US", "USDX", "U$D", "eu"] {
            let record = consistent_record().with(Column::UnitRevenue, code);
            let outcome = evaluate_consistency(&record, &catalog);
            assert!(outcome.has_issue(), "{} should fail", code);
            assert_eq!(outcome.issues[0].column, Some(Column::UnitRevenue));
        }
    }

    #[test]
    fn test_consistency_currency_code_ignores_case() {
        let catalog = SchemaCatalog::financial().unwrap();

        for code in ["usd", "Eur", "CHF"] {
            let record = consistent_record()
                .with(Column::OperationStatusType, "active")
                .with(Column::UnitRevenue, code);
            assert!(
                !evaluate_consistency(&record, &catalog).has_issue(),
                "{} should pass",
                code
            );
        }
    }

    #[test]
    fn test_consistency_name_casing() {
        let catalog = SchemaCatalog::financial().unwrap();

        for name in ["ACME HOLDINGS LTD", "Acme Holdings Ltd", "A.B.C. (UK) PLC"] {
            let record = consistent_record().with(Column::CompanyNameOfficial, name);
            assert!(
                !evaluate_consistency(&record, &catalog).has_issue(),
                "{} should pass",
                name
            );
        }

        for name in ["acme holdings", "ACME Holdings", "Acme holdings Ltd", "12345"] {
            let record = consistent_record().with(Column::CompanyNameOfficial, name);
            assert!(
                evaluate_consistency(&record, &catalog).has_issue(),
                "{} should fail",
                name
            );
        }
    }

    #[test]
    fn test_consistency_checks_do_not_short_circuit() {
        let catalog = SchemaCatalog::financial().unwrap();
        let record = Record::new()
            .with(Column::CompanyNameOfficial, "acme")
            .with(Column::OperationStatusType, "UNKNOWN")
            .with(Column::IpoStatusType, "LISTED")
            .with(Column::UnitRevenue, "dollars");

        let outcome = evaluate_consistency(&record, &catalog);

        assert_eq!(outcome.issues.len(), 4);
    }

    #[test]
    fn test_consistency_skips_missing_cells() {
        let catalog = SchemaCatalog::financial().unwrap();
        let record = Record::new().with(Column::UnitRevenue, " ");

        assert!(!evaluate_consistency(&record, &catalog).has_issue());
    }

    #[test]
    fn test_numeric_status_is_inconsistent() {
        let catalog = SchemaCatalog::financial().unwrap();
        let record = consistent_record().with(Column::OperationStatusType, 1_i64);

        assert!(evaluate_consistency(&record, &catalog).has_issue());
    }

    #[test]
    fn test_casing_helpers() {
        assert!(is_upper_case("ACME & CO."));
        assert!(!is_upper_case("1234"));
        assert!(is_title_case("Acme & Co."));
        assert!(is_title_case("O'Neil Group"));
        assert!(!is_title_case("McDonald Corp"));
        assert!(!is_title_case(""));
    }
}
