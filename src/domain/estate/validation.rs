//! Estate field validation

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::{EstateDraft, NumericInput};

static TRANSACTION_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Errors for malformed transaction identifiers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstateValidationError {
    #[error("transaction_id cannot be empty")]
    EmptyId,

    #[error("Invalid ID format: '{0}' is not a UUID")]
    MalformedId(String),
}

/// Check that an identifier has the 8-4-4-4-12 hex grouping (any case)
pub fn validate_transaction_id(id: &str) -> Result<(), EstateValidationError> {
    if id.is_empty() {
        return Err(EstateValidationError::EmptyId);
    }

    if !TRANSACTION_ID_PATTERN.is_match(id) {
        return Err(EstateValidationError::MalformedId(id.to_string()));
    }

    Ok(())
}

/// Collect every field-level problem of a draft, in a stable order:
/// missing required fields, then bad numbers, then the date format.
pub fn validate_draft(draft: &EstateDraft) -> Vec<String> {
    let mut errors = Vec::new();

    let required_text = [
        ("transaction_date", &draft.transaction_date),
        ("city", &draft.city),
        ("district", &draft.district),
    ];

    for (field, value) in required_text {
        if is_blank(value) {
            errors.push(format!("{} is required", field));
        }
    }

    if is_blank(&draft.building_type) {
        errors.push("building_type is required".to_string());
    }

    if draft.price.is_none() {
        errors.push("price is required".to_string());
    }

    let numeric = [
        ("price", &draft.price),
        ("building_area", &draft.building_area),
        ("unit_price", &draft.unit_price),
        ("floor_level", &draft.floor_level),
        ("building_age", &draft.building_age),
        ("total_floors", &draft.total_floors),
        ("land_area", &draft.land_area),
    ];

    for (field, value) in numeric {
        if let Some(input) = value {
            if !is_non_negative(input) {
                errors.push(format!("{} must be a non-negative number", field));
            }
        }
    }

    if let Some(date) = draft.transaction_date.as_deref().filter(|d| !d.trim().is_empty()) {
        if !DATE_PATTERN.is_match(date) {
            errors.push("transaction_date must be formatted as YYYY-MM-DD".to_string());
        } else if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            errors.push("transaction_date is not a valid calendar date".to_string());
        }
    }

    errors
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn is_non_negative(input: &NumericInput) -> bool {
    input.as_f64().is_some_and(|n| n >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> EstateDraft {
        EstateDraft {
            transaction_date: Some("2024-05-01".to_string()),
            city: Some("台北市".to_string()),
            district: Some("信義區".to_string()),
            building_type: Some("住宅".to_string()),
            price: Some(NumericInput::Number(15_000_000.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_transaction_ids() {
        assert!(validate_transaction_id("123e4567-e89b-12d3-a456-426614174000").is_ok());
        assert!(validate_transaction_id("123E4567-E89B-12D3-A456-426614174000").is_ok());
    }

    #[test]
    fn test_invalid_transaction_ids() {
        assert_eq!(validate_transaction_id(""), Err(EstateValidationError::EmptyId));
        assert!(validate_transaction_id("P123456").is_err());
        assert!(validate_transaction_id("123e4567e89b12d3a456426614174000").is_err());
        assert!(validate_transaction_id("{123e4567-e89b-12d3-a456-426614174000}").is_err());
        assert!(validate_transaction_id("g23e4567-e89b-12d3-a456-426614174000").is_err());
    }

    #[test]
    fn test_complete_draft_has_no_errors() {
        assert!(validate_draft(&complete_draft()).is_empty());
    }

    #[test]
    fn test_missing_required_fields_in_order() {
        let errors = validate_draft(&EstateDraft::default());

        assert_eq!(
            errors,
            vec![
                "transaction_date is required",
                "city is required",
                "district is required",
                "building_type is required",
                "price is required",
            ]
        );
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let mut draft = complete_draft();
        draft.city = Some("  ".to_string());

        assert_eq!(validate_draft(&draft), vec!["city is required"]);
    }

    #[test]
    fn test_zero_price_is_accepted() {
        let mut draft = complete_draft();
        draft.price = Some(NumericInput::Number(0.0));

        assert!(validate_draft(&draft).is_empty());
    }

    #[test]
    fn test_negative_and_non_numeric_values() {
        let mut draft = complete_draft();
        draft.building_area = Some(NumericInput::Number(-3.0));
        draft.total_floors = Some(NumericInput::Text("ten".to_string()));

        assert_eq!(
            validate_draft(&draft),
            vec![
                "building_area must be a non-negative number",
                "total_floors must be a non-negative number",
            ]
        );
    }

    #[test]
    fn test_date_format() {
        let mut draft = complete_draft();
        draft.transaction_date = Some("2024/05/01".to_string());
        assert_eq!(
            validate_draft(&draft),
            vec!["transaction_date must be formatted as YYYY-MM-DD"]
        );

        draft.transaction_date = Some("2024-02-30".to_string());
        assert_eq!(
            validate_draft(&draft),
            vec!["transaction_date is not a valid calendar date"]
        );
    }
}
