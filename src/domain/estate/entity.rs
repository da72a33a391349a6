//! Estate record entity and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_draft, validate_transaction_id, EstateValidationError};
use crate::domain::DomainError;

/// Identifier of a transaction row
///
/// Server-generated identifiers are UUID v4 strings. Client-supplied identifiers
/// must have the same 8-4-4-4-12 hex shape so every record stays addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an identifier used to address an existing row (must be UUID-shaped)
    pub fn parse(id: &str) -> Result<Self, EstateValidationError> {
        validate_transaction_id(id)?;
        Ok(Self(id.to_string()))
    }

    /// Wrap an identifier read back from storage
    ///
    /// Rows written before ids were checked may not be UUID-shaped; they are
    /// still listed, only addressing them by id is refused.
    pub fn from_stored(id: impl Into<String>) -> Result<Self, EstateValidationError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(EstateValidationError::EmptyId);
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of real-estate transaction data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estate {
    pub transaction_id: TransactionId,
    pub transaction_date: NaiveDate,
    pub city: String,
    pub district: String,
    pub address: Option<String>,
    pub building_type: String,
    pub price: f64,
    pub building_area: Option<f64>,
    pub unit_price: Option<f64>,
    pub floor_level: Option<f64>,
    pub building_age: Option<f64>,
    pub total_floors: Option<f64>,
    pub land_area: Option<f64>,
    pub main_use: Option<String>,
    pub construction_materials: Option<String>,
    pub transaction_type: Option<String>,
}

/// Numeric input that arrives either as a JSON number or as a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Interpret the input as a finite number
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };

        value.is_finite().then_some(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Unvalidated estate payload as received in create and replace requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EstateDraft {
    pub transaction_id: Option<String>,
    pub transaction_date: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub address: Option<String>,
    pub building_type: Option<String>,
    pub price: Option<NumericInput>,
    pub building_area: Option<NumericInput>,
    pub unit_price: Option<NumericInput>,
    pub floor_level: Option<NumericInput>,
    pub building_age: Option<NumericInput>,
    pub total_floors: Option<NumericInput>,
    pub land_area: Option<NumericInput>,
    pub main_use: Option<String>,
    pub construction_materials: Option<String>,
    pub transaction_type: Option<String>,
}

impl EstateDraft {
    /// Validate the draft and turn it into a record stored under `id`
    ///
    /// All field problems are reported together.
    pub fn into_estate(self, id: TransactionId) -> Result<Estate, DomainError> {
        let errors = validate_draft(&self);

        if !errors.is_empty() {
            return Err(DomainError::invalid_record(errors));
        }

        let transaction_date = self
            .transaction_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| DomainError::internal("transaction_date passed validation but did not parse"))?;
        let price = self
            .price
            .as_ref()
            .and_then(NumericInput::as_f64)
            .ok_or_else(|| DomainError::internal("price passed validation but did not parse"))?;

        Ok(Estate {
            transaction_id: id,
            transaction_date,
            city: required_text(self.city),
            district: required_text(self.district),
            address: optional_text(self.address),
            building_type: required_text(self.building_type),
            price,
            building_area: optional_number(&self.building_area),
            unit_price: optional_number(&self.unit_price),
            floor_level: optional_number(&self.floor_level),
            building_age: optional_number(&self.building_age),
            total_floors: optional_number(&self.total_floors),
            land_area: optional_number(&self.land_area),
            main_use: optional_text(self.main_use),
            construction_materials: optional_text(self.construction_materials),
            transaction_type: optional_text(self.transaction_type),
        })
    }
}

fn required_text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn optional_number(value: &Option<NumericInput>) -> Option<f64> {
    value.as_ref().and_then(NumericInput::as_f64)
}

/// Rows of one page of a list query plus the total number of matching rows
#[derive(Debug, Clone, Default)]
pub struct EstatePage {
    pub rows: Vec<Estate>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taipei_draft() -> EstateDraft {
        EstateDraft {
            transaction_date: Some("2024-05-01".to_string()),
            city: Some("台北市".to_string()),
            district: Some("信義區".to_string()),
            building_type: Some("住宅".to_string()),
            price: Some(15_000_000.0.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_id_is_uuid_shaped() {
        let id = TransactionId::generate();
        assert!(TransactionId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_stored_id_must_not_be_blank() {
        assert!(TransactionId::from_stored("   ").is_err());
        assert!(TransactionId::from_stored("P123456").is_ok());
    }

    #[test]
    fn test_parse_rejects_legacy_ids() {
        assert!(matches!(
            TransactionId::parse("P-2024-0001"),
            Err(EstateValidationError::MalformedId(_))
        ));
    }

    #[test]
    fn test_numeric_input_accepts_numeric_strings() {
        assert_eq!(NumericInput::Text(" 42.5 ".to_string()).as_f64(), Some(42.5));
        assert_eq!(NumericInput::Number(7.0).as_f64(), Some(7.0));
        assert_eq!(NumericInput::Text("abc".to_string()).as_f64(), None);
        assert_eq!(NumericInput::Text("NaN".to_string()).as_f64(), None);
    }

    #[test]
    fn test_into_estate_builds_record() {
        let id = TransactionId::generate();
        let estate = taipei_draft().into_estate(id.clone()).unwrap();

        assert_eq!(estate.transaction_id, id);
        assert_eq!(estate.city, "台北市");
        assert_eq!(estate.price, 15_000_000.0);
        assert_eq!(
            estate.transaction_date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert!(estate.address.is_none());
    }

    #[test]
    fn test_into_estate_reports_all_errors() {
        let draft = EstateDraft {
            city: Some("台北市".to_string()),
            price: Some(NumericInput::Number(-1.0)),
            land_area: Some(NumericInput::Text("big".to_string())),
            ..Default::default()
        };

        let err = draft.into_estate(TransactionId::generate()).unwrap_err();

        match err {
            DomainError::InvalidRecord { errors } => {
                assert!(errors.iter().any(|e| e.starts_with("transaction_date")));
                assert!(errors.iter().any(|e| e.starts_with("district")));
                assert!(errors.iter().any(|e| e.starts_with("price")));
                assert!(errors.iter().any(|e| e.starts_with("land_area")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_draft_deserializes_numbers_and_strings() {
        let json = r#"{
            "transaction_date": "2024-05-01",
            "city": "台北市",
            "district": "信義區",
            "building_type": "住宅",
            "price": "15000000",
            "building_area": 30.5
        }"#;

        let draft: EstateDraft = serde_json::from_str(json).unwrap();
        let estate = draft.into_estate(TransactionId::generate()).unwrap();

        assert_eq!(estate.price, 15_000_000.0);
        assert_eq!(estate.building_area, Some(30.5));
    }
}
