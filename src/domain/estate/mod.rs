//! Estate domain
//!
//! Transaction records, their validation rules, the parameterized list query
//! builder and the repository abstraction over storage.

mod entity;
mod query;
mod repository;
mod validation;

pub use entity::{Estate, EstateDraft, EstatePage, NumericInput, TransactionId};
pub use query::{EstateFilter, EstateQuery, Pagination, SqlParam, ESTATE_COLUMNS, ESTATE_TABLE};
pub use repository::EstateRepository;
pub use validation::{validate_draft, validate_transaction_id, EstateValidationError};

#[cfg(test)]
pub use repository::mock::MockEstateRepository;
