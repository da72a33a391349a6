//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;
pub mod estate;

pub use api_key::{ApiKey, ApiKeyRepository, ApiKeyValidationError, Permission};
pub use error::DomainError;
pub use estate::{
    Estate, EstateDraft, EstateFilter, EstatePage, EstateQuery, EstateRepository,
    EstateValidationError, Pagination, SqlParam, TransactionId,
};
