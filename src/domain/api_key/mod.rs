//! API Key domain
//!
//! This module provides domain types and traits for API key management:
//! permissions, expiry semantics and the storage abstraction.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, Permission};
pub use repository::ApiKeyRepository;
pub use validation::{
    parse_permissions, validate_expiry_days, validate_user_id, ApiKeyValidationError,
};

#[cfg(test)]
pub use repository::mock::MockApiKeyRepository;
