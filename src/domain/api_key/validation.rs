//! API Key validation utilities

use thiserror::Error;

use super::entity::Permission;

/// Errors that can occur when validating API key input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("user ID cannot be empty")]
    EmptyUserId,

    #[error("unknown permission '{0}'. Allowed values: read, write, admin")]
    UnknownPermission(String),

    #[error("at least one permission is required")]
    NoPermissions,

    #[error("expiry must be at least one day, got {0}")]
    InvalidExpiry(i64),
}

/// Parse a list of permission names, rejecting unknown ones
pub fn parse_permissions<S: AsRef<str>>(
    names: &[S],
) -> Result<Vec<Permission>, ApiKeyValidationError> {
    if names.is_empty() {
        return Err(ApiKeyValidationError::NoPermissions);
    }

    names.iter().map(|name| name.as_ref().parse()).collect()
}

/// Validate the owner of a new key
pub fn validate_user_id(user_id: &str) -> Result<(), ApiKeyValidationError> {
    if user_id.trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyUserId);
    }

    Ok(())
}

/// Validate a lifetime given in days
pub fn validate_expiry_days(days: i64) -> Result<(), ApiKeyValidationError> {
    if days < 1 {
        return Err(ApiKeyValidationError::InvalidExpiry(days));
    }

    Ok(())
}
