//! API Key repository trait

use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use super::entity::ApiKey;
use crate::domain::DomainError;

/// Repository trait for API key storage
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Find a key by hash, only if it is active and not expired
    async fn find_usable_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Get an API key by its ID
    async fn get(&self, id: Uuid) -> Result<Option<ApiKey>, DomainError>;

    /// Create a new API key
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// List all API keys, newest first
    async fn list(&self) -> Result<Vec<ApiKey>, DomainError>;

    /// Mark a key inactive; returns false when no such key exists
    async fn deactivate(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Refresh the last-used timestamp
    async fn record_usage(&self, id: Uuid) -> Result<(), DomainError>;
}
