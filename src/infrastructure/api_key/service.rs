//! API Key service
//!
//! Provides high-level operations for API key management.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::api_key::{
    validate_expiry_days, validate_user_id, ApiKey, ApiKeyRepository, Permission,
};
use crate::domain::DomainError;

use super::generator::{hash_key, ApiKeyGenerator};

/// Input for issuing a new key
#[derive(Debug, Clone)]
pub struct CreateApiKeyRequest {
    pub user_id: String,
    pub permissions: Vec<Permission>,
    /// None = never expires
    pub expires_in_days: Option<i64>,
}

/// Result of creating a new API key
#[derive(Debug)]
pub struct CreateApiKeyResult {
    /// The API key entity (without the secret)
    pub api_key: ApiKey,
    /// The full secret key (only returned once)
    pub secret: String,
}

/// API Key service for managing API keys
#[derive(Debug)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    generator: ApiKeyGenerator,
}

impl ApiKeyService {
    /// Create a new API key service
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Issue a new random API key
    pub async fn create(
        &self,
        request: CreateApiKeyRequest,
    ) -> Result<CreateApiKeyResult, DomainError> {
        let generated = self.generator.generate();
        self.store(generated, request).await
    }

    /// Issue an API key with a known secret
    ///
    /// Used for the bootstrap admin key and for deterministic keys in tests.
    pub async fn create_with_secret(
        &self,
        secret: &str,
        request: CreateApiKeyRequest,
    ) -> Result<CreateApiKeyResult, DomainError> {
        if secret.trim().is_empty() {
            return Err(DomainError::validation("API key secret cannot be empty"));
        }

        let generated = self.generator.from_secret(secret);
        self.store(generated, request).await
    }

    /// Make sure a usable key with this secret exists, creating it if needed
    pub async fn ensure_key_with_secret(
        &self,
        secret: &str,
        request: CreateApiKeyRequest,
    ) -> Result<ApiKey, DomainError> {
        if let Some(existing) = self.repository.find_usable_by_hash(&hash_key(secret)).await? {
            debug!("Bootstrap API key already present: id={}", existing.id());
            return Ok(existing);
        }

        Ok(self.create_with_secret(secret, request).await?.api_key)
    }

    async fn store(
        &self,
        generated: super::generator::GeneratedApiKey,
        request: CreateApiKeyRequest,
    ) -> Result<CreateApiKeyResult, DomainError> {
        validate_user_id(&request.user_id).map_err(|e| DomainError::validation(e.to_string()))?;

        if request.permissions.is_empty() {
            return Err(DomainError::validation("at least one permission is required"));
        }

        let expires_at = match request.expires_in_days {
            Some(days) => {
                validate_expiry_days(days).map_err(|e| DomainError::validation(e.to_string()))?;
                Some(Utc::now() + Duration::days(days))
            }
            None => None,
        };

        let api_key = ApiKey::new(&generated.prefix, &generated.hash, request.user_id.trim())
            .with_permissions(request.permissions)
            .with_expiration(expires_at);

        info!(
            "Creating API key: id={}, user_id={}",
            api_key.id(),
            api_key.user_id()
        );

        let created = self.repository.create(api_key).await?;

        Ok(CreateApiKeyResult {
            api_key: created,
            secret: generated.key,
        })
    }

    /// Resolve a presented key to its record if it is active and unexpired
    ///
    /// A successful lookup refreshes the key's last-used time. That refresh is
    /// best-effort: a failure is logged and the key is still accepted.
    pub async fn validate(&self, key_secret: &str) -> Result<Option<ApiKey>, DomainError> {
        let api_key = self
            .repository
            .find_usable_by_hash(&hash_key(key_secret))
            .await?;

        match api_key {
            Some(key) => {
                if let Err(e) = self.repository.record_usage(key.id()).await {
                    warn!("Failed to record API key usage: {}", e);
                }
                Ok(Some(key))
            }
            None => {
                debug!("API key not found, inactive or expired");
                Ok(None)
            }
        }
    }

    /// List all keys
    pub async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list().await
    }

    /// Deactivate a key; keys are never deleted
    pub async fn deactivate(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deactivating API key: id={}", id);

        if !self.repository.deactivate(id).await? {
            return Err(DomainError::not_found(format!("API key '{}' not found", id)));
        }

        Ok(())
    }
}
