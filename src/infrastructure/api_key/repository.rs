//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::generator::constant_time_compare;
use crate::domain::api_key::{ApiKey, ApiKeyRepository};
use crate::domain::DomainError;

/// In-memory implementation of ApiKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<Uuid, ApiKey>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn find_usable_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        let now = Utc::now();

        Ok(keys
            .values()
            .find(|k| constant_time_compare(k.key_hash(), key_hash) && k.is_usable_at(now))
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(&id).cloned())
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;

        if keys.contains_key(&api_key.id()) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                api_key.id()
            )));
        }

        if keys.values().any(|k| k.key_hash() == api_key.key_hash()) {
            return Err(DomainError::conflict("API key already exists"));
        }

        keys.insert(api_key.id(), api_key.clone());

        Ok(api_key)
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut result: Vec<ApiKey> = keys.values().cloned().collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(result)
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut keys = self.keys.write().await;

        match keys.get_mut(&id) {
            Some(key) => {
                key.deactivate();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_usage(&self, id: Uuid) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;

        if let Some(key) = keys.get_mut(&id) {
            key.record_usage();
            Ok(())
        } else {
            Err(DomainError::not_found(format!("API key '{}' not found", id)))
        }
    }
}
