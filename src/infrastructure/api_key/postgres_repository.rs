//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::warn;
use uuid::Uuid;

use crate::domain::api_key::{ApiKey, ApiKeyRepository, Permission};
use crate::domain::DomainError;

const API_KEY_COLUMNS: &str =
    "id, key_prefix, key_hash, user_id, permissions, is_active, expires_at, last_used_at, created_at";

/// PostgreSQL implementation of ApiKeyRepository over the `api_keys` table
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn find_usable_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let sql = format!(
            "SELECT {} FROM api_keys \
             WHERE key_hash = $1 AND is_active = TRUE AND (expires_at IS NULL OR expires_at > NOW())",
            API_KEY_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApiKey>, DomainError> {
        let sql = format!("SELECT {} FROM api_keys WHERE id = $1", API_KEY_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let permissions: Vec<String> = api_key
            .permissions()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO api_keys (id, key_prefix, key_hash, user_id, permissions, is_active,
                                  expires_at, last_used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(api_key.id())
        .bind(api_key.key_prefix())
        .bind(api_key.key_hash())
        .bind(api_key.user_id())
        .bind(&permissions)
        .bind(api_key.is_active())
        .bind(api_key.expires_at())
        .bind(api_key.last_used_at())
        .bind(api_key.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::conflict("API key already exists")
            }
            _ => DomainError::storage(format!("Failed to create API key: {}", e)),
        })?;

        Ok(api_key)
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let sql = format!(
            "SELECT {} FROM api_keys ORDER BY created_at DESC",
            API_KEY_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to deactivate API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_usage(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to record API key usage: {}", e)))?;

        Ok(())
    }
}

fn row_to_api_key(row: &sqlx::postgres::PgRow) -> Result<ApiKey, DomainError> {
    let map_err = |e: sqlx::Error| DomainError::storage(format!("Invalid API key row: {}", e));

    let id: Uuid = row.try_get("id").map_err(map_err)?;
    let key_prefix: String = row.try_get("key_prefix").map_err(map_err)?;
    let key_hash: String = row.try_get("key_hash").map_err(map_err)?;
    let user_id: String = row.try_get("user_id").map_err(map_err)?;
    let permission_names: Vec<String> = row.try_get("permissions").map_err(map_err)?;
    let is_active: bool = row.try_get("is_active").map_err(map_err)?;
    let expires_at: Option<DateTime<Utc>> = row.try_get("expires_at").map_err(map_err)?;
    let last_used_at: Option<DateTime<Utc>> = row.try_get("last_used_at").map_err(map_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_err)?;

    Ok(ApiKey::new(key_prefix, key_hash, user_id)
        .with_id(id)
        .with_permissions(parse_stored_permissions(&permission_names))
        .with_active(is_active)
        .with_expiration(expires_at)
        .with_last_used_at(last_used_at)
        .with_created_at(created_at))
}

/// Unknown names in storage are skipped rather than failing the whole row
fn parse_stored_permissions(names: &[String]) -> Vec<Permission> {
    names
        .iter()
        .filter_map(|name| match name.parse::<Permission>() {
            Ok(permission) => Some(permission),
            Err(e) => {
                warn!("Ignoring stored permission: {}", e);
                None
            }
        })
        .collect()
}
