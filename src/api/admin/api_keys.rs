//! API key management admin endpoints
//!
//! Bodies use camelCase, as consumed by the admin panel.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path};
use crate::domain::api_key::{parse_permissions, ApiKey, Permission};
use crate::infrastructure::api_key::CreateApiKeyRequest;

/// Request to issue a new key
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub user_id: String,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub expires_in_days: Option<i64>,
}

/// API key as shown to administrators; never carries the secret
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub key_prefix: String,
    pub user_id: String,
    pub permissions: Vec<Permission>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ApiKey> for ApiKeyResponse {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id(),
            key_prefix: key.key_prefix().to_string(),
            user_id: key.user_id().to_string(),
            permissions: key.permissions().to_vec(),
            is_active: key.is_active(),
            expires_at: key.expires_at(),
            last_used_at: key.last_used_at(),
            created_at: key.created_at(),
        }
    }
}

/// Creation response: the record plus the full key, shown only this once
#[derive(Debug, Clone, Serialize)]
pub struct CreatedKeyResponse {
    #[serde(flatten)]
    pub api_key: ApiKeyResponse,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct DeactivatedResponse {
    pub message: &'static str,
    pub id: Uuid,
}

/// GET /admin/keys
pub async fn list_keys(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    debug!(admin_key = %admin.id(), "Listing API keys");

    let keys = state.api_key_service.list().await?;

    Ok(Json(keys.iter().map(ApiKeyResponse::from).collect()))
}

/// POST /admin/keys
pub async fn create_key(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(admin_key = %admin.id(), user_id = %request.user_id, "Creating API key");

    let permissions = match request.permissions {
        Some(names) => parse_permissions(&names)
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("permissions"))?,
        None => vec![Permission::Read],
    };

    let created = state
        .api_key_service
        .create(CreateApiKeyRequest {
            user_id: request.user_id,
            permissions,
            expires_in_days: request.expires_in_days,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedKeyResponse {
            api_key: ApiKeyResponse::from(&created.api_key),
            key: created.secret,
        }),
    ))
}

/// PATCH /admin/keys/{id}/deactivate
pub async fn deactivate_key(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<DeactivatedResponse>, ApiError> {
    debug!(admin_key = %admin.id(), key_id = %id, "Deactivating API key");

    let id = Uuid::parse_str(&id).map_err(|_| {
        ApiError::bad_request(format!("Invalid API key ID: '{}'", id)).with_param("id")
    })?;

    state.api_key_service.deactivate(id).await?;

    Ok(Json(DeactivatedResponse {
        message: "API key deactivated",
        id,
    }))
}
