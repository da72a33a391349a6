//! API key authentication
//!
//! [`require_api_key`] gates every request except the public paths. The key
//! record it resolves is stored in the request extensions, where the
//! [`RequireApiKey`], [`RequireWrite`] and [`RequireAdmin`] extractors pick it up.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{ApiKey, Permission};

/// Header carrying the caller's key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Paths served without a key (exact match)
pub const PUBLIC_PATHS: [&str; 2] = ["/health", "/api-docs"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Middleware enforcing the `X-API-KEY` header
///
/// Missing or empty header: 401. Unknown, inactive or expired key: 403.
/// A storage failure during lookup: 500.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let presented = extract_api_key(request.headers()).ok_or_else(|| {
        debug!(path = %request.uri().path(), "Rejected request without API key");
        ApiError::unauthorized("API key is required")
    })?;

    let api_key = state
        .api_key_service
        .validate(&presented)
        .await?
        .ok_or_else(|| {
            warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            ApiError::forbidden("API key is invalid or expired")
        })?;

    debug!(key_id = %api_key.id(), user_id = %api_key.user_id(), "API key accepted");

    request.extensions_mut().insert(api_key);

    Ok(next.run(request).await)
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The key that authenticated the current request
#[derive(Debug, Clone)]
pub struct RequireApiKey(pub ApiKey);

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ApiKey>()
            .cloned()
            .map(RequireApiKey)
            .ok_or_else(|| ApiError::unauthorized("API key is required"))
    }
}

/// An authenticated key holding the `write` permission
#[derive(Debug, Clone)]
pub struct RequireWrite(pub ApiKey);

impl<S> FromRequestParts<S> for RequireWrite
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireApiKey(api_key) = RequireApiKey::from_request_parts(parts, state).await?;

        if !api_key.has_permission(Permission::Write) {
            warn!(key_id = %api_key.id(), "Write permission required");
            return Err(ApiError::forbidden("Write permission required"));
        }

        Ok(RequireWrite(api_key))
    }
}

/// An authenticated key holding the `admin` permission
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub ApiKey);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireApiKey(api_key) = RequireApiKey::from_request_parts(parts, state).await?;

        if !api_key.has_permission(Permission::Admin) {
            warn!(key_id = %api_key.id(), "Admin permission required");
            return Err(ApiError::forbidden("Admin permission required"));
        }

        Ok(RequireAdmin(api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-KEY", "ek_test-key-67890".parse().unwrap());

        assert_eq!(extract_api_key(&headers), Some("ek_test-key-67890".to_string()));
    }

    #[test]
    fn test_missing_or_blank_key() {
        assert!(extract_api_key(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, "   ".parse().unwrap());
        assert!(extract_api_key(&headers).is_none());
    }

    #[test]
    fn test_bearer_is_not_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer ek_test".parse().unwrap());

        assert!(extract_api_key(&headers).is_none());
    }

    #[test]
    fn test_public_paths_match_exactly() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/api-docs"));
        assert!(!is_public_path("/health/extra"));
        assert!(!is_public_path("/estates"));
    }

    #[tokio::test]
    async fn test_admin_extractor_checks_permission() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        parts
            .extensions
            .insert(ApiKey::new("ek_", "sha256$x", "user-1"));

        let err = RequireAdmin::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        parts.extensions.insert(
            ApiKey::new("ek_", "sha256$x", "user-1").with_permissions([Permission::Admin]),
        );
        assert!(RequireAdmin::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_extractor_checks_permission() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        parts
            .extensions
            .insert(ApiKey::new("ek_", "sha256$x", "user-1").with_permissions([Permission::Read]));

        let err = RequireWrite::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.response.error.message, "Write permission required");

        parts.extensions.insert(
            ApiKey::new("ek_", "sha256$x", "user-1")
                .with_permissions([Permission::Read, Permission::Write]),
        );
        assert!(RequireWrite::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_extractor_without_gate_is_unauthorized() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();

        let err = RequireApiKey::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
