//! Admin API endpoints (require the `admin` permission)

pub mod api_keys;

use axum::{
    routing::{get, patch},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/keys", get(api_keys::list_keys).post(api_keys::create_key))
        .route("/keys/{id}/deactivate", patch(api_keys::deactivate_key))
}
