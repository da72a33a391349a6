use axum::{
    http::HeaderName,
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::admin;
use super::estates;
use super::health;
use super::middleware::{logging_middleware, require_api_key};
use super::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the full router with application state
///
/// Layer order, outermost first: request id, tracing, request logging, API key gate.
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        // Public endpoints
        .route("/health", get(health::health_check))
        .route("/api-docs", get(health::api_docs))
        // Estate records
        .route(
            "/estates",
            get(estates::list_estates).post(estates::create_estate),
        )
        .route(
            "/estates/{id}",
            get(estates::get_estate)
                .put(estates::update_estate)
                .delete(estates::delete_estate),
        )
        // Key administration
        .nest("/admin", admin::create_admin_router())
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(middleware::from_fn(logging_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .with_state(state)
}
