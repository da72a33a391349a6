//! Public endpoints: liveness and the endpoint catalog

use axum::{http::StatusCode, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::api::types::Json;

/// Version of the HTTP contract reported by `/api-docs`
pub const API_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
    pub version: &'static str,
}

/// Returns 200 while the process is serving
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiDocsResponse {
    pub api_version: &'static str,
    pub endpoints: Vec<EndpointDoc>,
    pub authentication: &'static str,
}

const ENDPOINTS: [EndpointDoc; 8] = [
    EndpointDoc {
        method: "GET",
        path: "/estates",
        description: "List estate records (filters: city, district, building_type, min_price, max_price; paging: limit, page)",
    },
    EndpointDoc {
        method: "GET",
        path: "/estates/:id",
        description: "Get an estate record by ID",
    },
    EndpointDoc {
        method: "POST",
        path: "/estates",
        description: "Create an estate record",
    },
    EndpointDoc {
        method: "PUT",
        path: "/estates/:id",
        description: "Replace an estate record",
    },
    EndpointDoc {
        method: "DELETE",
        path: "/estates/:id",
        description: "Delete an estate record",
    },
    EndpointDoc {
        method: "GET",
        path: "/admin/keys",
        description: "List API keys (admin)",
    },
    EndpointDoc {
        method: "POST",
        path: "/admin/keys",
        description: "Issue an API key (admin)",
    },
    EndpointDoc {
        method: "PATCH",
        path: "/admin/keys/:id/deactivate",
        description: "Deactivate an API key (admin)",
    },
];

/// Static catalog of the routes this service exposes
pub async fn api_docs() -> impl IntoResponse {
    Json(ApiDocsResponse {
        api_version: API_VERSION,
        endpoints: ENDPOINTS.into(),
        authentication: concat!(
            "Provide the API key in the X-API-KEY request header; ",
            "POST, PUT and DELETE need the write permission"
        ),
    })
}
