//! API middleware components

pub mod auth;
pub mod logging;

pub use auth::{
    is_public_path, require_api_key, RequireAdmin, RequireApiKey, RequireWrite, API_KEY_HEADER,
};
pub use logging::logging_middleware;
