//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::estate::EstateService;

/// Services shared by every handler
///
/// Cloned per request; the services themselves sit behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub estate_service: Arc<EstateService>,
    pub api_key_service: Arc<ApiKeyService>,
}

impl AppState {
    pub fn new(estate_service: Arc<EstateService>, api_key_service: Arc<ApiKeyService>) -> Self {
        Self {
            estate_service,
            api_key_service,
        }
    }
}
