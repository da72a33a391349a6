//! Estate API
//!
//! REST service over real-estate transaction records:
//! - Filtered, paginated listing built from parameterized SQL
//! - Create, read, replace and delete of single records
//! - API key gate with permissions, expiry and deactivation
//! - PostgreSQL or in-memory storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use api::state::AppState;
use config::DatabaseBackend;
use domain::api_key::Permission;
use infrastructure::{
    api_key::{
        ApiKeyGenerator, ApiKeyService, CreateApiKeyRequest, InMemoryApiKeyRepository,
        PostgresApiKeyRepository,
    },
    estate::{EstateService, InMemoryEstateRepository, PostgresEstateRepository},
    storage::{connect_pool, run_migrations},
};

/// Environment variable holding the bootstrap admin key
pub const ADMIN_API_KEY_ENV: &str = "ADMIN_API_KEY";

/// Application state plus the resources that must be released on shutdown
#[derive(Debug)]
pub struct AppResources {
    pub state: AppState,
    pool: Option<PgPool>,
}

impl AppResources {
    /// Close the database pool, waiting for checked-out connections
    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            info!("Database pool closed");
        }
    }
}

/// Create application state backed by process-local maps
pub fn create_in_memory_state(config: &AppConfig) -> AppState {
    let estate_service = EstateService::new(Arc::new(InMemoryEstateRepository::new()));
    let api_key_service = ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new()))
        .with_generator(ApiKeyGenerator::new(&config.auth.key_prefix));

    AppState::new(Arc::new(estate_service), Arc::new(api_key_service))
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppResources> {
    info!("Storage backend: {:?}", config.database.backend);

    let resources = match config.database.backend {
        DatabaseBackend::Memory => {
            warn!("Using in-memory storage; records and keys are lost on restart");
            AppResources {
                state: create_in_memory_state(config),
                pool: None,
            }
        }
        DatabaseBackend::Postgres => {
            let pool = connect_pool(&config.database).await?;

            if config.database.run_migrations {
                let applied = run_migrations(&pool).await?;
                info!("Applied {} pending migration(s)", applied);
            }

            let estate_service =
                EstateService::new(Arc::new(PostgresEstateRepository::new(pool.clone())));
            estate_service.ping().await?;

            let api_key_service =
                ApiKeyService::new(Arc::new(PostgresApiKeyRepository::new(pool.clone())))
                    .with_generator(ApiKeyGenerator::new(&config.auth.key_prefix));

            AppResources {
                state: AppState::new(Arc::new(estate_service), Arc::new(api_key_service)),
                pool: Some(pool),
            }
        }
    };

    if let Ok(secret) = std::env::var(ADMIN_API_KEY_ENV) {
        ensure_admin_key(&resources.state.api_key_service, &secret).await?;
    }

    Ok(resources)
}

/// Make sure an admin key with exactly this secret exists
pub async fn ensure_admin_key(service: &ApiKeyService, secret: &str) -> anyhow::Result<()> {
    if secret.trim().is_empty() {
        warn!("{} is set but empty; no bootstrap key created", ADMIN_API_KEY_ENV);
        return Ok(());
    }

    let api_key = service
        .ensure_key_with_secret(
            secret,
            CreateApiKeyRequest {
                user_id: "admin".to_string(),
                permissions: vec![Permission::Read, Permission::Write, Permission::Admin],
                expires_in_days: None,
            },
        )
        .await?;

    info!(key_id = %api_key.id(), "Bootstrap admin key available");

    Ok(())
}
