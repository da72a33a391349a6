//! PostgreSQL connection pool

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use crate::config::{DatabaseConfig, DatabaseLocation};
use crate::domain::DomainError;

/// Build the shared pool; every connection gets the configured `statement_timeout`
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let location = config.resolve_location().ok_or_else(|| {
        DomainError::configuration(
            "No database location configured: set database.url, DATABASE_URL or PG_HOST/PG_DATABASE",
        )
    })?;

    let options = connect_options(&location, config.statement_timeout_ms)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        statement_timeout_ms = config.statement_timeout_ms,
        "PostgreSQL pool ready"
    );

    Ok(pool)
}

fn connect_options(
    location: &DatabaseLocation,
    statement_timeout_ms: u64,
) -> Result<PgConnectOptions, DomainError> {
    let options = match location {
        DatabaseLocation::Url(url) => PgConnectOptions::from_str(url)
            .map_err(|e| DomainError::configuration(format!("Invalid database URL: {}", e)))?,
        DatabaseLocation::Discrete {
            host,
            port,
            user,
            password,
            database,
        } => {
            let port = port.trim().parse::<u16>().map_err(|_| {
                DomainError::configuration(format!("Invalid PG_PORT: '{}'", port))
            })?;

            let mut options = PgConnectOptions::new()
                .host(host)
                .port(port)
                .database(database);
            if let Some(user) = user {
                options = options.username(user);
            }
            if let Some(password) = password {
                options = options.password(password);
            }
            options
        }
    };

    Ok(options.options([("statement_timeout", statement_timeout_ms.to_string())]))
}
