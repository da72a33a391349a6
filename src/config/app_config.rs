use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where estate records and API keys live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    /// Process-local maps, lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Connection URL; falls back to `DATABASE_URL`, then the `PG_*` variables
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Server-side `statement_timeout` applied to every pooled connection
    pub statement_timeout_ms: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Prefix of generated API keys
    pub key_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
            statement_timeout_ms: 10_000,
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_prefix: "ek_".to_string(),
        }
    }
}

/// Where the database lives, as found in configuration or the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A full `postgres://` connection URL
    Url(String),
    /// Discrete `PG_*` settings; values are used verbatim, never spliced into a URL
    Discrete {
        host: String,
        port: String,
        user: Option<String>,
        password: Option<String>,
        database: String,
    },
}

impl DatabaseConfig {
    /// Resolve the database location from configuration or the process environment
    pub fn resolve_location(&self) -> Option<DatabaseLocation> {
        self.resolve_location_with(|name| std::env::var(name).ok())
    }

    fn resolve_location_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<DatabaseLocation> {
        if let Some(url) = self.url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Some(DatabaseLocation::Url(url.clone()));
        }

        if let Some(url) = env("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            return Some(DatabaseLocation::Url(url));
        }

        Some(DatabaseLocation::Discrete {
            host: env("PG_HOST")?,
            port: env("PG_PORT").unwrap_or_else(|| "5432".to_string()),
            user: env("PG_USER"),
            password: env("PG_PASSWORD"),
            database: env("PG_DATABASE")?,
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
