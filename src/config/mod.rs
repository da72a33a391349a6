//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseBackend, DatabaseConfig, DatabaseLocation, LogFormat,
    LoggingConfig, ServerConfig,
};
