//! CLI module for the estate API
//!
//! Provides subcommands:
//! - `serve`: run the HTTP server (default deployment mode)
//! - `migrate`: apply or revert the database schema
//! - `create-key`: issue an API key from the command line

pub mod keys;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Real-estate transaction REST service
#[derive(Parser)]
#[command(name = "estate-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending migrations (or revert the latest one)
    Migrate(migrate::MigrateArgs),

    /// Issue a new API key and print it once
    CreateKey(keys::CreateKeyArgs),
}

/// Load `.env` and the layered configuration, then install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
