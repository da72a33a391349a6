//! Migrate command - applies the embedded schema to PostgreSQL

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, Migrator, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let pool = connect_pool(&config.database).await?;
    let migrator = PostgresMigrator::new(pool.clone());

    if args.revert {
        match migrator.revert().await? {
            Some(version) => info!("Reverted migration {}", version),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = migrator.run().await?;
        info!("Applied {} migration(s)", applied);
    }

    let version = migrator.version().await?;
    info!(
        "Schema version: {}",
        version.map_or_else(|| "none".to_string(), |v| v.to_string())
    );

    pool.close().await;

    Ok(())
}
