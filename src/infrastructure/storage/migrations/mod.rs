//! Database migrations infrastructure

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations, returning how many were applied
    async fn run(&self) -> Result<usize, DomainError>;

    /// Reverts the last applied migration, returning its version
    async fn revert(&self) -> Result<Option<i64>, DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// PostgreSQL migrator over an embedded migration list
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrations: estate_migrations(),
        }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies a single migration and records it in one transaction
    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        let tx_err = |e: sqlx::Error| {
            DomainError::storage(format!("Failed to run migration {}: {}", migration.version, e))
        };

        let mut tx = self.pool.begin().await.map_err(tx_err)?;

        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(migration.up))
            .await
            .map_err(tx_err)?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(tx_err)?;

        tx.commit().await.map_err(tx_err)?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );

        Ok(())
    }

    /// Runs a migration's down script and removes its record in one transaction
    async fn unapply(&self, migration: &Migration) -> Result<(), DomainError> {
        let tx_err = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to revert migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(tx_err)?;

        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(migration.down))
            .await
            .map_err(tx_err)?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(tx_err)?;

        tx.commit().await.map_err(tx_err)?;

        info!(version = migration.version, "Reverted migration");

        Ok(())
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<usize, DomainError> {
        self.ensure_migrations_table().await?;

        let mut applied = 0;

        for migration in &self.migrations {
            if self.is_applied(migration.version).await? {
                continue;
            }

            self.apply(migration).await?;
            applied += 1;
        }

        Ok(applied)
    }

    async fn revert(&self) -> Result<Option<i64>, DomainError> {
        let Some(version) = self.version().await? else {
            return Ok(None);
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == version)
            .ok_or_else(|| {
                DomainError::storage(format!("Applied migration {} is unknown to this build", version))
            })?;

        self.unapply(migration).await?;

        Ok(Some(version))
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// Represents a database migration
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    /// SQL to run when applying the migration
    pub up: &'static str,
    /// SQL to run when reverting the migration
    pub down: &'static str,
}

/// Schema of the estate service, in version order
pub fn estate_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create real_estate_data table",
            up: r#"
            CREATE TABLE IF NOT EXISTS real_estate_data (
                transaction_id TEXT PRIMARY KEY,
                transaction_date DATE NOT NULL,
                city TEXT NOT NULL,
                district TEXT NOT NULL,
                address TEXT,
                building_type TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                building_area DOUBLE PRECISION,
                unit_price DOUBLE PRECISION,
                floor_level DOUBLE PRECISION,
                building_age DOUBLE PRECISION,
                total_floors DOUBLE PRECISION,
                land_area DOUBLE PRECISION,
                main_use TEXT,
                construction_materials TEXT,
                transaction_type TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_real_estate_data_transaction_date
                ON real_estate_data(transaction_date DESC);
            CREATE INDEX IF NOT EXISTS idx_real_estate_data_city_district
                ON real_estate_data(city, district);
            CREATE INDEX IF NOT EXISTS idx_real_estate_data_price
                ON real_estate_data(price);
            "#,
            down: r#"
            DROP TABLE IF EXISTS real_estate_data;
            "#,
        },
        Migration {
            version: 2,
            description: "Create api_keys table",
            up: r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id UUID PRIMARY KEY,
                key_prefix TEXT NOT NULL,
                key_hash TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                permissions TEXT[] NOT NULL DEFAULT ARRAY['read']::TEXT[],
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                expires_at TIMESTAMPTZ,
                last_used_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_api_keys_user_id ON api_keys(user_id);
            "#,
            down: r#"
            DROP TABLE IF EXISTS api_keys;
            "#,
        },
    ]
}

/// Runs all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_transactional_steps_can_run_on_any_worker() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://estate@localhost/estate")
            .unwrap();
        let migrator = PostgresMigrator::new(pool);
        let migration = estate_migrations()[0];

        let apply = migrator.apply(&migration);
        assert_send(&apply);
        drop(apply);

        let unapply = migrator.unapply(&migration);
        assert_send(&unapply);
    }

    #[test]
    fn test_migrations_are_strictly_ordered() {
        let migrations = estate_migrations();

        assert!(!migrations.is_empty());
        assert!(migrations.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(migrations[0].version, 1);
    }

    #[test]
    fn test_every_migration_can_be_reverted() {
        for migration in estate_migrations() {
            assert!(!migration.up.trim().is_empty());
            assert!(migration.down.contains("DROP"));
        }
    }

    #[test]
    fn test_estate_table_has_every_selected_column() {
        let schema = estate_migrations()[0].up;

        for column in crate::domain::estate::ESTATE_COLUMNS.split(',') {
            assert!(schema.contains(column.trim()), "missing column {}", column.trim());
        }
    }
}
