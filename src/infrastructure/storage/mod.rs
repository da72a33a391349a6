//! Storage infrastructure: connection pool and schema migrations

pub mod migrations;
mod pool;

pub use migrations::{run_migrations, Migration, Migrator, PostgresMigrator};
pub use pool::connect_pool;
