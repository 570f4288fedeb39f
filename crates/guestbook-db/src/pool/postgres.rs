//! PostgreSQL connection pool management

use std::path::Path;
use std::time::Duration;

use guestbook_common::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
pub use sqlx::postgres::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// SQL files applied by `run_migrations`, in version order
const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections.min(config.max_connections),
            ..Self::new(config.url.clone())
        }
    }
}

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
}

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let migrator = Migrator::new(Path::new(MIGRATIONS_DIR)).await?;
    migrator.run(pool).await?;
    info!(applied = migrator.iter().count(), "Database migrations up to date");
    Ok(())
}
