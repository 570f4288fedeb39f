//! Connection pool and schema migrations

mod postgres;

pub use postgres::{create_pool, run_migrations, PgPool, PoolConfig};
