//! # guestbook-db
//!
//! Database layer implementing the guestbook repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations
//!
//! Access codes and guest tokens rely on the `UNIQUE` indexes as their
//! insert-if-absent primitive: a violation comes back as
//! `DomainError::DuplicateCode` and the caller retries with a fresh value.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guestbook_db::{create_pool, run_migrations, PgEventRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/guestbook")).await?;
//!     run_migrations(&pool).await?;
//!     let events = PgEventRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgEventRepository, PgGuestTokenRepository, PgMediaFileRepository, PgMessageRepository,
};
