//! # guestbook-common
//!
//! Shared utilities including configuration, error handling, host authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    RateLimitConfig, ServerConfig, SnowflakeConfig, StorageConfig, SweepConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
