//! Application configuration
//!
//! Everything comes from environment variables, optionally seeded from a
//! `.env` file. Unset optional values fall back to defaults; set but
//! unparsable values are an error rather than silently defaulted.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub sweep: SweepConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    /// Origin that guests open share links and files from
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations at startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// JWT configuration for verifying hosts
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Blob storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
    #[serde(default = "default_upload_url_ttl")]
    pub upload_url_ttl_secs: u64,
}

impl StorageConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb) * 1024 * 1024
    }

    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_secs)
    }
}

/// Background sweeper configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
    /// Pending media rows untouched for this long are garbage
    #[serde(default = "default_incomplete_media_max_age")]
    pub incomplete_media_max_age_secs: u64,
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn incomplete_media_max_age(&self) -> Duration {
        Duration::from_secs(self.incomplete_media_max_age_secs)
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "guestbook".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    50
}

fn default_upload_url_ttl() -> u64 {
    900 // 15 minutes
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_incomplete_media_max_age() -> u64 {
    1800 // 30 minutes
}

/// Parse an optional variable, using `default` when it is unset
fn var_or<T: FromStr>(name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

/// Parse a required variable
fn required_var<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    let raw = env::var(name).map_err(|_| ConfigError::MissingVar(name))?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, raw))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or any value fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let public_base_url: String = var_or("PUBLIC_BASE_URL", default_public_base_url)?;

        Ok(Self {
            app: AppSettings {
                name: var_or("APP_NAME", default_app_name)?,
                env: var_or("APP_ENV", Environment::default)?,
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
            },
            api: ServerConfig {
                host: var_or("API_HOST", default_host)?,
                port: required_var("API_PORT")?,
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                run_migrations: var_or("DATABASE_RUN_MIGRATIONS", default_true)?,
            },
            jwt: JwtConfig {
                secret: required_var("JWT_SECRET")?,
                access_token_expiry: var_or("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: var_or(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: var_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|raw| parse_origins(&raw))
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                upload_dir: var_or("UPLOAD_DIR", default_upload_dir)?,
                max_file_size_mb: var_or("MAX_FILE_SIZE_MB", default_max_file_size)?,
                upload_url_ttl_secs: var_or("UPLOAD_URL_TTL_SECS", default_upload_url_ttl)?,
            },
            sweep: SweepConfig {
                interval_secs: var_or("SWEEP_INTERVAL_SECS", default_sweep_interval)?,
                incomplete_media_max_age_secs: var_or(
                    "INCOMPLETE_MEDIA_MAX_AGE_SECS",
                    default_incomplete_media_max_age,
                )?,
            },
            snowflake: SnowflakeConfig {
                worker_id: var_or("WORKER_ID", || 0)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
