//! Service context - dependency container for services
//!
//! Holds the repositories, the blob store, and the settings the use cases need.

use std::sync::Arc;

use chrono::Duration;
use guestbook_common::AppConfig;
use guestbook_core::traits::{
    BlobStore, EventRepository, GuestTokenRepository, MediaFileRepository, MessageRepository,
};
use guestbook_core::{Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Tunables the use cases read at request time
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Largest accepted media file
    pub max_file_size_bytes: u64,
    /// Lifetime of an issued upload URL
    pub upload_url_ttl: Duration,
    /// Base of shareable guest links, without trailing slash
    pub public_base_url: String,
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_file_size_bytes: config.storage.max_file_size_bytes(),
            upload_url_ttl: Duration::from_std(config.storage.upload_url_ttl())
                .unwrap_or(defaults.upload_url_ttl),
            public_base_url: config.app.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * 1024 * 1024,
            upload_url_ttl: Duration::minutes(15),
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Service context containing all dependencies
///
/// Cloning is cheap: every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    event_repo: Arc<dyn EventRepository>,
    message_repo: Arc<dyn MessageRepository>,
    media_repo: Arc<dyn MediaFileRepository>,
    token_repo: Arc<dyn GuestTokenRepository>,

    // Binary storage
    blob_store: Arc<dyn BlobStore>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: Arc<ServiceSettings>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        message_repo: Arc<dyn MessageRepository>,
        media_repo: Arc<dyn MediaFileRepository>,
        token_repo: Arc<dyn GuestTokenRepository>,
        blob_store: Arc<dyn BlobStore>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            event_repo,
            message_repo,
            media_repo,
            token_repo,
            blob_store,
            snowflake_generator,
            settings: Arc::new(settings),
        }
    }

    // === Repositories ===

    /// Get the event repository
    pub fn event_repo(&self) -> &dyn EventRepository {
        self.event_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the media file repository
    pub fn media_repo(&self) -> &dyn MediaFileRepository {
        self.media_repo.as_ref()
    }

    /// Get the guest token repository
    pub fn token_repo(&self) -> &dyn GuestTokenRepository {
        self.token_repo.as_ref()
    }

    // === Storage ===

    pub fn blob_store(&self) -> &dyn BlobStore {
        self.blob_store.as_ref()
    }

    // === Misc ===

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("blob_store", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    event_repo: Option<Arc<dyn EventRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    media_repo: Option<Arc<dyn MediaFileRepository>>,
    token_repo: Option<Arc<dyn GuestTokenRepository>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_repo(mut self, repo: Arc<dyn EventRepository>) -> Self {
        self.event_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn media_repo(mut self, repo: Arc<dyn MediaFileRepository>) -> Self {
        self.media_repo = Some(repo);
        self
    }

    pub fn token_repo(mut self, repo: Arc<dyn GuestTokenRepository>) -> Self {
        self.token_repo = Some(repo);
        self
    }

    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// Settings fall back to [`ServiceSettings::default`].
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.event_repo.ok_or_else(|| ServiceError::validation("event_repo is required"))?,
            self.message_repo.ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.media_repo.ok_or_else(|| ServiceError::validation("media_repo is required"))?,
            self.token_repo.ok_or_else(|| ServiceError::validation("token_repo is required"))?,
            self.blob_store.ok_or_else(|| ServiceError::validation("blob_store is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            self.settings.unwrap_or_default(),
        ))
    }
}
