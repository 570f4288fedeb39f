//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! configuration, host token verifier, and the pool used by readiness checks.

use std::sync::Arc;

use guestbook_common::{AppConfig, JwtService};
use guestbook_db::PgPool;
use guestbook_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    jwt_service: Arc<JwtService>,
    pool: PgPool,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        jwt_service: JwtService,
        pool: PgPool,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            jwt_service: Arc::new(jwt_service),
            pool,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Shared handle for work that outlives a request
    pub fn shared_context(&self) -> Arc<ServiceContext> {
        Arc::clone(&self.service_context)
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Verifier for host bearer tokens
    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
