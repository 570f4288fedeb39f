//! Maintenance service
//!
//! One pass of background housekeeping: abandoned media, expired upload
//! slots, expired guest tokens.

use chrono::Duration;
use tracing::{info, instrument};

use crate::dto::MaintenanceReport;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guest_token::GuestTokenService;
use super::media::MediaService;

/// Maintenance service
pub struct MaintenanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MaintenanceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run every cleanup step once
    #[instrument(skip(self))]
    pub async fn run_once(&self, incomplete_media_max_age: Duration) -> ServiceResult<MaintenanceReport> {
        let sweep = MediaService::new(self.ctx)
            .sweep_incomplete(incomplete_media_max_age)
            .await?;
        let expired_slots_purged = self.ctx.blob_store().purge_expired_slots().await as u64;
        let tokens = GuestTokenService::new(self.ctx)
            .cleanup_expired_tokens()
            .await?;

        let report = MaintenanceReport {
            media_deleted: sweep.media_deleted,
            blobs_deleted: sweep.blobs_deleted,
            expired_slots_purged,
            expired_tokens_deleted: tokens.deleted_count,
        };
        if !report.is_empty() {
            info!(?report, "Maintenance pass finished");
        }
        Ok(report)
    }
}
