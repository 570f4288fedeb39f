//! Guest token service
//!
//! Shareable credentials scoped to one event, optionally time-limited.

use chrono::{DateTime, Duration, Utc};
use guestbook_core::entities::{GuestToken, TokenValidation};
use guestbook_core::{insert_unique, CodeKind, DomainError, Snowflake, GUEST_TOKEN};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    CleanupResponse, CreateGuestTokenRequest, CreateShareLinkRequest, CreatedTokenResponse,
    GuestTokenResponse, ShareLinkResponse, UpdateTokenExpirationRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::event::EventService;

/// Guest token service
pub struct GuestTokenService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GuestTokenService<'a> {
    /// Create a new GuestTokenService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a token for an event the host owns
    #[instrument(skip(self, request))]
    pub async fn create_token(
        &self,
        host_id: &str,
        event_id: Snowflake,
        request: CreateGuestTokenRequest,
    ) -> ServiceResult<CreatedTokenResponse> {
        request.validate()?;
        let token = self
            .issue(host_id, event_id, request.guest_email, request.expires_at)
            .await?;

        Ok(CreatedTokenResponse {
            id: token.id.to_string(),
            token: token.token,
            expires_at: token.expires_at,
        })
    }

    /// Issue a token and build the guest link around it
    #[instrument(skip(self, request))]
    pub async fn create_shareable_link(
        &self,
        host_id: &str,
        event_id: Snowflake,
        request: CreateShareLinkRequest,
    ) -> ServiceResult<ShareLinkResponse> {
        request.validate()?;
        let expires_at = request
            .expires_in_days
            .map(|days| Utc::now() + Duration::days(i64::from(days)));
        let token = self
            .issue(host_id, event_id, request.guest_email, expires_at)
            .await?;

        Ok(ShareLinkResponse {
            shareable_url: format!(
                "{}/guest/{}",
                self.ctx.settings().public_base_url,
                token.token
            ),
            id: token.id.to_string(),
            token: token.token,
            expires_at: token.expires_at,
        })
    }

    /// Check a token presented by a guest.
    ///
    /// Never fails for a bad token; the reason is part of the result.
    #[instrument(skip_all)]
    pub async fn validate_token(&self, token: &str) -> ServiceResult<TokenValidation> {
        let now = Utc::now();
        let found = self.ctx.token_repo().find_by_token(token.trim()).await?;

        let event = match &found {
            Some(token) if token.is_usable_at(now) => {
                self.ctx.event_repo().find_by_id(token.event_id).await?
            }
            _ => None,
        };

        Ok(GuestToken::validate(found.as_ref(), event, now))
    }

    /// All tokens of an event
    #[instrument(skip(self))]
    pub async fn list_tokens(
        &self,
        host_id: &str,
        event_id: Snowflake,
    ) -> ServiceResult<Vec<GuestTokenResponse>> {
        EventService::new(self.ctx)
            .require_owned(host_id, event_id)
            .await?;
        let tokens = self.ctx.token_repo().find_by_event(event_id).await?;
        Ok(tokens.iter().map(GuestTokenResponse::from).collect())
    }

    /// Tokens of an event that are active and unexpired
    #[instrument(skip(self))]
    pub async fn list_active_tokens(
        &self,
        host_id: &str,
        event_id: Snowflake,
    ) -> ServiceResult<Vec<GuestTokenResponse>> {
        EventService::new(self.ctx)
            .require_owned(host_id, event_id)
            .await?;
        let now = Utc::now();
        let tokens = self.ctx.token_repo().find_by_event(event_id).await?;
        Ok(tokens
            .iter()
            .filter(|t| t.is_usable_at(now))
            .map(GuestTokenResponse::from)
            .collect())
    }

    /// Turn a token off. Deactivating twice is a no-op.
    #[instrument(skip(self))]
    pub async fn deactivate_token(
        &self,
        host_id: &str,
        token_id: Snowflake,
    ) -> ServiceResult<GuestTokenResponse> {
        let mut token = self.require_owned(host_id, token_id).await?;
        if token.is_active {
            self.ctx.token_repo().set_active(token_id, false).await?;
            token.is_active = false;
            info!(token_id = %token_id, "Guest token deactivated");
        }
        Ok(GuestTokenResponse::from(token))
    }

    /// Remove a token for good
    #[instrument(skip(self))]
    pub async fn delete_token(&self, host_id: &str, token_id: Snowflake) -> ServiceResult<()> {
        self.require_owned(host_id, token_id).await?;
        self.ctx.token_repo().delete(token_id).await?;
        info!(token_id = %token_id, "Guest token deleted");
        Ok(())
    }

    /// Replace the expiry, or clear it with `null`
    #[instrument(skip(self, request))]
    pub async fn update_token_expiration(
        &self,
        host_id: &str,
        token_id: Snowflake,
        request: UpdateTokenExpirationRequest,
    ) -> ServiceResult<GuestTokenResponse> {
        let mut token = self.require_owned(host_id, token_id).await?;
        self.ctx
            .token_repo()
            .update_expiration(token_id, request.expires_at)
            .await?;
        token.expires_at = request.expires_at;
        Ok(GuestTokenResponse::from(token))
    }

    /// Delete every token past its expiry. Safe to repeat.
    #[instrument(skip(self))]
    pub async fn cleanup_expired_tokens(&self) -> ServiceResult<CleanupResponse> {
        let deleted_count = self.ctx.token_repo().delete_expired(Utc::now()).await?;
        if deleted_count > 0 {
            info!(deleted_count, "Expired guest tokens deleted");
        }
        Ok(CleanupResponse { deleted_count })
    }

    async fn issue(
        &self,
        host_id: &str,
        event_id: Snowflake,
        guest_email: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<GuestToken> {
        if expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(ServiceError::validation("expires_at must be in the future"));
        }
        EventService::new(self.ctx)
            .require_owned(host_id, event_id)
            .await?;

        let repo = self.ctx.token_repo();
        let token = insert_unique(
            CodeKind::GuestToken,
            || GUEST_TOKEN.generate(),
            |value| {
                let token = GuestToken::new(
                    self.ctx.generate_id(),
                    event_id,
                    value,
                    guest_email.clone(),
                    expires_at,
                );
                async move {
                    repo.create(&token).await?;
                    Ok(token)
                }
            },
        )
        .await?;

        info!(token_id = %token.id, event_id = %event_id, "Guest token issued");
        Ok(token)
    }

    async fn require_owned(&self, host_id: &str, token_id: Snowflake) -> ServiceResult<GuestToken> {
        let token = self
            .ctx
            .token_repo()
            .find_by_id(token_id)
            .await?
            .ok_or(DomainError::GuestTokenNotFound(token_id))?;
        EventService::new(self.ctx)
            .require_owned(host_id, token.event_id)
            .await?;
        Ok(token)
    }
}
