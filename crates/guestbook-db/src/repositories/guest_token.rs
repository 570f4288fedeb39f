//! PostgreSQL implementation of GuestTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use guestbook_core::entities::GuestToken;
use guestbook_core::error::DomainError;
use guestbook_core::generation::CodeKind;
use guestbook_core::traits::{GuestTokenRepository, RepoResult};
use guestbook_core::value_objects::Snowflake;

use crate::models::GuestTokenModel;

use super::error::{guest_token_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of GuestTokenRepository
#[derive(Clone)]
pub struct PgGuestTokenRepository {
    pool: PgPool,
}

impl PgGuestTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestTokenRepository for PgGuestTokenRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<GuestToken>> {
        let result = sqlx::query_as::<_, GuestTokenModel>(
            r#"
            SELECT id, event_id, token, guest_email, expires_at, is_active, created_at
            FROM guest_tokens
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(GuestToken::from))
    }

    // The token value is a credential; keep it out of spans.
    #[instrument(skip_all)]
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<GuestToken>> {
        let result = sqlx::query_as::<_, GuestTokenModel>(
            r#"
            SELECT id, event_id, token, guest_email, expires_at, is_active, created_at
            FROM guest_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(GuestToken::from))
    }

    #[instrument(skip(self))]
    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<GuestToken>> {
        let rows = sqlx::query_as::<_, GuestTokenModel>(
            r#"
            SELECT id, event_id, token, guest_email, expires_at, is_active, created_at
            FROM guest_tokens
            WHERE event_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(event_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(GuestToken::from).collect())
    }

    #[instrument(skip(self, token), fields(token_id = %token.id, event_id = %token.event_id))]
    async fn create(&self, token: &GuestToken) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO guest_tokens (id, event_id, token, guest_email, expires_at, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id.into_inner())
        .bind(token.event_id.into_inner())
        .bind(&token.token)
        .bind(&token.guest_email)
        .bind(token.expires_at)
        .bind(token.is_active)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateCode(CodeKind::GuestToken)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_active(&self, id: Snowflake, is_active: bool) -> RepoResult<()> {
        let result = sqlx::query("UPDATE guest_tokens SET is_active = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(is_active)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(guest_token_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_expiration(
        &self,
        id: Snowflake,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let result = sqlx::query("UPDATE guest_tokens SET expires_at = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(guest_token_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM guest_tokens WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(guest_token_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            "DELETE FROM guest_tokens WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
