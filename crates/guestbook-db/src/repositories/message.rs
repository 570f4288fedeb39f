//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use guestbook_core::entities::{Message, MessageFilter};
use guestbook_core::traits::{MessageRepository, RepoResult};
use guestbook_core::value_objects::Snowflake;

use crate::mappers::map_rows;
use crate::models::MessageModel;

use super::error::{map_db_error, message_not_found};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Extra predicate for a moderation filter
fn filter_clause(filter: MessageFilter) -> &'static str {
    match filter {
        MessageFilter::All => "",
        MessageFilter::Approved => "AND is_approved",
        MessageFilter::Pending => "AND NOT is_approved",
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, event_id, guest_name, guest_email, message_text, message_type,
                   is_approved, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_event(
        &self,
        event_id: Snowflake,
        filter: MessageFilter,
    ) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT id, event_id, guest_name, guest_email, message_text, message_type,
                   is_approved, created_at
            FROM messages
            WHERE event_id = $1 {}
            ORDER BY created_at DESC, id DESC
            "#,
            filter_clause(filter)
        ))
        .bind(event_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, event_id = %message.event_id))]
    async fn create_for_active_event(&self, message: &Message) -> RepoResult<bool> {
        // Checking the event in the same statement means a concurrent
        // deactivation can never leave a message on an inactive event.
        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, event_id, guest_name, guest_email, message_text,
                                  message_type, is_approved, created_at)
            SELECT $1, e.id, $3, $4, $5, $6, FALSE, $7
            FROM events e
            WHERE e.id = $2 AND e.is_active
            "#,
        )
        .bind(message.id.into_inner())
        .bind(message.event_id.into_inner())
        .bind(&message.guest_name)
        .bind(&message.guest_email)
        .bind(&message.message_text)
        .bind(message.message_type.as_str())
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn approve(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("UPDATE messages SET is_approved = TRUE WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_with_media(&self, id: Snowflake) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let media = sqlx::query("DELETE FROM media_files WHERE message_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let message = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if message.rows_affected() == 0 {
            // Dropping the transaction rolls back the media delete
            return Err(message_not_found(id));
        }

        tx.commit().await.map_err(map_db_error)?;

        debug!(deleted_media_files = media.rows_affected(), "Message deleted with media");
        Ok(media.rows_affected())
    }
}
