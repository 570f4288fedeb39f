//! PostgreSQL implementation of EventRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use guestbook_core::entities::Event;
use guestbook_core::error::DomainError;
use guestbook_core::generation::CodeKind;
use guestbook_core::traits::{EventRepository, RepoResult};
use guestbook_core::value_objects::{AccessCode, Snowflake};

use crate::mappers::map_rows;
use crate::models::EventModel;

use super::error::{event_not_found, map_db_error, map_unique_violation};

const EVENT_COLUMNS: &str = "id, title, description, date, location, host_id, access_code, \
                             is_active, created_at, updated_at";

/// PostgreSQL implementation of EventRepository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Event>> {
        let result = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Event::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_access_code(&self, code: &AccessCode) -> RepoResult<Option<Event>> {
        let result = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE access_code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Event::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_host(&self, host_id: &str) -> RepoResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE host_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self))]
    async fn find_active(&self) -> RepoResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create(&self, event: &Event) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, date, location, host_id, access_code,
                                is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.id.into_inner())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(&event.host_id)
        .bind(event.access_code.as_str())
        .bind(event.is_active)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateCode(CodeKind::AccessCode)))?;

        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update(&self, event: &Event) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = $2, description = $3, date = $4, location = $5, is_active = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(event.id.into_inner())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.is_active)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(event_not_found(event.id));
        }

        Ok(())
    }
}
