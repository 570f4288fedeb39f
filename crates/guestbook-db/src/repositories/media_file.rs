//! PostgreSQL implementation of MediaFileRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use guestbook_core::entities::MediaFile;
use guestbook_core::pipeline::PipelineState;
use guestbook_core::traits::{MediaFileRepository, RepoResult};
use guestbook_core::value_objects::Snowflake;

use crate::mappers::{map_rows, StageColumns};
use crate::models::MediaFileModel;

use super::error::{map_db_error, media_file_not_found};

const MEDIA_COLUMNS: &str = "id, message_id, file_name, file_size, mime_type, storage_ref, \
                             storage_url, duration, thumbnail_url, stage, failed_stage, \
                             failure_reason, created_at, updated_at";

/// PostgreSQL implementation of MediaFileRepository
#[derive(Clone)]
pub struct PgMediaFileRepository {
    pool: PgPool,
}

impl PgMediaFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_ids(ids: &[Snowflake]) -> Vec<i64> {
    ids.iter().map(|id| id.into_inner()).collect()
}

#[async_trait]
impl MediaFileRepository for PgMediaFileRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MediaFile>> {
        let result = sqlx::query_as::<_, MediaFileModel>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_files WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(MediaFile::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Vec<MediaFile>> {
        let rows = sqlx::query_as::<_, MediaFileModel>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_files WHERE message_id = $1 ORDER BY created_at, id"
        ))
        .bind(message_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<MediaFile>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MediaFileModel>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_files WHERE message_id = ANY($1) ORDER BY created_at, id"
        ))
        .bind(to_ids(message_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self, media), fields(media_id = %media.id, message_id = %media.message_id))]
    async fn create(&self, media: &MediaFile) -> RepoResult<()> {
        let columns = StageColumns::new(&media.state);

        sqlx::query(
            r#"
            INSERT INTO media_files (id, message_id, file_name, file_size, mime_type, storage_ref,
                                     storage_url, duration, thumbnail_url, stage, failed_stage,
                                     failure_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(media.id.into_inner())
        .bind(media.message_id.into_inner())
        .bind(&media.file_name)
        .bind(media.file_size)
        .bind(&media.mime_type)
        .bind(&media.storage_ref)
        .bind(&media.storage_url)
        .bind(media.duration)
        .bind(&media.thumbnail_url)
        .bind(columns.stage)
        .bind(columns.failed_stage)
        .bind(columns.failure_reason)
        .bind(media.created_at)
        .bind(media.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_state(
        &self,
        id: Snowflake,
        expected: &PipelineState,
        next: &PipelineState,
    ) -> RepoResult<bool> {
        let columns = StageColumns::new(next);

        let result = sqlx::query(
            r#"
            UPDATE media_files
            SET stage = $3, failed_stage = $4, failure_reason = $5, updated_at = NOW()
            WHERE id = $1 AND stage = $2
            "#,
        )
        .bind(id.into_inner())
        .bind(expected.stage_name())
        .bind(columns.stage)
        .bind(columns.failed_stage)
        .bind(columns.failure_reason)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn finalize(
        &self,
        id: Snowflake,
        storage_ref: &str,
        storage_url: &str,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE media_files
            SET storage_ref = $2, storage_url = $3, stage = 'finalized', updated_at = NOW()
            WHERE id = $1 AND stage = 'uploaded'
            "#,
        )
        .bind(id.into_inner())
        .bind(storage_ref)
        .bind(storage_url)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM media_files WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(media_file_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_incomplete_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<MediaFile>> {
        let rows = sqlx::query_as::<_, MediaFileModel>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_files \
             WHERE stage <> 'finalized' AND updated_at < $1 ORDER BY updated_at"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_pending(&self, ids: &[Snowflake], cutoff: DateTime<Utc>) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        // Re-check stage and age so a row that moved since it was selected survives
        let result = sqlx::query(
            "DELETE FROM media_files \
             WHERE id = ANY($1) AND stage <> 'finalized' AND updated_at < $2",
        )
        .bind(to_ids(ids))
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
