//! MediaFile entity <-> model mapper

use guestbook_core::entities::MediaFile;
use guestbook_core::error::DomainError;
use guestbook_core::pipeline::PipelineState;
use guestbook_core::value_objects::Snowflake;

use crate::models::MediaFileModel;

/// Column values for a persisted pipeline state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageColumns<'a> {
    pub stage: &'static str,
    pub failed_stage: Option<&'static str>,
    pub failure_reason: Option<&'a str>,
}

impl<'a> StageColumns<'a> {
    pub fn new(state: &'a PipelineState) -> Self {
        match state {
            PipelineState::Failed { failed_stage, reason } => Self {
                stage: state.stage_name(),
                failed_stage: Some(failed_stage.as_str()),
                failure_reason: Some(reason.as_str()),
            },
            _ => Self {
                stage: state.stage_name(),
                failed_stage: None,
                failure_reason: None,
            },
        }
    }
}

/// Convert MediaFileModel to MediaFile entity
impl TryFrom<MediaFileModel> for MediaFile {
    type Error = DomainError;

    fn try_from(model: MediaFileModel) -> Result<Self, Self::Error> {
        let state = PipelineState::from_columns(
            &model.stage,
            model.failed_stage.as_deref(),
            model.failure_reason,
        )
        .ok_or_else(|| {
            DomainError::DatabaseError(format!(
                "media file {} has unknown stage {:?}",
                model.id, model.stage
            ))
        })?;

        Ok(MediaFile {
            id: Snowflake::new(model.id),
            message_id: Snowflake::new(model.message_id),
            file_name: model.file_name,
            file_size: model.file_size,
            mime_type: model.mime_type,
            storage_ref: model.storage_ref,
            storage_url: model.storage_url,
            duration: model.duration,
            thumbnail_url: model.thumbnail_url,
            state,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use guestbook_core::pipeline::PipelineStage;

    use super::*;

    fn model(stage: &str, failed_stage: Option<&str>) -> MediaFileModel {
        MediaFileModel {
            id: 1,
            message_id: 2,
            file_name: "clip.webm".to_string(),
            file_size: 2048,
            mime_type: "video/webm".to_string(),
            storage_ref: None,
            storage_url: None,
            duration: Some(12.5),
            thumbnail_url: None,
            stage: stage.to_string(),
            failed_stage: failed_stage.map(String::from),
            failure_reason: Some("connection reset".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_failed_row() {
        let media = MediaFile::try_from(model("failed", Some("upload"))).unwrap();
        assert_eq!(
            media.state,
            PipelineState::Failed {
                failed_stage: PipelineStage::Upload,
                reason: "connection reset".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_stage() {
        assert!(MediaFile::try_from(model("recording", None)).is_err());
    }

    #[test]
    fn test_stage_columns() {
        let failed = PipelineState::Failed {
            failed_stage: PipelineStage::Finalize,
            reason: "bad id".to_string(),
        };
        let columns = StageColumns::new(&failed);
        assert_eq!(columns.stage, "failed");
        assert_eq!(columns.failed_stage, Some("finalize"));
        assert_eq!(columns.failure_reason, Some("bad id"));

        let columns = StageColumns::new(&PipelineState::Uploaded);
        assert_eq!(columns.stage, "uploaded");
        assert_eq!(columns.failed_stage, None);
    }
}
