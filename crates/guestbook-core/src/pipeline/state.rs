//! Media submission pipeline
//!
//! ```text
//! Idle -> Recording | Selecting -> Captured -> MetadataSubmitted
//!      -> UploadUrlObtained -> Uploaded -> Finalized
//! ```
//!
//! Any non-terminal state can move to `Failed { stage, reason }`. `Finalized`
//! and `Failed` are absorbing. Only the states from `MetadataSubmitted` onward
//! are ever persisted on a media row; the earlier ones live on the client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Step of the pipeline that was in progress when a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Capture,
    Metadata,
    UploadUrl,
    Upload,
    Finalize,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Metadata => "metadata",
            Self::UploadUrl => "upload_url",
            Self::Upload => "upload",
            Self::Finalize => "finalize",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "capture" => Some(Self::Capture),
            "metadata" => Some(Self::Metadata),
            "upload_url" => Some(Self::UploadUrl),
            "upload" => Some(Self::Upload),
            "finalize" => Some(Self::Finalize),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs that drive the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StartRecording,
    StartSelecting,
    Capture,
    SubmitMetadata,
    IssueUploadUrl,
    CompleteUpload,
    Finalize,
    Fail { reason: String },
}

impl PipelineEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::StartRecording => "start_recording",
            Self::StartSelecting => "start_selecting",
            Self::Capture => "capture",
            Self::SubmitMetadata => "submit_metadata",
            Self::IssueUploadUrl => "issue_upload_url",
            Self::CompleteUpload => "complete_upload",
            Self::Finalize => "finalize",
            Self::Fail { .. } => "fail",
        }
    }
}

/// Pipeline state, also persisted on media rows as `stage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Recording,
    Selecting,
    Captured,
    MetadataSubmitted,
    UploadUrlObtained,
    Uploaded,
    Finalized,
    Failed {
        failed_stage: PipelineStage,
        reason: String,
    },
}

impl PipelineState {
    /// Apply `event`, returning the next state.
    ///
    /// Requesting another upload URL while one is outstanding is allowed so
    /// that an expired URL can be replaced.
    pub fn transition(&self, event: PipelineEvent) -> Result<Self, DomainError> {
        use PipelineEvent as E;

        let next = match (self, event) {
            (Self::Finalized | Self::Failed { .. }, event) => return Err(self.reject(&event)),
            (_, E::Fail { reason }) => Self::Failed {
                failed_stage: self.stage_in_progress(),
                reason,
            },
            (Self::Idle, E::StartRecording) => Self::Recording,
            (Self::Idle, E::StartSelecting) => Self::Selecting,
            (Self::Recording | Self::Selecting, E::Capture) => Self::Captured,
            (Self::Captured, E::SubmitMetadata) => Self::MetadataSubmitted,
            (Self::MetadataSubmitted | Self::UploadUrlObtained, E::IssueUploadUrl) => {
                Self::UploadUrlObtained
            }
            (Self::UploadUrlObtained, E::CompleteUpload) => Self::Uploaded,
            (Self::Uploaded, E::Finalize) => Self::Finalized,
            (_, event) => return Err(self.reject(&event)),
        };

        Ok(next)
    }

    fn reject(&self, event: &PipelineEvent) -> DomainError {
        DomainError::InvalidTransition {
            from: self.stage_name(),
            event: event.name(),
        }
    }

    /// The step a failure in this state would be attributed to
    pub fn stage_in_progress(&self) -> PipelineStage {
        match self {
            Self::Idle | Self::Recording | Self::Selecting => PipelineStage::Capture,
            Self::Captured => PipelineStage::Metadata,
            Self::MetadataSubmitted => PipelineStage::UploadUrl,
            Self::UploadUrlObtained => PipelineStage::Upload,
            Self::Uploaded | Self::Finalized => PipelineStage::Finalize,
            Self::Failed { failed_stage, .. } => *failed_stage,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed { .. })
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Column value for the persisted `stage`
    pub fn stage_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Selecting => "selecting",
            Self::Captured => "captured",
            Self::MetadataSubmitted => "metadata_submitted",
            Self::UploadUrlObtained => "upload_url_obtained",
            Self::Uploaded => "uploaded",
            Self::Finalized => "finalized",
            Self::Failed { .. } => "failed",
        }
    }

    /// Rebuild a persisted state from its columns
    pub fn from_columns(
        stage: &str,
        failed_stage: Option<&str>,
        failure_reason: Option<String>,
    ) -> Option<Self> {
        let state = match stage {
            "metadata_submitted" => Self::MetadataSubmitted,
            "upload_url_obtained" => Self::UploadUrlObtained,
            "uploaded" => Self::Uploaded,
            "finalized" => Self::Finalized,
            "failed" => Self::Failed {
                failed_stage: failed_stage.and_then(PipelineStage::parse)?,
                reason: failure_reason.unwrap_or_default(),
            },
            _ => return None,
        };
        Some(state)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(events: Vec<PipelineEvent>) -> Result<PipelineState, DomainError> {
        events
            .into_iter()
            .try_fold(PipelineState::Idle, |state, event| state.transition(event))
    }

    #[test]
    fn test_happy_path_from_recording() {
        let state = drive(vec![
            PipelineEvent::StartRecording,
            PipelineEvent::Capture,
            PipelineEvent::SubmitMetadata,
            PipelineEvent::IssueUploadUrl,
            PipelineEvent::CompleteUpload,
            PipelineEvent::Finalize,
        ])
        .unwrap();
        assert_eq!(state, PipelineState::Finalized);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_happy_path_from_selecting() {
        let state = drive(vec![
            PipelineEvent::StartSelecting,
            PipelineEvent::Capture,
            PipelineEvent::SubmitMetadata,
        ])
        .unwrap();
        assert_eq!(state, PipelineState::MetadataSubmitted);
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        let err = PipelineState::MetadataSubmitted
            .transition(PipelineEvent::Finalize)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: "metadata_submitted",
                event: "finalize"
            }
        ));

        assert!(PipelineState::Idle
            .transition(PipelineEvent::SubmitMetadata)
            .is_err());
        assert!(PipelineState::MetadataSubmitted
            .transition(PipelineEvent::CompleteUpload)
            .is_err());
    }

    #[test]
    fn test_upload_url_can_be_reissued() {
        let state = PipelineState::UploadUrlObtained
            .transition(PipelineEvent::IssueUploadUrl)
            .unwrap();
        assert_eq!(state, PipelineState::UploadUrlObtained);
    }

    #[test]
    fn test_failure_records_stage() {
        let state = PipelineState::UploadUrlObtained
            .transition(PipelineEvent::Fail {
                reason: "network dropped".to_string(),
            })
            .unwrap();
        assert_eq!(
            state,
            PipelineState::Failed {
                failed_stage: PipelineStage::Upload,
                reason: "network dropped".to_string()
            }
        );
    }

    #[test]
    fn test_terminal_states_absorb() {
        let failed = PipelineState::Failed {
            failed_stage: PipelineStage::Upload,
            reason: "x".to_string(),
        };
        assert!(failed.transition(PipelineEvent::Finalize).is_err());
        assert!(failed
            .transition(PipelineEvent::Fail {
                reason: "again".to_string()
            })
            .is_err());
        assert!(PipelineState::Finalized
            .transition(PipelineEvent::IssueUploadUrl)
            .is_err());
    }

    #[test]
    fn test_persisted_columns_round_trip() {
        let failed = PipelineState::Failed {
            failed_stage: PipelineStage::Finalize,
            reason: "bad id".to_string(),
        };
        let rebuilt = PipelineState::from_columns(
            failed.stage_name(),
            Some(failed.stage_in_progress().as_str()),
            Some("bad id".to_string()),
        );
        assert_eq!(rebuilt, Some(failed));

        assert_eq!(
            PipelineState::from_columns("uploaded", None, None),
            Some(PipelineState::Uploaded)
        );
        assert_eq!(PipelineState::from_columns("recording", None, None), None);
        assert_eq!(PipelineState::from_columns("failed", None, None), None);
    }
}
