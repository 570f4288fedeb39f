//! MediaFile entity - metadata and storage location of an uploaded file

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::PipelineState;
use crate::value_objects::Snowflake;

/// MediaFile entity
///
/// `storage_ref` and `storage_url` are only set once the pipeline reaches
/// `Finalized`. Rows in any other state are pending and must not be shown to
/// readers as complete.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub storage_ref: Option<String>,
    pub storage_url: Option<String>,
    /// Length in seconds for audio and video
    pub duration: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub state: PipelineState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaFile {
    /// Create the metadata row that opens the server side of the pipeline
    pub fn new(
        id: Snowflake,
        message_id: Snowflake,
        file_name: String,
        file_size: i64,
        mime_type: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            message_id,
            file_name,
            file_size,
            mime_type,
            storage_ref: None,
            storage_url: None,
            duration: None,
            thumbnail_url: None,
            state: PipelineState::MetadataSubmitted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Complete when the storage reference is attached and the pipeline is finalized
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state.is_finalized() && self.storage_ref.is_some()
    }

    #[inline]
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }
}

/// Coarse media category derived from the MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Self {
        let top = mime_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match top.as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilesByType {
    pub image: u64,
    pub video: u64,
    pub audio: u64,
    pub other: u64,
}

/// Storage usage for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MediaStats {
    pub total_files: u64,
    pub total_size: u64,
    pub files_by_type: FilesByType,
    pub average_file_size: u64,
}

impl MediaStats {
    pub fn tally<'a>(files: impl IntoIterator<Item = &'a MediaFile>) -> Self {
        let mut stats = Self::default();
        for file in files {
            stats.total_files += 1;
            stats.total_size += u64::try_from(file.file_size).unwrap_or(0);
            let slot = match file.kind() {
                MediaKind::Image => &mut stats.files_by_type.image,
                MediaKind::Video => &mut stats.files_by_type.video,
                MediaKind::Audio => &mut stats.files_by_type.audio,
                MediaKind::Other => &mut stats.files_by_type.other,
            };
            *slot += 1;
        }
        if stats.total_files > 0 {
            stats.average_file_size = stats.total_size / stats.total_files;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: i64, size: i64, mime: &str) -> MediaFile {
        MediaFile::new(
            Snowflake::new(id),
            Snowflake::new(1),
            format!("file-{id}"),
            size,
            mime.to_string(),
        )
    }

    #[test]
    fn test_new_row_is_pending() {
        let media = file(1, 1024, "audio/webm");
        assert_eq!(media.state, PipelineState::MetadataSubmitted);
        assert!(!media.is_complete());
        assert_eq!(media.kind(), MediaKind::Audio);
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("VIDEO/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/pdf"), MediaKind::Other);
        assert_eq!(MediaKind::from_mime(""), MediaKind::Other);
    }

    #[test]
    fn test_stats_tally() {
        let files = [
            file(1, 100, "image/png"),
            file(2, 300, "image/jpeg"),
            file(3, 200, "video/mp4"),
        ];
        let stats = MediaStats::tally(&files);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 600);
        assert_eq!(stats.average_file_size, 200);
        assert_eq!(stats.files_by_type.image, 2);
        assert_eq!(stats.files_by_type.video, 1);
    }

    #[test]
    fn test_stats_empty() {
        let stats = MediaStats::tally(std::iter::empty());
        assert_eq!(stats, MediaStats::default());
    }
}
