//! Per-file upload tracking.
//!
//! Every attached file gets an [`UploadKey`]. The controller hands out
//! [`UploadJob`]s and records each [`UploadOutcome`] independently, so one
//! failed file never blocks the others. Bytes are never held by the draft.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::ObjectStorage;
use crate::error::UploadError;
use crate::types::FileHandle;

/// Storage bucket for audio files.
pub const BUCKET_AUDIO: &str = "audio";
/// Storage bucket for video clips.
pub const BUCKET_VIDEO: &str = "video";
/// Storage bucket for cover images.
pub const BUCKET_IMAGES: &str = "images";

/// Local identifier of one attached file, stable across reorders.
pub type UploadKey = Uuid;

/// Where an attached file belongs in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSlot {
    Audio,
    Video,
    Cover,
    Bundle,
}

impl MediaSlot {
    pub fn bucket(self) -> &'static str {
        match self {
            Self::Audio | Self::Bundle => BUCKET_AUDIO,
            Self::Video => BUCKET_VIDEO,
            Self::Cover => BUCKET_IMAGES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Cover => "cover",
            Self::Bundle => "bundle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "cover" => Some(Self::Cover),
            "bundle" => Some(Self::Bundle),
            _ => None,
        }
    }
}

/// Upload state of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    /// Attached, upload not started.
    Pending,
    InFlight,
    Uploaded { url: String },
    Failed { error: String },
}

impl UploadStatus {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Uploaded { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// A single-file media reference in the draft (audio, video or cover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub key: UploadKey,
    pub name: String,
    /// `None` when the file was stored by an earlier session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileHandle>,
    pub status: UploadStatus,
}

impl MediaAsset {
    /// A new file whose upload is about to start.
    pub fn in_flight(file: FileHandle) -> Self {
        Self {
            key: Uuid::new_v4(),
            name: file.name.clone(),
            file: Some(file),
            status: UploadStatus::InFlight,
        }
    }

    /// A file stored by an earlier session.
    pub fn stored(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = url.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            key: Uuid::new_v4(),
            name,
            file: None,
            status: UploadStatus::Uploaded { url },
        }
    }
}

/// File bytes handed in by the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub handle: FileHandle,
    pub data: Vec<u8>,
}

/// Work item for one upload.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub key: UploadKey,
    pub slot: MediaSlot,
    pub file: FileHandle,
    pub data: Vec<u8>,
}

/// Result of one [`UploadJob`].
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub key: UploadKey,
    pub result: Result<String, UploadError>,
}

/// Upload every job concurrently, one storage call per file.
///
/// Outcomes are returned in job order; failures are per file.
pub async fn run_uploads<S>(storage: &S, jobs: Vec<UploadJob>) -> Vec<UploadOutcome>
where
    S: ObjectStorage + ?Sized,
{
    let uploads = jobs.into_iter().map(|job| async move {
        let result = storage
            .upload(job.slot.bucket(), &job.file, job.data)
            .await;
        match &result {
            Ok(url) => tracing::debug!(key = %job.key, file = %job.file.name, %url, "File uploaded"),
            Err(e) => tracing::warn!(key = %job.key, file = %job.file.name, error = %e, "File upload failed"),
        }
        UploadOutcome {
            key: job.key,
            result,
        }
    });
    futures::future::join_all(uploads).await
}
