//! In-memory collaborator doubles for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::bundle::PersistedBundleItem;
use crate::collaborators::{BpmDetection, BpmDetector, Geocoder, ObjectStorage, SubmissionStore};
use crate::error::{CoreError, PersistenceError, UploadError};
use crate::form::{PersistedTrack, SubmissionPayload};
use crate::types::{Coordinates, FileHandle, RecordId};

/// Object storage that keeps file names and fails on chosen names.
#[derive(Default)]
pub struct MemoryStorage {
    fail_on: Vec<String>,
    uploaded: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|n| n.to_string()).collect(),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    pub fn uploaded_count(&self) -> usize {
        self.uploaded.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        file: &FileHandle,
        _data: Vec<u8>,
    ) -> Result<String, UploadError> {
        if self.fail_on.contains(&file.name) {
            return Err(UploadError::new(&file.name, "503 Service Unavailable"));
        }
        self.uploaded.lock().unwrap().push(file.name.clone());
        Ok(format!("memory://{bucket}/{}", file.name))
    }
}

/// Submission store that records payloads, or rejects every write.
#[derive(Default)]
pub struct MemoryStore {
    error: Option<String>,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl MemoryStore {
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn upsert(&self, payload: &SubmissionPayload) -> Result<RecordId, PersistenceError> {
        if let Some(message) = &self.error {
            return Err(PersistenceError::from_display(message));
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(payload.id.unwrap_or_else(uuid::Uuid::new_v4))
    }

    async fn load(&self, id: RecordId) -> Result<PersistedTrack, PersistenceError> {
        Err(PersistenceError(format!("track {id} not found")))
    }

    async fn load_bundle_items(
        &self,
        _parent_id: RecordId,
    ) -> Result<Vec<PersistedBundleItem>, PersistenceError> {
        Ok(Vec::new())
    }
}

/// Geocoder with a fixed answer.
pub enum StaticGeocoder {
    Found(Coordinates),
    NotFound,
    Failing,
}

impl StaticGeocoder {
    pub fn found(lat: f64, lng: f64) -> Self {
        Self::Found(Coordinates { lat, lng })
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn failing() -> Self {
        Self::Failing
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, _text: &str) -> Result<Option<Coordinates>, CoreError> {
        match self {
            Self::Found(coords) => Ok(Some(*coords)),
            Self::NotFound => Ok(None),
            Self::Failing => Err(CoreError::Internal("geocoder unavailable".to_string())),
        }
    }
}

/// BPM detector with a fixed answer; `None` fails every call.
pub struct StaticBpm(pub Option<BpmDetection>);

#[async_trait]
impl BpmDetector for StaticBpm {
    async fn detect(
        &self,
        _file: &FileHandle,
        _data: &[u8],
    ) -> Result<Option<BpmDetection>, CoreError> {
        self.0
            .map(Some)
            .ok_or_else(|| CoreError::Internal("detector unavailable".to_string()))
    }
}
