//! [`BpmDetector`] over an audio analysis HTTP service.
//!
//! The file bytes are POSTed to `{base}/detect`. The service answers with
//! `{"bpm": u32, "confidence": f64}`, or `null` when no tempo was found.

use async_trait::async_trait;
use reqwest::Method;

use tunedrop_core::collaborators::{BpmDetection, BpmDetector};
use tunedrop_core::error::CoreError;
use tunedrop_core::types::FileHandle;

use crate::client::RestClient;

pub struct RestBpmDetector {
    rest: RestClient,
}

impl RestBpmDetector {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl BpmDetector for RestBpmDetector {
    async fn detect(&self, file: &FileHandle, data: &[u8]) -> Result<Option<BpmDetection>, CoreError> {
        let content_type = file
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let response = self
            .rest
            .request(Method::POST, "detect")
            .header("Content-Type", content_type)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("BPM detection failed: {e}")))?;
        let detection: Option<BpmDetection> = RestClient::parse_response(response)
            .await
            .map_err(|e| CoreError::Internal(format!("BPM detection failed: {e}")))?;

        tracing::debug!(file = %file.name, ?detection, "BPM detection finished");
        Ok(detection)
    }
}
