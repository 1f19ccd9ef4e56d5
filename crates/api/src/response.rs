//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope.

use serde::Serialize;
use tunedrop_core::form::FormSnapshot;
use tunedrop_core::types::RecordId;
use uuid::Uuid;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A session's rendering state, tagged with its id.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub snapshot: FormSnapshot,
}

/// Result of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub record_id: RecordId,
    pub session: SessionView,
}
