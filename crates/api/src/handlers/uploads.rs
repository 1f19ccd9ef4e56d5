//! Handlers for media uploads into a session.
//!
//! Files arrive as multipart parts. They are checked and registered on the
//! controller first, then sent to object storage concurrently with the
//! session unlocked, and finally each outcome is recorded on its file. A
//! storage failure marks only that file as failed.
//!
//! A new main audio file is also sent to the BPM detector, when one is
//! configured, alongside its upload.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tunedrop_core::form::detect_bpm;
use tunedrop_core::types::FileHandle;
use tunedrop_core::uploads::{run_uploads, IncomingFile, MediaSlot, UploadJob, UploadKey};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SessionView};
use crate::sessions::SessionId;
use crate::state::AppState;

/// Text part carrying the measured playback duration of the file part before it.
const DURATION_FIELD: &str = "duration_secs";

/// Read every file part of `multipart`. Parts without a file name are
/// skipped, except [`DURATION_FIELD`].
async fn read_files(mut multipart: Multipart) -> AppResult<Vec<IncomingFile>> {
    let mut files: Vec<IncomingFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().map(str::to_string);
        if field_name.as_deref() == Some(DURATION_FIELD) {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let secs: f64 = text.trim().parse().map_err(|_| {
                AppError::BadRequest(format!("{DURATION_FIELD} must be a number, got '{text}'"))
            })?;
            let last = files.last_mut().ok_or_else(|| {
                AppError::BadRequest(format!("{DURATION_FIELD} must follow the file it describes"))
            })?;
            last.handle.duration_secs = Some(secs);
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut handle = FileHandle::new(file_name, data.len() as u64);
        handle.mime_type = mime_type;
        files.push(IncomingFile {
            handle,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(
            "No files received in multipart upload".to_string(),
        ));
    }
    Ok(files)
}

/// Send `jobs` to storage and record each outcome on the session.
/// `tempo_source` is an audio file to run tempo detection on meanwhile.
async fn upload_and_record(
    state: &AppState,
    auth: &AuthUser,
    id: SessionId,
    jobs: Vec<UploadJob>,
    tempo_source: Option<(FileHandle, Vec<u8>)>,
) -> AppResult<SessionView> {
    let detection = async {
        match (state.bpm_detector.as_deref(), tempo_source) {
            (Some(detector), Some((file, data))) => detect_bpm(detector, &file, &data).await,
            _ => None,
        }
    };
    let (outcomes, detection) = tokio::join!(run_uploads(state.storage.as_ref(), jobs), detection);
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    let total = outcomes.len();
    for outcome in outcomes {
        session.controller.record_upload(outcome);
    }
    if failed > 0 {
        tracing::warn!(session_id = %id, failed, total, "Some uploads failed");
    } else {
        tracing::info!(session_id = %id, total, "Uploads stored");
    }
    if let Some(detection) = detection {
        session.controller.apply_detected_bpm(detection);
    }

    Ok(SessionView {
        session_id: session.id,
        snapshot: session.controller.snapshot(),
    })
}

/// POST /api/v1/sessions/{id}/files/{slot}
///
/// Attach files to `audio`, `video`, `cover` or `bundle` and upload them.
/// Rejected files answer 422 with one issue per problem and nothing is
/// stored.
pub async fn upload_files(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, slot_name)): Path<(SessionId, String)>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let slot = MediaSlot::from_name(&slot_name)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown media slot '{slot_name}'")))?;
    let files = read_files(multipart).await?;

    let jobs = state
        .sessions
        .lock(id, &auth.wallet)
        .await?
        .controller
        .attach_files(slot, files)
        .map_err(AppError::Invalid)?;

    tracing::debug!(session_id = %id, slot = slot.as_str(), count = jobs.len(), "Files attached");

    let tempo_source = match (&state.bpm_detector, slot) {
        (Some(_), MediaSlot::Audio) => jobs.first().map(|job| (job.file.clone(), job.data.clone())),
        _ => None,
    };
    let view = upload_and_record(&state, &auth, id, jobs, tempo_source).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/sessions/{id}/files/retry/{key}
///
/// Re-send a failed upload. The body carries the file again as one
/// multipart part.
pub async fn retry_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, key)): Path<(SessionId, UploadKey)>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut files = read_files(multipart).await?;
    if files.len() != 1 {
        return Err(AppError::BadRequest(format!(
            "A retry takes exactly one file, got {}",
            files.len()
        )));
    }
    let file = files.remove(0);

    let job = state
        .sessions
        .lock(id, &auth.wallet)
        .await?
        .controller
        .retry_upload(key, file)?;

    tracing::debug!(session_id = %id, %key, file = %job.file.name, "Retrying upload");

    let view = upload_and_record(&state, &auth, id, vec![job], None).await?;
    Ok(Json(DataResponse { data: view }))
}
