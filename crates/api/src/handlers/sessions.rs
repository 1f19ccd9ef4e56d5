//! Handlers for authoring sessions.
//!
//! A session is one [`UploadFormController`] owned by the authenticated
//! creator. Every mutating handler answers with the refreshed
//! [`SessionView`] so the client re-renders from a single source of truth.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tunedrop_core::content_type::{ContentType, FormMode};
use tunedrop_core::form::{resolve_location, FormEvent, UploadFormController};
use tunedrop_core::types::{RecordId, WalletAddress};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SessionView, SubmissionResult};
use crate::sessions::{Session, SessionId};
use crate::state::AppState;

fn view(session: &Session) -> SessionView {
    SessionView {
        session_id: session.id,
        snapshot: session.controller.snapshot(),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub content_type: ContentType,
    #[serde(default)]
    pub mode: FormMode,
}

/// POST /api/v1/sessions
///
/// Open a session for a new asset.
pub async fn create_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<impl IntoResponse> {
    let controller = UploadFormController::new(auth.wallet.clone(), input.content_type, input.mode);
    let id = state.sessions.open(auth.wallet.clone(), controller).await;
    let session = state.sessions.lock(id, &auth.wallet).await?;

    tracing::info!(
        session_id = %id,
        content_type = input.content_type.as_str(),
        mode = input.mode.as_str(),
        "Session opened"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: view(&session) })))
}

/// POST /api/v1/sessions/edit/{record_id}
///
/// Open a session editing a stored track of the caller.
pub async fn edit_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .store
        .load(record_id)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    let content_type = ContentType::from_str_db(&record.content_type)?;
    let items = if content_type.is_bundle() {
        state
            .store
            .load_bundle_items(record_id)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?
    } else {
        Vec::new()
    };

    let controller = UploadFormController::hydrate(auth.wallet.clone(), record, items)?;
    let id = state.sessions.open(auth.wallet.clone(), controller).await;
    let session = state.sessions.lock(id, &auth.wallet).await?;

    tracing::info!(session_id = %id, %record_id, "Session opened for editing");

    Ok((StatusCode::CREATED, Json(DataResponse { data: view(&session) })))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let session = state.sessions.lock(id, &auth.wallet).await?;
    Ok(Json(DataResponse { data: view(&session) }))
}

#[derive(Debug, Deserialize)]
pub struct CloseParams {
    #[serde(default)]
    pub force: bool,
}

/// DELETE /api/v1/sessions/{id}?force=
///
/// Close a session. Refused with 409 while a submission is running, and
/// while uploads are in flight unless `force=true`.
pub async fn close_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Query(params): Query<CloseParams>,
) -> AppResult<impl IntoResponse> {
    {
        let mut session = state.sessions.lock(id, &auth.wallet).await?;
        session.controller.close(params.force)?;
    }
    state.sessions.remove(id).await;

    tracing::info!(session_id = %id, force = params.force, "Session closed");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Editing and navigation
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{id}/events
///
/// Apply one [`FormEvent`].
pub async fn apply_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(event): Json<FormEvent>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    session.controller.apply(event)?;
    Ok(Json(DataResponse { data: view(&session) }))
}

/// POST /api/v1/sessions/{id}/next
pub async fn next_step(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    session.controller.next();
    Ok(Json(DataResponse { data: view(&session) }))
}

/// POST /api/v1/sessions/{id}/prev
pub async fn prev_step(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    session.controller.prev();
    Ok(Json(DataResponse { data: view(&session) }))
}

/// POST /api/v1/sessions/{id}/steps/{index}
pub async fn go_to_step(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(SessionId, usize)>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    if !session.controller.go_to_step(index) {
        return Err(AppError::BadRequest(format!(
            "Step {index} does not exist; this form has {} steps",
            session.controller.steps().len()
        )));
    }
    Ok(Json(DataResponse { data: view(&session) }))
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: FormMode,
}

/// PUT /api/v1/sessions/{id}/mode
pub async fn set_mode(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<SetModeRequest>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    session.controller.set_mode(input.mode)?;
    Ok(Json(DataResponse { data: view(&session) }))
}

#[derive(Debug, Deserialize)]
pub struct SetContentTypeRequest {
    pub content_type: ContentType,
}

/// PUT /api/v1/sessions/{id}/content-type
pub async fn set_content_type(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<SetContentTypeRequest>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.sessions.lock(id, &auth.wallet).await?;
    session.controller.set_content_type(input.content_type)?;
    tracing::debug!(session_id = %id, content_type = input.content_type.as_str(), "Content type changed");
    Ok(Json(DataResponse { data: view(&session) }))
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub q: String,
}

/// GET /api/v1/sessions/{id}/locations/suggest?q=
pub async fn suggest_locations(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Query(params): Query<SuggestParams>,
) -> AppResult<impl IntoResponse> {
    // Ownership check only; the lock is released before the lookup.
    drop(state.sessions.lock(id, &auth.wallet).await?);
    let suggestions = state.autocomplete.suggest(&params.q).await?;
    Ok(Json(DataResponse { data: suggestions }))
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{id}/submit
///
/// Validate, geocode the free-text location if any, and persist the track.
/// The session lock is released around each collaborator call; a second
/// submit while this one runs is answered with 409.
///
/// The stages run on their own task, so a request that times out or is
/// dropped by the client still records the outcome on the session.
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let query = state
        .sessions
        .lock(id, &auth.wallet)
        .await?
        .controller
        .begin_submission()?;

    let task = tokio::spawn(run_submission(state.clone(), auth.wallet.clone(), id, query));
    let record_id = match task.await {
        Ok(result) => result?,
        Err(e) => {
            tracing::error!(session_id = %id, error = %e, "Submission task failed");
            if let Ok(mut session) = state.sessions.lock(id, &auth.wallet).await {
                session.controller.abort_submission();
            }
            return Err(AppError::InternalError(format!("Submission task failed: {e}")));
        }
    };

    let session = state.sessions.lock(id, &auth.wallet).await?;
    tracing::info!(session_id = %id, %record_id, "Session submitted");

    Ok(Json(DataResponse {
        data: SubmissionResult {
            record_id,
            session: view(&session),
        },
    }))
}

/// Geocode, assemble and persist a submission begun on session `id`.
async fn run_submission(
    state: AppState,
    wallet: WalletAddress,
    id: SessionId,
    query: Option<String>,
) -> AppResult<RecordId> {
    let geocoded = match query {
        Some(query) => match resolve_location(state.geocoder.as_ref(), &query).await {
            Ok(coords) => Some(coords),
            Err(warning) => {
                let mut session = state.sessions.lock(id, &wallet).await?;
                session.controller.push_warning(warning);
                None
            }
        },
        None => None,
    };

    let payload = state
        .sessions
        .lock(id, &wallet)
        .await?
        .controller
        .prepare_payload(geocoded)?;

    let result = state.store.upsert(&payload).await;

    let mut session = state.sessions.lock(id, &wallet).await?;
    Ok(session.controller.finish_submission(result)?)
}
