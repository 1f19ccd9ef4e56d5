//! Route definitions for authoring sessions, mounted at `/sessions`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{sessions, uploads};
use crate::state::AppState;

/// ```text
/// POST   /                              -> create_session
/// POST   /edit/{record_id}              -> edit_session
/// GET    /{id}                          -> get_session
/// DELETE /{id}                          -> close_session
/// POST   /{id}/events                   -> apply_event
/// POST   /{id}/next                     -> next_step
/// POST   /{id}/prev                     -> prev_step
/// POST   /{id}/steps/{index}            -> go_to_step
/// PUT    /{id}/mode                     -> set_mode
/// PUT    /{id}/content-type             -> set_content_type
/// GET    /{id}/locations/suggest        -> suggest_locations
/// POST   /{id}/submit                   -> submit
/// POST   /{id}/files/{slot}             -> upload_files
/// POST   /{id}/files/retry/{key}        -> retry_upload
/// ```
pub fn router(max_upload_body_bytes: usize) -> Router<AppState> {
    let files = Router::new()
        .route("/{id}/files/{slot}", post(uploads::upload_files))
        .route("/{id}/files/retry/{key}", post(uploads::retry_upload))
        .layer(DefaultBodyLimit::max(max_upload_body_bytes));

    Router::new()
        .route("/", post(sessions::create_session))
        .route("/edit/{record_id}", post(sessions::edit_session))
        .route(
            "/{id}",
            get(sessions::get_session).delete(sessions::close_session),
        )
        .route("/{id}/events", post(sessions::apply_event))
        .route("/{id}/next", post(sessions::next_step))
        .route("/{id}/prev", post(sessions::prev_step))
        .route("/{id}/steps/{index}", post(sessions::go_to_step))
        .route("/{id}/mode", put(sessions::set_mode))
        .route("/{id}/content-type", put(sessions::set_content_type))
        .route("/{id}/locations/suggest", get(sessions::suggest_locations))
        .route("/{id}/submit", post(sessions::submit))
        .merge(files)
}
