pub mod health;
pub mod sessions;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions                                   open (POST)
/// /sessions/edit/{record_id}                  open on a stored track (POST)
/// /sessions/{id}                              snapshot (GET), close (DELETE ?force=)
/// /sessions/{id}/events                       apply a form event (POST)
/// /sessions/{id}/next                         next step (POST)
/// /sessions/{id}/prev                         previous step (POST)
/// /sessions/{id}/steps/{index}                jump to step (POST)
/// /sessions/{id}/mode                         quick / advanced (PUT)
/// /sessions/{id}/content-type                 switch content type (PUT)
/// /sessions/{id}/files/{slot}                 multipart upload (POST)
/// /sessions/{id}/files/retry/{key}            retry a failed upload (POST)
/// /sessions/{id}/locations/suggest?q=         location autocomplete (GET)
/// /sessions/{id}/submit                       validate and persist (POST)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new().nest("/sessions", sessions::router(config.max_upload_body_bytes))
}
