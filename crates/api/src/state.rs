use std::sync::Arc;

use tunedrop_core::collaborators::{
    BpmDetector, Geocoder, IdentityResolver, LocationAutocomplete, ObjectStorage, SubmissionStore,
};

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every collaborator is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Open authoring sessions.
    pub sessions: Arc<SessionRegistry>,
    /// Canonicalizes the wallet carried by the access token.
    pub identity: Arc<dyn IdentityResolver>,
    /// Relational store for submitted tracks.
    pub store: Arc<dyn SubmissionStore>,
    /// Object storage for media bytes.
    pub storage: Arc<dyn ObjectStorage>,
    /// Place suggestions while typing a location.
    pub autocomplete: Arc<dyn LocationAutocomplete>,
    /// Free-text location resolution at submission time.
    pub geocoder: Arc<dyn Geocoder>,
    /// Tempo detection on uploaded audio; `None` leaves BPM to the creator.
    pub bpm_detector: Option<Arc<dyn BpmDetector>>,
}
