#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::{Notify, Semaphore};
use tower::ServiceExt;
use uuid::Uuid;

use tunedrop_api::app::build_app;
use tunedrop_api::auth::jwt::{generate_access_token, JwtConfig};
use tunedrop_api::config::ServerConfig;
use tunedrop_api::sessions::SessionRegistry;
use tunedrop_api::state::AppState;
use tunedrop_core::bundle::PersistedBundleItem;
use tunedrop_core::collaborators::{
    BpmDetection, BpmDetector, CanonicalWalletResolver, Geocoder, LocationAutocomplete,
    LocationSuggestion, ObjectStorage, SubmissionStore,
};
use tunedrop_core::error::{CoreError, PersistenceError, UploadError};
use tunedrop_core::form::{PersistedTrack, SubmissionPayload};
use tunedrop_core::types::{Coordinates, FileHandle, RecordId};

pub const ALICE: &str = "0xa11ce";
pub const BOB: &str = "0xb0b";

const JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

// ---------------------------------------------------------------------------
// Collaborator doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Vec<SubmissionPayload>>,
    pub records: Mutex<HashMap<RecordId, PersistedTrack>>,
    pub items: Mutex<HashMap<RecordId, Vec<PersistedBundleItem>>>,
    pub fail_with: Mutex<Option<String>>,
    /// When set, writes wait for a permit before completing.
    pub hold: Mutex<Option<Arc<Semaphore>>>,
    /// Notified as each write starts.
    pub write_started: Notify,
}

impl MemoryStore {
    /// Make writes wait until the returned semaphore is given a permit.
    pub fn hold_writes(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.hold.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.saved.lock().unwrap().last().cloned()
    }

    pub fn insert(&self, record: PersistedTrack) {
        self.records.lock().unwrap().insert(record.id, record);
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn upsert(&self, payload: &SubmissionPayload) -> Result<RecordId, PersistenceError> {
        self.write_started.notify_one();
        let hold = self.hold.lock().unwrap().clone();
        if let Some(gate) = hold {
            let _permit = gate.acquire().await;
        }
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(PersistenceError(message));
        }
        self.saved.lock().unwrap().push(payload.clone());
        Ok(payload.id.unwrap_or_else(Uuid::new_v4))
    }

    async fn load(&self, id: RecordId) -> Result<PersistedTrack, PersistenceError> {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PersistenceError(format!("Track {id} not found")))
    }

    async fn load_bundle_items(
        &self,
        parent_id: RecordId,
    ) -> Result<Vec<PersistedBundleItem>, PersistenceError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&parent_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    pub failing: Mutex<HashSet<String>>,
    pub stored: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        file: &FileHandle,
        _data: Vec<u8>,
    ) -> Result<String, UploadError> {
        if self.failing.lock().unwrap().contains(&file.name) {
            return Err(UploadError::new(&file.name, "503 Service Unavailable"));
        }
        let url = format!("memory://{bucket}/{}", file.name);
        self.stored.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

/// Answers every query with the same place.
pub struct FixedPlaces {
    pub place: Option<LocationSuggestion>,
}

#[async_trait]
impl LocationAutocomplete for FixedPlaces {
    async fn suggest(&self, _text: &str) -> Result<Vec<LocationSuggestion>, CoreError> {
        Ok(self.place.clone().into_iter().collect())
    }
}

#[async_trait]
impl Geocoder for FixedPlaces {
    async fn geocode(&self, _text: &str) -> Result<Option<Coordinates>, CoreError> {
        Ok(self.place.as_ref().map(|p| Coordinates {
            lat: p.lat,
            lng: p.lng,
        }))
    }
}

/// Detects the same tempo in every file.
pub struct FixedTempo(pub BpmDetection);

#[async_trait]
impl BpmDetector for FixedTempo {
    async fn detect(
        &self,
        _file: &FileHandle,
        _data: &[u8],
    ) -> Result<Option<BpmDetection>, CoreError> {
        Ok(Some(self.0))
    }
}

pub const DETECTED_BPM: u32 = 124;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_idle_timeout_secs: 3600,
        max_upload_body_bytes: 16 * 1024 * 1024,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    pub sessions: Arc<SessionRegistry>,
}

pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(MemoryStorage::default());
    let sessions = Arc::new(SessionRegistry::new());
    let places = Arc::new(FixedPlaces {
        place: Some(LocationSuggestion {
            name: "Lisbon, Portugal".to_string(),
            lat: 38.72,
            lng: -9.14,
        }),
    });

    let state = AppState {
        config: Arc::new(test_config()),
        sessions: Arc::clone(&sessions),
        identity: Arc::new(CanonicalWalletResolver),
        store: store.clone(),
        storage: storage.clone(),
        autocomplete: places.clone(),
        geocoder: places,
        bpm_detector: Some(Arc::new(FixedTempo(BpmDetection {
            bpm: DETECTED_BPM,
            confidence: 0.9,
        }))),
    };

    TestApp {
        router: build_app(state),
        store,
        storage,
        sessions,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub fn token_for(wallet: &str) -> String {
    generate_access_token(wallet, &test_config().jwt).unwrap()
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    wallet: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(wallet) = wallet {
        builder = builder.header("authorization", format!("Bearer {}", token_for(wallet)));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// One multipart part: `(file name, MIME type, bytes)`.
pub type Part<'a> = (&'a str, &'a str, &'a [u8]);

pub async fn upload(app: &Router, uri: &str, wallet: &str, parts: &[Part<'_>]) -> Response<Body> {
    const BOUNDARY: &str = "tunedrop-test-boundary";
    let mut body = Vec::new();
    for (name, mime, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token_for(wallet)))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Open a session and return its id.
pub async fn open_session(app: &Router, wallet: &str, content_type: &str, mode: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/v1/sessions",
        Some(wallet),
        Some(serde_json::json!({ "content_type": content_type, "mode": mode })),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}
