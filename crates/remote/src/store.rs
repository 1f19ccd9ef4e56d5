//! [`SubmissionStore`] over a PostgREST-style interface.
//!
//! A submission is written by one call to the [`UPSERT_FUNCTION`] remote
//! procedure, which upserts the track row and, for bundles, replaces its
//! rows in [`BUNDLE_ITEMS_TABLE`] inside a single transaction. The body is
//! `{"track": <row>, "items": [<item>] | null}`; `null` leaves existing items
//! untouched. Items not listed are deleted and the rest are upserted with
//! their recomputed positions. The procedure answers with the track id.
//!
//! Reads go straight to the tables.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use uuid::Uuid;

use tunedrop_core::bundle::{PersistedBundleItem, TrackMetadata};
use tunedrop_core::collaborators::SubmissionStore;
use tunedrop_core::error::PersistenceError;
use tunedrop_core::form::{PersistedTrack, SubmissionPayload};
use tunedrop_core::types::RecordId;

use crate::client::RestClient;
use crate::error::RemoteError;

pub const TRACKS_TABLE: &str = "tracks";
pub const BUNDLE_ITEMS_TABLE: &str = "bundle_items";
pub const UPSERT_FUNCTION: &str = "upsert_track_with_items";

const ACCEPT_SINGLE: &str = "application/vnd.pgrst.object+json";

#[derive(Debug, Serialize)]
struct UpsertArgs<'a> {
    track: &'a SubmissionPayload,
    items: Option<Vec<BundleItemRow<'a>>>,
}

/// One bundle item; the procedure fills in `parent_id`.
#[derive(Debug, Serialize)]
struct BundleItemRow<'a> {
    id: String,
    title: &'a str,
    bpm: Option<u32>,
    position: u32,
    audio_url: Option<&'a str>,
}

impl<'a> BundleItemRow<'a> {
    fn from_metadata(item: &'a TrackMetadata) -> Self {
        Self {
            id: item
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: &item.title,
            bpm: item.bpm,
            position: item.position,
            audio_url: item.audio_url.as_deref(),
        }
    }
}

pub struct RestSubmissionStore {
    rest: RestClient,
}

impl RestSubmissionStore {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    async fn call_upsert(&self, payload: &SubmissionPayload) -> Result<RecordId, RemoteError> {
        let args = UpsertArgs {
            track: payload,
            items: payload
                .track_metadata
                .as_ref()
                .map(|items| items.iter().map(BundleItemRow::from_metadata).collect()),
        };
        let response = self
            .rest
            .request(Method::POST, &format!("rpc/{UPSERT_FUNCTION}"))
            .json(&args)
            .send()
            .await?;
        RestClient::parse_response(response).await
    }
}

#[async_trait]
impl SubmissionStore for RestSubmissionStore {
    async fn upsert(&self, payload: &SubmissionPayload) -> Result<RecordId, PersistenceError> {
        let id = self
            .call_upsert(payload)
            .await
            .map_err(PersistenceError::from_display)?;
        tracing::debug!(
            record_id = %id,
            content_type = payload.content_type.as_str(),
            items = payload.track_metadata.as_ref().map_or(0, Vec::len),
            "Track upserted"
        );
        Ok(id)
    }

    async fn load(&self, id: RecordId) -> Result<PersistedTrack, PersistenceError> {
        let response = self
            .rest
            .request(Method::GET, &format!("{TRACKS_TABLE}?id=eq.{id}&select=*"))
            .header("Accept", ACCEPT_SINGLE)
            .send()
            .await
            .map_err(PersistenceError::from_display)?;
        // A single-object request for zero rows is answered with 406.
        if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            return Err(PersistenceError(format!("Track {id} not found")));
        }
        RestClient::parse_response(response)
            .await
            .map_err(PersistenceError::from_display)
    }

    async fn load_bundle_items(
        &self,
        parent_id: RecordId,
    ) -> Result<Vec<PersistedBundleItem>, PersistenceError> {
        let response = self
            .rest
            .request(
                Method::GET,
                &format!("{BUNDLE_ITEMS_TABLE}?parent_id=eq.{parent_id}&order=position.asc"),
            )
            .send()
            .await
            .map_err(PersistenceError::from_display)?;
        RestClient::parse_response(response)
            .await
            .map_err(PersistenceError::from_display)
    }
}
