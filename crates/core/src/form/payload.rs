//! Submission payload handed to the persistence collaborator, and the
//! stored record shape it is hydrated from when editing.
//!
//! Split groups are fixed arrays in memory and flat
//! `{category}_split_{n}_{wallet|percentage}` columns on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bundle::{BundleEditor, PersistedBundleItem, TrackMetadata};
use crate::content_type::{ContentType, LoopCategory};
use crate::error::CoreError;
use crate::licensing::{LicenseType, LicensingSelection};
use crate::location::{LocationPayload, LocationTagResolver};
use crate::splits::{RightsCategory, SplitGroup, SplitSlot, SPLIT_SLOTS};
use crate::types::{RecordId, WalletAddress};
use crate::uploads::MediaAsset;

use super::draft::{TrackDraft, VideoCrop};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Content-type-specific title column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleField {
    Title(String),
    PackTitle(String),
    EpTitle(String),
}

/// Content-type-specific media column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaField {
    AudioUrl(String),
    VideoUrl(String),
    LoopFiles(Vec<String>),
    EpFiles(Vec<String>),
}

/// One logical write of a track. `id` is set when replacing a stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub uploader_address: WalletAddress,
    pub content_type: ContentType,
    #[serde(flatten)]
    pub title: TitleField,
    pub artist: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub split_columns: BTreeMap<String, Value>,

    pub license_type: LicenseType,
    pub allow_remixing: bool,
    pub allow_downloads: bool,
    pub remix_protected: bool,
    pub allow_streaming: bool,
    pub remix_price: Option<f64>,
    /// Download total: the flat price for singletons, unit × count for
    /// bundles.
    pub download_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_loop: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_song: Option<f64>,

    pub bpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_category: Option<LoopCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_descriptor: Option<String>,

    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub primary_location: Option<String>,
    pub locations: Vec<LocationPayload>,

    #[serde(flatten)]
    pub media: Option<MediaField>,
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_metadata: Option<Vec<TrackMetadata>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_crop: Option<VideoCrop>,

    pub notes: Option<String>,
    pub connected_release: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_key(category: RightsCategory, slot: usize, field: &str) -> String {
    format!("{}_split_{}_{field}", category.as_str(), slot + 1)
}

/// Flatten a split group into its wire columns. Empty wallets are `null`.
pub fn split_columns(category: RightsCategory, group: &SplitGroup) -> BTreeMap<String, Value> {
    let mut columns = BTreeMap::new();
    for (idx, slot) in group.slots.iter().enumerate() {
        let wallet = non_empty(&slot.wallet).map_or(Value::Null, Value::String);
        columns.insert(split_key(category, idx, "wallet"), wallet);
        columns.insert(split_key(category, idx, "percentage"), Value::from(slot.percentage));
    }
    columns
}

/// Rebuild a split group from wire columns. Missing or `null` columns read
/// as an empty slot.
pub fn split_group_from_columns(
    category: RightsCategory,
    columns: &BTreeMap<String, Value>,
) -> SplitGroup {
    let mut group = SplitGroup::default();
    for idx in 0..SPLIT_SLOTS {
        let wallet = columns
            .get(&split_key(category, idx, "wallet"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let percentage = columns
            .get(&split_key(category, idx, "percentage"))
            .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or_default();
        group.slots[idx] = SplitSlot {
            wallet: wallet.to_string(),
            percentage,
        };
    }
    group
}

fn asset_url(asset: &Option<MediaAsset>) -> Option<String> {
    asset
        .as_ref()
        .and_then(|a| a.status.url())
        .map(str::to_string)
}

impl SubmissionPayload {
    /// Assemble the payload from a validated draft.
    ///
    /// Bundle positions are derived here, from the list order at this moment.
    pub fn from_draft(draft: &TrackDraft, uploader: &WalletAddress) -> Self {
        let ct = draft.content_type;
        let quote = draft.quote();
        let title = draft.title.trim().to_string();

        let title = match ct {
            ContentType::LoopPack => TitleField::PackTitle(title),
            ContentType::Ep => TitleField::EpTitle(title),
            _ => TitleField::Title(title),
        };

        let bundle_urls = || -> Vec<String> {
            draft
                .bundle
                .items()
                .iter()
                .filter_map(|i| i.upload.url().map(str::to_string))
                .collect()
        };
        let media = match ct {
            ContentType::Loop | ContentType::FullSong => asset_url(&draft.audio).map(MediaField::AudioUrl),
            ContentType::VideoClip => asset_url(&draft.video).map(MediaField::VideoUrl),
            ContentType::LoopPack => Some(MediaField::LoopFiles(bundle_urls())),
            ContentType::Ep => Some(MediaField::EpFiles(bundle_urls())),
        };

        let track_metadata = ct.is_bundle().then(|| {
            let fallback_bpm = (ct == ContentType::LoopPack).then_some(draft.bpm).flatten();
            draft.bundle.to_submission_metadata(fallback_bpm)
        });

        let mut split_cols = split_columns(RightsCategory::Composition, &draft.composition);
        split_cols.extend(split_columns(RightsCategory::Production, &draft.production));

        let coords = draft.locations.primary_coordinates();
        let licensing = &draft.licensing;

        Self {
            id: draft.record_id,
            uploader_address: uploader.clone(),
            content_type: ct,
            title,
            artist: draft.artist.trim().to_string(),
            description: draft.description.trim().to_string(),
            tags: draft.locations.to_tags(&draft.tags),
            split_columns: split_cols,
            license_type: licensing.license_type(),
            allow_remixing: licensing.allow_remixing,
            allow_downloads: licensing.allow_downloads,
            remix_protected: licensing.remix_protected(),
            allow_streaming: licensing.allow_streaming,
            remix_price: quote.remix_fee,
            download_price: quote.download_total,
            price_per_loop: (ct == ContentType::LoopPack)
                .then_some(quote.download_unit_price)
                .flatten(),
            price_per_song: (ct == ContentType::Ep)
                .then_some(quote.download_unit_price)
                .flatten(),
            bpm: if ct.shows_main_bpm() { draft.bpm } else { None },
            loop_category: draft.loop_category.filter(|_| ct.is_loop_based()),
            loop_descriptor: non_empty(&draft.loop_descriptor).filter(|_| ct.is_loop_based()),
            location_lat: coords.map(|c| c.lat),
            location_lng: coords.map(|c| c.lng),
            primary_location: draft.locations.primary_name().map(str::to_string),
            locations: draft.locations.to_payload(),
            media,
            cover_image_url: asset_url(&draft.cover),
            track_metadata,
            video_crop: draft.video_crop.filter(|_| ct == ContentType::VideoClip),
            notes: non_empty(&draft.notes),
            connected_release: draft.connected_release.as_deref().and_then(non_empty),
        }
    }
}

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// A stored track row as returned by the persistence collaborator.
///
/// Columns other than the named ones, including the split columns, land in
/// `columns`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedTrack {
    pub id: RecordId,
    pub content_type: String,
    pub uploader_address: Option<String>,
    pub title: Option<String>,
    pub pack_title: Option<String>,
    pub ep_title: Option<String>,
    pub artist: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,

    pub allow_remixing: Option<bool>,
    pub allow_downloads: Option<bool>,
    pub remix_protected: Option<bool>,
    pub allow_streaming: Option<bool>,
    pub download_price: Option<f64>,
    pub price_per_loop: Option<f64>,
    pub price_per_song: Option<f64>,

    pub bpm: Option<u32>,
    pub loop_category: Option<String>,
    pub loop_descriptor: Option<String>,

    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub primary_location: Option<String>,
    pub locations: Option<Vec<LocationPayload>>,

    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub video_crop: Option<VideoCrop>,
    pub notes: Option<String>,
    pub connected_release: Option<String>,

    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl TrackDraft {
    /// Rebuild a draft from a stored record and its bundle items.
    ///
    /// The price is recomputed from the loaded inputs; the stored download
    /// total is kept only as a fallback for bundles whose items are missing.
    pub fn from_persisted(
        record: PersistedTrack,
        items: Vec<PersistedBundleItem>,
    ) -> Result<Self, CoreError> {
        let ct = ContentType::from_str_db(&record.content_type)?;
        let mut draft = TrackDraft::new(ct);

        let title = match ct {
            ContentType::LoopPack => record.pack_title.or(record.title),
            ContentType::Ep => record.ep_title.or(record.title),
            _ => record.title,
        };
        draft.title = title.unwrap_or_default();
        draft.artist = record.artist.unwrap_or_default();
        draft.description = record.description.unwrap_or_default();
        draft.tags = record.tags.unwrap_or_default();

        if ct.shows_main_bpm() {
            draft.bpm = record.bpm;
        }
        if ct.is_loop_based() {
            if let Some(category) = record.loop_category.as_deref() {
                draft.loop_category = Some(LoopCategory::from_str_db(category)?);
            }
            draft.loop_descriptor = record.loop_descriptor.unwrap_or_default();
        }

        draft.composition = split_group_from_columns(RightsCategory::Composition, &record.columns);
        draft.production = split_group_from_columns(RightsCategory::Production, &record.columns);

        draft.bundle = BundleEditor::hydrate(items);
        let item_count = draft.bundle.len();

        let defaults = LicensingSelection::defaults_for(ct);
        let allow_downloads = record.allow_downloads.unwrap_or(defaults.allow_downloads);
        let unit_price = match ct {
            ContentType::LoopPack | ContentType::Ep => {
                let per_item = if ct == ContentType::LoopPack {
                    record.price_per_loop
                } else {
                    record.price_per_song
                };
                per_item.or_else(|| {
                    record
                        .download_price
                        .filter(|_| item_count > 0)
                        .map(|total| total / item_count as f64)
                })
            }
            _ => record.download_price,
        };
        let mut licensing = LicensingSelection {
            allow_remixing: record
                .allow_remixing
                .or(record.remix_protected.map(|p| !p))
                .unwrap_or(defaults.allow_remixing),
            allow_downloads,
            allow_streaming: record.allow_streaming.unwrap_or(defaults.allow_streaming),
            download_price: unit_price.filter(|_| allow_downloads),
        };
        licensing.conform_to(ct);
        draft.licensing = licensing;
        if ct.is_bundle() {
            draft.stored_download_total = record.download_price;
        }

        let mut stored_locations = record.locations.unwrap_or_default();
        if stored_locations.is_empty() {
            if let Some(name) = record.primary_location {
                stored_locations.push(LocationPayload {
                    name,
                    lat: record.location_lat,
                    lng: record.location_lng,
                });
            }
        }
        draft.locations = LocationTagResolver::from_stored(stored_locations);

        match ct {
            ContentType::Loop | ContentType::FullSong => {
                draft.audio = record.audio_url.map(MediaAsset::stored);
            }
            ContentType::VideoClip => {
                draft.video = record.video_url.map(MediaAsset::stored);
                draft.video_crop = record.video_crop;
            }
            ContentType::LoopPack | ContentType::Ep => {}
        }
        draft.cover = record.cover_image_url.map(MediaAsset::stored);
        draft.notes = record.notes.unwrap_or_default();
        draft.connected_release = record.connected_release;
        draft.record_id = Some(record.id);

        draft.recompute();
        Ok(draft)
    }
}
