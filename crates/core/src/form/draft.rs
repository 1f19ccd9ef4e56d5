//! The in-memory submission aggregate owned by one authoring session.

use serde::{Deserialize, Serialize};

use crate::bundle::BundleEditor;
use crate::content_type::{ContentType, LoopCategory};
use crate::error::ValidationIssue;
use crate::licensing::LicensingSelection;
use crate::location::LocationTagResolver;
use crate::pricing::{price, PriceQuote};
use crate::splits::{RightsCategory, SplitGroup};
use crate::types::RecordId;
use crate::uploads::{MediaAsset, UploadKey, UploadStatus};

use super::defaults::PartialSubmission;

/// Crop rectangle for a video clip, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl VideoCrop {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.width <= 0.0 || self.height <= 0.0 {
            issues.push(ValidationIssue::new(
                "video_crop",
                "Crop width and height must be positive",
            ));
        }
        if self.zoom <= 0.0 {
            issues.push(ValidationIssue::new("video_crop", "Crop zoom must be positive"));
        }
        if self.x < 0.0
            || self.y < 0.0
            || self.x + self.width > f64::from(self.natural_width)
            || self.y + self.height > f64::from(self.natural_height)
        {
            issues.push(ValidationIssue::new(
                "video_crop",
                "Crop area must lie within the video frame",
            ));
        }
        issues
    }
}

/// Everything collected for one asset before it is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDraft {
    pub content_type: ContentType,
    pub title: String,
    pub artist: String,
    pub description: String,
    pub tags: Vec<String>,
    pub bpm: Option<u32>,
    pub loop_category: Option<LoopCategory>,
    pub loop_descriptor: String,
    pub composition: SplitGroup,
    pub production: SplitGroup,
    pub licensing: LicensingSelection,
    /// Last computed quote. Recomputed after every change and again
    /// before submission.
    pub price: PriceQuote,
    pub locations: LocationTagResolver,
    pub bundle: BundleEditor,
    pub audio: Option<MediaAsset>,
    pub video: Option<MediaAsset>,
    pub cover: Option<MediaAsset>,
    pub video_crop: Option<VideoCrop>,
    pub connected_release: Option<String>,
    pub notes: String,
    /// Set when editing a stored record.
    pub record_id: Option<RecordId>,
    /// Download total of the stored record, used only when the bundle
    /// items it was computed from could not be loaded.
    pub stored_download_total: Option<f64>,
}

impl TrackDraft {
    /// An empty draft for `content_type`.
    pub fn new(content_type: ContentType) -> Self {
        let licensing = LicensingSelection::defaults_for(content_type);
        let mut draft = Self {
            content_type,
            title: String::new(),
            artist: String::new(),
            description: String::new(),
            tags: Vec::new(),
            bpm: None,
            loop_category: content_type
                .is_loop_based()
                .then_some(LoopCategory::default()),
            loop_descriptor: String::new(),
            composition: SplitGroup::default(),
            production: SplitGroup::default(),
            licensing,
            price: PriceQuote::default(),
            locations: LocationTagResolver::default(),
            bundle: BundleEditor::default(),
            audio: None,
            video: None,
            cover: None,
            video_crop: None,
            connected_release: None,
            notes: String::new(),
            record_id: None,
            stored_download_total: None,
        };
        draft.recompute();
        draft
    }

    pub fn split(&self, category: RightsCategory) -> &SplitGroup {
        match category {
            RightsCategory::Composition => &self.composition,
            RightsCategory::Production => &self.production,
        }
    }

    pub fn split_mut(&mut self, category: RightsCategory) -> &mut SplitGroup {
        match category {
            RightsCategory::Composition => &mut self.composition,
            RightsCategory::Production => &mut self.production,
        }
    }

    /// Number of priced items: bundle size for bundles, 1 otherwise.
    pub fn item_count(&self) -> usize {
        if self.content_type.is_bundle() {
            self.bundle.len()
        } else {
            1
        }
    }

    /// Derive the current price quote.
    pub fn quote(&self) -> PriceQuote {
        let mut quote = price(self.content_type, &self.licensing, self.item_count());
        if self.content_type.is_bundle()
            && self.bundle.is_empty()
            && self.licensing.allow_downloads
            && quote.download_total.is_none_or(|t| t == 0.0)
        {
            if let Some(stored) = self.stored_download_total {
                quote.download_total = Some(stored);
            }
        }
        quote
    }

    /// Refresh every derived field.
    pub fn recompute(&mut self) {
        self.price = self.quote();
    }

    /// Merge a defaults bundle into the draft.
    pub fn merge(&mut self, partial: PartialSubmission) {
        self.composition = partial.composition;
        self.production = partial.production;
        self.licensing = partial.licensing;
        self.recompute();
    }

    /// Switch content type, clearing fields that no longer apply.
    pub fn switch_content_type(&mut self, content_type: ContentType) {
        let previous = self.content_type;
        if previous == content_type {
            return;
        }
        self.content_type = content_type;

        if content_type.is_loop_based() {
            self.loop_category.get_or_insert_with(LoopCategory::default);
        } else {
            self.loop_category = None;
            self.loop_descriptor.clear();
        }
        if !content_type.shows_main_bpm() {
            self.bpm = None;
        }

        let single_audio = |ct: ContentType| matches!(ct, ContentType::Loop | ContentType::FullSong);
        if !(single_audio(previous) && single_audio(content_type)) {
            self.audio = None;
        }
        if content_type != ContentType::VideoClip {
            self.video = None;
            self.video_crop = None;
        }
        // Bundle item ceilings differ between packs and EPs.
        self.bundle.clear();
        self.stored_download_total = None;

        self.licensing.conform_to(content_type);
        self.recompute();
    }

    /// Every single-file asset slot.
    pub fn assets(&self) -> impl Iterator<Item = &MediaAsset> {
        self.audio.iter().chain(self.video.iter()).chain(self.cover.iter())
    }

    /// Status of every tracked upload, media slots and bundle items.
    pub fn upload_statuses(&self) -> impl Iterator<Item = (UploadKey, &UploadStatus)> {
        self.assets()
            .map(|a| (a.key, &a.status))
            .chain(self.bundle.items().iter().map(|i| (i.key, &i.upload)))
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.upload_statuses()
            .filter(|(_, status)| status.is_in_flight())
            .count()
    }

    /// Set the status of the upload identified by `key`.
    ///
    /// Returns `false` if nothing in the draft carries that key, e.g. the
    /// item was removed while its upload was running.
    pub fn set_upload_status(&mut self, key: UploadKey, status: UploadStatus) -> bool {
        for asset in [&mut self.audio, &mut self.video, &mut self.cover]
            .into_iter()
            .flatten()
        {
            if asset.key == key {
                asset.status = status;
                return true;
            }
        }
        if let Some(item) = self.bundle.find_mut(key) {
            item.upload = status;
            return true;
        }
        false
    }
}
