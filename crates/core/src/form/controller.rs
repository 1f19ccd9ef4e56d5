//! The authoring session state machine.
//!
//! One controller owns one [`TrackDraft`]. Every edit goes through it and
//! derived state (price, step issues) is recomputed afterwards. Submission
//! is split into three stages so that callers never hold the controller
//! across a network call:
//!
//! 1. [`begin_submission`](UploadFormController::begin_submission) validates
//!    without touching the network, then marks the session as submitting
//!    and returns the free-text location to geocode, if any.
//! 2. [`prepare_payload`](UploadFormController::prepare_payload) applies the
//!    geocoding result, validates again and assembles the payload.
//! 3. [`finish_submission`](UploadFormController::finish_submission) records
//!    the persistence outcome.
//!
//! [`submit`](UploadFormController::submit) runs all three in order.

use serde::Serialize;

use crate::bundle::PersistedBundleItem;
use crate::collaborators::{
    BpmDetection, BpmDetector, Geocoder, SubmissionStore, MIN_BPM_CONFIDENCE,
};
use crate::content_type::{ContentType, FormMode};
use crate::error::{CoreError, PersistenceError, SubmitError, ValidationIssue};
use crate::policy::{
    check_bpm, check_file, check_files, cover_rule, media_rule, requires_human_created_audio,
    FileRule,
};
use crate::pricing::PriceQuote;
use crate::types::{Coordinates, FileHandle, RecordId, WalletAddress};
use crate::uploads::{
    IncomingFile, MediaAsset, MediaSlot, UploadJob, UploadKey, UploadOutcome, UploadStatus,
};

use super::defaults::apply_defaults;
use super::draft::TrackDraft;
use super::events::FormEvent;
use super::payload::{PersistedTrack, SubmissionPayload};
use super::steps::{sections, steps_for, Section, Step};
use super::validation::{self, submission_issues};

/// Lifecycle of an authoring session after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Editing,
    /// A submission is awaiting its collaborators; edits are refused.
    Submitting,
    /// The draft was persisted and reset.
    Complete,
}

/// Per-step entry of a [`FormSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step: Step,
    pub label: &'static str,
    pub issue_count: usize,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub phase: SessionPhase,
    pub mode: FormMode,
    pub content_type: ContentType,
    pub steps: Vec<StepView>,
    pub step_index: usize,
    pub current_step: Step,
    pub sections: Vec<Section>,
    pub issues: Vec<ValidationIssue>,
    pub can_advance: bool,
    pub can_submit: bool,
    pub composition_total: f64,
    pub production_total: f64,
    pub price: PriceQuote,
    pub show_price_line: bool,
    pub human_created_audio_required: bool,
    pub uploads_in_flight: usize,
    pub warnings: Vec<String>,
    pub last_record_id: Option<RecordId>,
    pub draft: TrackDraft,
}

#[derive(Debug, Clone)]
pub struct UploadFormController {
    identity: WalletAddress,
    mode: FormMode,
    step_index: usize,
    phase: SessionPhase,
    draft: TrackDraft,
    warnings: Vec<String>,
    last_record_id: Option<RecordId>,
}

impl UploadFormController {
    /// Open a session for a new asset. Quick mode starts from the defaults.
    pub fn new(identity: WalletAddress, content_type: ContentType, mode: FormMode) -> Self {
        let mut controller = Self {
            identity,
            mode,
            step_index: 0,
            phase: SessionPhase::Editing,
            draft: TrackDraft::new(content_type),
            warnings: Vec::new(),
            last_record_id: None,
        };
        if mode == FormMode::Quick {
            controller.apply_mode_defaults();
        }
        controller
    }

    /// Open a session editing a stored record. Editing starts in advanced
    /// mode so the stored splits are shown as they are.
    pub fn hydrate(
        identity: WalletAddress,
        record: PersistedTrack,
        items: Vec<PersistedBundleItem>,
    ) -> Result<Self, CoreError> {
        if let Some(owner) = record.uploader_address.as_deref() {
            if !owner.eq_ignore_ascii_case(identity.as_str()) {
                return Err(CoreError::Unauthorized(format!(
                    "Track {} belongs to another creator",
                    record.id
                )));
            }
        }
        let draft = TrackDraft::from_persisted(record, items)?;
        Ok(Self {
            identity,
            mode: FormMode::Advanced,
            step_index: 0,
            phase: SessionPhase::Editing,
            draft,
            warnings: Vec::new(),
            last_record_id: None,
        })
    }

    // -- Accessors ----------------------------------------------------------

    pub fn identity(&self) -> &WalletAddress {
        &self.identity
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn draft(&self) -> &TrackDraft {
        &self.draft
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn last_record_id(&self) -> Option<RecordId> {
        self.last_record_id
    }

    pub fn steps(&self) -> &'static [Step] {
        steps_for(self.mode)
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_step(&self) -> Step {
        let steps = self.steps();
        steps[self.step_index.min(steps.len() - 1)]
    }

    pub fn price(&self) -> PriceQuote {
        self.draft.quote()
    }

    pub fn sections(&self, step: Step) -> Vec<Section> {
        sections(step, self.draft.content_type, &self.draft.quote())
    }

    pub fn step_issues(&self, step: Step) -> Vec<ValidationIssue> {
        validation::step_issues(step, &self.draft, self.mode)
    }

    /// Whether the current step has no open issues. Advisory: `next` does
    /// not enforce it.
    pub fn can_advance(&self) -> bool {
        self.step_issues(self.current_step()).is_empty()
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.draft.uploads_in_flight()
    }

    // -- Navigation ---------------------------------------------------------

    /// Move to the next step. No-op on the last step.
    pub fn next(&mut self) -> bool {
        if self.step_index + 1 >= self.steps().len() {
            return false;
        }
        self.step_index += 1;
        true
    }

    /// Move to the previous step. No-op on the first step.
    pub fn prev(&mut self) -> bool {
        if self.step_index == 0 {
            return false;
        }
        self.step_index -= 1;
        true
    }

    /// Jump to step `index`; out-of-range indices are ignored.
    pub fn go_to_step(&mut self, index: usize) -> bool {
        if index >= self.steps().len() {
            return false;
        }
        self.step_index = index;
        true
    }

    /// Switch authoring mode. Always resets to the first step; switching to
    /// quick mode merges the quick defaults into the draft.
    pub fn set_mode(&mut self, mode: FormMode) -> Result<(), CoreError> {
        self.ensure_editing()?;
        self.step_index = 0;
        if self.mode == mode {
            return Ok(());
        }
        self.mode = mode;
        if mode == FormMode::Quick {
            self.apply_mode_defaults();
        }
        Ok(())
    }

    pub fn toggle_mode(&mut self) -> Result<(), CoreError> {
        self.set_mode(self.mode.toggled())
    }

    /// Switch content type, clearing fields that no longer apply.
    pub fn set_content_type(&mut self, content_type: ContentType) -> Result<(), CoreError> {
        self.ensure_editing()?;
        if self.uploads_in_flight() > 0 && content_type != self.draft.content_type {
            return Err(CoreError::Conflict(
                "Wait for uploads to finish before changing the content type".to_string(),
            ));
        }
        self.draft.switch_content_type(content_type);
        if self.mode == FormMode::Quick {
            self.apply_mode_defaults();
        }
        Ok(())
    }

    fn apply_mode_defaults(&mut self) {
        let defaults = apply_defaults(self.draft.content_type, &self.identity);
        self.draft.merge(defaults);
    }

    fn ensure_editing(&self) -> Result<(), CoreError> {
        match self.phase {
            SessionPhase::Editing => Ok(()),
            SessionPhase::Submitting => Err(CoreError::Conflict(
                "A submission is in progress".to_string(),
            )),
            SessionPhase::Complete => Err(CoreError::Conflict(
                "This draft has already been submitted".to_string(),
            )),
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Apply one edit and recompute derived state.
    pub fn apply(&mut self, event: FormEvent) -> Result<(), CoreError> {
        self.ensure_editing()?;
        let ct = self.draft.content_type;
        let draft = &mut self.draft;

        match event {
            FormEvent::SetTitle { value } => draft.title = value,
            FormEvent::SetArtist { value } => draft.artist = value,
            FormEvent::SetDescription { value } => draft.description = value,
            FormEvent::SetTags { tags } => {
                draft.tags = draft.locations.to_tags(&tags);
            }
            FormEvent::AddTag { tag } => {
                let tag = tag.trim().to_string();
                if !tag.is_empty() && !draft.tags.contains(&tag) {
                    draft.tags.push(tag);
                }
            }
            FormEvent::RemoveTag { tag } => draft.tags.retain(|t| *t != tag),

            FormEvent::SetBpm { bpm } => {
                if !ct.shows_main_bpm() {
                    return Err(CoreError::Validation(format!(
                        "A {} has no main BPM",
                        ct.label()
                    )));
                }
                draft.bpm = bpm;
            }
            FormEvent::DetectedBpm { detection } => {
                self.apply_detected_bpm(detection);
            }
            FormEvent::SetLoopCategory { category } => {
                if !ct.is_loop_based() {
                    return Err(CoreError::Validation(format!(
                        "A {} has no loop category",
                        ct.label()
                    )));
                }
                draft.loop_category = Some(category);
            }
            FormEvent::SetLoopDescriptor { value } => draft.loop_descriptor = value,

            FormEvent::SetSplitWallet {
                category,
                index,
                wallet,
            } => {
                if !draft.split_mut(category).set_wallet(index, &wallet) {
                    return Err(slot_out_of_range(index));
                }
            }
            FormEvent::SetSplitPercentage {
                category,
                index,
                percentage,
            } => {
                if !percentage.is_finite() || percentage < 0.0 {
                    return Err(CoreError::Validation(format!(
                        "Split percentage must be a non-negative number, got {percentage}"
                    )));
                }
                if !draft.split_mut(category).set_percentage(index, percentage) {
                    return Err(slot_out_of_range(index));
                }
            }

            FormEvent::SetRemixProtected { protected } => {
                draft.licensing.set_remix_protected(ct, protected)?;
            }
            FormEvent::SetAllowDownloads { allow } => draft.licensing.set_downloads(ct, allow)?,
            FormEvent::SetAllowStreaming { allow } => draft.licensing.set_streaming(ct, allow)?,
            FormEvent::SetDownloadPrice { price } => draft.licensing.set_download_price(price)?,

            FormEvent::AddLocation { name, lat, lng } => {
                draft.locations.add_from_autocomplete(&name, lat, lng, &mut draft.tags);
            }
            FormEvent::AddFreeTextLocation { text } => {
                draft.locations.add_from_free_text(&text, &mut draft.tags);
            }
            FormEvent::RemoveLocation { index } => {
                if draft.locations.remove(index, &mut draft.tags).is_none() {
                    return Err(CoreError::Validation(format!(
                        "No location at position {index}"
                    )));
                }
            }

            FormEvent::MoveItemUp { index } => {
                draft.bundle.move_up(index);
            }
            FormEvent::MoveItemDown { index } => {
                draft.bundle.move_down(index);
            }
            FormEvent::EditItemTitle { index, title } => {
                if !draft.bundle.edit_title(index, &title) {
                    return Err(item_out_of_range(index));
                }
            }
            FormEvent::EditItemBpm { index, bpm } => {
                if !draft.bundle.edit_bpm(index, bpm) {
                    return Err(item_out_of_range(index));
                }
            }
            FormEvent::RemoveItem { index } => {
                if draft.bundle.remove(index).is_none() {
                    return Err(item_out_of_range(index));
                }
            }

            FormEvent::RemoveMedia { slot } => match slot {
                MediaSlot::Audio => draft.audio = None,
                MediaSlot::Video => {
                    draft.video = None;
                    draft.video_crop = None;
                }
                MediaSlot::Cover => draft.cover = None,
                MediaSlot::Bundle => draft.bundle.clear(),
            },
            FormEvent::SetVideoCrop { crop } => {
                if ct != ContentType::VideoClip {
                    return Err(CoreError::Validation(
                        "Only video clips can be cropped".to_string(),
                    ));
                }
                draft.video_crop = crop;
            }
            FormEvent::SetNotes { value } => draft.notes = value,
            FormEvent::SetConnectedRelease { url } => draft.connected_release = url,
        }

        self.draft.recompute();
        Ok(())
    }

    /// Fill an unset BPM from a confident detection. A BPM the user typed is
    /// never overwritten.
    pub fn apply_detected_bpm(&mut self, detection: BpmDetection) -> bool {
        if self.draft.bpm.is_some()
            || !self.draft.content_type.shows_main_bpm()
            || detection.confidence < MIN_BPM_CONFIDENCE
            || check_bpm("bpm", Some(detection.bpm)).is_some()
        {
            return false;
        }
        tracing::debug!(bpm = detection.bpm, confidence = detection.confidence, "Applied detected BPM");
        self.draft.bpm = Some(detection.bpm);
        true
    }

    // -- Uploads ------------------------------------------------------------

    fn rule_for(&self, slot: MediaSlot) -> Result<FileRule, ValidationIssue> {
        let ct = self.draft.content_type;
        let accepted = match slot {
            MediaSlot::Audio => matches!(ct, ContentType::Loop | ContentType::FullSong),
            MediaSlot::Video => ct == ContentType::VideoClip,
            MediaSlot::Bundle => ct.is_bundle(),
            MediaSlot::Cover => true,
        };
        if !accepted {
            return Err(ValidationIssue::new(
                "files",
                format!("A {} does not take {} files", ct.label(), slot.as_str()),
            ));
        }
        Ok(match slot {
            MediaSlot::Cover => cover_rule(),
            _ => media_rule(ct),
        })
    }

    /// Validate newly picked files for `slot` and register them.
    ///
    /// Returns one [`UploadJob`] per file for the caller to run. Nothing is
    /// registered when any file is rejected. Bundle files are appended;
    /// single-file slots are replaced.
    pub fn attach_files(
        &mut self,
        slot: MediaSlot,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<UploadJob>, Vec<ValidationIssue>> {
        if let Err(e) = self.ensure_editing() {
            return Err(vec![ValidationIssue::new("session", e.to_string())]);
        }
        let rule = self.rule_for(slot).map_err(|issue| vec![issue])?;
        if files.is_empty() {
            return Err(vec![ValidationIssue::new(rule.field, "No files were attached")]);
        }

        let handles: Vec<_> = files.iter().map(|f| f.handle.clone()).collect();
        let issues = if slot == MediaSlot::Bundle {
            let mut issues = Vec::new();
            let total = self.draft.bundle.len() + handles.len();
            if total > rule.max_count {
                issues.push(ValidationIssue::new(
                    rule.field,
                    format!(
                        "At most {} {}s are allowed (got {total})",
                        rule.max_count, rule.label
                    ),
                ));
            }
            for handle in &handles {
                issues.extend(check_file(&rule, handle));
            }
            issues
        } else {
            let single = FileRule {
                min_count: 1,
                ..rule
            };
            check_files(&single, &handles)
        };
        if !issues.is_empty() {
            return Err(issues);
        }

        let jobs = if slot == MediaSlot::Bundle {
            let keys = self.draft.bundle.append_files(handles);
            keys.into_iter()
                .zip(files)
                .map(|(key, file)| {
                    self.draft.set_upload_status(key, UploadStatus::InFlight);
                    UploadJob {
                        key,
                        slot,
                        file: file.handle,
                        data: file.data,
                    }
                })
                .collect()
        } else {
            let mut jobs = Vec::with_capacity(1);
            for file in files {
                let asset = MediaAsset::in_flight(file.handle.clone());
                jobs.push(UploadJob {
                    key: asset.key,
                    slot,
                    file: file.handle,
                    data: file.data,
                });
                match slot {
                    MediaSlot::Audio => self.draft.audio = Some(asset),
                    MediaSlot::Video => {
                        self.draft.video = Some(asset);
                        self.draft.video_crop = None;
                    }
                    MediaSlot::Cover => self.draft.cover = Some(asset),
                    MediaSlot::Bundle => {}
                }
            }
            jobs
        };

        self.draft.recompute();
        Ok(jobs)
    }

    fn slot_of(&self, key: UploadKey) -> Option<(MediaSlot, &UploadStatus)> {
        let singles = [
            (MediaSlot::Audio, &self.draft.audio),
            (MediaSlot::Video, &self.draft.video),
            (MediaSlot::Cover, &self.draft.cover),
        ];
        for (slot, asset) in singles {
            if let Some(asset) = asset.as_ref().filter(|a| a.key == key) {
                return Some((slot, &asset.status));
            }
        }
        self.draft
            .bundle
            .items()
            .iter()
            .find(|item| item.key == key)
            .map(|item| (MediaSlot::Bundle, &item.upload))
    }

    /// Re-send the bytes of a failed upload.
    pub fn retry_upload(&mut self, key: UploadKey, file: IncomingFile) -> Result<UploadJob, CoreError> {
        self.ensure_editing()?;
        let (slot, status) = self.slot_of(key).ok_or_else(|| CoreError::NotFound {
            entity: "upload",
            id: key.to_string(),
        })?;
        if !matches!(status, UploadStatus::Failed { .. }) {
            return Err(CoreError::Conflict(format!(
                "Upload {key} has not failed and cannot be retried"
            )));
        }
        let rule = self.rule_for(slot).map_err(|issue| CoreError::Validation(issue.message))?;
        if let Some(issue) = check_file(&rule, &file.handle).into_iter().next() {
            return Err(CoreError::Validation(issue.message));
        }

        self.draft.set_upload_status(key, UploadStatus::InFlight);
        Ok(UploadJob {
            key,
            slot,
            file: file.handle,
            data: file.data,
        })
    }

    /// Record the outcome of one upload. Returns `false` if the file was
    /// removed from the draft while it was uploading.
    pub fn record_upload(&mut self, outcome: UploadOutcome) -> bool {
        let status = match outcome.result {
            Ok(url) => UploadStatus::Uploaded { url },
            Err(e) => UploadStatus::Failed { error: e.message },
        };
        let applied = self.draft.set_upload_status(outcome.key, status);
        if !applied {
            tracing::debug!(key = %outcome.key, "Upload finished for a file no longer in the draft");
        }
        applied
    }

    /// Close the session, discarding the draft.
    ///
    /// Refused while a submission is running, even with `force`. Refused
    /// while uploads are in flight unless `force` is set. Objects already
    /// stored are not removed.
    pub fn close(&mut self, force: bool) -> Result<(), CoreError> {
        if self.phase == SessionPhase::Submitting {
            return Err(CoreError::Conflict(
                "A submission is in progress; close once it has finished".to_string(),
            ));
        }
        let in_flight = self.uploads_in_flight();
        if in_flight > 0 && !force {
            return Err(CoreError::Conflict(format!(
                "{in_flight} upload(s) still in progress; close again with force to discard them"
            )));
        }
        if in_flight > 0 {
            tracing::warn!(in_flight, "Session closed with uploads in flight");
        }
        self.reset_draft();
        Ok(())
    }

    fn reset_draft(&mut self) {
        self.draft = TrackDraft::new(self.draft.content_type);
        if self.mode == FormMode::Quick {
            self.apply_mode_defaults();
        }
        self.step_index = 0;
    }

    // -- Submission ---------------------------------------------------------

    /// Validate and mark the session as submitting.
    ///
    /// Returns the free-text location to geocode before
    /// [`prepare_payload`](Self::prepare_payload), if one is needed.
    pub fn begin_submission(&mut self) -> Result<Option<String>, SubmitError> {
        match self.phase {
            SessionPhase::Submitting => return Err(SubmitError::InProgress),
            SessionPhase::Complete => return Err(SubmitError::AlreadyComplete),
            SessionPhase::Editing => {}
        }
        self.draft.recompute();
        let issues = submission_issues(&self.draft, self.mode);
        if !issues.is_empty() {
            return Err(SubmitError::Invalid(issues));
        }
        self.phase = SessionPhase::Submitting;
        self.warnings.clear();
        Ok(self.draft.locations.pending_geocode_query().map(str::to_string))
    }

    /// Note a non-fatal problem to show alongside the form.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merge locations into tags and coordinates, re-validate and assemble
    /// the payload. On failure the session returns to editing.
    pub fn prepare_payload(
        &mut self,
        geocoded: Option<Coordinates>,
    ) -> Result<SubmissionPayload, SubmitError> {
        if self.phase != SessionPhase::Submitting {
            return Err(SubmitError::NotStarted);
        }
        if let Some(coords) = geocoded {
            self.draft.locations.apply_geocoded(coords);
        }
        self.draft.tags = self.draft.locations.to_tags(&self.draft.tags);
        self.draft.recompute();

        let issues = submission_issues(&self.draft, self.mode);
        if !issues.is_empty() {
            self.phase = SessionPhase::Editing;
            return Err(SubmitError::Invalid(issues));
        }
        Ok(SubmissionPayload::from_draft(&self.draft, &self.identity))
    }

    /// Record the persistence outcome. Success resets the draft; failure
    /// keeps it for a retry.
    pub fn finish_submission(
        &mut self,
        result: Result<RecordId, PersistenceError>,
    ) -> Result<RecordId, SubmitError> {
        if self.phase != SessionPhase::Submitting {
            return Err(SubmitError::NotStarted);
        }
        match result {
            Ok(id) => {
                tracing::info!(record_id = %id, content_type = self.draft.content_type.as_str(), "Track submitted");
                self.phase = SessionPhase::Complete;
                self.last_record_id = Some(id);
                self.reset_draft();
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Track submission failed");
                self.phase = SessionPhase::Editing;
                Err(SubmitError::Persistence(e))
            }
        }
    }

    /// Return a submission that never reached
    /// [`finish_submission`](Self::finish_submission) to editing, keeping the
    /// draft. Returns `false` if no submission was running.
    pub fn abort_submission(&mut self) -> bool {
        if self.phase != SessionPhase::Submitting {
            return false;
        }
        tracing::warn!("Submission aborted before it finished");
        self.phase = SessionPhase::Editing;
        true
    }

    /// Run the whole submission against the given collaborators.
    ///
    /// Geocoding failures are not fatal: the track is stored without
    /// coordinates and a warning is kept on the session.
    pub async fn submit<S, G>(&mut self, store: &S, geocoder: &G) -> Result<RecordId, SubmitError>
    where
        S: SubmissionStore + ?Sized,
        G: Geocoder + ?Sized,
    {
        let query = self.begin_submission()?;
        let geocoded = match query {
            Some(query) => match resolve_location(geocoder, &query).await {
                Ok(coords) => Some(coords),
                Err(warning) => {
                    self.push_warning(warning);
                    None
                }
            },
            None => None,
        };
        let payload = self.prepare_payload(geocoded)?;
        let result = store.upsert(&payload).await;
        self.finish_submission(result)
    }

    // -- Snapshot -----------------------------------------------------------

    pub fn snapshot(&self) -> FormSnapshot {
        let quote = self.draft.quote();
        let current_step = self.current_step();
        let steps = self
            .steps()
            .iter()
            .map(|&step| StepView {
                step,
                label: step.label(),
                issue_count: self.step_issues(step).len(),
            })
            .collect();
        let issues = self.step_issues(current_step);

        FormSnapshot {
            phase: self.phase,
            mode: self.mode,
            content_type: self.draft.content_type,
            steps,
            step_index: self.step_index,
            current_step,
            sections: self.sections(current_step),
            can_advance: issues.is_empty(),
            issues,
            can_submit: self.phase == SessionPhase::Editing
                && submission_issues(&self.draft, self.mode).is_empty(),
            composition_total: self.draft.composition.total(),
            production_total: self.draft.production.total(),
            show_price_line: quote.has_active_price(),
            price: quote,
            human_created_audio_required: requires_human_created_audio(self.draft.content_type),
            uploads_in_flight: self.uploads_in_flight(),
            warnings: self.warnings.clone(),
            last_record_id: self.last_record_id,
            draft: self.draft.clone(),
        }
    }
}

fn slot_out_of_range(index: usize) -> CoreError {
    CoreError::Validation(format!("No split slot at position {index}"))
}

fn item_out_of_range(index: usize) -> CoreError {
    CoreError::Validation(format!("No bundle item at position {index}"))
}

/// Geocode the free-text location of a submission.
///
/// A miss or a geocoder failure is returned as the warning to keep on the
/// session; neither stops the submission.
pub async fn resolve_location<G>(geocoder: &G, query: &str) -> Result<Coordinates, String>
where
    G: Geocoder + ?Sized,
{
    match geocoder.geocode(query).await {
        Ok(Some(coords)) => Ok(coords),
        Ok(None) => Err(format!("No coordinates found for '{query}'")),
        Err(e) => {
            tracing::warn!(query, error = %e, "Geocoding failed");
            Err(format!("Could not resolve '{query}': {e}"))
        }
    }
}

/// Run tempo detection on an uploaded audio file. Detector failures are
/// logged and treated as "not detected".
pub async fn detect_bpm<D>(detector: &D, file: &FileHandle, data: &[u8]) -> Option<BpmDetection>
where
    D: BpmDetector + ?Sized,
{
    match detector.detect(file, data).await {
        Ok(detection) => detection,
        Err(e) => {
            tracing::warn!(file = %file.name, error = %e, "BPM detection failed");
            None
        }
    }
}
