//! Draft checks, grouped by the step that owns each field.
//!
//! The per-step lists are advisory while editing. [`submission_issues`]
//! runs every check at once and is authoritative: a single issue aborts the
//! submission.

use crate::content_type::{ContentType, FormMode};
use crate::error::ValidationIssue;
use crate::policy::{check_bpm, check_item_count, media_rule, required_fields, RequiredField};
use crate::splits::{validate, RightsCategory};
use crate::uploads::UploadStatus;

use super::draft::TrackDraft;
use super::steps::Step;

fn required_field_issue(field: RequiredField, draft: &TrackDraft) -> Option<ValidationIssue> {
    let key = field.key();
    match field {
        RequiredField::Title if draft.title.trim().is_empty() => {
            Some(ValidationIssue::new(key, "Title is required"))
        }
        RequiredField::Artist if draft.artist.trim().is_empty() => {
            Some(ValidationIssue::new(key, "Artist is required"))
        }
        RequiredField::Bpm if draft.bpm.is_none() => {
            Some(ValidationIssue::new(key, "BPM is required for loops"))
        }
        RequiredField::LoopDescriptor => {
            let needs = draft.loop_category.is_some_and(|c| c.requires_descriptor());
            (needs && draft.loop_descriptor.trim().is_empty()).then(|| {
                ValidationIssue::new(key, "Describe the loop when the category is stem or other")
            })
        }
        RequiredField::AudioFile if draft.audio.is_none() => {
            Some(ValidationIssue::new(key, "An audio file is required"))
        }
        RequiredField::VideoFile if draft.video.is_none() => {
            Some(ValidationIssue::new(key, "A video file is required"))
        }
        RequiredField::LoopFiles | RequiredField::EpFiles => {
            check_item_count(&media_rule(draft.content_type), draft.bundle.len())
        }
        _ => None,
    }
}

fn is_basic_info_field(field: RequiredField) -> bool {
    matches!(
        field,
        RequiredField::Title | RequiredField::Artist | RequiredField::Bpm | RequiredField::LoopDescriptor
    )
}

/// Required-field checks for the active content type and mode.
pub fn required_field_issues(draft: &TrackDraft, mode: FormMode) -> Vec<ValidationIssue> {
    required_fields(draft.content_type, mode)
        .into_iter()
        .filter_map(|field| required_field_issue(field, draft))
        .collect()
}

/// Range checks on the main BPM and every bundle item's BPM.
pub fn bpm_issues(draft: &TrackDraft) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = check_bpm("bpm", draft.bpm).into_iter().collect();
    for item in draft.bundle.items() {
        if let Some(mut issue) = check_bpm("track_metadata", item.bpm) {
            issue.message = format!("{} ({})", issue.message, item.title);
            issues.push(issue);
        }
    }
    issues
}

pub fn split_issues(draft: &TrackDraft, category: RightsCategory) -> Vec<ValidationIssue> {
    let field = format!("{}_splits", category.as_str());
    validate(draft.split(category), category)
        .errors
        .into_iter()
        .map(|message| ValidationIssue::new(field.clone(), message))
        .collect()
}

pub fn licensing_issues(draft: &TrackDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if draft.licensing.allow_downloads && draft.licensing.download_price.is_none() {
        issues.push(ValidationIssue::new(
            "download_price",
            "Set a download price or disable downloads",
        ));
    }
    issues
}

/// Upload state of every attached file: anything not yet uploaded blocks
/// submission.
pub fn upload_issues(draft: &TrackDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let media_field = media_rule(draft.content_type).field;

    let assets = [
        (draft.audio.as_ref(), media_field),
        (draft.video.as_ref(), media_field),
        (draft.cover.as_ref(), "cover_image_url"),
    ];
    let singles = assets
        .into_iter()
        .filter_map(|(asset, field)| asset.map(|a| (field, a.name.as_str(), &a.status)));
    let items = draft.bundle.items().iter().map(|item| {
        let name = item
            .source_file
            .as_ref()
            .map_or(item.title.as_str(), |f| f.name.as_str());
        (media_field, name, &item.upload)
    });

    for (field, name, status) in singles.chain(items) {
        match status {
            UploadStatus::Pending | UploadStatus::InFlight => {
                issues.push(ValidationIssue::new(field, format!("'{name}' is still uploading")));
            }
            UploadStatus::Failed { error } => {
                issues.push(ValidationIssue::new(
                    field,
                    format!("'{name}' failed to upload: {error}"),
                ));
            }
            UploadStatus::Uploaded { .. } => {}
        }
    }
    issues
}

pub fn crop_issues(draft: &TrackDraft) -> Vec<ValidationIssue> {
    match (draft.content_type, draft.video_crop) {
        (ContentType::VideoClip, Some(crop)) => crop.validate(),
        _ => Vec::new(),
    }
}

/// Issues owned by `step`, for step indicators and the next button.
pub fn step_issues(step: Step, draft: &TrackDraft, mode: FormMode) -> Vec<ValidationIssue> {
    match step {
        Step::BasicInfo => {
            let mut issues: Vec<ValidationIssue> = required_fields(draft.content_type, mode)
                .into_iter()
                .filter(|f| is_basic_info_field(*f))
                .filter_map(|f| required_field_issue(f, draft))
                .collect();
            issues.extend(check_bpm("bpm", draft.bpm));
            issues.extend(draft.locations.validate());
            issues
        }
        Step::CompositionSplits => split_issues(draft, RightsCategory::Composition),
        Step::ProductionSplits => split_issues(draft, RightsCategory::Production),
        Step::ConnectRelease => Vec::new(),
        Step::FileUploads => {
            let mut issues: Vec<ValidationIssue> = required_fields(draft.content_type, mode)
                .into_iter()
                .filter(|f| !is_basic_info_field(*f))
                .filter_map(|f| required_field_issue(f, draft))
                .collect();
            issues.extend(bpm_issues(draft).into_iter().filter(|i| i.field != "bpm"));
            issues.extend(crop_issues(draft));
            issues.extend(upload_issues(draft));
            issues
        }
        Step::Licensing => licensing_issues(draft),
        Step::Review => submission_issues(draft, mode),
    }
}

/// Every check, in submission order: splits, required fields, BPM ranges,
/// coordinates, licensing, crop, uploads.
pub fn submission_issues(draft: &TrackDraft, mode: FormMode) -> Vec<ValidationIssue> {
    let mut issues = split_issues(draft, RightsCategory::Composition);
    issues.extend(split_issues(draft, RightsCategory::Production));
    issues.extend(required_field_issues(draft, mode));
    issues.extend(bpm_issues(draft));
    issues.extend(draft.locations.validate());
    issues.extend(licensing_issues(draft));
    issues.extend(crop_issues(draft));
    issues.extend(upload_issues(draft));
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::LoopCategory;
    use crate::types::FileHandle;
    use crate::uploads::MediaAsset;

    fn messages(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn stem_loops_need_a_descriptor() {
        let mut draft = TrackDraft::new(ContentType::Loop);
        draft.loop_category = Some(LoopCategory::Stem);
        let issues = required_field_issues(&draft, FormMode::Quick);
        assert!(issues.iter().any(|i| i.field == "loop_descriptor"));

        draft.loop_descriptor = "drums".into();
        let issues = required_field_issues(&draft, FormMode::Quick);
        assert!(!issues.iter().any(|i| i.field == "loop_descriptor"));
    }

    #[test]
    fn bundle_presence_is_an_item_count() {
        let mut draft = TrackDraft::new(ContentType::LoopPack);
        draft.bundle.append_files(vec![FileHandle::new("a.wav", 1)]);
        let issues = required_field_issues(&draft, FormMode::Quick);
        assert!(issues.iter().any(|i| i.field == "loop_files"));
        assert!(!issues.iter().any(|i| i.field == "audio_url"));
    }

    #[test]
    fn unfinished_uploads_block_submission() {
        let mut draft = TrackDraft::new(ContentType::FullSong);
        draft.audio = Some(MediaAsset::in_flight(FileHandle::new("song.wav", 1)));
        assert_eq!(messages(&upload_issues(&draft)), vec!["'song.wav' is still uploading"]);

        let key = draft.audio.as_ref().unwrap().key;
        draft.set_upload_status(key, UploadStatus::Failed { error: "timeout".into() });
        assert_eq!(messages(&upload_issues(&draft)), vec!["'song.wav' failed to upload: timeout"]);

        draft.set_upload_status(key, UploadStatus::Uploaded { url: "https://cdn/song.wav".into() });
        assert!(upload_issues(&draft).is_empty());
    }

    #[test]
    fn downloads_need_a_price() {
        let mut draft = TrackDraft::new(ContentType::Loop);
        draft.licensing.set_downloads(ContentType::Loop, true).unwrap();
        assert_eq!(licensing_issues(&draft).len(), 1);
        draft.licensing.set_download_price(Some(0.0)).unwrap();
        assert!(licensing_issues(&draft).is_empty());
    }

    #[test]
    fn item_bpm_out_of_range_is_named() {
        let mut draft = TrackDraft::new(ContentType::Ep);
        draft.bundle.append_files(vec![FileHandle::new("intro.wav", 1)]);
        draft.bundle.edit_bpm(0, Some(400));
        let issues = bpm_issues(&draft);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.ends_with("(intro)"));
    }

    #[test]
    fn basic_info_step_only_reports_its_fields() {
        let draft = TrackDraft::new(ContentType::FullSong);
        let issues = step_issues(Step::BasicInfo, &draft, FormMode::Quick);
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "artist"]);
    }
}
