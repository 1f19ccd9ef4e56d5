//! Content-type policy table.
//!
//! Maps each [`ContentType`] to its required fields, the licensing
//! capabilities it offers and the file constraints checked before upload.
//! All lookups are pure; the form controller re-evaluates them on every
//! change instead of caching results.

use serde::{Deserialize, Serialize};

use crate::content_type::{ContentType, FormMode};
use crate::error::ValidationIssue;
use crate::types::{FileHandle, MB};

// ---------------------------------------------------------------------------
// File constraints
// ---------------------------------------------------------------------------

/// Maximum size of a single audio file (loop, song).
pub const MAX_AUDIO_BYTES: u64 = 50 * MB;

/// Maximum size of one loop inside a loop pack.
pub const MAX_LOOP_PACK_ITEM_BYTES: u64 = 10 * MB;

/// Maximum size of one song inside an EP.
pub const MAX_EP_ITEM_BYTES: u64 = 50 * MB;

/// Maximum size of a video clip.
pub const MAX_VIDEO_BYTES: u64 = 10 * MB;

/// Nominal video clip length in seconds.
pub const VIDEO_NOMINAL_SECS: f64 = 5.0;

/// Accepted video clip length, a soft buffer over [`VIDEO_NOMINAL_SECS`].
pub const MAX_VIDEO_SECS: f64 = 5.5;

/// Maximum size of a cover image.
pub const MAX_COVER_BYTES: u64 = 5 * MB;

/// Minimum number of items in a bundle.
pub const MIN_BUNDLE_ITEMS: usize = 2;

/// Maximum number of items in a bundle.
pub const MAX_BUNDLE_ITEMS: usize = 5;

/// Lowest accepted BPM.
pub const MIN_BPM: u32 = 1;

/// Highest accepted BPM.
pub const MAX_BPM: u32 = 300;

/// Quick-mode download price of a single loop, or of each loop in a pack.
pub const QUICK_LOOP_PRICE: f64 = 1.0;

/// Quick-mode download price of a full song, or of each song in an EP.
pub const QUICK_SONG_PRICE: f64 = 2.0;

/// Quick-mode download price of a video clip.
pub const QUICK_VIDEO_PRICE: f64 = 1.5;

// ---------------------------------------------------------------------------
// Required fields
// ---------------------------------------------------------------------------

/// A field that must be filled before a draft may be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Title,
    Artist,
    Bpm,
    LoopDescriptor,
    AudioFile,
    LoopFiles,
    EpFiles,
    VideoFile,
}

impl RequiredField {
    /// Form field key used in [`ValidationIssue::field`].
    pub fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Bpm => "bpm",
            Self::LoopDescriptor => "loop_descriptor",
            Self::AudioFile => "audio_url",
            Self::LoopFiles => "loop_files",
            Self::EpFiles => "ep_files",
            Self::VideoFile => "video_url",
        }
    }
}

/// Fields required for `content_type` in `mode`.
///
/// [`RequiredField::LoopDescriptor`] is listed for loop-based types but
/// only enforced when the chosen category is stem or "other".
pub fn required_fields(content_type: ContentType, mode: FormMode) -> Vec<RequiredField> {
    let mut fields = vec![RequiredField::Title, RequiredField::Artist];
    match content_type {
        ContentType::Loop => {
            if mode == FormMode::Advanced {
                fields.push(RequiredField::Bpm);
            }
            fields.push(RequiredField::LoopDescriptor);
            fields.push(RequiredField::AudioFile);
        }
        ContentType::LoopPack => {
            fields.push(RequiredField::LoopDescriptor);
            fields.push(RequiredField::LoopFiles);
        }
        ContentType::FullSong => fields.push(RequiredField::AudioFile),
        ContentType::Ep => fields.push(RequiredField::EpFiles),
        ContentType::VideoClip => fields.push(RequiredField::VideoFile),
    }
    fields
}

// ---------------------------------------------------------------------------
// Licensing capabilities
// ---------------------------------------------------------------------------

/// How a licensing capability may be toggled for a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Not offered; always off.
    Unavailable,
    /// User may toggle it.
    Optional,
    /// Always on; cannot be disabled.
    Mandatory,
}

impl Availability {
    pub fn is_offered(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Licensing capabilities offered for a content type, with their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LicensingCapabilities {
    pub remix: Availability,
    pub download: Availability,
    pub streaming: Availability,
    pub remix_default: bool,
    pub download_default: bool,
    pub streaming_default: bool,
}

/// Capabilities a creator may choose from for `content_type`.
pub fn allowed_licensing(content_type: ContentType) -> LicensingCapabilities {
    match content_type {
        ContentType::Loop | ContentType::LoopPack => LicensingCapabilities {
            remix: Availability::Optional,
            download: Availability::Optional,
            streaming: Availability::Unavailable,
            remix_default: true,
            download_default: false,
            streaming_default: false,
        },
        ContentType::FullSong | ContentType::Ep => LicensingCapabilities {
            remix: Availability::Optional,
            download: Availability::Optional,
            streaming: Availability::Optional,
            remix_default: true,
            download_default: false,
            streaming_default: true,
        },
        ContentType::VideoClip => LicensingCapabilities {
            remix: Availability::Mandatory,
            download: Availability::Optional,
            streaming: Availability::Unavailable,
            remix_default: true,
            download_default: false,
            streaming_default: false,
        },
    }
}

/// Flat per-item download price quick mode sets for `content_type`.
pub fn quick_download_price(content_type: ContentType) -> f64 {
    match content_type {
        ContentType::Loop | ContentType::LoopPack => QUICK_LOOP_PRICE,
        ContentType::FullSong | ContentType::Ep => QUICK_SONG_PRICE,
        ContentType::VideoClip => QUICK_VIDEO_PRICE,
    }
}

/// Audio embedded in a video clip inherits the clip's attribution and must
/// be fully human-created. Declared to the creator, not verified.
pub fn requires_human_created_audio(content_type: ContentType) -> bool {
    content_type == ContentType::VideoClip
}

// ---------------------------------------------------------------------------
// File rules
// ---------------------------------------------------------------------------

/// Pre-upload constraints for one media slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FileRule {
    pub field: &'static str,
    pub label: &'static str,
    pub min_count: usize,
    pub max_count: usize,
    pub max_bytes: u64,
    pub max_duration_secs: Option<f64>,
    pub mime_prefix: &'static str,
}

/// Rule for the primary media of `content_type`.
pub fn media_rule(content_type: ContentType) -> FileRule {
    match content_type {
        ContentType::Loop | ContentType::FullSong => FileRule {
            field: RequiredField::AudioFile.key(),
            label: "audio file",
            min_count: 1,
            max_count: 1,
            max_bytes: MAX_AUDIO_BYTES,
            max_duration_secs: None,
            mime_prefix: "audio/",
        },
        ContentType::LoopPack => FileRule {
            field: RequiredField::LoopFiles.key(),
            label: "loop",
            min_count: MIN_BUNDLE_ITEMS,
            max_count: MAX_BUNDLE_ITEMS,
            max_bytes: MAX_LOOP_PACK_ITEM_BYTES,
            max_duration_secs: None,
            mime_prefix: "audio/",
        },
        ContentType::Ep => FileRule {
            field: RequiredField::EpFiles.key(),
            label: "song",
            min_count: MIN_BUNDLE_ITEMS,
            max_count: MAX_BUNDLE_ITEMS,
            max_bytes: MAX_EP_ITEM_BYTES,
            max_duration_secs: None,
            mime_prefix: "audio/",
        },
        ContentType::VideoClip => FileRule {
            field: RequiredField::VideoFile.key(),
            label: "video",
            min_count: 1,
            max_count: 1,
            max_bytes: MAX_VIDEO_BYTES,
            max_duration_secs: Some(MAX_VIDEO_SECS),
            mime_prefix: "video/",
        },
    }
}

/// Rule for the optional cover image.
pub fn cover_rule() -> FileRule {
    FileRule {
        field: "cover_image_url",
        label: "cover image",
        min_count: 0,
        max_count: 1,
        max_bytes: MAX_COVER_BYTES,
        max_duration_secs: None,
        mime_prefix: "image/",
    }
}

/// Validate a bundle item count against the bundle bounds.
pub fn check_item_count(rule: &FileRule, count: usize) -> Option<ValidationIssue> {
    if count < rule.min_count || count > rule.max_count {
        let message = if rule.min_count == rule.max_count {
            format!(
                "Exactly {} {} is required (got {count})",
                rule.min_count, rule.label
            )
        } else {
            format!(
                "Between {} and {} {}s are required (got {count})",
                rule.min_count, rule.max_count, rule.label
            )
        };
        return Some(ValidationIssue::new(rule.field, message));
    }
    None
}

/// Validate one file's size, duration and MIME type against `rule`.
pub fn check_file(rule: &FileRule, file: &FileHandle) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if file.size_bytes > rule.max_bytes {
        issues.push(ValidationIssue::new(
            rule.field,
            format!(
                "'{}' exceeds the {} MB limit for a {}",
                file.name,
                rule.max_bytes / MB,
                rule.label
            ),
        ));
    }

    if let Some(max_secs) = rule.max_duration_secs {
        match file.duration_secs {
            Some(secs) if secs > max_secs => issues.push(ValidationIssue::new(
                rule.field,
                format!(
                    "'{}' is {secs:.1}s long; a {} may be at most {VIDEO_NOMINAL_SECS}s",
                    file.name, rule.label
                ),
            )),
            Some(_) => {}
            None => issues.push(ValidationIssue::new(
                rule.field,
                format!("Could not determine the duration of '{}'", file.name),
            )),
        }
    }

    if let Some(mime) = file.mime_type.as_deref() {
        if !mime.starts_with(rule.mime_prefix) {
            issues.push(ValidationIssue::new(
                rule.field,
                format!(
                    "'{}' has type '{mime}', expected {}*",
                    file.name, rule.mime_prefix
                ),
            ));
        }
    }

    issues
}

/// Validate a whole selection of files for one slot: count plus each file.
pub fn check_files(rule: &FileRule, files: &[FileHandle]) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = check_item_count(rule, files.len()).into_iter().collect();
    for file in files {
        issues.extend(check_file(rule, file));
    }
    issues
}

/// Validate an optional BPM value.
pub fn check_bpm(field: &str, bpm: Option<u32>) -> Option<ValidationIssue> {
    match bpm {
        Some(value) if !(MIN_BPM..=MAX_BPM).contains(&value) => Some(ValidationIssue::new(
            field,
            format!("BPM must be between {MIN_BPM} and {MAX_BPM}, got {value}"),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(name: &str, mb: u64) -> FileHandle {
        FileHandle::new(name, mb * MB).with_mime("audio/wav")
    }

    #[test]
    fn bpm_required_only_for_advanced_loops() {
        assert!(required_fields(ContentType::Loop, FormMode::Advanced).contains(&RequiredField::Bpm));
        assert!(!required_fields(ContentType::Loop, FormMode::Quick).contains(&RequiredField::Bpm));
        for ct in [ContentType::LoopPack, ContentType::FullSong, ContentType::Ep, ContentType::VideoClip] {
            assert!(!required_fields(ct, FormMode::Advanced).contains(&RequiredField::Bpm));
        }
    }

    #[test]
    fn media_requirement_follows_content_type() {
        assert!(required_fields(ContentType::LoopPack, FormMode::Quick).contains(&RequiredField::LoopFiles));
        assert!(required_fields(ContentType::Ep, FormMode::Quick).contains(&RequiredField::EpFiles));
        assert!(required_fields(ContentType::VideoClip, FormMode::Quick).contains(&RequiredField::VideoFile));
        assert!(required_fields(ContentType::FullSong, FormMode::Quick).contains(&RequiredField::AudioFile));
    }

    #[test]
    fn bundle_count_bounds() {
        for ct in [ContentType::LoopPack, ContentType::Ep] {
            let rule = media_rule(ct);
            for rejected in [0, 1, 6] {
                assert!(check_item_count(&rule, rejected).is_some(), "{ct:?} {rejected}");
            }
            for accepted in 2..=5 {
                assert!(check_item_count(&rule, accepted).is_none(), "{ct:?} {accepted}");
            }
        }
    }

    #[test]
    fn loop_pack_items_are_capped_at_10mb() {
        let rule = media_rule(ContentType::LoopPack);
        assert!(check_file(&rule, &audio("a.wav", 10)).is_empty());
        assert_eq!(check_file(&rule, &audio("big.wav", 11)).len(), 1);

        let ep = media_rule(ContentType::Ep);
        assert!(check_file(&ep, &audio("song.wav", 11)).is_empty());
    }

    #[test]
    fn video_duration_ceiling() {
        let rule = media_rule(ContentType::VideoClip);
        let at_limit = FileHandle::new("clip.mp4", MB).with_mime("video/mp4").with_duration(5.0);
        assert!(check_file(&rule, &at_limit).is_empty());

        let buffered = FileHandle::new("clip.mp4", MB).with_duration(5.5);
        assert!(check_file(&rule, &buffered).is_empty());

        let too_long = FileHandle::new("clip.mp4", MB).with_duration(5.6);
        assert_eq!(check_file(&rule, &too_long).len(), 1);

        let unknown = FileHandle::new("clip.mp4", MB);
        assert_eq!(check_file(&rule, &unknown).len(), 1);
    }

    #[test]
    fn video_size_ceiling() {
        let rule = media_rule(ContentType::VideoClip);
        let big = FileHandle::new("clip.mp4", 11 * MB).with_duration(3.0);
        assert_eq!(check_file(&rule, &big).len(), 1);
    }

    #[test]
    fn video_requires_exactly_one_file() {
        let rule = media_rule(ContentType::VideoClip);
        let clip = FileHandle::new("clip.mp4", MB).with_duration(2.0);
        assert!(check_files(&rule, &[clip.clone()]).is_empty());
        assert!(!check_files(&rule, &[clip.clone(), clip]).is_empty());
        assert!(!check_files(&rule, &[]).is_empty());
    }

    #[test]
    fn mime_mismatch_is_reported() {
        let rule = media_rule(ContentType::Loop);
        let wrong = FileHandle::new("beat.mp4", MB).with_mime("video/mp4");
        let issues = check_file(&rule, &wrong);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("expected audio/*"));
    }

    #[test]
    fn video_remix_is_mandatory() {
        let caps = allowed_licensing(ContentType::VideoClip);
        assert_eq!(caps.remix, Availability::Mandatory);
        assert!(!caps.streaming.is_offered());
    }

    #[test]
    fn streaming_offered_for_songs_and_eps() {
        assert!(allowed_licensing(ContentType::FullSong).streaming.is_offered());
        assert!(allowed_licensing(ContentType::Ep).streaming.is_offered());
        assert!(!allowed_licensing(ContentType::Loop).streaming.is_offered());
    }

    #[test]
    fn bpm_range() {
        assert!(check_bpm("bpm", None).is_none());
        assert!(check_bpm("bpm", Some(120)).is_none());
        assert!(check_bpm("bpm", Some(0)).is_some());
        assert!(check_bpm("bpm", Some(301)).is_some());
    }
}
