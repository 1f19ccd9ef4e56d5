//! Content type, authoring mode and loop category enumerations.
//!
//! The content type decides which other entities are relevant for a draft
//! and which fields are required before it may be submitted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Content type
// ---------------------------------------------------------------------------

pub const CONTENT_LOOP: &str = "loop";
pub const CONTENT_LOOP_PACK: &str = "loop_pack";
pub const CONTENT_FULL_SONG: &str = "full_song";
pub const CONTENT_EP: &str = "ep";
pub const CONTENT_VIDEO_CLIP: &str = "video_clip";

/// All valid content type strings.
pub const VALID_CONTENT_TYPES: &[&str] = &[
    CONTENT_LOOP,
    CONTENT_LOOP_PACK,
    CONTENT_FULL_SONG,
    CONTENT_EP,
    CONTENT_VIDEO_CLIP,
];

/// Kind of asset being registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Loop,
    LoopPack,
    FullSong,
    Ep,
    VideoClip,
}

impl ContentType {
    /// Parse a content type string from a stored record.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            CONTENT_LOOP => Ok(Self::Loop),
            CONTENT_LOOP_PACK => Ok(Self::LoopPack),
            CONTENT_FULL_SONG => Ok(Self::FullSong),
            CONTENT_EP => Ok(Self::Ep),
            CONTENT_VIDEO_CLIP => Ok(Self::VideoClip),
            _ => Err(CoreError::Validation(format!(
                "Invalid content type '{s}'. Must be one of: {}",
                VALID_CONTENT_TYPES.join(", ")
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loop => CONTENT_LOOP,
            Self::LoopPack => CONTENT_LOOP_PACK,
            Self::FullSong => CONTENT_FULL_SONG,
            Self::Ep => CONTENT_EP,
            Self::VideoClip => CONTENT_VIDEO_CLIP,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Loop => "Loop",
            Self::LoopPack => "Loop Pack",
            Self::FullSong => "Song",
            Self::Ep => "EP",
            Self::VideoClip => "Video Clip",
        }
    }

    /// Multi-item assets made of ordered bundle items.
    pub fn is_bundle(self) -> bool {
        matches!(self, Self::LoopPack | Self::Ep)
    }

    /// Loop-based assets carry a loop category.
    pub fn is_loop_based(self) -> bool {
        matches!(self, Self::Loop | Self::LoopPack)
    }

    /// Whether the BPM sub-section of the basic info step is shown.
    ///
    /// EPs collect BPM per song in the bundle editor instead, and video
    /// clips have none.
    pub fn shows_main_bpm(self) -> bool {
        matches!(self, Self::Loop | Self::LoopPack | Self::FullSong)
    }
}

// ---------------------------------------------------------------------------
// Authoring mode
// ---------------------------------------------------------------------------

/// Step-sequencing preset for the authoring flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Quick,
    Advanced,
}

impl FormMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Advanced => "advanced",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Quick => Self::Advanced,
            Self::Advanced => Self::Quick,
        }
    }
}

// ---------------------------------------------------------------------------
// Loop category
// ---------------------------------------------------------------------------

/// Musical role of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCategory {
    #[default]
    Instrumental,
    Vocals,
    Beats,
    Stem,
    Other,
}

impl LoopCategory {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "instrumental" => Ok(Self::Instrumental),
            "vocals" => Ok(Self::Vocals),
            "beats" => Ok(Self::Beats),
            "stem" => Ok(Self::Stem),
            "other" => Ok(Self::Other),
            _ => Err(CoreError::Validation(format!(
                "Invalid loop category '{s}'. Must be one of: instrumental, vocals, beats, stem, other"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instrumental => "instrumental",
            Self::Vocals => "vocals",
            Self::Beats => "beats",
            Self::Stem => "stem",
            Self::Other => "other",
        }
    }

    /// Stem and "other" loops must describe themselves in free text.
    pub fn requires_descriptor(self) -> bool {
        matches!(self, Self::Stem | Self::Other)
    }
}
