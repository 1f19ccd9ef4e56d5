//! Step sequences and the sub-forms shown on each step.

use serde::{Deserialize, Serialize};

use crate::content_type::{ContentType, FormMode};
use crate::policy::{allowed_licensing, requires_human_created_audio};
use crate::pricing::PriceQuote;

/// One page of the authoring flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    BasicInfo,
    CompositionSplits,
    ProductionSplits,
    ConnectRelease,
    FileUploads,
    Licensing,
    Review,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::CompositionSplits => "Idea Rights",
            Self::ProductionSplits => "Implementation Rights",
            Self::ConnectRelease => "Connect Release",
            Self::FileUploads => "Files",
            Self::Licensing => "Licensing",
            Self::Review => "Review",
        }
    }
}

const QUICK_STEPS: &[Step] = &[
    Step::BasicInfo,
    Step::FileUploads,
    Step::Licensing,
    Step::Review,
];

const ADVANCED_STEPS: &[Step] = &[
    Step::BasicInfo,
    Step::CompositionSplits,
    Step::ProductionSplits,
    Step::ConnectRelease,
    Step::FileUploads,
    Step::Licensing,
    Step::Review,
];

/// Ordered steps for `mode`. Every content type shares the same step names.
pub fn steps_for(mode: FormMode) -> &'static [Step] {
    match mode {
        FormMode::Quick => QUICK_STEPS,
        FormMode::Advanced => ADVANCED_STEPS,
    }
}

/// A sub-form rendered inside a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Title,
    Artist,
    Description,
    Tags,
    Locations,
    Bpm,
    LoopCategory,
    CompositionSplits,
    ProductionSplits,
    ReleaseLink,
    Notes,
    AudioUpload,
    LoopPackUpload,
    EpUpload,
    BundleEditor,
    VideoUpload,
    VideoCrop,
    CoverImage,
    RemixLicense,
    DownloadLicense,
    StreamingLicense,
    HumanCreatedAudioNotice,
    Summary,
    PriceLine,
}

/// Sub-forms shown on `step` for `content_type`.
///
/// The review step lists a price line only when `quote` has an active price.
pub fn sections(step: Step, content_type: ContentType, quote: &PriceQuote) -> Vec<Section> {
    match step {
        Step::BasicInfo => {
            let mut sections = vec![
                Section::Title,
                Section::Artist,
                Section::Description,
                Section::Tags,
                Section::Locations,
            ];
            if content_type.shows_main_bpm() {
                sections.push(Section::Bpm);
            }
            if content_type.is_loop_based() {
                sections.push(Section::LoopCategory);
            }
            sections
        }
        Step::CompositionSplits => vec![Section::CompositionSplits],
        Step::ProductionSplits => vec![Section::ProductionSplits],
        Step::ConnectRelease => vec![Section::ReleaseLink, Section::Notes],
        Step::FileUploads => {
            let mut sections = match content_type {
                ContentType::Loop | ContentType::FullSong => vec![Section::AudioUpload],
                ContentType::LoopPack => vec![Section::LoopPackUpload, Section::BundleEditor],
                ContentType::Ep => vec![Section::EpUpload, Section::BundleEditor],
                ContentType::VideoClip => vec![Section::VideoUpload, Section::VideoCrop],
            };
            sections.push(Section::CoverImage);
            sections
        }
        Step::Licensing => {
            let caps = allowed_licensing(content_type);
            let mut sections = vec![Section::RemixLicense];
            if caps.download.is_offered() {
                sections.push(Section::DownloadLicense);
            }
            if caps.streaming.is_offered() {
                sections.push(Section::StreamingLicense);
            }
            if requires_human_created_audio(content_type) {
                sections.push(Section::HumanCreatedAudioNotice);
            }
            sections
        }
        Step::Review => {
            let mut sections = vec![Section::Summary];
            if quote.has_active_price() {
                sections.push(Section::PriceLine);
            }
            sections
        }
    }
}
