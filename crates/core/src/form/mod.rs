//! The authoring flow: draft aggregate, steps, edits and submission.

mod controller;
mod defaults;
mod draft;
mod events;
mod payload;
mod steps;
pub mod validation;

pub use controller::{
    detect_bpm, resolve_location, FormSnapshot, SessionPhase, StepView, UploadFormController,
};
pub use defaults::{apply_defaults, PartialSubmission};
pub use draft::{TrackDraft, VideoCrop};
pub use events::FormEvent;
pub use payload::{
    split_columns, split_group_from_columns, MediaField, PersistedTrack, SubmissionPayload,
    TitleField,
};
pub use steps::{sections, steps_for, Section, Step};
