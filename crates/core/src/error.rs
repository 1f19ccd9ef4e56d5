use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single user-facing validation failure, keyed by the form field it
/// belongs to so the UI can place it next to the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Object-storage failure for one file. Recorded on that file only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Upload of '{file_name}' failed: {message}")]
pub struct UploadError {
    pub file_name: String,
    pub message: String,
}

impl UploadError {
    pub fn new(file_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            file_name: file_name.into(),
            message: message.to_string(),
        }
    }
}

/// Failure of the final write to the relational store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PersistenceError(pub String);

impl PersistenceError {
    /// Stringify an arbitrary collaborator error.
    pub fn from_display(err: impl fmt::Display) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            Self("Unknown persistence error".to_string())
        } else {
            Self(message)
        }
    }
}

/// Outcome of a rejected [`submit`](crate::form::UploadFormController::submit).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// Client-side validation failed; nothing was sent.
    #[error("Submission has {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),

    /// A previous attempt has not resolved yet.
    #[error("A submission is already in progress")]
    InProgress,

    /// The draft was already submitted and reset.
    #[error("This draft has already been submitted")]
    AlreadyComplete,

    /// A later submission stage was called without `begin_submission`.
    #[error("No submission has been started")]
    NotStarted,

    /// The persistence collaborator rejected the write. Form state is kept.
    #[error("Failed to save submission: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SubmitError {
    /// Validation issues carried by this error, empty for other variants.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_error_stringifies_unknown_errors() {
        let err = PersistenceError::from_display("connection reset");
        assert_eq!(err.to_string(), "connection reset");

        let blank = PersistenceError::from_display("   ");
        assert_eq!(blank.to_string(), "Unknown persistence error");
    }

    #[test]
    fn upload_error_names_the_file() {
        let err = UploadError::new("kick.wav", "503 Service Unavailable");
        assert_eq!(
            err.to_string(),
            "Upload of 'kick.wav' failed: 503 Service Unavailable"
        );
    }

    #[test]
    fn submit_error_counts_issues() {
        let err = SubmitError::Invalid(vec![
            ValidationIssue::new("bpm", "BPM is required for loops"),
            ValidationIssue::new("title", "Title is required"),
        ]);
        assert_eq!(err.to_string(), "Submission has 2 validation error(s)");
        assert_eq!(err.issues().len(), 2);
        assert!(SubmitError::InProgress.issues().is_empty());
    }
}
