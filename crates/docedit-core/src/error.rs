use thiserror::Error;

use crate::fields::FieldId;

/// Input rejected at the point of interaction. Nothing is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a tag name")]
    EmptyTag,

    #[error("Spaces are not allowed in tag names")]
    TagContainsSpace,

    #[error("Tag is already selected")]
    AlreadySelected,

    #[error("{}", .0.required_message())]
    MissingRequired(FieldId),
}

impl ValidationError {
    /// Stable identifier for the failure, independent of the display text
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyTag => "empty",
            ValidationError::TagContainsSpace => "containsSpace",
            ValidationError::AlreadySelected => "alreadySelected",
            ValidationError::MissingRequired(_) => "missingRequired",
        }
    }
}

/// A selected file that can never be uploaded. The file input is cleared.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileAcceptanceError {
    #[error("Please upload only PDF files")]
    NotPdf { mime_type: String },

    #[error("File size must be less than 50MB")]
    TooLarge { size: u64, limit: u64 },
}

impl FileAcceptanceError {
    pub fn code(&self) -> &'static str {
        match self {
            FileAcceptanceError::NotPdf { .. } => "notPdf",
            FileAcceptanceError::TooLarge { .. } => "tooLarge",
        }
    }
}

/// Failure reported by the PDF capability. Always degraded, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfInspectionError {
    #[error("PDF requires a password: {0}")]
    PasswordRequired(String),

    #[error("Failed to open PDF: {0}")]
    OpenFailed(String),

    #[error("Could not check permissions: {0}")]
    Permissions(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    FileAcceptance(#[from] FileAcceptanceError),

    #[error("Inspection for file #{ticket} is stale (current file is #{current})")]
    StaleInspection { ticket: u64, current: u64 },

    #[error("No file is waiting for confirmation")]
    NoPendingFile,
}
