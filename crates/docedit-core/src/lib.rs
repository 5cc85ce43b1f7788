//! Edit-document wizard
//!
//! Headless state for the document edit page: a four-step wizard, tag and
//! classification multi-selects, replacement-PDF inspection with lopdf and an
//! unsaved-changes navigation guard. Nothing here touches the DOM; the browser
//! shell renders the view models and effects produced by
//! [`EditDocumentController`].

pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod fields;
pub mod format;
pub mod guard;
pub mod pdf;
pub mod review;
pub mod selection;
pub mod snapshot;
pub mod submission;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod upload;
pub mod wizard;

pub use config::{EditorConfig, EditorSettings, MAX_UPLOAD_BYTES};
pub use controller::{EditDocumentController, PageView, UploadView};
pub use effects::{Effect, Notice, NoticeKind};
pub use error::{EditorError, FileAcceptanceError, PdfInspectionError, ValidationError};
pub use fields::{FieldId, FormFields};
pub use guard::{ExitAttempt, GuardDecision, NavigationTarget};
pub use pdf::{inspect, InspectionOutcome, LopdfBackend, PdfBackend, PdfSource};
pub use review::{PreviewSource, ReviewView};
pub use selection::{SelectionKind, TagAddition};
pub use submission::{DocumentUpdate, SubmissionPlan};
pub use upload::{Completion, FileCandidate, InspectionTicket};
pub use wizard::WizardStep;

/// Page count of a PDF, if lopdf can read it
pub fn get_page_count(bytes: &[u8]) -> Option<u32> {
    let document = LopdfBackend.open(bytes).ok()?;
    Some(document.page_count())
}
