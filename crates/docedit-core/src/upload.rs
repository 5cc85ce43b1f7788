//! Replacement-file pipeline: accept, inspect, acknowledge, finalize
//!
//! Each accepted file gets an [`InspectionTicket`] carrying a generation
//! number. Inspection runs asynchronously in the browser, so a result is only
//! applied if its ticket is still the current generation; anything older was
//! overtaken by a newer selection, a cancel, or a "change file".

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{EditorError, FileAcceptanceError};
use crate::format::{default_title, format_file_size};
use crate::pdf::{InspectionOutcome, PdfInspection, UNREADABLE_PASSWORD_LABEL};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file the user picked or dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

/// Type and size gate. `max_bytes` itself is allowed.
pub fn accept(candidate: &FileCandidate, max_bytes: u64) -> Result<(), FileAcceptanceError> {
    if candidate.mime_type != PDF_MIME_TYPE {
        return Err(FileAcceptanceError::NotPdf {
            mime_type: candidate.mime_type.clone(),
        });
    }
    if candidate.size > max_bytes {
        return Err(FileAcceptanceError::TooLarge {
            size: candidate.size,
            limit: max_bytes,
        });
    }
    Ok(())
}

/// Identifies one run of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InspectionTicket(u64);

impl InspectionTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// A replacement file that made it through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub candidate: FileCandidate,
    pub ticket: InspectionTicket,
    pub inspection: Option<PdfInspection>,
    /// Uploaded despite restrictions; metadata and preview are off
    pub restricted: bool,
}

impl UploadedFile {
    /// Inspection data usable for title/page extraction and preview
    pub fn readable(&self) -> Option<&PdfInspection> {
        if self.restricted {
            None
        } else {
            self.inspection.as_ref()
        }
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Inspecting {
        candidate: FileCandidate,
        ticket: InspectionTicket,
    },
    AwaitingAcknowledgement {
        candidate: FileCandidate,
        ticket: InspectionTicket,
        inspection: Option<PdfInspection>,
    },
}

/// Where a completed inspection left the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The user must confirm uploading a restricted file
    NeedsAcknowledgement(Vec<String>),
    /// The file is now the active replacement
    Finalized,
}

#[derive(Debug, Default)]
pub struct ReplacementPipeline {
    generation: u64,
    pending: Option<Pending>,
    uploaded: Option<UploadedFile>,
}

impl ReplacementPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate a new selection. The previous replacement and any in-flight
    /// inspection are dropped either way.
    pub fn select(
        &mut self,
        candidate: FileCandidate,
        max_bytes: u64,
    ) -> Result<InspectionTicket, FileAcceptanceError> {
        self.discard();
        if let Err(e) = accept(&candidate, max_bytes) {
            warn!(name = %candidate.name, code = e.code(), "file rejected");
            return Err(e);
        }
        let ticket = InspectionTicket(self.generation);
        info!(name = %candidate.name, size = candidate.size, generation = self.generation, "file accepted");
        self.pending = Some(Pending::Inspecting { candidate, ticket });
        Ok(ticket)
    }

    /// Apply an inspection result
    pub fn complete(
        &mut self,
        ticket: InspectionTicket,
        outcome: InspectionOutcome,
    ) -> Result<Completion, EditorError> {
        let candidate = match self.pending.take() {
            Some(Pending::Inspecting {
                candidate,
                ticket: current,
            }) if current == ticket => candidate,
            other => {
                self.pending = other;
                warn!(ticket = ticket.0, current = self.generation, "dropping stale inspection");
                return Err(EditorError::StaleInspection {
                    ticket: ticket.0,
                    current: self.generation,
                });
            }
        };

        let (inspection, labels) = match outcome {
            InspectionOutcome::Readable(inspection) => (Some(inspection), Vec::new()),
            InspectionOutcome::Restricted(inspection) => {
                let labels = inspection.restriction_labels();
                (Some(inspection), labels)
            }
            InspectionOutcome::Unreadable {
                password_required: true,
            } => (None, vec![UNREADABLE_PASSWORD_LABEL.to_string()]),
            InspectionOutcome::Unreadable {
                password_required: false,
            } => (None, Vec::new()),
        };

        if labels.is_empty() {
            self.uploaded = Some(UploadedFile {
                candidate,
                ticket,
                inspection,
                restricted: false,
            });
            Ok(Completion::Finalized)
        } else {
            info!(restrictions = ?labels, "restricted file needs confirmation");
            self.pending = Some(Pending::AwaitingAcknowledgement {
                candidate,
                ticket,
                inspection,
            });
            Ok(Completion::NeedsAcknowledgement(labels))
        }
    }

    /// Upload the restricted file anyway
    pub fn acknowledge(&mut self) -> Result<&UploadedFile, EditorError> {
        match self.pending.take() {
            Some(Pending::AwaitingAcknowledgement {
                candidate,
                ticket,
                inspection,
            }) => {
                info!(name = %candidate.name, "restricted file accepted by user");
                Ok(&*self.uploaded.insert(UploadedFile {
                    candidate,
                    ticket,
                    inspection,
                    restricted: true,
                }))
            }
            other => {
                self.pending = other;
                Err(EditorError::NoPendingFile)
            }
        }
    }

    /// Drop the replacement and anything in flight or awaiting confirmation.
    /// Outstanding tickets become stale.
    pub fn discard(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.uploaded = None;
    }

    pub fn uploaded(&self) -> Option<&UploadedFile> {
        self.uploaded.as_ref()
    }

    pub fn file_replaced(&self) -> bool {
        self.uploaded.is_some()
    }

    pub fn is_inspecting(&self) -> bool {
        matches!(self.pending, Some(Pending::Inspecting { .. }))
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    Info,
    Warning,
}

/// Hint under the page-count input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagesInfo {
    pub tone: Tone,
    pub message: String,
}

impl PagesInfo {
    pub fn default_hint() -> Self {
        Self {
            tone: Tone::Info,
            message: "Page count will be auto-updated if you replace the document".to_string(),
        }
    }

    fn changed(from: &str, to: u32) -> Self {
        Self {
            tone: Tone::Warning,
            message: format!("Page count changed from {} to {} pages", from, to),
        }
    }

    fn auto_detected() -> Self {
        Self {
            tone: Tone::Info,
            message: "Page count auto-detected from new PDF".to_string(),
        }
    }

    fn manual_entry() -> Self {
        Self {
            tone: Tone::Warning,
            message: "Please enter the number of pages manually (password-protected PDF)"
                .to_string(),
        }
    }
}

/// "Uploaded file" card contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub name: String,
    pub size_label: String,
    pub pages_label: String,
}

/// Field updates produced once a replacement file is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalization {
    /// New value for the page-count input; `None` leaves it for manual entry
    pub page_count: Option<u32>,
    pub pages_changed: bool,
    pub pages_info: PagesInfo,
    pub title: String,
    pub title_changed: bool,
    pub summary: FileSummary,
}

/// Derive field updates for an uploaded file against the load-time values
pub fn finalize(file: &UploadedFile, original_title: &str, original_pages: &str) -> Finalization {
    let candidate = &file.candidate;
    let readable = file.readable();
    let page_count = readable.and_then(|i| i.page_count);

    let (pages_changed, pages_info, pages_label) = match page_count {
        Some(count) => {
            let original = original_pages.trim().parse::<u32>().ok();
            if original == Some(count) {
                (false, PagesInfo::auto_detected(), format!("{} pages", count))
            } else {
                let from = original.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
                (true, PagesInfo::changed(&from, count), format!("{} pages", count))
            }
        }
        None => (false, PagesInfo::manual_entry(), "Manual entry required".to_string()),
    };

    let title = readable
        .and_then(|i| i.title.clone())
        .unwrap_or_else(|| default_title(&candidate.name));
    let title_changed = title != original_title;

    Finalization {
        page_count,
        pages_changed,
        pages_info,
        title_changed,
        title,
        summary: FileSummary {
            name: candidate.name.clone(),
            size_label: format_file_size(candidate.size),
            pages_label,
        },
    }
}
