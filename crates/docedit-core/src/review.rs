//! Read-only summary shown on the last wizard step
//!
//! Every value is compared against the load-time snapshot and flagged when it
//! differs. Display formatting never feeds back into the comparison except for
//! the publish date, which is compared in its rendered `Month Year` form.

use serde::Serialize;

use crate::fields::FormFields;
use crate::format::{format_file_size, or_dash, truncate_chars};
use crate::selection::SelectionView;
use crate::snapshot::FormSnapshot;
use crate::upload::UploadedFile;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `"March 2021"`, `"2021"` without a month, `"-"` without a year
pub fn format_publish_date(month: &str, year: &str) -> String {
    if year.is_empty() {
        return "-".to_string();
    }
    if month.is_empty() {
        return year.to_string();
    }
    match month.trim().parse::<usize>() {
        Ok(m @ 1..=12) => format!("{} {}", MONTH_NAMES[m - 1], year),
        _ => year.to_string(),
    }
}

/// One line of the review table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewValue {
    pub text: String,
    pub changed: bool,
}

impl ReviewValue {
    fn compare(current: &str, original: &str) -> Self {
        Self {
            text: or_dash(current).to_string(),
            changed: current != original,
        }
    }
}

/// What the preview canvas should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PreviewSource {
    /// First page of the replacement file held by the page
    Replacement { generation: u64, scale: f64 },
    /// First page of the stored document
    Original { url: String, scale: f64 },
    Placeholder {
        caption: &'static str,
        note: Option<&'static str>,
    },
}

pub const PREVIEW_UNAVAILABLE: &str = "Preview not available";
pub const NOTE_PASSWORD_PROTECTED: &str = "(Password Protected)";
/// Second placeholder line when the stored document fails to load
pub const NOTE_MAYBE_PROTECTED: &str = "(Document may be protected)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub file_name: ReviewValue,
    pub file_size: String,
    pub pages: ReviewValue,
    pub title: ReviewValue,
    pub product_code: ReviewValue,
    pub edition: ReviewValue,
    pub publish_date: ReviewValue,
    pub notes: ReviewValue,
    pub tags: SelectionView,
    pub classifications: SelectionView,
    pub preview: PreviewSource,
}

/// Everything the review step needs besides the snapshot
pub struct ReviewInput<'a> {
    pub fields: &'a FormFields,
    pub uploaded: Option<&'a UploadedFile>,
    pub tags: SelectionView,
    pub classifications: SelectionView,
    pub document_id: u64,
    pub original_file_name: &'a str,
    pub view_url: String,
    pub preview_scale: f64,
    pub notes_preview_chars: usize,
}

pub fn build_review(snapshot: &FormSnapshot, input: ReviewInput<'_>) -> ReviewView {
    let fields = input.fields;
    let original = &snapshot.fields;

    let (file_name, file_size) = match input.uploaded {
        Some(file) => (
            ReviewValue {
                text: file.candidate.name.clone(),
                changed: true,
            },
            format_file_size(file.candidate.size),
        ),
        None => (
            ReviewValue {
                text: or_dash(input.original_file_name).to_string(),
                changed: false,
            },
            "-".to_string(),
        ),
    };

    let current_date = format_publish_date(&fields.publish_month, &fields.publish_year);
    let original_date = format_publish_date(&original.publish_month, &original.publish_year);

    let notes_text = if fields.notes.is_empty() {
        "-".to_string()
    } else {
        truncate_chars(&fields.notes, input.notes_preview_chars)
    };

    let preview = match input.uploaded {
        Some(file) if file.readable().is_some() => PreviewSource::Replacement {
            generation: file.ticket.generation(),
            scale: input.preview_scale,
        },
        Some(file) => PreviewSource::Placeholder {
            caption: PREVIEW_UNAVAILABLE,
            note: file.restricted.then_some(NOTE_PASSWORD_PROTECTED),
        },
        None if input.document_id != 0 => PreviewSource::Original {
            url: input.view_url,
            scale: input.preview_scale,
        },
        None => PreviewSource::Placeholder {
            caption: PREVIEW_UNAVAILABLE,
            note: None,
        },
    };

    ReviewView {
        file_name,
        file_size,
        pages: ReviewValue::compare(&fields.no_of_pages, &original.no_of_pages),
        title: ReviewValue::compare(&fields.title, &original.title),
        product_code: ReviewValue::compare(&fields.product_code, &original.product_code),
        edition: ReviewValue::compare(&fields.edition, &original.edition),
        publish_date: ReviewValue {
            changed: current_date != original_date,
            text: current_date,
        },
        notes: ReviewValue {
            text: notes_text,
            changed: fields.notes != original.notes,
        },
        tags: input.tags,
        classifications: input.classifications,
        preview,
    }
}
