//! One-shot page effects queued by the controller
//!
//! View models describe what the page looks like; effects describe things
//! that happen once (a transient message, a blink, writing a value into an
//! input, leaving the page). The browser shell drains them after every event.

use serde::Serialize;

use crate::fields::FieldId;
use crate::guard::NavigationTarget;
use crate::selection::SelectionKind;

/// Code of the informational notice for a re-used tag
pub const ALREADY_EXISTS: &str = "alreadyExists";
pub const ALREADY_EXISTS_MESSAGE: &str = "Tag already exists in available tags";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    /// Floating alert in the page corner
    Alert,
    /// Error under the tag input
    TagError,
    /// Information under the tag input
    TagInfo,
}

/// A transient message. Auto-dismissal is cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub code: &'static str,
    pub message: String,
    pub dismiss_after_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Effect {
    Notice(Notice),
    /// Briefly highlight an existing option
    Blink {
        kind: SelectionKind,
        name: String,
        duration_ms: u32,
    },
    /// Write a value the controller derived into an input
    SetField { field: FieldId, value: String },
    ClearTagInput,
    ClearFileInput,
    ShowProtectionPrompt { restrictions: Vec<String> },
    HideProtectionPrompt,
    ShowNavigationPrompt,
    HideNavigationPrompt,
    /// Leave the page now
    Navigate { target: NavigationTarget },
}
