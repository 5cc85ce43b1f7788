//! Unsaved-changes navigation guard
//!
//! Every way of leaving the page funnels through [`NavigationGuard::intercept`].
//! A dirty form turns the attempt into a pending [`NavigationIntent`] that the
//! user confirms or declines through one confirmation dialog. Closing the tab
//! can only be stopped with the browser's own prompt.

use serde::Serialize;
use tracing::{debug, info};

/// Where an intercepted navigation was headed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationTarget {
    /// Browser history back
    Back,
    Url(String),
}

/// A way the user can try to leave the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitAttempt {
    LinkClick {
        href: String,
        /// Inside the wizard chrome or a dialog button
        in_wizard: bool,
        /// Opens a dropdown/modal instead of navigating
        toggles_overlay: bool,
    },
    HistoryPop,
    Unload,
    /// Submission of any form other than the edit form
    FormSubmit { action: String },
    /// The page's own back/cancel buttons
    Leave(NavigationTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the navigation happen
    Allow,
    /// Suppress the event and ask for confirmation
    Prompt(NavigationTarget),
    /// Ask the browser to show its native leave-page prompt
    NativePrompt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIntent {
    pub target: NavigationTarget,
    pub confirmed: bool,
}

#[derive(Debug, Default)]
pub struct NavigationGuard {
    submitting: bool,
    confirmed: bool,
    pending: Option<NavigationIntent>,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intercept(&mut self, attempt: ExitAttempt, dirty: bool) -> GuardDecision {
        if let ExitAttempt::Unload = attempt {
            return if dirty && !self.submitting {
                GuardDecision::NativePrompt
            } else {
                GuardDecision::Allow
            };
        }

        let target = match attempt {
            ExitAttempt::LinkClick {
                in_wizard: true, ..
            }
            | ExitAttempt::LinkClick {
                toggles_overlay: true,
                ..
            } => return GuardDecision::Allow,
            ExitAttempt::LinkClick { href, .. } => NavigationTarget::Url(href),
            ExitAttempt::HistoryPop => NavigationTarget::Back,
            ExitAttempt::FormSubmit { action } => NavigationTarget::Url(action),
            ExitAttempt::Leave(target) => target,
            ExitAttempt::Unload => return GuardDecision::Allow,
        };

        if !dirty || self.submitting || self.confirmed {
            debug!(?target, "navigation allowed");
            return GuardDecision::Allow;
        }

        info!(?target, "navigation needs confirmation");
        self.pending = Some(NavigationIntent {
            target: target.clone(),
            confirmed: false,
        });
        GuardDecision::Prompt(target)
    }

    /// Accept the pending navigation. The guard stays disarmed afterwards.
    pub fn confirm(&mut self) -> Option<NavigationTarget> {
        let mut intent = self.pending.take()?;
        intent.confirmed = true;
        self.confirmed = true;
        self.submitting = true;
        info!(target = ?intent.target, "navigation confirmed");
        Some(intent.target)
    }

    /// Stay on the page; the next attempt is guarded again
    pub fn decline(&mut self) {
        if let Some(intent) = self.pending.take() {
            debug!(target = ?intent.target, "navigation declined");
        }
    }

    /// The edit form itself is being submitted
    pub fn begin_submit(&mut self) {
        self.submitting = true;
    }

    pub fn pending(&self) -> Option<&NavigationIntent> {
        self.pending.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}
