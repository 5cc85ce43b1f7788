//! Tag and classification multi-selects
//!
//! A [`SelectionManager`] owns both the universe of selectable options and the
//! ordered set of chosen names. The option checkboxes and chips on the page
//! are projections of this state and are rebuilt from it after every change.

use serde::Serialize;
use tracing::debug;

use crate::error::ValidationError;

/// Which multi-select a manager drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionKind {
    Tag,
    Classification,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Tag => "tag",
            SelectionKind::Classification => "classification",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "tag" => Some(SelectionKind::Tag),
            "classification" => Some(SelectionKind::Classification),
            _ => None,
        }
    }

    /// Placeholder shown when nothing is selected
    pub fn empty_label(&self) -> &'static str {
        match self {
            SelectionKind::Tag => "No tags selected",
            SelectionKind::Classification => "No classifications selected",
        }
    }

    /// Tags compare case-insensitively; classifications are taken verbatim
    fn normalize(&self, name: &str) -> String {
        match self {
            SelectionKind::Tag => name.to_lowercase(),
            SelectionKind::Classification => name.to_string(),
        }
    }
}

/// Ordered, duplicate-free list of names. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    items: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless already present. Returns whether it was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.items.push(name);
        true
    }

    /// Returns whether `name` was present
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item != name);
        self.items.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Comma-joined value for the hidden form field
    pub fn joined(&self) -> String {
        self.items.join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// One selectable option on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub name: String,
    pub selected: bool,
    /// Created during this session rather than rendered by the server
    pub synthesized: bool,
}

/// One chip in the "selected" strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipView {
    /// Identity the remove affordance is bound to
    pub name: String,
    /// Not part of the value captured when the page loaded
    pub is_new: bool,
}

/// Projection of a selection for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub kind: SelectionKind,
    pub chips: Vec<ChipView>,
    /// Set when `chips` is empty
    pub empty_label: Option<&'static str>,
    pub hidden_value: String,
}

/// Result of a successful free-text add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAddition {
    /// A brand new option was created and selected
    Created(String),
    /// The name matched an existing option, which is now selected
    Reused(String),
}

#[derive(Debug, Clone)]
pub struct SelectionManager {
    kind: SelectionKind,
    options: Vec<OptionView>,
    selected: SelectionSet,
}

impl SelectionManager {
    /// Build from the page's options and the document's current names.
    ///
    /// Names attached to the document but missing from the option list get a
    /// synthesized option so every selected name has a checked entry.
    pub fn new(kind: SelectionKind, available: Vec<String>, initial: Vec<String>) -> Self {
        let selected: SelectionSet = initial.into_iter().collect();
        let mut options: Vec<OptionView> = Vec::with_capacity(available.len());
        for name in available {
            if options.iter().any(|o| o.name == name) {
                continue;
            }
            options.push(OptionView {
                selected: selected.contains(&name),
                name,
                synthesized: false,
            });
        }
        for name in selected.iter() {
            if !options.iter().any(|o| o.name == name) {
                options.push(OptionView {
                    name: name.to_string(),
                    selected: true,
                    synthesized: true,
                });
            }
        }
        Self {
            kind,
            options,
            selected,
        }
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn selected(&self) -> &SelectionSet {
        &self.selected
    }

    pub fn options(&self) -> &[OptionView] {
        &self.options
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Flip membership of a known option. Returns the new membership, or
    /// `None` if no option has that name.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let option = self.options.iter_mut().find(|o| o.name == name)?;
        option.selected = !option.selected;
        if option.selected {
            self.selected.insert(name);
        } else {
            self.selected.remove(name);
        }
        debug!(kind = self.kind.as_str(), name, selected = option.selected, "toggled");
        Some(option.selected)
    }

    /// Add a tag typed by the user
    pub fn add_new(&mut self, raw_input: &str) -> Result<TagAddition, ValidationError> {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTag);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::TagContainsSpace);
        }
        let name = self.kind.normalize(trimmed);

        if self
            .selected
            .iter()
            .any(|selected| self.kind.normalize(selected) == name)
        {
            return Err(ValidationError::AlreadySelected);
        }

        if let Some(option) = self
            .options
            .iter_mut()
            .find(|o| self.kind.normalize(&o.name) == name)
        {
            option.selected = true;
            self.selected.insert(option.name.clone());
            debug!(name = %option.name, "reused existing option");
            return Ok(TagAddition::Reused(option.name.clone()));
        }

        self.options.push(OptionView {
            name: name.clone(),
            selected: true,
            synthesized: true,
        });
        self.selected.insert(name.clone());
        debug!(name = %name, "created option");
        Ok(TagAddition::Created(name))
    }

    /// Drop `name` from the selection. Returns whether it was selected.
    pub fn remove(&mut self, name: &str) -> bool {
        if let Some(option) = self.options.iter_mut().find(|o| o.name == name) {
            option.selected = false;
        }
        self.selected.remove(name)
    }

    /// Chips for the current selection, flagged against the load-time names
    pub fn view(&self, baseline: &[String]) -> SelectionView {
        let chips: Vec<ChipView> = self
            .selected
            .iter()
            .map(|name| ChipView {
                name: name.to_string(),
                is_new: !baseline.iter().any(|b| b == name),
            })
            .collect();
        SelectionView {
            kind: self.kind,
            empty_label: chips.is_empty().then(|| self.kind.empty_label()),
            chips,
            hidden_value: self.selected.joined(),
        }
    }
}
