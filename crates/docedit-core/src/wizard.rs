//! Four-step linear wizard

use serde::Serialize;
use tracing::info;

use crate::error::ValidationError;
use crate::fields::FormFields;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    #[default]
    File = 1,
    Metadata = 2,
    Tags = 3,
    Review = 4,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::File,
        WizardStep::Metadata,
        WizardStep::Tags,
        WizardStep::Review,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            WizardStep::File => Some(WizardStep::Metadata),
            WizardStep::Metadata => Some(WizardStep::Tags),
            WizardStep::Tags => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::File => None,
            WizardStep::Metadata => Some(WizardStep::File),
            WizardStep::Tags => Some(WizardStep::Metadata),
            WizardStep::Review => Some(WizardStep::Tags),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorState {
    Completed,
    Active,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepIndicator {
    pub step: u8,
    pub state: IndicatorState,
}

/// Which panel, indicator states and buttons are shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub active_step: u8,
    pub indicators: Vec<StepIndicator>,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_submit: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step: WizardStep,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Move forward one step. The metadata step requires every required
    /// field; the review step has no successor and returns `Ok(None)`.
    pub fn advance(&mut self, fields: &FormFields) -> Result<Option<WizardStep>, ValidationError> {
        if self.step == WizardStep::Metadata {
            if let Some(missing) = fields.first_missing_required() {
                return Err(ValidationError::MissingRequired(missing));
            }
        }
        let Some(next) = self.step.next() else {
            return Ok(None);
        };
        info!(from = self.step.number(), to = next.number(), "wizard advanced");
        self.step = next;
        Ok(Some(next))
    }

    /// Move back one step, never below the first
    pub fn retreat(&mut self) -> Option<WizardStep> {
        let previous = self.step.previous()?;
        info!(from = self.step.number(), to = previous.number(), "wizard retreated");
        self.step = previous;
        Some(previous)
    }

    pub fn view(&self) -> WizardView {
        let indicators = WizardStep::ALL
            .iter()
            .map(|step| StepIndicator {
                step: step.number(),
                state: match step.cmp(&self.step) {
                    std::cmp::Ordering::Less => IndicatorState::Completed,
                    std::cmp::Ordering::Equal => IndicatorState::Active,
                    std::cmp::Ordering::Greater => IndicatorState::Pending,
                },
            })
            .collect();
        WizardView {
            active_step: self.step.number(),
            indicators,
            show_previous: self.step != WizardStep::File,
            show_next: self.step != WizardStep::Review,
            show_submit: self.step == WizardStep::Review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldId;

    fn complete_fields() -> FormFields {
        FormFields {
            title: "Valve manual".into(),
            product_code: "VS-1".into(),
            publish_year: "2022".into(),
            no_of_pages: "10".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_on_file_step() {
        let wizard = Wizard::new();
        assert_eq!(wizard.step(), WizardStep::File);
        let view = wizard.view();
        assert!(!view.show_previous && view.show_next && !view.show_submit);
    }

    #[test]
    fn test_file_step_advances_unconditionally() {
        let mut wizard = Wizard::new();
        assert_eq!(
            wizard.advance(&FormFields::default()),
            Ok(Some(WizardStep::Metadata))
        );
    }

    #[test]
    fn test_metadata_step_blocks_on_each_missing_field() {
        for field in FieldId::REQUIRED {
            let mut wizard = Wizard::new();
            wizard.advance(&FormFields::default()).unwrap();

            let mut fields = complete_fields();
            fields.set(field, "   ");
            assert_eq!(
                wizard.advance(&fields),
                Err(ValidationError::MissingRequired(field))
            );
            assert_eq!(wizard.step(), WizardStep::Metadata);
        }
    }

    #[test]
    fn test_metadata_step_advances_once_when_complete() {
        let mut wizard = Wizard::new();
        wizard.advance(&FormFields::default()).unwrap();
        assert_eq!(wizard.advance(&complete_fields()), Ok(Some(WizardStep::Tags)));
        assert_eq!(wizard.step(), WizardStep::Tags);
    }

    #[test]
    fn test_review_has_no_forward_transition() {
        let mut wizard = Wizard::new();
        let fields = complete_fields();
        for _ in 0..3 {
            wizard.advance(&fields).unwrap();
        }
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.advance(&fields), Ok(None));
        assert_eq!(wizard.step(), WizardStep::Review);

        let view = wizard.view();
        assert!(view.show_previous && !view.show_next && view.show_submit);
    }

    #[test]
    fn test_retreat_stops_at_first_step() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.retreat(), None);
        wizard.advance(&FormFields::default()).unwrap();
        assert_eq!(wizard.retreat(), Some(WizardStep::File));
    }

    #[test]
    fn test_indicator_states() {
        let mut wizard = Wizard::new();
        wizard.advance(&FormFields::default()).unwrap();
        wizard.advance(&complete_fields()).unwrap();
        let states: Vec<_> = wizard.view().indicators.iter().map(|i| i.state).collect();
        assert_eq!(
            states,
            vec![
                IndicatorState::Completed,
                IndicatorState::Completed,
                IndicatorState::Active,
                IndicatorState::Pending,
            ]
        );
        assert_eq!(wizard.view().active_step, 3);
    }
}
