//! Intake wizard state machine
//!
//! `WizardState` is an owned value; every transition takes it by `&mut`.
//! Forward moves are gated by the validation rules of the fields owned by
//! the steps being left behind. Moving back never touches the values.

use super::estimator::{self, EstimateBreakdown};
use super::fields::{FieldName, FieldValue, FormValues};
use super::steps::WizardStep;
use super::validation::{self, InvalidFields, ValidationResult};
use serde::{Deserialize, Serialize};

/// Result of a forward transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Moved to the given step
    Moved { step: usize },
    /// Already on the last step; nothing to advance to
    AtLastStep { step: usize },
    /// A step failed validation; the wizard did not move
    Blocked {
        step: usize,
        #[serde(rename = "invalidFields")]
        invalid_fields: InvalidFields,
    },
    /// Requested step does not exist
    OutOfRange { requested: usize },
}

impl StepOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, StepOutcome::Blocked { .. })
    }
}

/// Complete state of one intake wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    /// Current step, 1-based
    current_step: usize,
    /// Values entered so far
    values: FormValues,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    /// Fresh wizard on step 1 with no values
    pub fn new() -> Self {
        Self {
            current_step: 1,
            values: FormValues::new(),
        }
    }

    /// Total number of steps
    pub fn step_count() -> usize {
        WizardStep::count()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::from_number(self.current_step).unwrap_or_default()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Store a field value and re-validate that field only
    pub fn set_field(&mut self, field: FieldName, value: FieldValue) -> ValidationResult {
        self.values.set(field, value);
        validation::validate_in(&self.values, field)
    }

    /// Remove a field value and re-validate it
    pub fn clear_field(&mut self, field: FieldName) -> ValidationResult {
        self.values.remove(field);
        validation::validate_in(&self.values, field)
    }

    /// Invalid fields of the current step
    pub fn current_step_errors(&self) -> InvalidFields {
        validation::validate_fields(&self.values, self.step().fields())
    }

    /// Move to the next step if the current step validates
    pub fn advance(&mut self) -> StepOutcome {
        let invalid_fields = self.current_step_errors();
        if !invalid_fields.is_empty() {
            log::debug!(
                "Wizard blocked on step {}: {} invalid field(s)",
                self.current_step,
                invalid_fields.len()
            );
            return StepOutcome::Blocked {
                step: self.current_step,
                invalid_fields,
            };
        }

        match self.step().next() {
            Some(next) => {
                self.current_step = next.number();
                StepOutcome::Moved {
                    step: self.current_step,
                }
            }
            None => StepOutcome::AtLastStep {
                step: self.current_step,
            },
        }
    }

    /// Move back one step (floored at step 1). Values are kept.
    pub fn retreat(&mut self) -> usize {
        if let Some(prev) = self.step().previous() {
            self.current_step = prev.number();
        }
        self.current_step
    }

    /// Jump to any step. Backward jumps always succeed; forward jumps require
    /// every step in between, starting with the current one, to validate.
    pub fn jump(&mut self, target: usize) -> StepOutcome {
        if WizardStep::from_number(target).is_none() {
            return StepOutcome::OutOfRange { requested: target };
        }

        if target > self.current_step {
            for number in self.current_step..target {
                let step = match WizardStep::from_number(number) {
                    Some(step) => step,
                    None => break,
                };
                let invalid_fields = validation::validate_fields(&self.values, step.fields());
                if !invalid_fields.is_empty() {
                    return StepOutcome::Blocked {
                        step: number,
                        invalid_fields,
                    };
                }
            }
        }

        self.current_step = target;
        StepOutcome::Moved { step: target }
    }

    /// Progress through the wizard, 0-100
    pub fn progress_percentage(&self) -> u8 {
        progress_for(self.current_step)
    }

    /// Invalid fields across every step
    pub fn all_errors(&self) -> InvalidFields {
        validation::validate_all(&self.values)
    }

    /// Submission is allowed on the last step once every step validates
    pub fn can_submit(&self) -> bool {
        self.current_step == Self::step_count() && self.all_errors().is_empty()
    }

    /// Derived budget estimate for the current values
    pub fn estimate(&self) -> EstimateBreakdown {
        estimator::breakdown_values(&self.values)
    }

    /// Back to step 1 with no values
    pub fn reset(&mut self) {
        self.current_step = 1;
        self.values.clear();
    }
}

/// Progress percentage for a step number: `round(100 * step / N)`
pub fn progress_for(step: usize) -> u8 {
    let total = WizardStep::count();
    let step = step.clamp(1, total);
    ((100.0 * step as f64) / total as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_project_step(state: &mut WizardState) {
        state.set_field(FieldName::Name, "Acme Redo".into());
        state.set_field(
            FieldName::Description,
            "Need a full site overhaul for our storefront".into(),
        );
        state.set_field(FieldName::ProjectType, "website-redesign".into());
        state.set_field(FieldName::Urgency, "urgent".into());
    }

    #[test]
    fn test_initial_state() {
        let state = WizardState::new();
        assert_eq!(state.current_step(), 1);
        assert!(state.values().is_empty());
        assert_eq!(state.step(), WizardStep::Project);
    }

    #[test]
    fn test_advance_blocked_is_repeatable() {
        let mut state = WizardState::new();
        state.set_field(FieldName::Name, "A".into());

        let first = state.advance();
        let second = state.advance();
        assert!(first.is_blocked());
        assert_eq!(first, second);
        assert_eq!(state.current_step(), 1);

        if let StepOutcome::Blocked { invalid_fields, .. } = first {
            assert!(invalid_fields.contains_key(&FieldName::Name));
            assert!(invalid_fields.contains_key(&FieldName::Description));
            assert!(invalid_fields.contains_key(&FieldName::ProjectType));
            assert!(!invalid_fields.contains_key(&FieldName::Urgency));
        }
    }

    #[test]
    fn test_advance_moves_when_valid() {
        let mut state = WizardState::new();
        filled_project_step(&mut state);
        assert_eq!(state.advance(), StepOutcome::Moved { step: 2 });
        assert_eq!(state.step(), WizardStep::Business);
    }

    #[test]
    fn test_advance_at_last_step() {
        let mut state = WizardState::new();
        filled_project_step(&mut state);
        state.set_field(FieldName::ContactEmail, "a@b.com".into());
        assert_eq!(state.jump(5), StepOutcome::Moved { step: 5 });
        assert_eq!(state.advance(), StepOutcome::AtLastStep { step: 5 });
        assert_eq!(state.current_step(), 5);
    }

    #[test]
    fn test_retreat_keeps_values_and_floors() {
        let mut state = WizardState::new();
        filled_project_step(&mut state);
        state.advance();

        let before = state.values().clone();
        assert_eq!(state.retreat(), 1);
        assert_eq!(state.values(), &before);
        assert_eq!(state.retreat(), 1);
        assert_eq!(state.values(), &before);
    }

    #[test]
    fn test_set_field_revalidates_without_moving() {
        let mut state = WizardState::new();
        let result = state.set_field(FieldName::ContactEmail, "not-an-email".into());
        assert!(!result.valid);
        assert_eq!(state.current_step(), 1);

        let result = state.set_field(FieldName::ContactEmail, "a@b.com".into());
        assert!(result.valid);
    }

    #[test]
    fn test_jump_forward_requires_intermediate_steps() {
        let mut state = WizardState::new();
        filled_project_step(&mut state);

        // contact step lacks an email, so jumping past it is blocked there
        match state.jump(5) {
            StepOutcome::Blocked {
                step,
                invalid_fields,
            } => {
                assert_eq!(step, 4);
                assert!(invalid_fields.contains_key(&FieldName::ContactEmail));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(state.current_step(), 1);

        assert_eq!(state.jump(4), StepOutcome::Moved { step: 4 });
        assert_eq!(state.jump(2), StepOutcome::Moved { step: 2 });
    }

    #[test]
    fn test_jump_out_of_range() {
        let mut state = WizardState::new();
        assert_eq!(state.jump(0), StepOutcome::OutOfRange { requested: 0 });
        assert_eq!(state.jump(9), StepOutcome::OutOfRange { requested: 9 });
        assert_eq!(state.current_step(), 1);
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_for(1), 20);
        assert_eq!(progress_for(WizardStep::count()), 100);
        let mut last = 0;
        for step in 1..=WizardStep::count() {
            let p = progress_for(step);
            assert!(p >= last);
            last = p;
        }
        assert_eq!(WizardState::new().progress_percentage(), 20);
    }

    #[test]
    fn test_can_submit_only_on_last_step() {
        let mut state = WizardState::new();
        filled_project_step(&mut state);
        state.set_field(FieldName::ContactEmail, "a@b.com".into());
        assert!(!state.can_submit());
        state.jump(5);
        assert!(state.can_submit());

        state.set_field(FieldName::ContactEmail, "broken".into());
        assert!(!state.can_submit());
    }

    #[test]
    fn test_reset() {
        let mut state = WizardState::new();
        filled_project_step(&mut state);
        state.advance();
        state.reset();
        assert_eq!(state, WizardState::new());
    }

    #[test]
    fn test_estimate_tracks_values() {
        let mut state = WizardState::new();
        state.set_field(FieldName::ProjectType, "mobile-app".into());
        state.set_field(
            FieldName::Features,
            FieldValue::List(vec!["user-authentication".into()]),
        );
        assert_eq!(state.estimate().total, 48_500);
    }
}
