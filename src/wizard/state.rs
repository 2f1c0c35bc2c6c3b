//! Wizard state machine: tracks the current step, the live draft, and the
//! accumulated record.
//!
//! Transitions are synchronous and side-effect free; persistence and
//! submission live in [`super::manager::WizardManager`].

use std::collections::BTreeSet;

use serde_json::Value;

use crate::crisis::{CrisisMode, CrisisProfile};
use crate::error::WizardError;

use super::fields::{self, FieldMap, WizardStep};
use super::payload;
use super::record::WizardRecord;
use super::summary::ReviewSummary;

/// Where the wizard is: on a numbered step, or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Step(WizardStep),
    /// Reached only through a successful submission.
    Submitted,
}

impl WizardPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

#[derive(Debug, Clone)]
pub struct WizardState {
    record: WizardRecord,
    current: WizardStep,
    submitted: bool,
    /// Live inputs, not yet accepted by `next()`.
    draft: FieldMap,
    invalid_fields: BTreeSet<String>,
    hints: Vec<&'static str>,
    summary: Option<ReviewSummary>,
}

impl WizardState {
    pub fn new(crisis_mode: CrisisMode, specific_threat: impl Into<String>) -> Self {
        Self::from_record(WizardRecord::new(crisis_mode, specific_threat))
    }

    /// Resume from a stored record. The draft is pre-filled with the
    /// accumulated fields but the wizard always restarts at step 1.
    pub fn from_record(record: WizardRecord) -> Self {
        Self {
            draft: record.fields.clone(),
            record,
            current: WizardStep::Location,
            submitted: false,
            invalid_fields: BTreeSet::new(),
            hints: Vec::new(),
            summary: None,
        }
    }

    pub fn phase(&self) -> WizardPhase {
        if self.submitted {
            WizardPhase::Submitted
        } else {
            WizardPhase::Step(self.current)
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current
    }

    pub fn crisis_mode(&self) -> CrisisMode {
        self.record.crisis_mode
    }

    pub fn record(&self) -> &WizardRecord {
        &self.record
    }

    pub fn accumulated(&self) -> &FieldMap {
        &self.record.fields
    }

    pub fn draft(&self) -> &FieldMap {
        &self.draft
    }

    /// Fields flagged by the last failed `next()`.
    pub fn invalid_fields(&self) -> &BTreeSet<String> {
        &self.invalid_fields
    }

    /// Advisory messages from the last accepted step.
    pub fn hints(&self) -> &[&'static str] {
        &self.hints
    }

    /// Present once the review step has been reached.
    pub fn summary(&self) -> Option<&ReviewSummary> {
        self.summary.as_ref()
    }

    /// Update a live input.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.draft.insert(name.to_string(), value.into());
        self.invalid_fields.remove(name);
        Ok(())
    }

    /// Validate the current step's draft, accept it into the record and move
    /// forward. On the review step the record is re-accepted in place.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        let step = self.current;
        let mode = self.record.crisis_mode;

        if let Err(e) = fields::validate_step(step, mode, &self.draft) {
            self.invalid_fields = e.missing.iter().cloned().collect();
            return Err(e.into());
        }
        self.invalid_fields.clear();

        for name in step.fields(mode) {
            let value = self
                .draft
                .get(*name)
                .filter(|v| !fields::is_empty(Some(*v)))
                .cloned();
            match value {
                Some(v) => {
                    self.record.fields.insert(name.to_string(), v);
                }
                None => {
                    self.record.fields.remove(*name);
                }
            }
        }

        self.hints = match step {
            WizardStep::Location => fields::zip_code_hint(&self.record.fields).into_iter().collect(),
            _ => Vec::new(),
        };

        if let Some(next) = step.next() {
            self.current = next;
        }
        if self.current.is_review() {
            self.summary = Some(ReviewSummary::build(&self.record));
        }
        Ok(self.current)
    }

    /// Step back without revalidating or discarding anything.
    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        if let Some(prev) = self.current.previous() {
            self.current = prev;
        }
        Ok(self.current)
    }

    /// The request body for submission. Only available on the review step.
    pub fn build_profile(&self) -> Result<CrisisProfile, WizardError> {
        self.ensure_open()?;
        if !self.current.is_review() {
            return Err(WizardError::NotOnReviewStep {
                step: self.current.number(),
            });
        }
        payload::build_profile(&self.record)
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.submitted {
            Err(WizardError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::wizard::fields::{ZIP_HINT, names};

    fn fill_location(state: &mut WizardState) {
        state.set_field(names::ZIP_CODE, "33139").unwrap();
        state.set_field(names::CITY, "Miami Beach").unwrap();
        state.set_field(names::STATE, "FL").unwrap();
    }

    fn fill_household(state: &mut WizardState) {
        state.set_field(names::ADULTS, 2).unwrap();
        state.set_field(names::CHILDREN, 0).unwrap();
        state.set_field(names::PETS, 0).unwrap();
        state.set_field(names::HOUSING_TYPE, "house").unwrap();
    }

    #[test]
    fn next_blocks_on_missing_fields_without_moving() {
        let mut state = WizardState::new(CrisisMode::NaturalDisaster, "hurricane");
        state.set_field(names::CITY, "Miami").unwrap();

        let err = state.next().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields");
        assert_eq!(state.current_step(), WizardStep::Location);
        assert!(state.accumulated().is_empty());
        assert!(state.invalid_fields().contains(names::ZIP_CODE));
        assert!(state.invalid_fields().contains(names::STATE));

        state.set_field(names::ZIP_CODE, "33139").unwrap();
        assert!(!state.invalid_fields().contains(names::ZIP_CODE));
    }

    #[test]
    fn walks_to_review_and_builds_summary() {
        let mut state = WizardState::new(CrisisMode::NaturalDisaster, "hurricane");
        fill_location(&mut state);
        assert_eq!(state.next().unwrap(), WizardStep::Household);
        fill_household(&mut state);
        assert_eq!(state.next().unwrap(), WizardStep::Resources);
        assert!(state.summary().is_none());
        state.set_field(names::BUDGET_TIER, 100).unwrap();
        assert_eq!(state.next().unwrap(), WizardStep::Review);

        let summary = state.summary().unwrap();
        assert_eq!(summary.get("Disaster Type"), Some("Hurricane"));
        assert_eq!(state.accumulated().get(names::PETS), Some(&json!(0)));
        assert!(state.build_profile().is_ok());
    }

    #[test]
    fn zip_hint_does_not_block() {
        let mut state = WizardState::new(CrisisMode::NaturalDisaster, "flood");
        state.set_field(names::ZIP_CODE, "123").unwrap();
        state.set_field(names::CITY, "Houston").unwrap();
        state.set_field(names::STATE, "TX").unwrap();
        assert_eq!(state.next().unwrap(), WizardStep::Household);
        assert_eq!(state.hints(), &[ZIP_HINT]);
    }

    #[test]
    fn previous_then_next_keeps_accumulated_fields() {
        let mut state = WizardState::new(CrisisMode::EconomicCrisis, "layoff");
        fill_location(&mut state);
        state.next().unwrap();
        fill_household(&mut state);
        state.next().unwrap();
        let before = state.accumulated().clone();

        assert_eq!(state.previous().unwrap(), WizardStep::Household);
        assert_eq!(state.accumulated(), &before);
        assert_eq!(state.next().unwrap(), WizardStep::Resources);
        assert_eq!(state.accumulated(), &before);
    }

    #[test]
    fn previous_on_first_step_stays_put() {
        let mut state = WizardState::new(CrisisMode::NaturalDisaster, "tornado");
        assert_eq!(state.previous().unwrap(), WizardStep::Location);
    }

    #[test]
    fn optional_debt_is_dropped_when_cleared() {
        let mut state = WizardState::new(CrisisMode::EconomicCrisis, "furlough");
        fill_location(&mut state);
        state.next().unwrap();
        fill_household(&mut state);
        state.next().unwrap();
        state.set_field(names::CURRENT_INCOME, 0).unwrap();
        state.set_field(names::MONTHLY_EXPENSES, 2000).unwrap();
        state.set_field(names::AVAILABLE_SAVINGS, 500).unwrap();
        state.set_field(names::DEBT_OBLIGATIONS, 300).unwrap();
        state.next().unwrap();
        assert_eq!(state.accumulated().get(names::DEBT_OBLIGATIONS), Some(&json!(300)));

        state.previous().unwrap();
        state.set_field(names::DEBT_OBLIGATIONS, "").unwrap();
        state.next().unwrap();
        assert!(state.accumulated().get(names::DEBT_OBLIGATIONS).is_none());
        let finances = state.build_profile().unwrap().financial_situation.unwrap();
        assert_eq!(finances.debt_obligations, 0.0);
    }

    #[test]
    fn restored_record_restarts_at_step_one() {
        let mut record = WizardRecord::new(CrisisMode::NaturalDisaster, "wildfire");
        record.fields.insert(names::CITY.into(), json!("Paradise"));

        let state = WizardState::from_record(record);
        assert_eq!(state.current_step(), WizardStep::Location);
        assert_eq!(state.draft().get(names::CITY), Some(&json!("Paradise")));
    }

    #[test]
    fn profile_requires_review_step_and_submitted_is_terminal() {
        let mut state = WizardState::new(CrisisMode::NaturalDisaster, "blizzard");
        assert!(matches!(
            state.build_profile(),
            Err(WizardError::NotOnReviewStep { step: 1 })
        ));

        state.mark_submitted();
        assert!(state.phase().is_terminal());
        assert!(matches!(state.next(), Err(WizardError::AlreadySubmitted)));
        assert!(matches!(state.previous(), Err(WizardError::AlreadySubmitted)));
        assert!(matches!(
            state.set_field(names::CITY, "x"),
            Err(WizardError::AlreadySubmitted)
        ));
    }
}
