//! Step validation for the application wizard.
//!
//! Steps are evaluated in order and the persisted pointer is a high-water mark: the
//! highest step N such that steps 1..=N all pass, capped by the step the client asked
//! for. Errors from every failing step up to the requested one are reported so the
//! client can render them inline, but a failure anywhere stops the pointer there.

mod config;
mod rules;

pub use config::WizardConfig;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::form::ApplicationForm;

/// Pages of the application wizard in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Identity,
    Household,
    Financial,
    Support,
    History,
    Documents,
    Consent,
}

/// Number of the last wizard step; a draft at this step is ready to submit.
pub const FINAL_STEP: u8 = 7;

impl WizardStep {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Identity,
            Self::Household,
            Self::Financial,
            Self::Support,
            Self::History,
            Self::Documents,
            Self::Consent,
        ]
    }

    /// One-based position in the wizard.
    pub const fn number(self) -> u8 {
        match self {
            Self::Identity => 1,
            Self::Household => 2,
            Self::Financial => 3,
            Self::Support => 4,
            Self::History => 5,
            Self::Documents => 6,
            Self::Consent => 7,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|step| step.number() == number)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Household => "Household",
            Self::Financial => "Financial",
            Self::Support => "Support",
            Self::History => "History",
            Self::Documents => "Documents",
            Self::Consent => "Consent",
        }
    }
}

/// A single failed rule, addressed by step and (dotted) field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub step: u8,
    pub field: String,
    pub message: String,
}

/// Result of recomputing the wizard pointer for a stored form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResolution {
    pub current_step: u8,
    pub errors: Vec<FieldError>,
}

impl StepResolution {
    pub fn is_complete(&self) -> bool {
        self.current_step == FINAL_STEP
    }
}

/// Stateless evaluator applying the per-step rule sets.
#[derive(Debug, Clone, Default)]
pub struct StepValidator {
    config: WizardConfig,
}

impl StepValidator {
    pub fn new(config: WizardConfig) -> Self {
        Self { config }
    }

    pub fn validate_step(
        &self,
        step: WizardStep,
        form: &ApplicationForm,
        today: NaiveDate,
    ) -> Vec<FieldError> {
        match step {
            WizardStep::Identity => rules::identity(form, &self.config, today),
            WizardStep::Household => rules::household(form),
            WizardStep::Financial => rules::financial(form),
            WizardStep::Support => rules::support(form),
            WizardStep::History => rules::history(form),
            WizardStep::Documents => rules::documents(form),
            WizardStep::Consent => rules::consent(form),
        }
    }

    /// Compute the step to persist for a save requesting `requested_step`.
    pub fn resolve(
        &self,
        form: &ApplicationForm,
        requested_step: u8,
        today: NaiveDate,
    ) -> StepResolution {
        let requested = requested_step.min(FINAL_STEP);
        let mut current_step = 0;
        let mut contiguous = true;
        let mut errors = Vec::new();

        for step in WizardStep::ordered() {
            if step.number() > requested {
                break;
            }

            let step_errors = self.validate_step(step, form, today);
            if step_errors.is_empty() {
                if contiguous {
                    current_step = step.number();
                }
            } else {
                contiguous = false;
                errors.extend(step_errors);
            }
        }

        StepResolution {
            current_step,
            errors,
        }
    }
}
