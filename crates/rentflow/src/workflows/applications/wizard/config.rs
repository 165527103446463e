use serde::{Deserialize, Serialize};

/// Tunables for the wizard's validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    pub minimum_applicant_age: u32,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            minimum_applicant_age: 18,
        }
    }
}
