use chrono::NaiveDate;

use super::super::form::{ApplicationForm, DocumentCategory};
use super::config::WizardConfig;
use super::{FieldError, WizardStep};
use crate::workflows::store::is_email;

const ID_DOCUMENT_TYPES: &[&str] = &["passport", "national_id", "drivers_license"];
const EMPLOYMENT_STATUSES: &[&str] = &["employed", "self_employed", "student", "unemployed", "retired"];
const LIVING_SITUATIONS: &[&str] = &["renting", "owner", "with_family", "other"];
const MAX_LEASE_TERM_MONTHS: u32 = 60;
const MAX_OCCUPANT_AGE: u32 = 120;

/// Accumulates field errors for one step.
struct StepCheck {
    step: WizardStep,
    errors: Vec<FieldError>,
}

impl StepCheck {
    fn new(step: WizardStep) -> Self {
        Self {
            step,
            errors: Vec::new(),
        }
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            step: self.step.number(),
            field: field.into(),
            message: message.into(),
        });
    }

    fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match present(value) {
            Some(value) => Some(value),
            None => {
                self.error(field, "is required");
                None
            }
        }
    }

    fn date(&mut self, field: &str, value: &Option<String>) -> Option<NaiveDate> {
        let raw = self.required(field, value)?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.error(field, "must be a date formatted YYYY-MM-DD");
                None
            }
        }
    }

    fn email(&mut self, field: &str, value: &Option<String>) {
        if let Some(raw) = self.required(field, value) {
            if !is_email(raw) {
                self.error(field, "must be a valid e-mail address");
            }
        }
    }

    fn one_of<'a>(
        &mut self,
        field: &str,
        value: &'a Option<String>,
        allowed: &[&str],
    ) -> Option<&'a str> {
        let raw = self.required(field, value)?;
        if allowed.contains(&raw) {
            Some(raw)
        } else {
            self.error(field, format!("must be one of: {}", allowed.join(", ")));
            None
        }
    }

    fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn is_employed(status: Option<&str>) -> bool {
    matches!(status, Some("employed" | "self_employed"))
}

pub(crate) fn identity(
    form: &ApplicationForm,
    config: &WizardConfig,
    today: NaiveDate,
) -> Vec<FieldError> {
    let section = &form.identity;
    let mut check = StepCheck::new(WizardStep::Identity);

    check.required("first_name", &section.first_name);
    check.required("last_name", &section.last_name);
    check.email("email", &section.email);
    check.required("phone", &section.phone);
    check.required("nationality", &section.nationality);

    if let Some(born) = check.date("date_of_birth", &section.date_of_birth) {
        match today.years_since(born) {
            None => check.error("date_of_birth", "cannot be in the future"),
            Some(age) if age < config.minimum_applicant_age => check.error(
                "date_of_birth",
                format!(
                    "applicant must be at least {} years old",
                    config.minimum_applicant_age
                ),
            ),
            Some(_) => {}
        }
    }

    check.one_of("id_document_type", &section.id_document_type, ID_DOCUMENT_TYPES);
    check.required("id_document_number", &section.id_document_number);
    check.finish()
}

pub(crate) fn household(form: &ApplicationForm) -> Vec<FieldError> {
    let section = &form.household;
    let mut check = StepCheck::new(WizardStep::Household);

    check.date("desired_move_in", &section.desired_move_in);

    match section.lease_term_months {
        None => check.error("lease_term_months", "is required"),
        Some(months) if months == 0 || months > MAX_LEASE_TERM_MONTHS => check.error(
            "lease_term_months",
            format!("must be between 1 and {MAX_LEASE_TERM_MONTHS}"),
        ),
        Some(_) => {}
    }

    for (index, occupant) in section.occupants.iter().flatten().enumerate() {
        check.required(&format!("occupants.{index}.name"), &occupant.name);
        check.required(
            &format!("occupants.{index}.relationship"),
            &occupant.relationship,
        );
        match occupant.age {
            None => check.error(format!("occupants.{index}.age"), "is required"),
            Some(age) if age > MAX_OCCUPANT_AGE => check.error(
                format!("occupants.{index}.age"),
                format!("must be at most {MAX_OCCUPANT_AGE}"),
            ),
            Some(_) => {}
        }
    }

    let pets = section.pets.as_deref().unwrap_or_default();
    if section.has_pets == Some(true) && pets.is_empty() {
        check.error("pets", "list at least one pet");
    }
    for (index, pet) in pets.iter().enumerate() {
        check.required(&format!("pets.{index}.kind"), &pet.kind);
    }

    check.finish()
}

pub(crate) fn financial(form: &ApplicationForm) -> Vec<FieldError> {
    let section = &form.financial;
    let mut check = StepCheck::new(WizardStep::Financial);

    let status = check.one_of(
        "employment_status",
        &section.employment_status,
        EMPLOYMENT_STATUSES,
    );
    if is_employed(status) {
        check.required("employer_name", &section.employer_name);
        check.required("job_title", &section.job_title);
        check.date("employment_start_date", &section.employment_start_date);
    }

    match section.monthly_income {
        None => check.error("monthly_income", "is required"),
        Some(income) if income < 0 => check.error("monthly_income", "cannot be negative"),
        Some(_) => {}
    }

    if let Some(currency) = check.required("income_currency", &section.income_currency) {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            check.error("income_currency", "must be a three-letter ISO currency code");
        }
    }

    check.finish()
}

pub(crate) fn support(form: &ApplicationForm) -> Vec<FieldError> {
    let section = &form.support;
    let mut check = StepCheck::new(WizardStep::Support);

    check.required("emergency_contact_name", &section.emergency_contact_name);
    check.required("emergency_contact_phone", &section.emergency_contact_phone);

    if section.has_guarantor == Some(true) {
        match &section.guarantor {
            None => check.error("guarantor", "is required when has_guarantor is set"),
            Some(guarantor) => {
                check.required("guarantor.name", &guarantor.name);
                check.required("guarantor.relationship", &guarantor.relationship);
                check.email("guarantor.email", &guarantor.email);
                match guarantor.monthly_income {
                    None => check.error("guarantor.monthly_income", "is required"),
                    Some(income) if income < 0 => {
                        check.error("guarantor.monthly_income", "cannot be negative")
                    }
                    Some(_) => {}
                }
            }
        }
    }

    for (index, co_signer) in section.co_signers.iter().flatten().enumerate() {
        check.required(&format!("co_signers.{index}.name"), &co_signer.name);
        check.email(&format!("co_signers.{index}.email"), &co_signer.email);
    }

    check.finish()
}

pub(crate) fn history(form: &ApplicationForm) -> Vec<FieldError> {
    let section = &form.history;
    let mut check = StepCheck::new(WizardStep::History);

    check.required("current_address", &section.current_address);
    check.required("current_city", &section.current_city);
    check.required("current_postal_code", &section.current_postal_code);
    check.required("current_country", &section.current_country);

    let situation = check.one_of(
        "living_situation",
        &section.living_situation,
        LIVING_SITUATIONS,
    );
    if situation == Some("renting") {
        check.required("current_landlord_name", &section.current_landlord_name);
        check.required("current_landlord_contact", &section.current_landlord_contact);
    }

    for (index, reference) in section.references.iter().flatten().enumerate() {
        check.required(&format!("references.{index}.name"), &reference.name);
        match (present(&reference.email), present(&reference.phone)) {
            (Some(email), _) if !is_email(email) => check.error(
                format!("references.{index}.email"),
                "must be a valid e-mail address",
            ),
            (None, None) => check.error(
                format!("references.{index}.email"),
                "provide an e-mail address or a phone number",
            ),
            _ => {}
        }
    }

    check.finish()
}

pub(crate) fn documents(form: &ApplicationForm) -> Vec<FieldError> {
    let documents = form.documents.documents.as_deref().unwrap_or_default();
    let mut check = StepCheck::new(WizardStep::Documents);

    let has = |category: DocumentCategory| documents.iter().any(|doc| doc.category == category);
    if !has(DocumentCategory::Identification) {
        check.error("documents", "upload at least one identification document");
    }
    if is_employed(present(&form.financial.employment_status)) && !has(DocumentCategory::IncomeProof)
    {
        check.error("documents", "upload at least one proof of income");
    }

    for (index, document) in documents.iter().enumerate() {
        if !is_accepted_upload(&document.file_name) {
            check.error(
                format!("documents.{index}.file_name"),
                "must be a PDF, JPEG, or PNG file",
            );
        }
    }

    check.finish()
}

fn is_accepted_upload(file_name: &str) -> bool {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return false;
    }
    mime_guess::from_path(file_name).iter().any(|guess| {
        guess == mime::APPLICATION_PDF || guess == mime::IMAGE_JPEG || guess == mime::IMAGE_PNG
    })
}

pub(crate) fn consent(form: &ApplicationForm) -> Vec<FieldError> {
    let section = &form.consent;
    let mut check = StepCheck::new(WizardStep::Consent);

    let acknowledgements = [
        ("accept_terms", section.accept_terms),
        ("accept_privacy", section.accept_privacy),
        ("accept_background_check", section.accept_background_check),
        ("declare_accurate", section.declare_accurate),
    ];
    for (field, accepted) in acknowledgements {
        if accepted != Some(true) {
            check.error(field, "must be accepted");
        }
    }
    check.required("signature_name", &section.signature_name);

    check.finish()
}
