//! Wizard field set bound to the application row.
//!
//! Sections are flattened so the wire format stays a single flat object of field name to
//! value. Every field is optional; a save only overwrites what it carries, which lets the
//! client post one step at a time without erasing the others.

use serde::{Deserialize, Serialize};

use crate::workflows::profiles::domain::overlay;
use crate::workflows::profiles::ProfileFields;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    #[serde(flatten)]
    pub identity: IdentitySection,
    #[serde(flatten)]
    pub household: HouseholdSection,
    #[serde(flatten)]
    pub financial: FinancialSection,
    #[serde(flatten)]
    pub support: SupportSection,
    #[serde(flatten)]
    pub history: HistorySection,
    #[serde(flatten)]
    pub documents: DocumentsSection,
    #[serde(flatten)]
    pub consent: ConsentSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySection {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<String>,
    pub id_document_type: Option<String>,
    pub id_document_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdSection {
    pub desired_move_in: Option<String>,
    pub lease_term_months: Option<u32>,
    pub occupants: Option<Vec<Occupant>>,
    pub has_pets: Option<bool>,
    pub pets: Option<Vec<Pet>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Occupant {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pet {
    pub kind: Option<String>,
    pub breed: Option<String>,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialSection {
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub employment_start_date: Option<String>,
    /// Minor currency units.
    pub monthly_income: Option<i64>,
    pub income_currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportSection {
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub has_guarantor: Option<bool>,
    pub guarantor: Option<Guarantor>,
    pub co_signers: Option<Vec<CoSigner>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guarantor {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub monthly_income: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoSigner {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    pub current_address: Option<String>,
    pub current_city: Option<String>,
    pub current_postal_code: Option<String>,
    pub current_country: Option<String>,
    pub living_situation: Option<String>,
    pub current_landlord_name: Option<String>,
    pub current_landlord_contact: Option<String>,
    pub references: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsSection {
    pub documents: Option<Vec<DocumentDescriptor>>,
}

/// Metadata for an uploaded file; the bytes live in object storage under `storage_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub category: DocumentCategory,
    pub file_name: String,
    #[serde(default)]
    pub storage_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Identification,
    IncomeProof,
    ReferenceLetter,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentSection {
    pub accept_terms: Option<bool>,
    pub accept_privacy: Option<bool>,
    pub accept_background_check: Option<bool>,
    pub declare_accurate: Option<bool>,
    pub signature_name: Option<String>,
}

impl ApplicationForm {
    /// Initial draft contents copied from the tenant's reusable profile.
    pub fn seeded_from(profile: &ProfileFields) -> Self {
        let mut form = Self::default();
        form.identity.first_name = profile.first_name.clone();
        form.identity.last_name = profile.last_name.clone();
        form.identity.email = profile.email.clone();
        form.identity.phone = profile.phone.clone();
        form.identity.nationality = profile.nationality.clone();
        form.identity.date_of_birth = profile.date_of_birth.clone();
        form.financial.employment_status = profile.employment_status.clone();
        form.financial.employer_name = profile.employer_name.clone();
        form.financial.job_title = profile.job_title.clone();
        form.financial.monthly_income = profile.monthly_income;
        form.financial.income_currency = profile.income_currency.clone();
        form.history.current_address = profile.current_address.clone();
        form.history.current_city = profile.current_city.clone();
        form.history.current_postal_code = profile.current_postal_code.clone();
        form.history.current_country = profile.current_country.clone();
        form
    }

    /// Overwrite stored values with every field present in `update`.
    pub fn merge(&mut self, update: ApplicationForm) {
        let ApplicationForm {
            identity,
            household,
            financial,
            support,
            history,
            documents,
            consent,
        } = update;

        overlay(&mut self.identity.first_name, identity.first_name);
        overlay(&mut self.identity.last_name, identity.last_name);
        overlay(&mut self.identity.email, identity.email);
        overlay(&mut self.identity.phone, identity.phone);
        overlay(&mut self.identity.nationality, identity.nationality);
        overlay(&mut self.identity.date_of_birth, identity.date_of_birth);
        overlay(&mut self.identity.id_document_type, identity.id_document_type);
        overlay(&mut self.identity.id_document_number, identity.id_document_number);

        overlay(&mut self.household.desired_move_in, household.desired_move_in);
        overlay(&mut self.household.lease_term_months, household.lease_term_months);
        overlay(&mut self.household.occupants, household.occupants);
        overlay(&mut self.household.has_pets, household.has_pets);
        overlay(&mut self.household.pets, household.pets);

        overlay(&mut self.financial.employment_status, financial.employment_status);
        overlay(&mut self.financial.employer_name, financial.employer_name);
        overlay(&mut self.financial.job_title, financial.job_title);
        overlay(
            &mut self.financial.employment_start_date,
            financial.employment_start_date,
        );
        overlay(&mut self.financial.monthly_income, financial.monthly_income);
        overlay(&mut self.financial.income_currency, financial.income_currency);

        overlay(
            &mut self.support.emergency_contact_name,
            support.emergency_contact_name,
        );
        overlay(
            &mut self.support.emergency_contact_phone,
            support.emergency_contact_phone,
        );
        overlay(&mut self.support.has_guarantor, support.has_guarantor);
        overlay(&mut self.support.guarantor, support.guarantor);
        overlay(&mut self.support.co_signers, support.co_signers);

        overlay(&mut self.history.current_address, history.current_address);
        overlay(&mut self.history.current_city, history.current_city);
        overlay(&mut self.history.current_postal_code, history.current_postal_code);
        overlay(&mut self.history.current_country, history.current_country);
        overlay(&mut self.history.living_situation, history.living_situation);
        overlay(
            &mut self.history.current_landlord_name,
            history.current_landlord_name,
        );
        overlay(
            &mut self.history.current_landlord_contact,
            history.current_landlord_contact,
        );
        overlay(&mut self.history.references, history.references);

        overlay(&mut self.documents.documents, documents.documents);

        overlay(&mut self.consent.accept_terms, consent.accept_terms);
        overlay(&mut self.consent.accept_privacy, consent.accept_privacy);
        overlay(
            &mut self.consent.accept_background_check,
            consent.accept_background_check,
        );
        overlay(&mut self.consent.declare_accurate, consent.declare_accurate);
        overlay(&mut self.consent.signature_name, consent.signature_name);
    }

    pub fn applicant_name(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.identity.first_name.as_deref(),
            self.identity.last_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Normalized contact e-mail, used to match the applicant against leads.
    pub fn contact_email(&self) -> Option<String> {
        self.identity
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_ascii_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_flat_payload_into_sections() {
        let form: ApplicationForm = serde_json::from_value(json!({
            "first_name": "Ada",
            "nationality": "",
            "lease_term_months": 12,
            "pets": [{ "kind": "cat" }],
            "documents": [{ "category": "identification", "file_name": "passport.pdf" }],
            "accept_terms": true
        }))
        .expect("flat payload parses");

        assert_eq!(form.identity.first_name.as_deref(), Some("Ada"));
        assert_eq!(form.identity.nationality.as_deref(), Some(""));
        assert_eq!(form.household.lease_term_months, Some(12));
        assert_eq!(form.household.pets.as_ref().map(Vec::len), Some(1));
        assert_eq!(form.consent.accept_terms, Some(true));
        assert!(form.financial.employment_status.is_none());
    }

    #[test]
    fn merge_overwrites_present_fields_only() {
        let mut stored = ApplicationForm::default();
        stored.identity.first_name = Some("Ada".to_string());
        stored.identity.nationality = Some("IE".to_string());
        stored.household.occupants = Some(vec![Occupant::default()]);

        let mut update = ApplicationForm::default();
        update.identity.nationality = Some(" ".to_string());
        update.household.occupants = Some(Vec::new());

        stored.merge(update);

        assert_eq!(stored.identity.first_name.as_deref(), Some("Ada"));
        assert_eq!(stored.identity.nationality.as_deref(), Some(" "));
        assert_eq!(stored.household.occupants, Some(Vec::new()));
    }

    #[test]
    fn seeding_copies_profile_identity_and_finances() {
        let profile = ProfileFields {
            first_name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            monthly_income: Some(350_000),
            current_city: Some("Cork".to_string()),
            ..ProfileFields::default()
        };

        let form = ApplicationForm::seeded_from(&profile);

        assert_eq!(form.identity.first_name.as_deref(), Some("Ada"));
        assert_eq!(form.financial.monthly_income, Some(350_000));
        assert_eq!(form.history.current_city.as_deref(), Some("Cork"));
        assert_eq!(form.contact_email().as_deref(), Some("ada@example.com"));
        assert!(form.consent.accept_terms.is_none());
    }
}
