use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantProfileId(pub String);

impl fmt::Display for TenantProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile columns a tenant maintains once and reuses across applications.
///
/// Every field is optional: an update only overwrites the fields it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<String>,
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub monthly_income: Option<i64>,
    pub income_currency: Option<String>,
    pub current_address: Option<String>,
    pub current_city: Option<String>,
    pub current_postal_code: Option<String>,
    pub current_country: Option<String>,
}

impl ProfileFields {
    pub fn merge(&mut self, update: ProfileFields) {
        let ProfileFields {
            first_name,
            last_name,
            email,
            phone,
            nationality,
            date_of_birth,
            employment_status,
            employer_name,
            job_title,
            monthly_income,
            income_currency,
            current_address,
            current_city,
            current_postal_code,
            current_country,
        } = update;

        overlay(&mut self.first_name, first_name);
        overlay(&mut self.last_name, last_name);
        overlay(&mut self.email, email);
        overlay(&mut self.phone, phone);
        overlay(&mut self.nationality, nationality);
        overlay(&mut self.date_of_birth, date_of_birth);
        overlay(&mut self.employment_status, employment_status);
        overlay(&mut self.employer_name, employer_name);
        overlay(&mut self.job_title, job_title);
        overlay(&mut self.monthly_income, monthly_income);
        overlay(&mut self.income_currency, income_currency);
        overlay(&mut self.current_address, current_address);
        overlay(&mut self.current_city, current_city);
        overlay(&mut self.current_postal_code, current_postal_code);
        overlay(&mut self.current_country, current_country);
    }

    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
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
}

/// Replace `slot` when the incoming value was supplied.
pub(crate) fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    pub id: TenantProfileId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantProfile {
    /// Freeze the current profile columns for an application being submitted.
    pub fn snapshot(&self, captured_at: DateTime<Utc>) -> ProfileSnapshot {
        ProfileSnapshot {
            profile_id: self.id.clone(),
            fields: self.fields.clone(),
            captured_at,
        }
    }
}

/// Copy of a tenant profile stored on a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub profile_id: TenantProfileId,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub captured_at: DateTime<Utc>,
}
