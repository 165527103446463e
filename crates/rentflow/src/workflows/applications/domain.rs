use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::UserId;
use crate::workflows::profiles::{ProfileSnapshot, TenantProfileId};
use crate::workflows::properties::PropertyId;

use super::form::ApplicationForm;

/// Identifier wrapper for applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review workflow status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    VisitScheduled,
    VisitCompleted,
    Approved,
    Leased,
    Rejected,
    Withdrawn,
    Archived,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::VisitScheduled => "visit_scheduled",
            ApplicationStatus::VisitCompleted => "visit_completed",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Leased => "leased",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Archived => "archived",
        }
    }

    /// Statuses a property manager may request; the rest are driven by the tenant.
    pub const fn is_manager_target(self) -> bool {
        !matches!(
            self,
            ApplicationStatus::Draft | ApplicationStatus::Submitted | ApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One tenant's application for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub property_id: PropertyId,
    pub tenant_profile_id: TenantProfileId,
    pub tenant_user_id: UserId,
    pub status: ApplicationStatus,
    pub current_step: u8,
    pub form: ApplicationForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ProfileSnapshot>,
    pub consented_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub visit_scheduled_for: Option<DateTime<Utc>>,
    pub status_note: Option<String>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn summary(&self) -> ApplicationSummary {
        let applicant_name = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.fields.display_name())
            .or_else(|| self.form.applicant_name());

        ApplicationSummary {
            application_id: self.id.clone(),
            property_id: self.property_id.clone(),
            status: self.status.label(),
            current_step: self.current_step,
            applicant_name,
            submitted_at: self.submitted_at,
        }
    }
}

/// Listing row shown to managers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummary {
    pub application_id: ApplicationId,
    pub property_id: PropertyId,
    pub status: &'static str,
    pub current_step: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}
