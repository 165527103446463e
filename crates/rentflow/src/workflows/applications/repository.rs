use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::workflows::profiles::TenantProfileId;
use crate::workflows::properties::PropertyId;
use crate::workflows::store::RepositoryError;

use super::domain::{Application, ApplicationId, ApplicationStatus};

/// Storage abstraction for application rows.
///
/// At most one application exists per (tenant profile, property) pair; `insert` reports
/// [`RepositoryError::Conflict`] when the pair or the id is already taken.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn find_for(
        &self,
        profile: &TenantProfileId,
        property: &PropertyId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Application>, RepositoryError>;
}

/// Outbound hook for application lifecycle events (lead tracking, notifications).
pub trait ApplicationEventPublisher: Send + Sync {
    fn publish(&self, event: ApplicationEvent) -> Result<(), EventError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationEventKind {
    DraftStarted,
    DraftSaved,
    Submitted,
    StatusChanged,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub kind: ApplicationEventKind,
    pub application_id: ApplicationId,
    pub property_id: PropertyId,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_email: Option<String>,
    pub details: BTreeMap<String, String>,
}

impl ApplicationEvent {
    pub fn for_application(kind: ApplicationEventKind, application: &Application) -> Self {
        Self {
            kind,
            application_id: application.id.clone(),
            property_id: application.property_id.clone(),
            status: application.status,
            applicant_email: application.form.contact_email(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
