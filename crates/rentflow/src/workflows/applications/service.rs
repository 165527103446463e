use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actor::UserId;
use crate::workflows::profiles::{ensure_profile, ProfileRepository, TenantProfile};
use crate::workflows::properties::{Property, PropertyId, PropertyRepository, PropertyStatus};
use crate::workflows::store::{system_clock, Clock, IdSequence, RepositoryError};

use super::domain::{Application, ApplicationId, ApplicationStatus, ApplicationSummary};
use super::form::ApplicationForm;
use super::repository::{
    ApplicationEvent, ApplicationEventKind, ApplicationEventPublisher, ApplicationRepository,
    EventError,
};
use super::transitions::{StatusTransitionGuard, TransitionError};
use super::wizard::{FieldError, StepResolution, StepValidator, WizardConfig, FINAL_STEP};

static APPLICATION_SEQUENCE: IdSequence = IdSequence::new("app");

/// Body of a wizard save: the step the client wants to reach plus any form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftSubmission {
    #[serde(default)]
    pub current_step: u8,
    #[serde(flatten)]
    pub form: ApplicationForm,
}

/// Stored draft plus the field errors the client should render.
#[derive(Debug, Clone, Serialize)]
pub struct DraftOutcome {
    pub application: Application,
    pub errors: Vec<FieldError>,
    #[serde(skip)]
    pub created: bool,
}

/// Manager request to move an application through review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub visit_scheduled_for: Option<DateTime<Utc>>,
}

impl StatusChangeRequest {
    pub fn to(status: ApplicationStatus) -> Self {
        Self {
            status,
            note: None,
            visit_scheduled_for: None,
        }
    }
}

/// Service composing the draft store, step validator, and status transition guard.
pub struct ApplicationService<R, E> {
    repository: Arc<R>,
    events: Arc<E>,
    properties: Arc<dyn PropertyRepository>,
    profiles: Arc<dyn ProfileRepository>,
    validator: StepValidator,
    guard: StatusTransitionGuard,
    clock: Clock,
}

impl<R, E> ApplicationService<R, E>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        events: Arc<E>,
        properties: Arc<dyn PropertyRepository>,
        profiles: Arc<dyn ProfileRepository>,
        config: WizardConfig,
    ) -> Self {
        Self {
            repository,
            events,
            properties,
            profiles,
            validator: StepValidator::new(config),
            guard: StatusTransitionGuard,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Upsert the acting tenant's draft for a property and recompute its wizard step.
    pub fn save_draft(
        &self,
        tenant: &UserId,
        property_id: &PropertyId,
        submission: DraftSubmission,
    ) -> Result<DraftOutcome, ApplicationServiceError> {
        let (outcome, _) = self.store_draft(tenant, property_id, submission)?;

        let kind = if outcome.created {
            ApplicationEventKind::DraftStarted
        } else {
            ApplicationEventKind::DraftSaved
        };
        self.events.publish(
            ApplicationEvent::for_application(kind, &outcome.application)
                .with_detail("current_step", outcome.application.current_step.to_string()),
        )?;

        Ok(outcome)
    }

    /// Final submission. Incomplete data stays stored as a draft and is reported back.
    pub fn submit(
        &self,
        tenant: &UserId,
        property_id: &PropertyId,
        form: ApplicationForm,
    ) -> Result<Application, ApplicationServiceError> {
        let submission = DraftSubmission {
            current_step: FINAL_STEP,
            form,
        };
        let (outcome, profile) = self.store_draft(tenant, property_id, submission)?;
        let DraftOutcome {
            mut application,
            errors,
            created,
        } = outcome;

        if created {
            self.events.publish(ApplicationEvent::for_application(
                ApplicationEventKind::DraftStarted,
                &application,
            ))?;
        }

        if application.current_step < FINAL_STEP {
            debug!(
                application_id = %application.id,
                current_step = application.current_step,
                errors = errors.len(),
                "submission incomplete"
            );
            return Err(ApplicationServiceError::Validation { errors });
        }

        self.guard
            .check(application.status, ApplicationStatus::Submitted)?;

        let now = (self.clock)();
        application.status = ApplicationStatus::Submitted;
        application.snapshot = Some(profile.snapshot(now));
        application.submitted_at = Some(now);
        application.consented_at = Some(now);
        application.updated_at = now;
        self.repository.update(application.clone())?;

        info!(
            application_id = %application.id,
            property_id = %application.property_id,
            "application submitted"
        );
        self.events.publish(ApplicationEvent::for_application(
            ApplicationEventKind::Submitted,
            &application,
        ))?;

        Ok(application)
    }

    /// Manager read; the manager must own the application's property.
    pub fn get_for_manager(
        &self,
        manager: &UserId,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        self.load_for_review(manager, application_id)
    }

    /// The acting tenant's own application for a property.
    pub fn get_for_tenant(
        &self,
        tenant: &UserId,
        property_id: &PropertyId,
    ) -> Result<Application, ApplicationServiceError> {
        let profile = self
            .profiles
            .fetch_for_user(tenant)?
            .ok_or(ApplicationServiceError::NotFound)?;
        self.repository
            .find_for(&profile.id, property_id)?
            .ok_or(ApplicationServiceError::NotFound)
    }

    /// Submitted applications for a managed property, oldest submission first.
    pub fn list_for_property(
        &self,
        manager: &UserId,
        property_id: &PropertyId,
    ) -> Result<Vec<ApplicationSummary>, ApplicationServiceError> {
        let property = self
            .properties
            .fetch(property_id)?
            .ok_or(ApplicationServiceError::PropertyNotFound)?;
        if !property.is_managed_by(manager) {
            warn!(property_id = %property_id, manager = %manager, "application listing refused");
            return Err(ApplicationServiceError::Forbidden);
        }

        let mut applications: Vec<Application> = self
            .repository
            .list_for_property(property_id)?
            .into_iter()
            .filter(|application| application.status != ApplicationStatus::Draft)
            .collect();
        applications.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(applications.iter().map(Application::summary).collect())
    }

    /// Manager status change, checked against the transition table.
    pub fn transition_status(
        &self,
        manager: &UserId,
        application_id: &ApplicationId,
        request: StatusChangeRequest,
    ) -> Result<Application, ApplicationServiceError> {
        let mut application = self.load_for_review(manager, application_id)?;
        let from = application.status;
        self.guard.check_manager(from, request.status)?;

        let now = (self.clock)();
        application.status = request.status;
        application.updated_at = now;
        if let Some(note) = request.note.filter(|note| !note.trim().is_empty()) {
            application.status_note = Some(note);
        }
        match request.status {
            ApplicationStatus::VisitScheduled => {
                application.visit_scheduled_for = request.visit_scheduled_for;
            }
            ApplicationStatus::Archived => application.archived_at = Some(now),
            _ => {}
        }

        let vacated = match request.status {
            ApplicationStatus::Leased => Some(self.lease_property(&application.property_id, now)?),
            _ => None,
        };
        if let Err(err) = self.repository.update(application.clone()) {
            if let Some(previous) = vacated {
                self.restore_property(previous);
            }
            return Err(err.into());
        }

        info!(
            application_id = %application.id,
            from = %from,
            to = %application.status,
            "application status changed"
        );
        self.events.publish(
            ApplicationEvent::for_application(ApplicationEventKind::StatusChanged, &application)
                .with_detail("from", from.label()),
        )?;

        Ok(application)
    }

    /// Tenant-initiated withdrawal of their own application.
    pub fn withdraw(
        &self,
        tenant: &UserId,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        let mut application = self
            .repository
            .fetch(application_id)?
            .ok_or(ApplicationServiceError::NotFound)?;
        if &application.tenant_user_id != tenant {
            warn!(application_id = %application_id, user = %tenant, "withdrawal refused");
            return Err(ApplicationServiceError::Forbidden);
        }

        self.guard
            .check(application.status, ApplicationStatus::Withdrawn)?;

        application.status = ApplicationStatus::Withdrawn;
        application.updated_at = (self.clock)();
        self.repository.update(application.clone())?;

        info!(application_id = %application.id, "application withdrawn");
        self.events.publish(ApplicationEvent::for_application(
            ApplicationEventKind::Withdrawn,
            &application,
        ))?;

        Ok(application)
    }

    fn store_draft(
        &self,
        tenant: &UserId,
        property_id: &PropertyId,
        submission: DraftSubmission,
    ) -> Result<(DraftOutcome, TenantProfile), ApplicationServiceError> {
        let property = self
            .properties
            .fetch(property_id)?
            .ok_or(ApplicationServiceError::PropertyNotFound)?;
        if !property.status.accepts_applications() {
            return Err(ApplicationServiceError::PropertyClosed(property.status));
        }

        let now = (self.clock)();
        let profile = ensure_profile(self.profiles.as_ref(), tenant, now)?;

        let (application, resolution, created) =
            match self.repository.find_for(&profile.id, property_id)? {
                Some(existing) => {
                    let (application, resolution) = self.update_draft(existing, &submission, now)?;
                    (application, resolution, false)
                }
                None => {
                    let mut fresh = Application {
                        id: ApplicationId(APPLICATION_SEQUENCE.next_id()),
                        property_id: property_id.clone(),
                        tenant_profile_id: profile.id.clone(),
                        tenant_user_id: tenant.clone(),
                        status: ApplicationStatus::Draft,
                        current_step: 0,
                        form: ApplicationForm::seeded_from(&profile.fields),
                        snapshot: None,
                        consented_at: None,
                        submitted_at: None,
                        visit_scheduled_for: None,
                        status_note: None,
                        archived_at: None,
                        created_at: now,
                        updated_at: now,
                    };
                    let resolution = self.apply_submission(&mut fresh, &submission, now);
                    match self.repository.insert(fresh) {
                        Ok(stored) => (stored, resolution, true),
                        // Lost the race against another first save for the same pair.
                        Err(RepositoryError::Conflict) => {
                            let existing = self
                                .repository
                                .find_for(&profile.id, property_id)?
                                .ok_or(RepositoryError::Conflict)?;
                            debug!(application_id = %existing.id, "first save raced; updating stored draft");
                            let (application, resolution) =
                                self.update_draft(existing, &submission, now)?;
                            (application, resolution, false)
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
            };

        debug!(
            application_id = %application.id,
            requested_step = submission.current_step,
            current_step = application.current_step,
            "draft stored"
        );

        Ok((
            DraftOutcome {
                application,
                errors: resolution.errors,
                created,
            },
            profile,
        ))
    }

    fn update_draft(
        &self,
        mut application: Application,
        submission: &DraftSubmission,
        now: DateTime<Utc>,
    ) -> Result<(Application, StepResolution), ApplicationServiceError> {
        if application.status != ApplicationStatus::Draft {
            return Err(ApplicationServiceError::NotEditable(application.status));
        }
        let resolution = self.apply_submission(&mut application, submission, now);
        self.repository.update(application.clone())?;
        Ok((application, resolution))
    }

    fn apply_submission(
        &self,
        application: &mut Application,
        submission: &DraftSubmission,
        now: DateTime<Utc>,
    ) -> StepResolution {
        application.form.merge(submission.form.clone());
        let resolution =
            self.validator
                .resolve(&application.form, submission.current_step, now.date_naive());
        application.current_step = resolution.current_step;
        application.updated_at = now;
        resolution
    }

    /// Manager access to a row on the review path; drafts stay private to the tenant.
    fn load_for_review(
        &self,
        manager: &UserId,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        let application = self.load_for_manager(manager, application_id)?;
        if application.status == ApplicationStatus::Draft {
            return Err(ApplicationServiceError::NotFound);
        }
        Ok(application)
    }

    fn load_for_manager(
        &self,
        manager: &UserId,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(ApplicationServiceError::NotFound)?;
        let property = self
            .properties
            .fetch(&application.property_id)?
            .ok_or(ApplicationServiceError::PropertyNotFound)?;
        if !property.is_managed_by(manager) {
            warn!(application_id = %application_id, manager = %manager, "application access refused");
            return Err(ApplicationServiceError::Forbidden);
        }
        Ok(application)
    }

    /// Marks the property leased and hands back its previous state.
    fn lease_property(
        &self,
        property_id: &PropertyId,
        now: DateTime<Utc>,
    ) -> Result<Property, ApplicationServiceError> {
        let previous = self
            .properties
            .fetch(property_id)?
            .ok_or(ApplicationServiceError::PropertyNotFound)?;
        if previous.status == PropertyStatus::Leased {
            return Err(ApplicationServiceError::PropertyLeased);
        }

        let mut property = previous.clone();
        property.status = PropertyStatus::Leased;
        property.updated_at = now;
        self.properties.update(property)?;
        info!(property_id = %property_id, "property marked leased");
        Ok(previous)
    }

    fn restore_property(&self, previous: Property) {
        let property_id = previous.id.clone();
        match self.properties.update(previous) {
            Ok(()) => warn!(property_id = %property_id, "lease rolled back"),
            Err(err) => {
                warn!(property_id = %property_id, error = %err, "lease rollback failed")
            }
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("application is incomplete: {} field error(s)", .errors.len())]
    Validation { errors: Vec<FieldError> },
    #[error("application not found")]
    NotFound,
    #[error("property not found")]
    PropertyNotFound,
    #[error("property is {0} and not accepting applications")]
    PropertyClosed(PropertyStatus),
    #[error("property is already leased")]
    PropertyLeased,
    #[error("application is {0} and can no longer be edited")]
    NotEditable(ApplicationStatus),
    #[error("not permitted to act on this application")]
    Forbidden,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Events(#[from] EventError),
}
