use std::sync::Arc;

use tracing::debug;

use crate::workflows::applications::{
    ApplicationEvent, ApplicationEventKind, ApplicationEventPublisher, EventError,
};

use super::domain::LeadStatus;
use super::repository::LeadRepository;
use super::service::LeadService;

/// Application event sink that keeps the matching lead's funnel status in step.
pub struct LeadApplicationSync<R> {
    leads: Arc<LeadService<R>>,
}

impl<R> LeadApplicationSync<R>
where
    R: LeadRepository + 'static,
{
    pub fn new(leads: Arc<LeadService<R>>) -> Self {
        Self { leads }
    }
}

impl<R> ApplicationEventPublisher for LeadApplicationSync<R>
where
    R: LeadRepository + 'static,
{
    fn publish(&self, event: ApplicationEvent) -> Result<(), EventError> {
        let reached = match event.kind {
            ApplicationEventKind::DraftStarted | ApplicationEventKind::DraftSaved => {
                LeadStatus::Drafting
            }
            ApplicationEventKind::Submitted => LeadStatus::Applied,
            _ => return Ok(()),
        };
        let Some(email) = event.applicant_email.as_deref() else {
            debug!(application_id = %event.application_id, "no applicant e-mail to match leads");
            return Ok(());
        };

        self.leads
            .record_application_progress(&event.property_id, email, reached)
            .map(|_| ())
            .map_err(|err| EventError::Transport(err.to_string()))
    }
}
