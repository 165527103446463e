use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::actor::UserId;
use crate::workflows::properties::{Property, PropertyId, PropertyRepository};
use crate::workflows::store::{is_email, system_clock, Clock, IdSequence, RepositoryError};

use super::domain::{normalize_email, Lead, LeadId, LeadInvite, LeadStatus};
use super::import::parse_invites;
use super::repository::LeadRepository;

static LEAD_SEQUENCE: IdSequence = IdSequence::new("lead");

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub imported: Vec<Lead>,
    /// Rows without an e-mail plus e-mails already known for the property.
    pub skipped: usize,
}

/// Lead tracking for property managers.
pub struct LeadService<R> {
    repository: Arc<R>,
    properties: Arc<dyn PropertyRepository>,
    clock: Clock,
}

impl<R> LeadService<R>
where
    R: LeadRepository + 'static,
{
    pub fn new(repository: Arc<R>, properties: Arc<dyn PropertyRepository>) -> Self {
        Self {
            repository,
            properties,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn invite(
        &self,
        manager: &UserId,
        property_id: &PropertyId,
        invite: LeadInvite,
    ) -> Result<Lead, LeadServiceError> {
        self.owned_property(manager, property_id)?;
        let email = normalize_email(&invite.email);
        if self
            .repository
            .find_by_email(property_id, &email)?
            .is_some()
        {
            return Err(LeadServiceError::Duplicate(email));
        }

        let lead = self.build(property_id, invite)?;
        let stored = self.repository.insert(lead)?;
        info!(lead_id = %stored.id, property_id = %property_id, "lead invited");
        Ok(stored)
    }

    pub fn list_for_property(
        &self,
        manager: &UserId,
        property_id: &PropertyId,
    ) -> Result<Vec<Lead>, LeadServiceError> {
        self.owned_property(manager, property_id)?;
        let mut leads = self.repository.list_for_property(property_id)?;
        leads.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(leads)
    }

    pub fn get(&self, manager: &UserId, lead_id: &LeadId) -> Result<Lead, LeadServiceError> {
        let lead = self
            .repository
            .fetch(lead_id)?
            .ok_or(LeadServiceError::NotFound)?;
        self.owned_property(manager, &lead.property_id)?;
        Ok(lead)
    }

    /// Move a lead forward through the funnel. Re-applying the current status is a no-op.
    pub fn advance(
        &self,
        manager: &UserId,
        lead_id: &LeadId,
        status: LeadStatus,
    ) -> Result<Lead, LeadServiceError> {
        let mut lead = self.get(manager, lead_id)?;
        if lead.status == status {
            return Ok(lead);
        }
        if !lead.status.can_advance_to(status) {
            return Err(LeadServiceError::Backward {
                from: lead.status,
                to: status,
            });
        }

        lead.status = status;
        lead.updated_at = (self.clock)();
        self.repository.update(lead.clone())?;
        info!(lead_id = %lead.id, status = %status, "lead advanced");
        Ok(lead)
    }

    pub fn import_csv(
        &self,
        manager: &UserId,
        property_id: &PropertyId,
        csv: &str,
    ) -> Result<ImportSummary, LeadServiceError> {
        self.owned_property(manager, property_id)?;
        let parsed = parse_invites(csv.as_bytes())?;

        let mut seen: HashSet<String> = self
            .repository
            .list_for_property(property_id)?
            .into_iter()
            .map(|lead| lead.email)
            .collect();
        let mut summary = ImportSummary {
            imported: Vec::new(),
            skipped: parsed.skipped,
        };

        for invite in parsed.invites {
            if !seen.insert(normalize_email(&invite.email)) {
                summary.skipped += 1;
                continue;
            }
            match self.build(property_id, invite) {
                Ok(lead) => summary.imported.push(self.repository.insert(lead)?),
                Err(LeadServiceError::InvalidLead(reason)) => {
                    debug!(reason, "skipping imported lead");
                    summary.skipped += 1;
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            property_id = %property_id,
            imported = summary.imported.len(),
            skipped = summary.skipped,
            "lead import finished"
        );
        Ok(summary)
    }

    /// Pull a matching lead forward when the applicant reaches `reached`; never moves back.
    pub fn record_application_progress(
        &self,
        property_id: &PropertyId,
        email: &str,
        reached: LeadStatus,
    ) -> Result<Option<Lead>, LeadServiceError> {
        let Some(mut lead) = self
            .repository
            .find_by_email(property_id, &normalize_email(email))?
        else {
            return Ok(None);
        };
        if reached == LeadStatus::Archived || !lead.status.can_advance_to(reached) {
            return Ok(None);
        }

        lead.status = reached;
        lead.updated_at = (self.clock)();
        self.repository.update(lead.clone())?;
        debug!(lead_id = %lead.id, status = %reached, "lead synced from application");
        Ok(Some(lead))
    }

    fn build(&self, property_id: &PropertyId, invite: LeadInvite) -> Result<Lead, LeadServiceError> {
        let email = normalize_email(&invite.email);
        if !is_email(&email) {
            return Err(LeadServiceError::InvalidLead("email must be an e-mail address"));
        }
        let name = match invite.name.trim() {
            "" => email.clone(),
            name => name.to_string(),
        };

        let now = (self.clock)();
        Ok(Lead {
            id: LeadId(LEAD_SEQUENCE.next_id()),
            property_id: property_id.clone(),
            name,
            email,
            phone: trimmed(invite.phone),
            source: trimmed(invite.source),
            status: LeadStatus::Invited,
            created_at: now,
            updated_at: now,
        })
    }

    fn owned_property(
        &self,
        manager: &UserId,
        property_id: &PropertyId,
    ) -> Result<Property, LeadServiceError> {
        let property = self
            .properties
            .fetch(property_id)?
            .ok_or(LeadServiceError::PropertyNotFound)?;
        if !property.is_managed_by(manager) {
            return Err(LeadServiceError::Forbidden);
        }
        Ok(property)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error("lead not found")]
    NotFound,
    #[error("property not found")]
    PropertyNotFound,
    #[error("not permitted to manage leads for this property")]
    Forbidden,
    #[error("invalid lead: {0}")]
    InvalidLead(&'static str),
    #[error("a lead with e-mail {0} already exists for this property")]
    Duplicate(String),
    #[error("lead status cannot move from {from} back to {to}")]
    Backward { from: LeadStatus, to: LeadStatus },
    #[error("invalid lead CSV: {0}")]
    Import(#[from] csv::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
