//! Prospective applicants tracked per property before (and alongside) an application.

pub mod domain;
mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod sync;

pub use domain::{Lead, LeadId, LeadInvite, LeadStatus};
pub use repository::LeadRepository;
pub use router::lead_router;
pub use service::{ImportSummary, LeadService, LeadServiceError};
pub use sync::LeadApplicationSync;
