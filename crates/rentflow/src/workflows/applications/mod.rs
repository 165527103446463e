//! Tenant applications: the multi-step wizard draft store, final submission, and the
//! manager review workflow guarded by a fixed status graph.

pub mod domain;
pub mod form;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{Application, ApplicationId, ApplicationStatus, ApplicationSummary};
pub use form::{ApplicationForm, DocumentCategory, DocumentDescriptor};
pub use repository::{
    ApplicationEvent, ApplicationEventKind, ApplicationEventPublisher, ApplicationRepository,
    EventError,
};
pub use router::application_router;
pub use service::{
    ApplicationService, ApplicationServiceError, DraftOutcome, DraftSubmission,
    StatusChangeRequest,
};
pub use transitions::{allowed_targets, can_transition, StatusTransitionGuard, TransitionError};
pub use wizard::{
    FieldError, StepResolution, StepValidator, WizardConfig, WizardStep, FINAL_STEP,
};
