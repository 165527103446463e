//! Fixed graph of allowed application status transitions.

use super::domain::ApplicationStatus;

use ApplicationStatus::*;

/// Statuses reachable from `from` in one step.
pub const fn allowed_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    match from {
        Draft => &[Submitted, Withdrawn, Archived],
        Submitted => &[UnderReview, Rejected, Withdrawn, Archived],
        UnderReview => &[VisitScheduled, Rejected, Withdrawn, Archived],
        VisitScheduled => &[VisitCompleted, Rejected, Withdrawn, Archived],
        VisitCompleted => &[Approved, Rejected, Withdrawn, Archived],
        Approved => &[Leased, Rejected, Withdrawn, Archived],
        Leased | Rejected | Withdrawn => &[Archived],
        Archived => &[],
    }
}

pub fn can_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    allowed_targets(from).contains(&to)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot transition application from {from} to {to}")]
    Illegal {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("status {0} cannot be set by a property manager")]
    NotManagerTarget(ApplicationStatus),
}

/// Guard consulted before any status mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusTransitionGuard;

impl StatusTransitionGuard {
    pub fn check(
        &self,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<(), TransitionError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(TransitionError::Illegal { from, to })
        }
    }

    /// Manager-initiated change: tenant-driven targets are refused outright.
    pub fn check_manager(
        &self,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<(), TransitionError> {
        if !to.is_manager_target() {
            return Err(TransitionError::NotManagerTarget(to));
        }
        self.check(from, to)
    }
}
