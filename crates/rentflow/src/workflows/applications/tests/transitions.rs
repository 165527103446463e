use crate::workflows::applications::{
    allowed_targets, can_transition, ApplicationStatus, StatusTransitionGuard, TransitionError,
};

use ApplicationStatus::*;

const ALL: [ApplicationStatus; 10] = [
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
];

#[test]
fn submitted_cannot_jump_to_approved() {
    let guard = StatusTransitionGuard;
    let error = guard
        .check_manager(Submitted, Approved)
        .expect_err("skipping review is illegal");

    assert_eq!(
        error,
        TransitionError::Illegal {
            from: Submitted,
            to: Approved
        }
    );
    assert_eq!(
        error.to_string(),
        "cannot transition application from submitted to approved"
    );
}

#[test]
fn review_chain_only_succeeds_in_order() {
    let chain = [Submitted, UnderReview, VisitScheduled, VisitCompleted, Approved];
    for pair in chain.windows(2) {
        assert!(can_transition(pair[0], pair[1]), "{} -> {}", pair[0], pair[1]);
    }

    for (index, from) in chain.iter().enumerate() {
        for to in chain.iter().skip(index + 2) {
            assert!(!can_transition(*from, *to), "{from} -> {to} should be refused");
        }
        for to in chain.iter().take(index) {
            assert!(!can_transition(*from, *to), "{from} -> {to} moves backward");
        }
    }
}

#[test]
fn no_status_transitions_to_itself() {
    for status in ALL {
        assert!(!can_transition(status, status), "{status} self-transition");
    }
}

#[test]
fn archived_is_terminal_and_reachable_from_everything_else() {
    assert!(allowed_targets(Archived).is_empty());
    for status in ALL.into_iter().filter(|status| *status != Archived) {
        assert!(can_transition(status, Archived), "{status} -> archived");
    }
}

#[test]
fn closed_outcomes_only_archive() {
    for status in [Leased, Rejected, Withdrawn] {
        assert_eq!(allowed_targets(status), &[Archived]);
    }
    assert!(can_transition(Approved, Leased));
    assert!(!can_transition(VisitCompleted, Leased));
}

#[test]
fn managers_cannot_request_tenant_driven_statuses() {
    let guard = StatusTransitionGuard;
    for target in [Draft, Submitted, Withdrawn] {
        assert_eq!(
            guard.check_manager(UnderReview, target),
            Err(TransitionError::NotManagerTarget(target))
        );
    }
    assert_eq!(guard.check(UnderReview, Withdrawn), Ok(()));
    assert_eq!(guard.check_manager(UnderReview, Rejected), Ok(()));
}
