// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the abort cascade and the abort-and-redraft compound
//! operation. These cover the all-or-nothing guarantees.

use vergabe::Event;
use vergabe_domain::{AssignmentState, CandidatureState};

use crate::{Persistence, PersistenceError};

use super::helpers::{
    admin_actor, create_candidature_row, persist_in_state, test_audit_event, test_cause, test_now,
    test_persistence,
};

/// An active assignment with one editing, one submitted, and one revoked
/// candidature.
fn active_with_candidatures(persistence: &mut Persistence) -> (i64, i64, i64, i64) {
    let active = persist_in_state(persistence, AssignmentState::Active);
    let assignment_id = active.assignment_id.unwrap();

    let editing = create_candidature_row(persistence, assignment_id, "applicant-1");
    let submitted = create_candidature_row(persistence, assignment_id, "applicant-2");
    let revoked = create_candidature_row(persistence, assignment_id, "applicant-3");

    let mut s = submitted.clone();
    s.state = CandidatureState::Submitted;
    persistence
        .update_candidature_if_version(
            &s,
            submitted.version,
            &test_audit_event("SubmitCandidature", Some(assignment_id)),
            test_now(),
        )
        .unwrap();

    let mut r = revoked.clone();
    r.state = CandidatureState::Submitted;
    let v = persistence
        .update_candidature_if_version(
            &r,
            revoked.version,
            &test_audit_event("SubmitCandidature", Some(assignment_id)),
            test_now(),
        )
        .unwrap();
    r.state = CandidatureState::Revoked;
    persistence
        .update_candidature_if_version(
            &r,
            v,
            &test_audit_event("RevokeCandidature", Some(assignment_id)),
            test_now(),
        )
        .unwrap();

    (
        assignment_id,
        editing.candidature_id.unwrap(),
        submitted.candidature_id.unwrap(),
        revoked.candidature_id.unwrap(),
    )
}

#[test]
fn test_abort_rejects_exactly_the_open_candidatures() {
    let mut persistence = test_persistence();
    let (assignment_id, editing_id, submitted_id, revoked_id) =
        active_with_candidatures(&mut persistence);
    let assignment = persistence.get_assignment(assignment_id).unwrap();

    let result = vergabe::apply(
        &assignment,
        &Event::Abort,
        admin_actor(),
        test_cause(),
        test_now(),
    )
    .unwrap();
    let (_, rejected) = persistence
        .abort_assignment(
            &result.assignment,
            assignment.version,
            &result.audit_event,
            test_now(),
        )
        .unwrap();

    assert_eq!(rejected, 2);
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Aborted
    );
    assert_eq!(
        persistence.get_candidature(editing_id).unwrap().state,
        CandidatureState::Rejected
    );
    assert_eq!(
        persistence.get_candidature(submitted_id).unwrap().state,
        CandidatureState::Rejected
    );
    // Already-settled candidatures are untouched by the cascade.
    assert_eq!(
        persistence.get_candidature(revoked_id).unwrap().state,
        CandidatureState::Revoked
    );
}

#[test]
fn test_cascade_bumps_candidature_versions() {
    let mut persistence = test_persistence();
    let (assignment_id, editing_id, _, _) = active_with_candidatures(&mut persistence);
    let assignment = persistence.get_assignment(assignment_id).unwrap();
    let before = persistence.get_candidature(editing_id).unwrap();

    let result = vergabe::apply(
        &assignment,
        &Event::Abort,
        admin_actor(),
        test_cause(),
        test_now(),
    )
    .unwrap();
    persistence
        .abort_assignment(
            &result.assignment,
            assignment.version,
            &result.audit_event,
            test_now(),
        )
        .unwrap();

    let after = persistence.get_candidature(editing_id).unwrap();
    // Any in-flight candidate edit must lose its version race.
    assert_eq!(after.version, before.version + 1);
}

#[test]
fn test_aborting_with_stale_version_leaves_everything_unchanged() {
    let mut persistence = test_persistence();
    let (assignment_id, editing_id, submitted_id, _) = active_with_candidatures(&mut persistence);
    let assignment = persistence.get_assignment(assignment_id).unwrap();

    let result = vergabe::apply(
        &assignment,
        &Event::Abort,
        admin_actor(),
        test_cause(),
        test_now(),
    )
    .unwrap();
    let outcome = persistence.abort_assignment(
        &result.assignment,
        assignment.version + 7,
        &result.audit_event,
        test_now(),
    );

    assert!(matches!(
        outcome,
        Err(PersistenceError::StaleVersion { .. })
    ));
    // All-or-nothing: neither the assignment nor any candidature moved.
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Active
    );
    assert_eq!(
        persistence.get_candidature(editing_id).unwrap().state,
        CandidatureState::Editing
    );
    assert_eq!(
        persistence.get_candidature(submitted_id).unwrap().state,
        CandidatureState::Submitted
    );
}

#[test]
fn test_abort_and_redraft_is_one_unit() {
    let mut persistence = test_persistence();
    let (assignment_id, _, _, _) = active_with_candidatures(&mut persistence);
    let assignment = persistence.get_assignment(assignment_id).unwrap();

    let result = vergabe::apply(
        &assignment,
        &Event::AbortAndDraft,
        admin_actor(),
        test_cause(),
        test_now(),
    )
    .unwrap();
    let fork = result.forked_draft.unwrap();
    let (_, rejected, fork_id) = persistence
        .abort_and_redraft(
            &result.assignment,
            assignment.version,
            &fork,
            &result.audit_event,
            &test_audit_event("CreateDraft", None),
            test_now(),
        )
        .unwrap();

    assert_eq!(rejected, 2);

    let original = persistence.get_assignment(assignment_id).unwrap();
    assert_eq!(original.state, AssignmentState::Aborted);
    // The aborted original keeps its window timestamps.
    assert!(original.window.is_some());

    let redraft = persistence.get_assignment(fork_id).unwrap();
    assert_eq!(redraft.state, AssignmentState::Draft);
    assert_eq!(redraft.window, None);
    assert!(redraft.parcels.is_empty());
    assert_eq!(redraft.details, assignment.details);
    assert_eq!(redraft.questions, assignment.questions);
    assert_eq!(redraft.attachments, assignment.attachments);

    // The creation audit event is scoped to the fresh draft.
    let fork_timeline = persistence.get_audit_timeline(fork_id).unwrap();
    assert_eq!(fork_timeline.len(), 1);
    assert_eq!(fork_timeline[0].action.name, "CreateDraft");
}

#[test]
fn test_abort_and_redraft_with_stale_version_creates_no_draft() {
    let mut persistence = test_persistence();
    let (assignment_id, _, _, _) = active_with_candidatures(&mut persistence);
    let assignment = persistence.get_assignment(assignment_id).unwrap();
    let assignments_before = persistence.list_assignments().unwrap().len();

    let result = vergabe::apply(
        &assignment,
        &Event::AbortAndDraft,
        admin_actor(),
        test_cause(),
        test_now(),
    )
    .unwrap();
    let fork = result.forked_draft.unwrap();
    let outcome = persistence.abort_and_redraft(
        &result.assignment,
        assignment.version + 1,
        &fork,
        &result.audit_event,
        &test_audit_event("CreateDraft", None),
        test_now(),
    );

    assert!(matches!(
        outcome,
        Err(PersistenceError::StaleVersion { .. })
    ));
    // No orphaned draft: an ABORTED original without its replacement (or
    // vice versa) must be impossible.
    assert_eq!(
        persistence.list_assignments().unwrap().len(),
        assignments_before
    );
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Active
    );
}

/// The admin/scheduler race: whoever persists first wins; the loser
/// observes `StaleVersion`.
#[test]
fn test_concurrent_abort_and_window_close_have_one_winner() {
    let mut persistence = test_persistence();
    let (assignment_id, _, _, _) = active_with_candidatures(&mut persistence);

    // Both sides load the same version.
    let admin_view = persistence.get_assignment(assignment_id).unwrap();
    let scheduler_view = persistence.get_assignment(assignment_id).unwrap();

    // The administrator aborts first.
    let abort = vergabe::apply(
        &admin_view,
        &Event::Abort,
        admin_actor(),
        test_cause(),
        test_now(),
    )
    .unwrap();
    persistence
        .abort_assignment(
            &abort.assignment,
            admin_view.version,
            &abort.audit_event,
            test_now(),
        )
        .unwrap();

    // The scheduler's due transition now loses its version race.
    let close = vergabe::apply(
        &scheduler_view,
        &Event::WindowClosed,
        admin_actor(),
        test_cause(),
        super::helpers::window_end(),
    )
    .unwrap();
    let result = persistence.update_assignment_if_version(
        &close.assignment,
        scheduler_view.version,
        &close.audit_event,
        super::helpers::window_end(),
    );

    assert!(matches!(
        result,
        Err(PersistenceError::StaleVersion { .. })
    ));
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Aborted
    );
}
