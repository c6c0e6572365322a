// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for due-event computation and multi-step catch-up ordering.

use time::macros::datetime;
use vergabe_domain::AssignmentState;

use crate::{Event, apply, due_event};

use super::helpers::{create_test_actor, create_test_cause, draft_assignment, started_assignment};

#[test]
fn test_no_due_event_for_draft() {
    let draft = draft_assignment();

    assert_eq!(due_event(&draft, datetime!(2026-03-02 12:00 UTC)), None);
}

#[test]
fn test_no_due_event_before_window_opens() {
    let assignment = started_assignment(AssignmentState::Waiting);

    assert_eq!(due_event(&assignment, datetime!(2026-03-02 07:59 UTC)), None);
}

#[test]
fn test_window_opened_due_at_starts_at() {
    let assignment = started_assignment(AssignmentState::Waiting);

    assert_eq!(
        due_event(&assignment, datetime!(2026-03-02 08:00 UTC)),
        Some(Event::WindowOpened)
    );
}

#[test]
fn test_window_closed_due_at_ends_at() {
    let assignment = started_assignment(AssignmentState::Active);

    assert_eq!(
        due_event(&assignment, datetime!(2026-03-02 18:00 UTC)),
        Some(Event::WindowClosed)
    );
}

#[test]
fn test_review_has_no_due_event() {
    // Review to Finished is admin-driven; the scheduler leaves review alone.
    let assignment = started_assignment(AssignmentState::Review);

    assert_eq!(due_event(&assignment, datetime!(2026-04-01 00:00 UTC)), None);
}

#[test]
fn test_terminal_states_have_no_due_event() {
    for state in [AssignmentState::Finished, AssignmentState::Aborted] {
        let assignment = started_assignment(state);

        assert_eq!(due_event(&assignment, datetime!(2026-04-01 00:00 UTC)), None);
    }
}

/// The long-downtime case: both window boundaries passed before any scan
/// ran. Draining `due_event` walks `Waiting` to `Active` to `Review` in
/// order, emitting one audit event per traversed state.
#[test]
fn test_catch_up_traverses_active_before_review() {
    let now = datetime!(2026-03-05 00:00 UTC);
    let mut assignment = started_assignment(AssignmentState::Waiting);
    let mut actions: Vec<String> = Vec::new();

    while let Some(event) = due_event(&assignment, now) {
        let result = apply(
            &assignment,
            &event,
            create_test_actor(),
            create_test_cause(),
            now,
        )
        .unwrap();
        actions.push(result.audit_event.action.name.clone());
        assignment = result.assignment;
    }

    assert_eq!(assignment.state, AssignmentState::Review);
    assert_eq!(actions, vec!["WindowOpened", "WindowClosed"]);
}

/// Re-deriving due-ness from an already-advanced assignment yields nothing;
/// a retried scan is a no-op rather than an error.
#[test]
fn test_catch_up_is_idempotent() {
    let now = datetime!(2026-03-05 00:00 UTC);
    let mut assignment = started_assignment(AssignmentState::Waiting);

    while let Some(event) = due_event(&assignment, now) {
        assignment = apply(
            &assignment,
            &event,
            create_test_actor(),
            create_test_cause(),
            now,
        )
        .unwrap()
        .assignment;
    }

    assert_eq!(due_event(&assignment, now), None);
}
