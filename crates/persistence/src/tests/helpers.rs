// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;
use vergabe::Event;
use vergabe_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use vergabe_domain::{
    ApplicantRef, AssignmentState, AssignmentType, Candidature, ConceptAssignment, ParcelRef,
};

use crate::Persistence;

pub fn test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn admin_actor() -> Actor {
    Actor::new(String::from("admin-1"), String::from("admin"))
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

/// Noon inside the default test window.
pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-02 12:00 UTC)
}

pub fn window_start() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

pub fn window_end() -> OffsetDateTime {
    datetime!(2026-03-02 18:00 UTC)
}

pub fn test_audit_event(action: &str, assignment_id: Option<i64>) -> AuditEvent {
    AuditEvent::for_assignment(
        admin_actor(),
        test_cause(),
        Action::new(action.to_string(), None),
        StateSnapshot::new(String::from("before")),
        StateSnapshot::new(String::from("after")),
        assignment_id,
    )
}

pub fn unsaved_draft() -> ConceptAssignment {
    ConceptAssignment::new_draft(
        AssignmentType::Anchor,
        vec![
            ParcelRef::new("FL-1").unwrap(),
            ParcelRef::new("FL-2").unwrap(),
        ],
        String::from("Cooperative housing on parcels FL-1 and FL-2"),
        vec![String::from("Describe your concept")],
        vec![String::from("site-plan.pdf")],
    )
}

/// Inserts a fresh draft and reloads it with its assigned ID.
pub fn create_draft(persistence: &mut Persistence) -> ConceptAssignment {
    let draft = unsaved_draft();
    let id = persistence
        .create_assignment(&draft, &test_audit_event("CreateDraft", None), test_now())
        .expect("Failed to insert draft");
    persistence
        .get_assignment(id)
        .expect("Failed to reload draft")
}

/// Applies a core event and persists the result, returning the updated
/// assignment.
pub fn advance(
    persistence: &mut Persistence,
    assignment: &ConceptAssignment,
    event: &Event,
    now: OffsetDateTime,
) -> ConceptAssignment {
    let result = vergabe::apply(assignment, event, admin_actor(), test_cause(), now)
        .expect("Transition rejected");
    persistence
        .update_assignment_if_version(
            &result.assignment,
            assignment.version,
            &result.audit_event,
            now,
        )
        .expect("Failed to persist transition");
    persistence
        .get_assignment(assignment.assignment_id.unwrap())
        .expect("Failed to reload assignment")
}

/// Creates a draft and drives it to the given state through real
/// transitions with the default test window.
pub fn persist_in_state(persistence: &mut Persistence, state: AssignmentState) -> ConceptAssignment {
    let draft = create_draft(persistence);
    if state == AssignmentState::Draft {
        return draft;
    }

    let waiting = advance(
        persistence,
        &draft,
        &Event::Start {
            starts_at: window_start(),
            ends_at: window_end(),
        },
        datetime!(2026-03-02 07:00 UTC),
    );
    if state == AssignmentState::Waiting {
        return waiting;
    }

    let active = advance(persistence, &waiting, &Event::WindowOpened, test_now());
    if state == AssignmentState::Active {
        return active;
    }

    let review = advance(persistence, &active, &Event::WindowClosed, window_end());
    if state == AssignmentState::Review {
        return review;
    }

    match state {
        AssignmentState::Finished => {
            advance(persistence, &review, &Event::FinishManually, window_end())
        }
        AssignmentState::Aborted => advance(persistence, &review, &Event::Abort, window_end()),
        _ => unreachable!("handled above"),
    }
}

pub fn unsaved_candidature(assignment_id: i64, applicant: &str) -> Candidature {
    Candidature::new(
        assignment_id,
        ApplicantRef::new(applicant).unwrap(),
        String::from("{\"concept\":\"co-housing\"}"),
    )
}

/// Inserts a candidature and reloads it with its assigned ID.
pub fn create_candidature_row(
    persistence: &mut Persistence,
    assignment_id: i64,
    applicant: &str,
) -> Candidature {
    let candidature = unsaved_candidature(assignment_id, applicant);
    let id = persistence
        .create_candidature(
            &candidature,
            &test_audit_event("CreateCandidature", Some(assignment_id)),
            test_now(),
        )
        .expect("Failed to insert candidature");
    persistence
        .get_candidature(id)
        .expect("Failed to reload candidature")
}
