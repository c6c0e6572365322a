// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;
use vergabe::FixedClock;
use vergabe_audit::Cause;
use vergabe_persistence::Persistence;

use crate::{
    AssignmentResponse, AuthenticatedActor, CreateCandidatureRequest, CreateDraftRequest,
    Role, StartAssignmentRequest, create_candidature, create_draft, start_assignment,
    submit_candidature,
};

pub fn admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::Admin)
}

pub fn candidate() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("applicant-1"), Role::Candidate)
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

/// Noon inside the default test window.
pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-02 12:00 UTC)
}

pub fn test_clock() -> FixedClock {
    FixedClock::new(test_now())
}

pub fn test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn draft_request() -> CreateDraftRequest {
    CreateDraftRequest {
        assignment_type: String::from("ANCHOR"),
        parcels: vec![String::from("FL-1"), String::from("FL-2")],
        details: String::from("Cooperative housing on parcels FL-1 and FL-2"),
        questions: vec![String::from("Describe your concept")],
        attachments: vec![String::from("site-plan.pdf")],
    }
}

/// Creates a draft via the gateway.
pub fn gateway_draft(persistence: &mut Persistence, clock: &FixedClock) -> AssignmentResponse {
    create_draft(persistence, draft_request(), &admin(), test_cause(), clock)
        .expect("create_draft failed")
}

/// Creates a draft and starts it with the default test window
/// (08:00-18:00 on 2026-03-02).
pub fn gateway_started(persistence: &mut Persistence, clock: &FixedClock) -> AssignmentResponse {
    let draft = gateway_draft(persistence, clock);
    start_assignment(
        persistence,
        &StartAssignmentRequest {
            assignment_id: draft.assignment_id,
            starts_at: String::from("2026-03-02T08:00:00Z"),
            ends_at: String::from("2026-03-02T18:00:00Z"),
        },
        &admin(),
        test_cause(),
        clock,
    )
    .expect("start_assignment failed")
}

/// Drives a started assignment into `Active` the way the scheduler
/// would: by applying the due window event directly.
pub fn activate(persistence: &mut Persistence, assignment_id: i64, now: OffsetDateTime) {
    let assignment = persistence.get_assignment(assignment_id).unwrap();
    let result = vergabe::apply(
        &assignment,
        &vergabe::Event::WindowOpened,
        vergabe_audit::Actor::scheduler("test-instance"),
        test_cause(),
        now,
    )
    .unwrap();
    persistence
        .update_assignment_if_version(&result.assignment, assignment.version, &result.audit_event, now)
        .unwrap();
}

/// Drives an active assignment into `Review` via its due window event.
pub fn close_window(persistence: &mut Persistence, assignment_id: i64, now: OffsetDateTime) {
    let assignment = persistence.get_assignment(assignment_id).unwrap();
    let result = vergabe::apply(
        &assignment,
        &vergabe::Event::WindowClosed,
        vergabe_audit::Actor::scheduler("test-instance"),
        test_cause(),
        now,
    )
    .unwrap();
    persistence
        .update_assignment_if_version(&result.assignment, assignment.version, &result.audit_event, now)
        .unwrap();
}

/// An active assignment with a submitted candidature, returned as
/// (assignment_id, candidature_id).
pub fn active_with_submission(
    persistence: &mut Persistence,
    clock: &FixedClock,
    applicant: &str,
) -> (i64, i64) {
    let started = gateway_started(persistence, clock);
    activate(persistence, started.assignment_id, test_now());

    let candidature = create_candidature(
        persistence,
        CreateCandidatureRequest {
            assignment_id: started.assignment_id,
            applicant: applicant.to_string(),
            content: String::from("{\"concept\":\"co-housing\"}"),
        },
        &candidate(),
        test_cause(),
        clock,
    )
    .expect("create_candidature failed");
    submit_candidature(
        persistence,
        candidature.candidature_id,
        &candidate(),
        test_cause(),
        clock,
    )
    .expect("submit_candidature failed");

    (started.assignment_id, candidature.candidature_id)
}
