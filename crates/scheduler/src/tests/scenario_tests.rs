// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end lifecycle scenarios across the gateway and the scan.

use time::Duration;
use time::macros::datetime;
use vergabe::FixedClock;
use vergabe_api::{
    ApiError, AuthenticatedActor, CreateCandidatureRequest, CreateDraftRequest,
    DecideCandidatureRequest, Role, StartAssignmentRequest, create_candidature, create_draft,
    decide_candidature, start_assignment, submit_candidature,
};
use vergabe_audit::Cause;
use vergabe_domain::{AssignmentState, CandidatureState};
use vergabe_persistence::Persistence;

use crate::run_scan;

const INSTANCE: &str = "instance-a";
const LEASE: Duration = Duration::seconds(150);

fn admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::Admin)
}

fn candidate() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("applicant-1"), Role::Candidate)
}

fn cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Scenario request"))
}

/// The acceptance walkthrough: create a draft, start it with a window
/// that already opened an hour ago, let scans drive the lifecycle, and
/// watch candidature creation flip from allowed to rejected.
#[test]
fn test_full_lifecycle_with_immediate_start() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    // "Now" is 12:00; the window ran from 11:00 and runs until 13:00.
    let clock = FixedClock::new(datetime!(2026-03-02 12:00 UTC));

    let draft = create_draft(
        &mut persistence,
        CreateDraftRequest {
            assignment_type: String::from("ANLIEGER"),
            parcels: vec![String::from("FL-1")],
            details: String::from("Terraced housing on parcel FL-1"),
            questions: vec![String::from("Financing plan?")],
            attachments: Vec::new(),
        },
        &admin(),
        cause(),
        &clock,
    )
    .unwrap();
    let assignment_id = draft.assignment_id;

    // starts_at = now - 1h, ends_at = now + 1h: accepted, immediately WAITING.
    let started = start_assignment(
        &mut persistence,
        &StartAssignmentRequest {
            assignment_id,
            starts_at: String::from("2026-03-02T11:00:00Z"),
            ends_at: String::from("2026-03-02T13:00:00Z"),
        },
        &admin(),
        cause(),
        &clock,
    )
    .unwrap();
    assert_eq!(started.state, AssignmentState::Waiting);

    // The next scan within the window moves it to ACTIVE.
    run_scan(&mut persistence, &clock, INSTANCE, LEASE).unwrap();
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Active
    );

    // A candidature created now succeeds.
    let candidature = create_candidature(
        &mut persistence,
        CreateCandidatureRequest {
            assignment_id,
            applicant: String::from("applicant-1"),
            content: String::from("{\"concept\":\"terraced\"}"),
        },
        &candidate(),
        cause(),
        &clock,
    )
    .unwrap();
    submit_candidature(
        &mut persistence,
        candidature.candidature_id,
        &candidate(),
        cause(),
        &clock,
    )
    .unwrap();

    // After ends_at passes, the next scan moves it to REVIEW.
    clock.set(datetime!(2026-03-02 13:00:30 UTC));
    run_scan(&mut persistence, &clock, INSTANCE, LEASE).unwrap();
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Review
    );

    // Candidature creation now fails with the invalid-transition outcome.
    let late = create_candidature(
        &mut persistence,
        CreateCandidatureRequest {
            assignment_id,
            applicant: String::from("applicant-2"),
            content: String::from("{}"),
        },
        &candidate(),
        cause(),
        &clock,
    );
    assert!(matches!(late, Err(ApiError::InvalidTransition { .. })));

    // The admin decides the submitted candidature during review.
    let decided = decide_candidature(
        &mut persistence,
        &DecideCandidatureRequest {
            candidature_id: candidature.candidature_id,
            decision: String::from("grant"),
        },
        &admin(),
        cause(),
        &clock,
    )
    .unwrap();
    assert_eq!(decided.candidature.state, CandidatureState::Granted);
    assert_eq!(decided.remaining_undecided, 0);

    // Review is left to the administrator: further scans change nothing.
    clock.advance(Duration::days(7));
    let quiet = run_scan(&mut persistence, &clock, INSTANCE, LEASE).unwrap();
    assert_eq!(quiet.transitions_applied, 0);
    assert_eq!(
        persistence.get_assignment(assignment_id).unwrap().state,
        AssignmentState::Review
    );
}
