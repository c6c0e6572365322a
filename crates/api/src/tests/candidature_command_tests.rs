// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the candidature commands of the gateway.

use time::macros::datetime;
use vergabe_domain::CandidatureState;

use crate::{
    ApiError, CreateCandidatureRequest, DecideCandidatureRequest, UpdateCandidatureRequest,
    create_candidature, decide_candidature, revoke_candidature, submit_candidature,
    update_candidature,
};

use super::helpers::{
    activate, active_with_submission, admin, candidate, close_window, gateway_started, test_cause,
    test_clock, test_now, test_persistence,
};

fn candidature_request(assignment_id: i64, applicant: &str) -> CreateCandidatureRequest {
    CreateCandidatureRequest {
        assignment_id,
        applicant: applicant.to_string(),
        content: String::from("{\"concept\":\"co-housing\"}"),
    }
}

#[test]
fn test_create_candidature_during_active_window() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let started = gateway_started(&mut persistence, &clock);
    activate(&mut persistence, started.assignment_id, test_now());

    let candidature = create_candidature(
        &mut persistence,
        candidature_request(started.assignment_id, "applicant-1"),
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();

    assert_eq!(candidature.state, CandidatureState::Editing);
    assert_eq!(candidature.applicant, "applicant-1");
    assert_eq!(candidature.version, 0);
}

#[test]
fn test_create_candidature_rejected_while_waiting() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let started = gateway_started(&mut persistence, &clock);

    let result = create_candidature(
        &mut persistence,
        candidature_request(started.assignment_id, "applicant-1"),
        &candidate(),
        test_cause(),
        &clock,
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_create_candidature_rejected_after_window_closes() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let started = gateway_started(&mut persistence, &clock);
    activate(&mut persistence, started.assignment_id, test_now());
    close_window(
        &mut persistence,
        started.assignment_id,
        datetime!(2026-03-02 18:00 UTC),
    );

    let result = create_candidature(
        &mut persistence,
        candidature_request(started.assignment_id, "applicant-1"),
        &candidate(),
        test_cause(),
        &clock,
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_second_candidature_for_same_applicant_is_rejected() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let started = gateway_started(&mut persistence, &clock);
    activate(&mut persistence, started.assignment_id, test_now());

    create_candidature(
        &mut persistence,
        candidature_request(started.assignment_id, "applicant-1"),
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();
    let result = create_candidature(
        &mut persistence,
        candidature_request(started.assignment_id, "applicant-1"),
        &candidate(),
        test_cause(),
        &clock,
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. })
            if rule == "one_candidature_per_applicant"
    ));
}

#[test]
fn test_update_then_submit() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let started = gateway_started(&mut persistence, &clock);
    activate(&mut persistence, started.assignment_id, test_now());

    let candidature = create_candidature(
        &mut persistence,
        candidature_request(started.assignment_id, "applicant-1"),
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();

    let updated = update_candidature(
        &mut persistence,
        UpdateCandidatureRequest {
            candidature_id: candidature.candidature_id,
            content: String::from("{\"concept\":\"revised\"}"),
        },
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();
    assert_eq!(updated.content, "{\"concept\":\"revised\"}");
    assert_eq!(updated.version, 1);

    let submitted = submit_candidature(
        &mut persistence,
        candidature.candidature_id,
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();
    assert_eq!(submitted.state, CandidatureState::Submitted);
}

#[test]
fn test_update_rejected_after_submission() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (_, candidature_id) = active_with_submission(&mut persistence, &clock, "applicant-1");

    let result = update_candidature(
        &mut persistence,
        UpdateCandidatureRequest {
            candidature_id,
            content: String::from("{}"),
        },
        &candidate(),
        test_cause(),
        &clock,
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_revoke_while_assignment_is_active() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (_, candidature_id) = active_with_submission(&mut persistence, &clock, "applicant-1");

    let revoked = revoke_candidature(
        &mut persistence,
        candidature_id,
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();

    assert_eq!(revoked.state, CandidatureState::Revoked);
}

#[test]
fn test_revoke_rejected_once_review_began() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (assignment_id, candidature_id) =
        active_with_submission(&mut persistence, &clock, "applicant-1");
    close_window(&mut persistence, assignment_id, datetime!(2026-03-02 18:00 UTC));

    let result = revoke_candidature(
        &mut persistence,
        candidature_id,
        &candidate(),
        test_cause(),
        &clock,
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_decide_during_review_counts_the_remainder() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (assignment_id, first_id) =
        active_with_submission(&mut persistence, &clock, "applicant-1");
    let second = create_candidature(
        &mut persistence,
        candidature_request(assignment_id, "applicant-2"),
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();
    submit_candidature(
        &mut persistence,
        second.candidature_id,
        &candidate(),
        test_cause(),
        &clock,
    )
    .unwrap();
    close_window(&mut persistence, assignment_id, datetime!(2026-03-02 18:00 UTC));

    let response = decide_candidature(
        &mut persistence,
        &DecideCandidatureRequest {
            candidature_id: first_id,
            decision: String::from("grant"),
        },
        &admin(),
        test_cause(),
        &clock,
    )
    .unwrap();

    assert_eq!(response.candidature.state, CandidatureState::Granted);
    assert_eq!(response.remaining_undecided, 1);
}

#[test]
fn test_decide_rejected_while_assignment_is_active() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (_, candidature_id) = active_with_submission(&mut persistence, &clock, "applicant-1");

    let result = decide_candidature(
        &mut persistence,
        &DecideCandidatureRequest {
            candidature_id,
            decision: String::from("reject"),
        },
        &admin(),
        test_cause(),
        &clock,
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_decide_requires_admin_role() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (assignment_id, candidature_id) =
        active_with_submission(&mut persistence, &clock, "applicant-1");
    close_window(&mut persistence, assignment_id, datetime!(2026-03-02 18:00 UTC));

    let result = decide_candidature(
        &mut persistence,
        &DecideCandidatureRequest {
            candidature_id,
            decision: String::from("grant"),
        },
        &candidate(),
        test_cause(),
        &clock,
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_decide_rejects_unknown_decision_string() {
    let mut persistence = test_persistence();
    let clock = test_clock();
    let (assignment_id, candidature_id) =
        active_with_submission(&mut persistence, &clock, "applicant-1");
    close_window(&mut persistence, assignment_id, datetime!(2026-03-02 18:00 UTC));

    let result = decide_candidature(
        &mut persistence,
        &DecideCandidatureRequest {
            candidature_id,
            decision: String::from("maybe"),
        },
        &admin(),
        test_cause(),
        &clock,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "decision"
    ));
}
