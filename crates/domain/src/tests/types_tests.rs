// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for state parsing and aggregate construction.

use std::str::FromStr;

use crate::{
    ApplicantRef, AssignmentState, AssignmentType, Candidature, CandidatureState,
    ConceptAssignment, DomainError, ParcelRef,
};

#[test]
fn test_assignment_state_round_trips_through_storage_form() {
    let states = [
        AssignmentState::Draft,
        AssignmentState::Waiting,
        AssignmentState::Active,
        AssignmentState::Review,
        AssignmentState::Finished,
        AssignmentState::Aborted,
    ];

    for state in states {
        let parsed = AssignmentState::from_str(state.as_str()).unwrap();
        assert_eq!(parsed, state);
    }
}

#[test]
fn test_assignment_state_rejects_unknown_string() {
    let result = AssignmentState::from_str("PENDING");

    assert!(matches!(
        result,
        Err(DomainError::UnknownAssignmentState(_))
    ));
}

#[test]
fn test_terminal_states() {
    assert!(AssignmentState::Finished.is_terminal());
    assert!(AssignmentState::Aborted.is_terminal());
    assert!(!AssignmentState::Draft.is_terminal());
    assert!(!AssignmentState::Review.is_terminal());
}

#[test]
fn test_candidature_state_round_trips_through_storage_form() {
    let states = [
        CandidatureState::Editing,
        CandidatureState::Submitted,
        CandidatureState::Granted,
        CandidatureState::Rejected,
        CandidatureState::Revoked,
    ];

    for state in states {
        let parsed = CandidatureState::from_str(state.as_str()).unwrap();
        assert_eq!(parsed, state);
    }
}

#[test]
fn test_open_candidature_states() {
    assert!(CandidatureState::Editing.is_open());
    assert!(CandidatureState::Submitted.is_open());
    assert!(!CandidatureState::Granted.is_open());
    assert!(!CandidatureState::Rejected.is_open());
    assert!(!CandidatureState::Revoked.is_open());
}

#[test]
fn test_parcel_ref_rejects_empty_and_padded_values() {
    assert!(ParcelRef::new("").is_err());
    assert!(ParcelRef::new(" FL-1 ").is_err());
    assert!(ParcelRef::new("FL-1").is_ok());
}

#[test]
fn test_applicant_ref_rejects_empty_value() {
    assert!(ApplicantRef::new("").is_err());
    assert!(ApplicantRef::new("applicant-1").is_ok());
}

#[test]
fn test_new_draft_starts_unversioned_without_window() {
    let draft = ConceptAssignment::new_draft(
        AssignmentType::Anchor,
        vec![ParcelRef::new("FL-1").unwrap()],
        String::from("Community workshop on parcel FL-1"),
        vec![String::from("What is your concept?")],
        Vec::new(),
    );

    assert_eq!(draft.assignment_id, None);
    assert_eq!(draft.state, AssignmentState::Draft);
    assert_eq!(draft.window, None);
    assert_eq!(draft.version, 0);
}

#[test]
fn test_redraft_copies_payload_but_not_parcels() {
    let original = ConceptAssignment::new_draft(
        AssignmentType::Anlieger,
        vec![
            ParcelRef::new("FL-1").unwrap(),
            ParcelRef::new("FL-2").unwrap(),
        ],
        String::from("Terraced housing"),
        vec![String::from("Financing plan?")],
        vec![String::from("attachment-key-1")],
    );

    let redraft = original.redraft();

    assert_eq!(redraft.assignment_id, None);
    assert_eq!(redraft.state, AssignmentState::Draft);
    assert_eq!(redraft.window, None);
    assert!(redraft.parcels.is_empty());
    assert_eq!(redraft.details, original.details);
    assert_eq!(redraft.questions, original.questions);
    assert_eq!(redraft.attachments, original.attachments);
    assert_eq!(redraft.version, 0);
}

#[test]
fn test_new_candidature_starts_in_editing() {
    let candidature = Candidature::new(
        7,
        ApplicantRef::new("applicant-1").unwrap(),
        String::from("{}"),
    );

    assert_eq!(candidature.candidature_id, None);
    assert_eq!(candidature.assignment_id, 7);
    assert_eq!(candidature.state, CandidatureState::Editing);
    assert_eq!(candidature.version, 0);
}
