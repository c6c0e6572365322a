// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for error translation: the two caller-visible conflict
//! outcomes must stay distinct.

use vergabe::CoreError;
use vergabe_domain::AssignmentState;
use vergabe_persistence::PersistenceError;

use crate::{ApiError, translate_core_error, translate_persistence_error};

#[test]
fn test_invalid_transition_is_action_no_longer_valid() {
    let err = translate_core_error(CoreError::InvalidTransition {
        event: String::from("AbortAssignment"),
        state: AssignmentState::Finished,
    });

    assert!(matches!(
        err,
        ApiError::InvalidTransition { ref action, .. } if action == "AbortAssignment"
    ));
}

#[test]
fn test_stale_version_is_reload_and_retry() {
    let err = translate_persistence_error(PersistenceError::StaleVersion {
        entity: "assignment",
        id: 42,
    });

    match err {
        ApiError::StateChanged { message } => {
            assert!(message.contains("reload and retry"));
        }
        other => panic!("expected StateChanged, got {other:?}"),
    }
}

#[test]
fn test_the_two_conflict_outcomes_are_distinct() {
    let invalid = translate_core_error(CoreError::InvalidTransition {
        event: String::from("UnstartAssignment"),
        state: AssignmentState::Active,
    });
    let stale = translate_persistence_error(PersistenceError::StaleVersion {
        entity: "assignment",
        id: 1,
    });

    assert!(matches!(invalid, ApiError::InvalidTransition { .. }));
    assert!(matches!(stale, ApiError::StateChanged { .. }));
}

#[test]
fn test_not_found_maps_to_resource_not_found() {
    let err = translate_persistence_error(PersistenceError::NotFound(String::from(
        "Assignment 7 does not exist",
    )));

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_database_failures_stay_internal() {
    let err = translate_persistence_error(PersistenceError::DatabaseError(String::from(
        "disk I/O error",
    )));

    assert!(matches!(err, ApiError::Internal { .. }));
}
