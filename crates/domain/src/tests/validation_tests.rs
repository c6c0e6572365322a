// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for command-boundary rule validation.

use time::macros::datetime;

use crate::{
    AssignmentType, AssignmentWindow, ConceptAssignment, DomainError, ParcelRef, validate_draft_startable,
    validate_parcels, validate_window_for_start,
};

fn parcels(ids: &[&str]) -> Vec<ParcelRef> {
    ids.iter().map(|id| ParcelRef::new(id).unwrap()).collect()
}

#[test]
fn test_validate_parcels_rejects_empty_set() {
    let result = validate_parcels(&[]);

    assert!(matches!(result, Err(DomainError::EmptyParcelSet)));
}

#[test]
fn test_validate_parcels_rejects_duplicates() {
    let result = validate_parcels(&parcels(&["FL-1", "FL-2", "FL-1"]));

    assert!(matches!(
        result,
        Err(DomainError::DuplicateParcelRef(ref p)) if p == "FL-1"
    ));
}

#[test]
fn test_validate_parcels_accepts_distinct_set() {
    assert!(validate_parcels(&parcels(&["FL-1", "FL-2"])).is_ok());
}

#[test]
fn test_window_for_start_accepts_past_start_with_future_end() {
    let window = AssignmentWindow::new(
        datetime!(2026-03-02 08:00 UTC),
        datetime!(2026-03-02 18:00 UTC),
    )
    .unwrap();

    // An immediate start: the window opened an hour ago but is still running.
    let result = validate_window_for_start(&window, datetime!(2026-03-02 09:00 UTC));

    assert!(result.is_ok());
}

#[test]
fn test_window_for_start_rejects_already_closed_window() {
    let window = AssignmentWindow::new(
        datetime!(2026-03-02 08:00 UTC),
        datetime!(2026-03-02 18:00 UTC),
    )
    .unwrap();

    let result = validate_window_for_start(&window, datetime!(2026-03-02 18:00 UTC));

    assert!(matches!(
        result,
        Err(DomainError::WindowAlreadyClosed { .. })
    ));
}

#[test]
fn test_draft_startable_requires_parcels() {
    let mut draft = ConceptAssignment::new_draft(
        AssignmentType::Anchor,
        parcels(&["FL-1"]),
        String::from("Workshop concept"),
        Vec::new(),
        Vec::new(),
    );

    assert!(validate_draft_startable(&draft).is_ok());

    // A forked redraft has no parcels until they are re-chosen.
    draft.parcels.clear();
    assert!(matches!(
        validate_draft_startable(&draft),
        Err(DomainError::EmptyParcelSet)
    ));
}

#[test]
fn test_draft_startable_requires_details() {
    let draft = ConceptAssignment::new_draft(
        AssignmentType::Anchor,
        parcels(&["FL-1"]),
        String::from("   "),
        Vec::new(),
        Vec::new(),
    );

    assert!(matches!(
        validate_draft_startable(&draft),
        Err(DomainError::InvalidDetails(_))
    ));
}
