// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;
use vergabe_audit::{Actor, Cause};
use vergabe_domain::{
    AssignmentState, AssignmentType, AssignmentWindow, ConceptAssignment, ParcelRef,
};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin-1"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Admin request"))
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

pub fn draft_assignment() -> ConceptAssignment {
    let mut assignment = ConceptAssignment::new_draft(
        AssignmentType::Anchor,
        vec![ParcelRef::new("FL-1").unwrap()],
        String::from("Cooperative housing on parcel FL-1"),
        vec![String::from("Describe your concept")],
        Vec::new(),
    );
    assignment.assignment_id = Some(1);
    assignment
}

/// A draft that went through `start` with the default test window, forced
/// into the given state.
pub fn started_assignment(state: AssignmentState) -> ConceptAssignment {
    let mut assignment = draft_assignment();
    assignment.state = state;
    assignment.window = Some(AssignmentWindow::new(window_start(), window_end()).unwrap());
    assignment.version = 1;
    assignment
}
