// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use vergabe_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use vergabe_domain::{
    AssignmentState, AssignmentWindow, ConceptAssignment, format_timestamp,
    validate_draft_startable, validate_window_for_start,
};

use crate::error::CoreError;
use crate::event::Event;
use crate::state::TransitionResult;

/// Applies an event to an assignment, producing the new assignment and the
/// audit event for the step.
///
/// The transition table is total: every (state, event) pair either matches
/// a defined edge below or is rejected with
/// [`CoreError::InvalidTransition`]. Nothing is silently ignored.
///
/// # Arguments
///
/// * `assignment` - The current assignment (immutable)
/// * `event` - The event to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The instant the event is being accepted
///
/// # Errors
///
/// Returns an error if the event is not a defined edge from the current
/// state, or if a domain rule (window ordering, startable draft) is
/// violated.
pub fn apply(
    assignment: &ConceptAssignment,
    event: &Event,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    match (assignment.state, event) {
        (AssignmentState::Draft, Event::Start { starts_at, ends_at }) => {
            validate_draft_startable(assignment)?;
            let window: AssignmentWindow = AssignmentWindow::new(*starts_at, *ends_at)?;
            validate_window_for_start(&window, now)?;

            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Waiting;
            next.window = Some(window);

            let details: String = format!(
                "Window {} to {}",
                format_timestamp(window.starts_at)?,
                format_timestamp(window.ends_at)?
            );
            Ok(plain_transition(
                assignment,
                next,
                event,
                Some(details),
                actor,
                cause,
            ))
        }
        (AssignmentState::Waiting, Event::Unstart) => {
            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Draft;
            next.window = None;

            Ok(plain_transition(
                assignment,
                next,
                event,
                Some(String::from("Returned to draft, window cleared")),
                actor,
                cause,
            ))
        }
        (AssignmentState::Waiting, Event::WindowOpened) => {
            let open: bool = assignment.window.is_some_and(|w| w.open_at(now));
            if !open {
                return Err(invalid(event, assignment.state));
            }

            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Active;

            Ok(plain_transition(assignment, next, event, None, actor, cause))
        }
        (AssignmentState::Active, Event::WindowClosed) => {
            let closed: bool = assignment.window.is_some_and(|w| w.closed_at(now));
            if !closed {
                return Err(invalid(event, assignment.state));
            }

            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Review;

            Ok(plain_transition(assignment, next, event, None, actor, cause))
        }
        (AssignmentState::Active, Event::FinishManually) => {
            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Review;

            Ok(plain_transition(
                assignment,
                next,
                event,
                Some(String::from("End of window forced early")),
                actor,
                cause,
            ))
        }
        (AssignmentState::Review, Event::FinishManually) => {
            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Finished;

            Ok(plain_transition(assignment, next, event, None, actor, cause))
        }
        (AssignmentState::Active | AssignmentState::Review, Event::Abort) => {
            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Aborted;

            let mut result: TransitionResult = plain_transition(
                assignment,
                next,
                event,
                Some(String::from("Open candidatures force-rejected")),
                actor,
                cause,
            );
            result.rejects_open_candidatures = true;
            Ok(result)
        }
        (AssignmentState::Active, Event::AbortAndDraft) => {
            let mut next: ConceptAssignment = assignment.clone();
            next.state = AssignmentState::Aborted;
            let forked: ConceptAssignment = assignment.redraft();

            let mut result: TransitionResult = plain_transition(
                assignment,
                next,
                event,
                Some(String::from(
                    "Aborted; replacement draft created without parcels",
                )),
                actor,
                cause,
            );
            result.forked_draft = Some(forked);
            result.rejects_open_candidatures = true;
            Ok(result)
        }
        _ => Err(invalid(event, assignment.state)),
    }
}

/// Computes the next pending time-triggered event for an assignment.
///
/// Returns at most one event; the scheduler drains this in a loop so a
/// catch-up after downtime traverses `Waiting`, `Active`, `Review`
/// strictly in order, never skipping the intermediate state.
#[must_use]
pub fn due_event(assignment: &ConceptAssignment, now: OffsetDateTime) -> Option<Event> {
    let window: AssignmentWindow = assignment.window?;
    match assignment.state {
        AssignmentState::Waiting if window.open_at(now) => Some(Event::WindowOpened),
        AssignmentState::Active if window.closed_at(now) => Some(Event::WindowClosed),
        _ => None,
    }
}

/// Builds a transition result with no fork and no cascade.
fn plain_transition(
    before: &ConceptAssignment,
    next: ConceptAssignment,
    event: &Event,
    details: Option<String>,
    actor: Actor,
    cause: Cause,
) -> TransitionResult {
    let audit_event: AuditEvent = AuditEvent::for_assignment(
        actor,
        cause,
        Action::new(String::from(event.name()), details),
        StateSnapshot::of_assignment(before.state),
        StateSnapshot::of_assignment(next.state),
        before.assignment_id,
    );
    TransitionResult {
        assignment: next,
        forked_draft: None,
        rejects_open_candidatures: false,
        audit_event,
    }
}

fn invalid(event: &Event, state: AssignmentState) -> CoreError {
    CoreError::InvalidTransition {
        event: event.name().to_string(),
        state,
    }
}
