// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use vergabe_domain::{AssignmentState, CandidatureState};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// an administrator, a candidate, or the scheduler itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (`"admin"`, `"candidate"`, or `"system"`).
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor used for scheduler-initiated transitions.
    #[must_use]
    pub fn scheduler(instance_id: &str) -> Self {
        Self::new(instance_id.to_string(), String::from("system"))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, scan ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`StartAssignment`", "`AbortAssignment`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of an aggregate's state at a point in time.
///
/// The snapshot is a compact string rendering; it exists for the audit
/// trail, not for state reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Renders an assignment state for the audit trail.
    #[must_use]
    pub fn of_assignment(state: AssignmentState) -> Self {
        Self::new(format!("state={state}"))
    }

    /// Renders a candidature state for the audit trail.
    #[must_use]
    pub fn of_candidature(state: CandidatureState) -> Self {
        Self::new(format!("state={state}"))
    }
}

/// An immutable audit event representing one state transition.
///
/// Every successful state change produces exactly one audit event. A
/// multi-step scheduler catch-up produces one event per traversed state,
/// never a single collapsed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The row id assigned at persistence time; `None` before persisting.
    pub event_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// The assignment this event is scoped to, when known.
    pub assignment_id: Option<i64>,
    /// The candidature this event is scoped to, for candidature transitions.
    pub candidature_id: Option<i64>,
}

impl AuditEvent {
    /// Creates an event scoped to an assignment.
    #[must_use]
    pub const fn for_assignment(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        assignment_id: Option<i64>,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            assignment_id,
            candidature_id: None,
        }
    }

    /// Creates an event scoped to a candidature within an assignment.
    #[must_use]
    pub const fn for_candidature(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        assignment_id: i64,
        candidature_id: Option<i64>,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            assignment_id: Some(assignment_id),
            candidature_id,
        }
    }
}
