// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vergabe_domain::{AssignmentState, CandidatureState, DomainError};

/// Errors that can occur during state transitions.
///
/// The state machine only classifies; it never performs I/O and never
/// retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The event is not a defined edge from the current assignment state.
    InvalidTransition {
        /// The name of the rejected event.
        event: String,
        /// The state the assignment was in.
        state: AssignmentState,
    },
    /// The event is not a defined edge from the current candidature state,
    /// or the owning assignment is in the wrong phase for it.
    CandidatureInvalidTransition {
        /// The name of the rejected event.
        event: String,
        /// The state the candidature was in.
        state: CandidatureState,
        /// The state the owning assignment was in.
        assignment_state: AssignmentState,
    },
    /// A domain rule was violated.
    DomainViolation(DomainError),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { event, state } => {
                write!(f, "Event '{event}' is not valid in state {state}")
            }
            Self::CandidatureInvalidTransition {
                event,
                state,
                assignment_state,
            } => write!(
                f,
                "Event '{event}' is not valid for a candidature in state {state} while the assignment is {assignment_state}"
            ),
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
