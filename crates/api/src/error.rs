// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.
//!
//! Two conflict outcomes stay distinct for callers: `InvalidTransition`
//! ("this action is no longer valid") and `StateChanged` ("the record
//! changed, reload and retry").

use vergabe::CoreError;
use vergabe_domain::DomainError;
use vergabe_persistence::PersistenceError;

use crate::auth::AuthError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The requested transition is not valid from the current state.
    InvalidTransition {
        /// The action that was attempted.
        action: String,
        /// A human-readable description of why it is not valid.
        message: String,
    },
    /// The record changed between load and write; reload and retry.
    StateChanged {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidTransition { action, message } => {
                write!(f, "'{action}' is no longer valid: {message}")
            }
            Self::StateChanged { message } => {
                write!(f, "State changed: {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidWindow { reason } => ApiError::InvalidInput {
            field: String::from("window"),
            message: reason,
        },
        DomainError::WindowAlreadyClosed { ends_at } => ApiError::InvalidInput {
            field: String::from("ends_at"),
            message: format!("The window would already be closed at {ends_at}"),
        },
        DomainError::EmptyParcelSet => ApiError::DomainRuleViolation {
            rule: String::from("non_empty_parcels"),
            message: String::from("An assignment must reference at least one parcel"),
        },
        DomainError::InvalidParcelRef(value) | DomainError::DuplicateParcelRef(value) => {
            ApiError::InvalidInput {
                field: String::from("parcels"),
                message: format!("Invalid parcel reference: '{value}'"),
            }
        }
        DomainError::InvalidApplicant(value) => ApiError::InvalidInput {
            field: String::from("applicant"),
            message: format!("Invalid applicant identifier: '{value}'"),
        },
        DomainError::InvalidDetails(reason) => ApiError::InvalidInput {
            field: String::from("details"),
            message: reason,
        },
        DomainError::DuplicateCandidature {
            assignment_id,
            applicant,
        } => ApiError::DomainRuleViolation {
            rule: String::from("one_candidature_per_applicant"),
            message: format!(
                "Applicant '{applicant}' already has a candidature for assignment {assignment_id}"
            ),
        },
        DomainError::InvalidTimestamp { value, reason } => ApiError::InvalidInput {
            field: String::from("timestamp"),
            message: format!("'{value}': {reason}"),
        },
        DomainError::UnknownAssignmentState(_)
        | DomainError::UnknownCandidatureState(_)
        | DomainError::UnknownAssignmentType(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked
/// directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::InvalidTransition { event, state } => ApiError::InvalidTransition {
            action: event,
            message: format!("not permitted while the assignment is {state}"),
        },
        CoreError::CandidatureInvalidTransition {
            event,
            state,
            assignment_state,
        } => ApiError::InvalidTransition {
            action: event,
            message: format!(
                "not permitted for a candidature in {state} while the assignment is {assignment_state}"
            ),
        },
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Optimistic concurrency conflicts become the caller-visible "reload
/// and retry" outcome.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::StaleVersion { entity, id } => ApiError::StateChanged {
            message: format!(
                "The {entity} {id} changed while the command was in flight; reload and retry"
            ),
        },
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::NotADraft {
            assignment_id,
            state,
        } => ApiError::InvalidTransition {
            action: String::from("draft_operation"),
            message: format!("assignment {assignment_id} is {state}, not DRAFT"),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
