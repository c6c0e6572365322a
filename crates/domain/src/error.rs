// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors raised by domain rule validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The assignment window is not ordered (`ends_at` must be after `starts_at`).
    InvalidWindow {
        /// A description of the ordering violation.
        reason: String,
    },
    /// The assignment window would already be closed at the time of the command.
    WindowAlreadyClosed {
        /// The offending end timestamp (RFC 3339).
        ends_at: String,
    },
    /// An assignment must reference at least one parcel to be offered.
    EmptyParcelSet,
    /// A parcel reference was syntactically invalid.
    InvalidParcelRef(String),
    /// The same parcel was referenced more than once.
    DuplicateParcelRef(String),
    /// An applicant identifier was syntactically invalid.
    InvalidApplicant(String),
    /// The assignment details were empty or invalid.
    InvalidDetails(String),
    /// A state string from storage did not name a known assignment state.
    UnknownAssignmentState(String),
    /// A state string from storage did not name a known candidature state.
    UnknownCandidatureState(String),
    /// A type string from storage did not name a known assignment type.
    UnknownAssignmentType(String),
    /// The applicant already has a candidature for this assignment.
    DuplicateCandidature {
        /// The assignment the applicant already applied to.
        assignment_id: i64,
        /// The applicant identifier.
        applicant: String,
    },
    /// A timestamp could not be formatted or parsed.
    InvalidTimestamp {
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindow { reason } => write!(f, "Invalid assignment window: {reason}"),
            Self::WindowAlreadyClosed { ends_at } => {
                write!(f, "Assignment window already closed at {ends_at}")
            }
            Self::EmptyParcelSet => {
                write!(f, "An assignment must reference at least one parcel")
            }
            Self::InvalidParcelRef(value) => write!(f, "Invalid parcel reference: '{value}'"),
            Self::DuplicateParcelRef(value) => {
                write!(f, "Parcel '{value}' is referenced more than once")
            }
            Self::InvalidApplicant(value) => write!(f, "Invalid applicant identifier: '{value}'"),
            Self::InvalidDetails(reason) => write!(f, "Invalid assignment details: {reason}"),
            Self::UnknownAssignmentState(value) => {
                write!(f, "Unknown assignment state: '{value}'")
            }
            Self::UnknownCandidatureState(value) => {
                write!(f, "Unknown candidature state: '{value}'")
            }
            Self::UnknownAssignmentType(value) => {
                write!(f, "Unknown assignment type: '{value}'")
            }
            Self::DuplicateCandidature {
                assignment_id,
                applicant,
            } => write!(
                f,
                "Applicant '{applicant}' already has a candidature for assignment {assignment_id}"
            ),
            Self::InvalidTimestamp { value, reason } => {
                write!(f, "Invalid timestamp '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
