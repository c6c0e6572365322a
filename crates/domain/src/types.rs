// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::window::AssignmentWindow;

/// Lifecycle states of a concept assignment.
///
/// Assignments only move forward through these states. The two exceptions
/// are `unstart` (`Waiting` back to `Draft`) and abort-and-redraft, which
/// creates a fresh sibling record in `Draft` rather than rewinding the
/// original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentState {
    /// Being prepared by an administrator; not visible to candidates.
    Draft,
    /// Published with a window; the window has not opened yet.
    Waiting,
    /// The window is open; candidatures may be created and submitted.
    Active,
    /// The window has closed; submitted candidatures await decisions.
    Review,
    /// The procedure concluded normally.
    Finished,
    /// The procedure was cancelled; open candidatures were rejected.
    Aborted,
}

impl AssignmentState {
    /// The canonical storage representation of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Waiting => "WAITING",
            Self::Active => "ACTIVE",
            Self::Review => "REVIEW",
            Self::Finished => "FINISHED",
            Self::Aborted => "ABORTED",
        }
    }

    /// Whether this state has no outbound transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }
}

impl FromStr for AssignmentState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "WAITING" => Ok(Self::Waiting),
            "ACTIVE" => Ok(Self::Active),
            "REVIEW" => Ok(Self::Review),
            "FINISHED" => Ok(Self::Finished),
            "ABORTED" => Ok(Self::Aborted),
            other => Err(DomainError::UnknownAssignmentState(other.to_string())),
        }
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle states of a candidature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidatureState {
    /// Being edited by the applicant; content is still mutable.
    Editing,
    /// Handed in; awaiting the review phase.
    Submitted,
    /// Granted by an administrator during review.
    Granted,
    /// Rejected by an administrator, or force-rejected by an abort cascade.
    Rejected,
    /// Withdrawn by the applicant while the assignment was still active.
    Revoked,
}

impl CandidatureState {
    /// The canonical storage representation of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "EDITING",
            Self::Submitted => "SUBMITTED",
            Self::Granted => "GRANTED",
            Self::Rejected => "REJECTED",
            Self::Revoked => "REVOKED",
        }
    }

    /// Whether this candidature still awaits an outcome.
    ///
    /// Open candidatures are the ones force-rejected by an abort cascade.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Editing | Self::Submitted)
    }
}

impl FromStr for CandidatureState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EDITING" => Ok(Self::Editing),
            "SUBMITTED" => Ok(Self::Submitted),
            "GRANTED" => Ok(Self::Granted),
            "REJECTED" => Ok(Self::Rejected),
            "REVOKED" => Ok(Self::Revoked),
            other => Err(DomainError::UnknownCandidatureState(other.to_string())),
        }
    }
}

impl std::fmt::Display for CandidatureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of building project an assignment offers.
///
/// Immutable after creation. Transition logic never consults it; it is
/// carried for collaborators (listing, reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentType {
    /// An anchor project assignment.
    Anchor,
    /// An adjacent-resident (Anlieger) assignment.
    Anlieger,
}

impl AssignmentType {
    /// The canonical storage representation of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anchor => "ANCHOR",
            Self::Anlieger => "ANLIEGER",
        }
    }
}

impl FromStr for AssignmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANCHOR" => Ok(Self::Anchor),
            "ANLIEGER" => Ok(Self::Anlieger),
            other => Err(DomainError::UnknownAssignmentType(other.to_string())),
        }
    }
}

impl std::fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated reference to a land parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelRef(String);

impl ParcelRef {
    /// Creates a parcel reference from its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or padded with whitespace.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        if value.is_empty() || value.trim() != value {
            return Err(DomainError::InvalidParcelRef(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// The parcel identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// A validated reference to an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantRef(String);

impl ApplicantRef {
    /// Creates an applicant reference from its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or padded with whitespace.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        if value.is_empty() || value.trim() != value {
            return Err(DomainError::InvalidApplicant(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// The applicant identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// A concept assignment: parcels offered for a building project, moving
/// through a publication lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptAssignment {
    /// The canonical row id; `None` until first persisted.
    pub assignment_id: Option<i64>,
    /// The kind of project offered (immutable).
    pub assignment_type: AssignmentType,
    /// The current lifecycle state.
    pub state: AssignmentState,
    /// The publication window; present iff the assignment entered the
    /// start path and has not been unstarted.
    pub window: Option<AssignmentWindow>,
    /// The parcels on offer. Non-empty for administrator-created drafts;
    /// a forked redraft starts empty until parcels are re-chosen.
    pub parcels: Vec<ParcelRef>,
    /// Free-form project description shown to candidates.
    pub details: String,
    /// Questions candidates answer in their candidature.
    pub questions: Vec<String>,
    /// References to stored attachment objects.
    pub attachments: Vec<String>,
    /// Optimistic concurrency token; bumped by every persisted write.
    pub version: i64,
}

impl ConceptAssignment {
    /// Creates a new draft assignment.
    #[must_use]
    pub const fn new_draft(
        assignment_type: AssignmentType,
        parcels: Vec<ParcelRef>,
        details: String,
        questions: Vec<String>,
        attachments: Vec<String>,
    ) -> Self {
        Self {
            assignment_id: None,
            assignment_type,
            state: AssignmentState::Draft,
            window: None,
            parcels,
            details,
            questions,
            attachments,
            version: 0,
        }
    }

    /// Creates the replacement draft used by abort-and-redraft.
    ///
    /// The payload is copied; parcels are deliberately not, they must be
    /// re-chosen before the redraft can be started.
    #[must_use]
    pub fn redraft(&self) -> Self {
        Self {
            assignment_id: None,
            assignment_type: self.assignment_type,
            state: AssignmentState::Draft,
            window: None,
            parcels: Vec::new(),
            details: self.details.clone(),
            questions: self.questions.clone(),
            attachments: self.attachments.clone(),
            version: 0,
        }
    }
}

/// An applicant's submission against an active concept assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidature {
    /// The canonical row id; `None` until first persisted.
    pub candidature_id: Option<i64>,
    /// The assignment this candidature applies to.
    pub assignment_id: i64,
    /// The applicant who owns this candidature.
    pub applicant: ApplicantRef,
    /// The current lifecycle state.
    pub state: CandidatureState,
    /// Applicant-editable answer payload; mutable only while `Editing`.
    pub content: String,
    /// Optimistic concurrency token; bumped by every persisted write.
    pub version: i64,
}

impl Candidature {
    /// Creates a new candidature in `Editing`.
    #[must_use]
    pub const fn new(assignment_id: i64, applicant: ApplicantRef, content: String) -> Self {
        Self {
            candidature_id: None,
            assignment_id,
            applicant,
            state: CandidatureState::Editing,
            content,
            version: 0,
        }
    }
}
