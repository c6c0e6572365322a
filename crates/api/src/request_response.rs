// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the command gateway.
//!
//! Timestamps cross this boundary as RFC 3339 strings; parsing happens in
//! the handlers so transport layers stay dumb.

use serde::{Deserialize, Serialize};
use vergabe_audit::AuditEvent;
use vergabe_domain::{
    AssignmentState, AssignmentType, Candidature, CandidatureState, ConceptAssignment,
    format_timestamp,
};

use crate::error::{ApiError, translate_domain_error};

/// Request to create a new draft assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// The assignment type (`"ANCHOR"` or `"ANLIEGER"`).
    pub assignment_type: String,
    /// The parcels on offer; must be non-empty and free of duplicates.
    pub parcels: Vec<String>,
    /// Free-form project description.
    pub details: String,
    /// Questions candidates answer in their candidature.
    pub questions: Vec<String>,
    /// References to stored attachment objects.
    pub attachments: Vec<String>,
}

/// Request to replace the parcel set of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDraftParcelsRequest {
    /// The assignment to update.
    pub assignment_id: i64,
    /// The new parcel set.
    pub parcels: Vec<String>,
}

/// Request to publish a draft with a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAssignmentRequest {
    /// The assignment to start.
    pub assignment_id: i64,
    /// When the window opens (RFC 3339). May already have passed for an
    /// immediate start.
    pub starts_at: String,
    /// When the window closes (RFC 3339). Must be in the future.
    pub ends_at: String,
}

/// Request to create a candidature against an active assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCandidatureRequest {
    /// The assignment applied to.
    pub assignment_id: i64,
    /// The applicant the candidature belongs to.
    pub applicant: String,
    /// The initial answer payload.
    pub content: String,
}

/// Request to replace a candidature's answer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCandidatureRequest {
    /// The candidature to update.
    pub candidature_id: i64,
    /// The new answer payload.
    pub content: String,
}

/// Request to decide a submitted candidature during review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideCandidatureRequest {
    /// The candidature to decide.
    pub candidature_id: i64,
    /// The decision: `"grant"` or `"reject"`.
    pub decision: String,
}

/// Serializable representation of a concept assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResponse {
    /// The assignment ID.
    pub assignment_id: i64,
    /// The assignment type.
    pub assignment_type: AssignmentType,
    /// The current lifecycle state.
    pub state: AssignmentState,
    /// When the window opens (RFC 3339), if started.
    pub starts_at: Option<String>,
    /// When the window closes (RFC 3339), if started.
    pub ends_at: Option<String>,
    /// The parcels on offer.
    pub parcels: Vec<String>,
    /// Free-form project description.
    pub details: String,
    /// Questions candidates answer in their candidature.
    pub questions: Vec<String>,
    /// References to stored attachment objects.
    pub attachments: Vec<String>,
    /// The record version the caller must echo back for its next command.
    pub version: i64,
}

impl AssignmentResponse {
    /// Renders an assignment for a caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment was never persisted or its
    /// window cannot be formatted.
    pub fn from_assignment(assignment: &ConceptAssignment) -> Result<Self, ApiError> {
        let assignment_id: i64 = assignment.assignment_id.ok_or_else(|| ApiError::Internal {
            message: String::from("Assignment has no ID"),
        })?;
        let (starts_at, ends_at) = match assignment.window {
            Some(window) => (
                Some(format_timestamp(window.starts_at).map_err(translate_domain_error)?),
                Some(format_timestamp(window.ends_at).map_err(translate_domain_error)?),
            ),
            None => (None, None),
        };

        Ok(Self {
            assignment_id,
            assignment_type: assignment.assignment_type,
            state: assignment.state,
            starts_at,
            ends_at,
            parcels: assignment
                .parcels
                .iter()
                .map(|p| p.value().to_string())
                .collect(),
            details: assignment.details.clone(),
            questions: assignment.questions.clone(),
            attachments: assignment.attachments.clone(),
            version: assignment.version,
        })
    }
}

/// Serializable representation of a candidature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatureResponse {
    /// The candidature ID.
    pub candidature_id: i64,
    /// The assignment applied to.
    pub assignment_id: i64,
    /// The applicant.
    pub applicant: String,
    /// The current lifecycle state.
    pub state: CandidatureState,
    /// The answer payload.
    pub content: String,
    /// The record version the caller must echo back for its next command.
    pub version: i64,
}

impl CandidatureResponse {
    /// Renders a candidature for a caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidature was never persisted.
    pub fn from_candidature(candidature: &Candidature) -> Result<Self, ApiError> {
        let candidature_id: i64 =
            candidature.candidature_id.ok_or_else(|| ApiError::Internal {
                message: String::from("Candidature has no ID"),
            })?;

        Ok(Self {
            candidature_id,
            assignment_id: candidature.assignment_id,
            applicant: candidature.applicant.value().to_string(),
            state: candidature.state,
            content: candidature.content.clone(),
            version: candidature.version,
        })
    }
}

/// Response to an abort command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortAssignmentResponse {
    /// The aborted assignment.
    pub assignment: AssignmentResponse,
    /// How many open candidatures were force-rejected.
    pub rejected_candidatures: usize,
}

/// Response to an abort-and-redraft command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortAndRedraftResponse {
    /// The aborted original.
    pub aborted: AssignmentResponse,
    /// The replacement draft (copied payload, no parcels).
    pub new_draft: AssignmentResponse,
    /// How many open candidatures were force-rejected.
    pub rejected_candidatures: usize,
}

/// Response to a candidature decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideCandidatureResponse {
    /// The decided candidature.
    pub candidature: CandidatureResponse,
    /// How many submitted candidatures still await a decision.
    pub remaining_undecided: usize,
}

/// Serializable representation of an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// The event ID.
    pub event_id: Option<i64>,
    /// The actor ID.
    pub actor_id: String,
    /// The actor type.
    pub actor_type: String,
    /// The action name.
    pub action_name: String,
    /// Optional action details.
    pub action_details: Option<String>,
    /// State before the transition.
    pub before: String,
    /// State after the transition.
    pub after: String,
    /// The candidature this event is scoped to, if any.
    pub candidature_id: Option<i64>,
}

impl AuditEventInfo {
    /// Renders an audit event for a caller.
    #[must_use]
    pub fn from_event(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            action_name: event.action.name.clone(),
            action_details: event.action.details.clone(),
            before: event.before.data.clone(),
            after: event.after.data.clone(),
            candidature_id: event.candidature_id,
        }
    }
}
