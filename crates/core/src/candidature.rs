// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidature transitions, coupled to the owning assignment's phase.
//!
//! A candidature never moves on its own clock; every edge is gated on the
//! assignment state it requires. The abort cascade (force-rejection of
//! open candidatures) is a bulk persistence operation and has no event
//! here.

use vergabe_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use vergabe_domain::{
    ApplicantRef, AssignmentState, Candidature, CandidatureState,
};

use crate::error::CoreError;
use crate::state::CandidatureTransition;

/// A candidature event represents applicant or administrator intent as
/// data only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidatureEvent {
    /// Replace the answer payload. Only valid while `Editing`.
    UpdateContent(String),
    /// Hand the candidature in: `Editing` to `Submitted`.
    Submit,
    /// Withdraw a submission: `Submitted` to `Revoked`. Only permitted
    /// while the assignment is still `Active`.
    Revoke,
    /// Administrator decision during review: `Submitted` to `Granted`.
    Grant,
    /// Administrator decision during review: `Submitted` to `Rejected`.
    Reject,
}

impl CandidatureEvent {
    /// The action name recorded for this event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateContent(_) => "UpdateCandidature",
            Self::Submit => "SubmitCandidature",
            Self::Revoke => "RevokeCandidature",
            Self::Grant => "GrantCandidature",
            Self::Reject => "RejectCandidature",
        }
    }
}

/// Creates a candidature against an active assignment.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTransition`] if the assignment is not
/// `Active`; candidatures may only be created while the window is open.
pub fn create_candidature(
    assignment_id: i64,
    assignment_state: AssignmentState,
    applicant: ApplicantRef,
    content: String,
    actor: Actor,
    cause: Cause,
) -> Result<CandidatureTransition, CoreError> {
    if assignment_state != AssignmentState::Active {
        return Err(CoreError::InvalidTransition {
            event: String::from("CreateCandidature"),
            state: assignment_state,
        });
    }

    let candidature: Candidature = Candidature::new(assignment_id, applicant, content);
    let audit_event: AuditEvent = AuditEvent::for_candidature(
        actor,
        cause,
        Action::new(
            String::from("CreateCandidature"),
            Some(format!(
                "Candidature by '{}' opened",
                candidature.applicant.value()
            )),
        ),
        StateSnapshot::new(String::from("absent")),
        StateSnapshot::of_candidature(candidature.state),
        assignment_id,
        None,
    );

    Ok(CandidatureTransition {
        candidature,
        audit_event,
    })
}

/// Applies an event to a candidature, producing the new candidature and
/// the audit event for the step.
///
/// Like the assignment machine, the table is total: anything not listed is
/// rejected, never ignored.
///
/// # Errors
///
/// Returns [`CoreError::CandidatureInvalidTransition`] if the event is not
/// a defined edge from the candidature's state, or the assignment is in
/// the wrong phase for it.
pub fn apply_candidature(
    candidature: &Candidature,
    assignment_state: AssignmentState,
    event: &CandidatureEvent,
    actor: Actor,
    cause: Cause,
) -> Result<CandidatureTransition, CoreError> {
    let next_state: CandidatureState = match (candidature.state, event, assignment_state) {
        (
            CandidatureState::Editing,
            CandidatureEvent::UpdateContent(_),
            AssignmentState::Active,
        ) => CandidatureState::Editing,
        (CandidatureState::Editing, CandidatureEvent::Submit, AssignmentState::Active) => {
            CandidatureState::Submitted
        }
        (CandidatureState::Submitted, CandidatureEvent::Revoke, AssignmentState::Active) => {
            CandidatureState::Revoked
        }
        (CandidatureState::Submitted, CandidatureEvent::Grant, AssignmentState::Review) => {
            CandidatureState::Granted
        }
        (CandidatureState::Submitted, CandidatureEvent::Reject, AssignmentState::Review) => {
            CandidatureState::Rejected
        }
        _ => {
            return Err(CoreError::CandidatureInvalidTransition {
                event: event.name().to_string(),
                state: candidature.state,
                assignment_state,
            });
        }
    };

    let mut next: Candidature = candidature.clone();
    next.state = next_state;
    if let CandidatureEvent::UpdateContent(content) = event {
        next.content.clone_from(content);
    }

    let audit_event: AuditEvent = AuditEvent::for_candidature(
        actor,
        cause,
        Action::new(String::from(event.name()), None),
        StateSnapshot::of_candidature(candidature.state),
        StateSnapshot::of_candidature(next.state),
        candidature.assignment_id,
        candidature.candidature_id,
    );

    Ok(CandidatureTransition {
        candidature: next,
        audit_event,
    })
}
