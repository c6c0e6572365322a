// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row/domain conversions.
//!
//! Rows are loaded as tuples and rebuilt into domain values here, so that
//! state strings and timestamps are parsed in exactly one place.

use std::str::FromStr;

use diesel::prelude::*;
use time::OffsetDateTime;
use vergabe_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use vergabe_domain::{
    ApplicantRef, AssignmentState, AssignmentType, AssignmentWindow, Candidature,
    CandidatureState, ConceptAssignment, ParcelRef, format_timestamp, parse_timestamp,
};

use crate::error::PersistenceError;

/// A `concept_assignments` row without its parcels.
pub(crate) type AssignmentRow = (
    i64,            // assignment_id
    String,         // assignment_type
    String,         // state
    Option<String>, // assignment_start
    Option<String>, // assignment_end
    String,         // details
    String,         // questions_json
    String,         // attachments_json
    i64,            // version
);

/// A `candidatures` row.
pub(crate) type CandidatureRow = (
    i64,    // candidature_id
    i64,    // assignment_id
    String, // applicant
    String, // state
    String, // content
    i64,    // version
);

/// An `audit_events` row.
pub(crate) type AuditEventRow = (
    i64,            // event_id
    Option<i64>,    // assignment_id
    Option<i64>,    // candidature_id
    String,         // actor_id
    String,         // actor_type
    String,         // cause_id
    String,         // cause_description
    String,         // action_name
    Option<String>, // action_details
    String,         // before_snapshot
    String,         // after_snapshot
);

/// Formats a timestamp for a storage column.
pub(crate) fn storage_timestamp(ts: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(format_timestamp(ts)?)
}

/// Renders the window columns of an assignment.
pub(crate) fn window_columns(
    assignment: &ConceptAssignment,
) -> Result<(Option<String>, Option<String>), PersistenceError> {
    match assignment.window {
        Some(window) => Ok((
            Some(format_timestamp(window.starts_at)?),
            Some(format_timestamp(window.ends_at)?),
        )),
        None => Ok((None, None)),
    }
}

/// Rebuilds an assignment from its row and parcel list.
pub(crate) fn assignment_from_row(
    row: AssignmentRow,
    parcel_refs: Vec<String>,
) -> Result<ConceptAssignment, PersistenceError> {
    let (
        assignment_id,
        assignment_type,
        state,
        assignment_start,
        assignment_end,
        details,
        questions_json,
        attachments_json,
        version,
    ) = row;

    let window: Option<AssignmentWindow> = match (assignment_start, assignment_end) {
        (Some(start), Some(end)) => Some(AssignmentWindow::new(
            parse_timestamp(&start)?,
            parse_timestamp(&end)?,
        )?),
        (None, None) => None,
        _ => {
            return Err(PersistenceError::ReconstructionError(format!(
                "Assignment {assignment_id} has only one window timestamp"
            )));
        }
    };

    let parcels: Vec<ParcelRef> = parcel_refs
        .iter()
        .map(|p| ParcelRef::new(p))
        .collect::<Result<Vec<ParcelRef>, _>>()?;

    Ok(ConceptAssignment {
        assignment_id: Some(assignment_id),
        assignment_type: AssignmentType::from_str(&assignment_type)?,
        state: AssignmentState::from_str(&state)?,
        window,
        parcels,
        details,
        questions: serde_json::from_str(&questions_json)?,
        attachments: serde_json::from_str(&attachments_json)?,
        version,
    })
}

/// Rebuilds a candidature from its row.
pub(crate) fn candidature_from_row(row: CandidatureRow) -> Result<Candidature, PersistenceError> {
    let (candidature_id, assignment_id, applicant, state, content, version) = row;

    Ok(Candidature {
        candidature_id: Some(candidature_id),
        assignment_id,
        applicant: ApplicantRef::new(&applicant)?,
        state: CandidatureState::from_str(&state)?,
        content,
        version,
    })
}

/// Insertable form of a `concept_assignments` row.
#[derive(Insertable)]
#[diesel(table_name = crate::diesel_schema::concept_assignments)]
pub(crate) struct NewAssignmentRow<'a> {
    pub assignment_type: &'a str,
    pub state: &'a str,
    pub assignment_start: Option<String>,
    pub assignment_end: Option<String>,
    pub details: &'a str,
    pub questions_json: String,
    pub attachments_json: String,
    pub version: i64,
    pub created_at: &'a str,
}

impl<'a> NewAssignmentRow<'a> {
    pub(crate) fn from_assignment(
        assignment: &'a ConceptAssignment,
        created_at: &'a str,
    ) -> Result<Self, PersistenceError> {
        let (assignment_start, assignment_end) = window_columns(assignment)?;
        Ok(Self {
            assignment_type: assignment.assignment_type.as_str(),
            state: assignment.state.as_str(),
            assignment_start,
            assignment_end,
            details: &assignment.details,
            questions_json: serde_json::to_string(&assignment.questions)?,
            attachments_json: serde_json::to_string(&assignment.attachments)?,
            version: assignment.version,
            created_at,
        })
    }
}

/// Insertable form of an `assignment_parcels` row.
#[derive(Insertable)]
#[diesel(table_name = crate::diesel_schema::assignment_parcels)]
pub(crate) struct NewParcelRow<'a> {
    pub assignment_id: i64,
    pub parcel_ref: &'a str,
}

/// Insertable form of a `candidatures` row.
#[derive(Insertable)]
#[diesel(table_name = crate::diesel_schema::candidatures)]
pub(crate) struct NewCandidatureRow<'a> {
    pub assignment_id: i64,
    pub applicant: &'a str,
    pub state: &'a str,
    pub content: &'a str,
    pub version: i64,
    pub created_at: &'a str,
}

impl<'a> NewCandidatureRow<'a> {
    pub(crate) fn from_candidature(candidature: &'a Candidature, created_at: &'a str) -> Self {
        Self {
            assignment_id: candidature.assignment_id,
            applicant: candidature.applicant.value(),
            state: candidature.state.as_str(),
            content: &candidature.content,
            version: candidature.version,
            created_at,
        }
    }
}

/// Insertable form of a `scheduler_locks` row.
#[derive(Insertable)]
#[diesel(table_name = crate::diesel_schema::scheduler_locks)]
pub(crate) struct NewLockRow<'a> {
    pub lock_name: &'a str,
    pub locked_by: &'a str,
    pub locked_until: &'a str,
}

/// Insertable form of an `audit_events` row.
#[derive(Insertable)]
#[diesel(table_name = crate::diesel_schema::audit_events)]
pub(crate) struct NewAuditEventRow<'a> {
    pub assignment_id: Option<i64>,
    pub candidature_id: Option<i64>,
    pub actor_id: &'a str,
    pub actor_type: &'a str,
    pub cause_id: &'a str,
    pub cause_description: &'a str,
    pub action_name: &'a str,
    pub action_details: Option<&'a str>,
    pub before_snapshot: &'a str,
    pub after_snapshot: &'a str,
    pub created_at: &'a str,
}

impl<'a> NewAuditEventRow<'a> {
    pub(crate) fn from_event(event: &'a AuditEvent, created_at: &'a str) -> Self {
        Self {
            assignment_id: event.assignment_id,
            candidature_id: event.candidature_id,
            actor_id: &event.actor.id,
            actor_type: &event.actor.actor_type,
            cause_id: &event.cause.id,
            cause_description: &event.cause.description,
            action_name: &event.action.name,
            action_details: event.action.details.as_deref(),
            before_snapshot: &event.before.data,
            after_snapshot: &event.after.data,
            created_at,
        }
    }
}

/// Rebuilds an audit event from its row.
pub(crate) fn audit_event_from_row(row: AuditEventRow) -> AuditEvent {
    let (
        event_id,
        assignment_id,
        candidature_id,
        actor_id,
        actor_type,
        cause_id,
        cause_description,
        action_name,
        action_details,
        before_snapshot,
        after_snapshot,
    ) = row;

    AuditEvent {
        event_id: Some(event_id),
        actor: Actor::new(actor_id, actor_type),
        cause: Cause::new(cause_id, cause_description),
        action: Action::new(action_name, action_details),
        before: StateSnapshot::new(before_snapshot),
        after: StateSnapshot::new(after_snapshot),
        assignment_id,
        candidature_id,
    }
}
