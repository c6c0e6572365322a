// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command gateway handlers.
//!
//! Every mutating handler follows the same shape: authorize, load the
//! record with its version, let the state machine validate and apply the
//! transition, persist under the version check, translate errors. A
//! concurrent writer (another administrator or the scheduler) surfaces as
//! [`ApiError::StateChanged`]; the caller reloads and retries.

use std::str::FromStr;

use time::OffsetDateTime;
use tracing::info;
use vergabe::{
    CandidatureEvent, Clock, Event, apply, apply_candidature, create_candidature as core_create_candidature,
};
use vergabe_audit::{Action, AuditEvent, Cause, StateSnapshot};
use vergabe_domain::{
    AssignmentState, AssignmentType, Candidature, ConceptAssignment, DomainError, ParcelRef,
    parse_timestamp, validate_draft_startable, validate_parcels,
};
use vergabe_persistence::Persistence;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AbortAndRedraftResponse, AbortAssignmentResponse, AssignmentResponse, AuditEventInfo,
    CandidatureResponse, CreateCandidatureRequest, CreateDraftRequest, DecideCandidatureRequest,
    DecideCandidatureResponse, StartAssignmentRequest, UpdateCandidatureRequest,
    UpdateDraftParcelsRequest,
};

/// Parses an RFC 3339 request field.
fn parse_request_timestamp(field: &'static str, value: &str) -> Result<OffsetDateTime, ApiError> {
    parse_timestamp(value).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Parses and validates a request parcel list.
fn parse_parcels(raw: &[String]) -> Result<Vec<ParcelRef>, ApiError> {
    let parcels: Vec<ParcelRef> = raw
        .iter()
        .map(|p| ParcelRef::new(p))
        .collect::<Result<Vec<ParcelRef>, DomainError>>()
        .map_err(translate_domain_error)?;
    validate_parcels(&parcels).map_err(translate_domain_error)?;
    Ok(parcels)
}

/// Loads an assignment, translating a missing record for the caller.
fn load_assignment(
    persistence: &mut Persistence,
    assignment_id: i64,
) -> Result<ConceptAssignment, ApiError> {
    persistence
        .get_assignment(assignment_id)
        .map_err(translate_persistence_error)
}

/// Loads a candidature, translating a missing record for the caller.
fn load_candidature(
    persistence: &mut Persistence,
    candidature_id: i64,
) -> Result<Candidature, ApiError> {
    persistence
        .get_candidature(candidature_id)
        .map_err(translate_persistence_error)
}

/// Applies an assignment event and persists the result under the version
/// check.
fn apply_and_persist(
    persistence: &mut Persistence,
    assignment: &ConceptAssignment,
    event: &Event,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ConceptAssignment, ApiError> {
    let result = apply(assignment, event, actor.to_audit_actor(), cause, now)
        .map_err(translate_core_error)?;
    let new_version: i64 = persistence
        .update_assignment_if_version(
            &result.assignment,
            assignment.version,
            &result.audit_event,
            now,
        )
        .map_err(translate_persistence_error)?;

    let mut updated: ConceptAssignment = result.assignment;
    updated.version = new_version;
    Ok(updated)
}

/// Creates a new draft assignment.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the type or
/// parcel set is invalid, or persistence fails.
pub fn create_draft(
    persistence: &mut Persistence,
    request: CreateDraftRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AssignmentResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "create_draft")?;

    let assignment_type: AssignmentType = AssignmentType::from_str(&request.assignment_type)
        .map_err(|_| ApiError::InvalidInput {
            field: String::from("assignment_type"),
            message: format!(
                "'{}' is not a known assignment type (expected ANCHOR or ANLIEGER)",
                request.assignment_type
            ),
        })?;
    let parcels: Vec<ParcelRef> = parse_parcels(&request.parcels)?;

    let draft: ConceptAssignment = ConceptAssignment::new_draft(
        assignment_type,
        parcels,
        request.details,
        request.questions,
        request.attachments,
    );
    validate_draft_startable(&draft).map_err(translate_domain_error)?;

    let audit: AuditEvent = AuditEvent::for_assignment(
        actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("CreateDraft"),
            Some(format!(
                "{} draft offering {} parcels",
                assignment_type,
                draft.parcels.len()
            )),
        ),
        StateSnapshot::new(String::from("absent")),
        StateSnapshot::of_assignment(AssignmentState::Draft),
        None,
    );

    let assignment_id: i64 = persistence
        .create_assignment(&draft, &audit, clock.now())
        .map_err(translate_persistence_error)?;
    let created: ConceptAssignment = load_assignment(persistence, assignment_id)?;

    info!(assignment_id, "Created draft assignment");
    AssignmentResponse::from_assignment(&created)
}

/// Replaces the parcel set of a draft assignment.
///
/// This is how a forked redraft becomes startable.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the assignment
/// is not a draft, or the version check fails.
pub fn update_draft_parcels(
    persistence: &mut Persistence,
    request: UpdateDraftParcelsRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AssignmentResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "update_draft_parcels")?;

    let parcels: Vec<ParcelRef> = parse_parcels(&request.parcels)?;
    let assignment: ConceptAssignment = load_assignment(persistence, request.assignment_id)?;

    let audit: AuditEvent = AuditEvent::for_assignment(
        actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("UpdateDraft"),
            Some(format!("Parcel set replaced ({} parcels)", parcels.len())),
        ),
        StateSnapshot::of_assignment(assignment.state),
        StateSnapshot::of_assignment(assignment.state),
        assignment.assignment_id,
    );

    persistence
        .update_draft_parcels(
            request.assignment_id,
            assignment.version,
            &parcels,
            &audit,
            clock.now(),
        )
        .map_err(translate_persistence_error)?;
    let updated: ConceptAssignment = load_assignment(persistence, request.assignment_id)?;

    AssignmentResponse::from_assignment(&updated)
}

/// Hard-deletes a draft assignment.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the
/// assignment already left `DRAFT`.
pub fn delete_draft(
    persistence: &mut Persistence,
    assignment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "delete_draft")?;

    let assignment: ConceptAssignment = load_assignment(persistence, assignment_id)?;

    let audit: AuditEvent = AuditEvent::for_assignment(
        actor.to_audit_actor(),
        cause,
        Action::new(String::from("DeleteDraft"), None),
        StateSnapshot::of_assignment(assignment.state),
        StateSnapshot::new(String::from("deleted")),
        assignment.assignment_id,
    );

    persistence
        .delete_draft_assignment(assignment_id, &audit, clock.now())
        .map_err(translate_persistence_error)?;

    info!(assignment_id, "Deleted draft assignment");
    Ok(())
}

/// Publishes a draft with a window: `Draft` to `Waiting`.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the window is
/// invalid, the draft is not startable, or a concurrent writer advanced
/// the record.
pub fn start_assignment(
    persistence: &mut Persistence,
    request: &StartAssignmentRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AssignmentResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "start_assignment")?;

    let starts_at: OffsetDateTime = parse_request_timestamp("starts_at", &request.starts_at)?;
    let ends_at: OffsetDateTime = parse_request_timestamp("ends_at", &request.ends_at)?;
    let assignment: ConceptAssignment = load_assignment(persistence, request.assignment_id)?;

    let updated: ConceptAssignment = apply_and_persist(
        persistence,
        &assignment,
        &Event::Start { starts_at, ends_at },
        actor,
        cause,
        clock.now(),
    )?;

    info!(
        assignment_id = request.assignment_id,
        starts_at = %request.starts_at,
        ends_at = %request.ends_at,
        "Started assignment"
    );
    AssignmentResponse::from_assignment(&updated)
}

/// Withdraws a waiting assignment back to `Draft`.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the assignment
/// is not `Waiting`, or a concurrent writer advanced the record.
pub fn unstart_assignment(
    persistence: &mut Persistence,
    assignment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AssignmentResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "unstart_assignment")?;

    let assignment: ConceptAssignment = load_assignment(persistence, assignment_id)?;
    let updated: ConceptAssignment = apply_and_persist(
        persistence,
        &assignment,
        &Event::Unstart,
        actor,
        cause,
        clock.now(),
    )?;

    info!(assignment_id, "Unstarted assignment");
    AssignmentResponse::from_assignment(&updated)
}

/// Forces the next phase: `Active` to `Review`, or `Review` to
/// `Finished`.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the assignment
/// is in neither phase, or a concurrent writer advanced the record.
pub fn finish_manually(
    persistence: &mut Persistence,
    assignment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AssignmentResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "finish_manually")?;

    let assignment: ConceptAssignment = load_assignment(persistence, assignment_id)?;
    let updated: ConceptAssignment = apply_and_persist(
        persistence,
        &assignment,
        &Event::FinishManually,
        actor,
        cause,
        clock.now(),
    )?;

    info!(assignment_id, state = %updated.state, "Finished assignment phase manually");
    AssignmentResponse::from_assignment(&updated)
}

/// Aborts an assignment, force-rejecting its open candidatures.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the assignment
/// is neither `Active` nor `Review`, or a concurrent writer advanced the
/// record.
pub fn abort_assignment(
    persistence: &mut Persistence,
    assignment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AbortAssignmentResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "abort_assignment")?;

    let assignment: ConceptAssignment = load_assignment(persistence, assignment_id)?;
    let now: OffsetDateTime = clock.now();
    let result = apply(
        &assignment,
        &Event::Abort,
        actor.to_audit_actor(),
        cause,
        now,
    )
    .map_err(translate_core_error)?;

    let (new_version, rejected): (i64, usize) = persistence
        .abort_assignment(
            &result.assignment,
            assignment.version,
            &result.audit_event,
            now,
        )
        .map_err(translate_persistence_error)?;

    let mut aborted: ConceptAssignment = result.assignment;
    aborted.version = new_version;

    info!(
        assignment_id,
        rejected_candidatures = rejected,
        "Aborted assignment"
    );
    Ok(AbortAssignmentResponse {
        assignment: AssignmentResponse::from_assignment(&aborted)?,
        rejected_candidatures: rejected,
    })
}

/// Aborts an active assignment and creates its replacement draft in one
/// atomic unit.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the assignment
/// is not `Active`, or a concurrent writer advanced the record.
pub fn abort_and_redraft(
    persistence: &mut Persistence,
    assignment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<AbortAndRedraftResponse, ApiError> {
    AuthorizationService::authorize_lifecycle_command(actor, "abort_and_redraft")?;

    let assignment: ConceptAssignment = load_assignment(persistence, assignment_id)?;
    let now: OffsetDateTime = clock.now();
    let result = apply(
        &assignment,
        &Event::AbortAndDraft,
        actor.to_audit_actor(),
        cause.clone(),
        now,
    )
    .map_err(translate_core_error)?;
    let fork: ConceptAssignment = result.forked_draft.ok_or_else(|| ApiError::Internal {
        message: String::from("AbortAndDraft produced no replacement draft"),
    })?;

    let fork_audit: AuditEvent = AuditEvent::for_assignment(
        actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("CreateDraft"),
            Some(format!("Redrafted from assignment {assignment_id}")),
        ),
        StateSnapshot::new(String::from("absent")),
        StateSnapshot::of_assignment(AssignmentState::Draft),
        None,
    );

    let (new_version, rejected, fork_id): (i64, usize, i64) = persistence
        .abort_and_redraft(
            &result.assignment,
            assignment.version,
            &fork,
            &result.audit_event,
            &fork_audit,
            now,
        )
        .map_err(translate_persistence_error)?;

    let mut aborted: ConceptAssignment = result.assignment;
    aborted.version = new_version;
    let new_draft: ConceptAssignment = load_assignment(persistence, fork_id)?;

    info!(
        assignment_id,
        fork_id,
        rejected_candidatures = rejected,
        "Aborted assignment and created replacement draft"
    );
    Ok(AbortAndRedraftResponse {
        aborted: AssignmentResponse::from_assignment(&aborted)?,
        new_draft: AssignmentResponse::from_assignment(&new_draft)?,
        rejected_candidatures: rejected,
    })
}

/// Creates a candidature against an active assignment.
///
/// # Errors
///
/// Returns an error if the assignment is not `Active`, the applicant
/// already has a candidature for it, or persistence fails.
pub fn create_candidature(
    persistence: &mut Persistence,
    request: CreateCandidatureRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<CandidatureResponse, ApiError> {
    AuthorizationService::authorize_candidature_action(actor, "create_candidature")?;

    let applicant = vergabe_domain::ApplicantRef::new(&request.applicant)
        .map_err(translate_domain_error)?;
    let assignment: ConceptAssignment = load_assignment(persistence, request.assignment_id)?;

    if persistence
        .find_candidature_for_applicant(request.assignment_id, &applicant)
        .map_err(translate_persistence_error)?
        .is_some()
    {
        return Err(translate_domain_error(DomainError::DuplicateCandidature {
            assignment_id: request.assignment_id,
            applicant: request.applicant,
        }));
    }

    let result = core_create_candidature(
        request.assignment_id,
        assignment.state,
        applicant,
        request.content,
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let candidature_id: i64 = persistence
        .create_candidature(&result.candidature, &result.audit_event, clock.now())
        .map_err(translate_persistence_error)?;
    let created: Candidature = load_candidature(persistence, candidature_id)?;

    info!(
        candidature_id,
        assignment_id = request.assignment_id,
        "Created candidature"
    );
    CandidatureResponse::from_candidature(&created)
}

/// Applies a candidature event and persists the result under the version
/// check.
fn apply_candidature_and_persist(
    persistence: &mut Persistence,
    candidature_id: i64,
    event: &CandidatureEvent,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Candidature, ApiError> {
    let candidature: Candidature = load_candidature(persistence, candidature_id)?;
    let assignment: ConceptAssignment = load_assignment(persistence, candidature.assignment_id)?;

    let result = apply_candidature(
        &candidature,
        assignment.state,
        event,
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let new_version: i64 = persistence
        .update_candidature_if_version(
            &result.candidature,
            candidature.version,
            &result.audit_event,
            now,
        )
        .map_err(translate_persistence_error)?;

    let mut updated: Candidature = result.candidature;
    updated.version = new_version;
    Ok(updated)
}

/// Replaces a candidature's answer payload while it is still `Editing`.
///
/// # Errors
///
/// Returns an error if the candidature left `Editing`, the assignment is
/// no longer `Active`, or a concurrent writer advanced the record.
pub fn update_candidature(
    persistence: &mut Persistence,
    request: UpdateCandidatureRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<CandidatureResponse, ApiError> {
    AuthorizationService::authorize_candidature_action(actor, "update_candidature")?;

    let updated: Candidature = apply_candidature_and_persist(
        persistence,
        request.candidature_id,
        &CandidatureEvent::UpdateContent(request.content),
        actor,
        cause,
        clock.now(),
    )?;

    CandidatureResponse::from_candidature(&updated)
}

/// Hands a candidature in: `Editing` to `Submitted`.
///
/// # Errors
///
/// Returns an error if the candidature is not `Editing`, the assignment
/// is no longer `Active`, or a concurrent writer advanced the record.
pub fn submit_candidature(
    persistence: &mut Persistence,
    candidature_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<CandidatureResponse, ApiError> {
    AuthorizationService::authorize_candidature_action(actor, "submit_candidature")?;

    let updated: Candidature = apply_candidature_and_persist(
        persistence,
        candidature_id,
        &CandidatureEvent::Submit,
        actor,
        cause,
        clock.now(),
    )?;

    info!(candidature_id, "Submitted candidature");
    CandidatureResponse::from_candidature(&updated)
}

/// Withdraws a submitted candidature while the assignment is still
/// `Active`.
///
/// # Errors
///
/// Returns an error if the candidature is not `Submitted`, the window
/// already closed, or a concurrent writer advanced the record.
pub fn revoke_candidature(
    persistence: &mut Persistence,
    candidature_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<CandidatureResponse, ApiError> {
    AuthorizationService::authorize_candidature_action(actor, "revoke_candidature")?;

    let updated: Candidature = apply_candidature_and_persist(
        persistence,
        candidature_id,
        &CandidatureEvent::Revoke,
        actor,
        cause,
        clock.now(),
    )?;

    info!(candidature_id, "Revoked candidature");
    CandidatureResponse::from_candidature(&updated)
}

/// Decides a submitted candidature during review.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the decision
/// string is unknown, the assignment is not `Review`, or a concurrent
/// writer advanced the record.
pub fn decide_candidature(
    persistence: &mut Persistence,
    request: &DecideCandidatureRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    clock: &dyn Clock,
) -> Result<DecideCandidatureResponse, ApiError> {
    AuthorizationService::authorize_decision(actor)?;

    let event: CandidatureEvent = match request.decision.to_lowercase().as_str() {
        "grant" => CandidatureEvent::Grant,
        "reject" => CandidatureEvent::Reject,
        other => {
            return Err(ApiError::InvalidInput {
                field: String::from("decision"),
                message: format!("'{other}' is not a decision (expected 'grant' or 'reject')"),
            });
        }
    };

    let updated: Candidature = apply_candidature_and_persist(
        persistence,
        request.candidature_id,
        &event,
        actor,
        cause,
        clock.now(),
    )?;
    let remaining: usize = persistence
        .count_undecided_candidatures(updated.assignment_id)
        .map_err(translate_persistence_error)?;

    info!(
        candidature_id = request.candidature_id,
        decision = %request.decision,
        remaining_undecided = remaining,
        "Decided candidature"
    );
    Ok(DecideCandidatureResponse {
        candidature: CandidatureResponse::from_candidature(&updated)?,
        remaining_undecided: remaining,
    })
}

// ============================================================================
// Read side
// ============================================================================

/// Loads a single assignment.
///
/// # Errors
///
/// Returns an error if the assignment does not exist.
pub fn get_assignment(
    persistence: &mut Persistence,
    assignment_id: i64,
) -> Result<AssignmentResponse, ApiError> {
    let assignment: ConceptAssignment = load_assignment(persistence, assignment_id)?;
    AssignmentResponse::from_assignment(&assignment)
}

/// Lists all assignments, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_assignments(persistence: &mut Persistence) -> Result<Vec<AssignmentResponse>, ApiError> {
    persistence
        .list_assignments()
        .map_err(translate_persistence_error)?
        .iter()
        .map(AssignmentResponse::from_assignment)
        .collect()
}

/// Lists all candidatures for an assignment, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_candidatures(
    persistence: &mut Persistence,
    assignment_id: i64,
) -> Result<Vec<CandidatureResponse>, ApiError> {
    persistence
        .list_candidatures_for_assignment(assignment_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(CandidatureResponse::from_candidature)
        .collect()
}

/// Retrieves the ordered audit timeline for an assignment.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_audit_timeline(
    persistence: &mut Persistence,
    assignment_id: i64,
) -> Result<Vec<AuditEventInfo>, ApiError> {
    Ok(persistence
        .get_audit_timeline(assignment_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(AuditEventInfo::from_event)
        .collect())
}
