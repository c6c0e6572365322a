// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Concept assignment mutations.
//!
//! Every write is guarded by an optimistic version check: the `UPDATE`
//! filters on the version read at load time and bumps it by one. Zero
//! affected rows means another writer (scheduler or administrator) got
//! there first; the caller receives `StaleVersion` and must reload.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;
use vergabe_audit::AuditEvent;
use vergabe_domain::{ConceptAssignment, ParcelRef};

use crate::backend::PersistenceBackend;
use crate::data_models::{NewAssignmentRow, NewAuditEventRow, NewParcelRow, window_columns};
use crate::diesel_schema::{assignment_parcels, audit_events, candidatures, concept_assignments};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a new draft assignment with its parcels.
///
/// The audit event is written in the same transaction, scoped to the
/// freshly assigned ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment` - The draft to insert
/// * `audit` - The audit event recording the creation
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The assignment ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_assignment(
    conn: &mut _,
    assignment: &ConceptAssignment,
    audit: &AuditEvent,
    now: &str,
) -> Result<i64, PersistenceError> {
    conn.transaction(|conn| {
        diesel::insert_into(concept_assignments::table)
            .values(&NewAssignmentRow::from_assignment(assignment, now)?)
            .execute(conn)?;
        let assignment_id: i64 = conn.last_insert_id()?;

        for parcel in &assignment.parcels {
            diesel::insert_into(assignment_parcels::table)
                .values(&NewParcelRow {
                    assignment_id,
                    parcel_ref: parcel.value(),
                })
                .execute(conn)?;
        }

        let mut scoped: AuditEvent = audit.clone();
        scoped.assignment_id = Some(assignment_id);
        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(&scoped, now))
            .execute(conn)?;

        debug!(assignment_id, "Inserted draft assignment");
        Ok(assignment_id)
    })
}
}

backend_fn! {
/// Persists a transitioned assignment under an optimistic version check.
///
/// Updates the lifecycle columns (state, window, version, `updated_at`)
/// and writes the audit event in the same transaction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment` - The assignment after the transition
/// * `expected_version` - The version read at load time
/// * `audit` - The audit event recording the transition
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The new version of the assignment.
///
/// # Errors
///
/// Returns `StaleVersion` if another writer advanced the record first,
/// `NotFound` if the record no longer exists.
pub fn update_assignment_if_version(
    conn: &mut _,
    assignment: &ConceptAssignment,
    expected_version: i64,
    audit: &AuditEvent,
    now: &str,
) -> Result<i64, PersistenceError> {
    let assignment_id: i64 = assignment.assignment_id.ok_or_else(|| {
        PersistenceError::ReconstructionError(String::from(
            "Cannot update an assignment that was never persisted",
        ))
    })?;

    conn.transaction(|conn| {
        let (start, end) = window_columns(assignment)?;
        let affected: usize = diesel::update(
            concept_assignments::table
                .filter(concept_assignments::assignment_id.eq(assignment_id))
                .filter(concept_assignments::version.eq(expected_version)),
        )
        .set((
            concept_assignments::state.eq(assignment.state.as_str()),
            concept_assignments::assignment_start.eq(start),
            concept_assignments::assignment_end.eq(end),
            concept_assignments::version.eq(expected_version + 1),
            concept_assignments::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        if affected == 0 {
            let exists: i64 = concept_assignments::table
                .filter(concept_assignments::assignment_id.eq(assignment_id))
                .count()
                .get_result(conn)?;
            return Err(if exists > 0 {
                PersistenceError::StaleVersion {
                    entity: "assignment",
                    id: assignment_id,
                }
            } else {
                PersistenceError::NotFound(format!("Assignment {assignment_id} does not exist"))
            });
        }

        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(audit, now))
            .execute(conn)?;

        Ok(expected_version + 1)
    })
}
}

backend_fn! {
/// Replaces the parcel set of a draft assignment.
///
/// Only drafts may have their parcels re-chosen; this is how a forked
/// redraft becomes startable.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
/// * `expected_version` - The version read at load time
/// * `parcels` - The new parcel set
/// * `audit` - The audit event recording the change
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The new version of the assignment.
///
/// # Errors
///
/// Returns `NotADraft` if the assignment left `DRAFT`, `StaleVersion` on
/// a lost version race, `NotFound` if the record does not exist.
pub fn update_draft_parcels(
    conn: &mut _,
    assignment_id: i64,
    expected_version: i64,
    parcels: &[ParcelRef],
    audit: &AuditEvent,
    now: &str,
) -> Result<i64, PersistenceError> {
    conn.transaction(|conn| {
        let state: Option<String> = concept_assignments::table
            .filter(concept_assignments::assignment_id.eq(assignment_id))
            .select(concept_assignments::state)
            .first::<String>(conn)
            .optional()?;
        match state {
            None => {
                return Err(PersistenceError::NotFound(format!(
                    "Assignment {assignment_id} does not exist"
                )));
            }
            Some(state) if state != "DRAFT" => {
                return Err(PersistenceError::NotADraft {
                    assignment_id,
                    state,
                });
            }
            Some(_) => {}
        }

        let affected: usize = diesel::update(
            concept_assignments::table
                .filter(concept_assignments::assignment_id.eq(assignment_id))
                .filter(concept_assignments::version.eq(expected_version)),
        )
        .set((
            concept_assignments::version.eq(expected_version + 1),
            concept_assignments::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        if affected == 0 {
            return Err(PersistenceError::StaleVersion {
                entity: "assignment",
                id: assignment_id,
            });
        }

        diesel::delete(
            assignment_parcels::table
                .filter(assignment_parcels::assignment_id.eq(assignment_id)),
        )
        .execute(conn)?;
        for parcel in parcels {
            diesel::insert_into(assignment_parcels::table)
                .values(&NewParcelRow {
                    assignment_id,
                    parcel_ref: parcel.value(),
                })
                .execute(conn)?;
        }

        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(audit, now))
            .execute(conn)?;

        Ok(expected_version + 1)
    })
}
}

backend_fn! {
/// Hard-deletes a draft assignment.
///
/// The only hard delete in the system; anything past `DRAFT` persists
/// forever. The audit event survives the row it describes.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
/// * `audit` - The audit event recording the deletion
/// * `now` - The current instant in storage form
///
/// # Errors
///
/// Returns `NotADraft` if the assignment left `DRAFT`, `NotFound` if it
/// does not exist.
pub fn delete_draft_assignment(
    conn: &mut _,
    assignment_id: i64,
    audit: &AuditEvent,
    now: &str,
) -> Result<(), PersistenceError> {
    conn.transaction(|conn| {
        let state: Option<String> = concept_assignments::table
            .filter(concept_assignments::assignment_id.eq(assignment_id))
            .select(concept_assignments::state)
            .first::<String>(conn)
            .optional()?;
        match state {
            None => {
                return Err(PersistenceError::NotFound(format!(
                    "Assignment {assignment_id} does not exist"
                )));
            }
            Some(state) if state != "DRAFT" => {
                return Err(PersistenceError::NotADraft {
                    assignment_id,
                    state,
                });
            }
            Some(_) => {}
        }

        diesel::delete(
            assignment_parcels::table
                .filter(assignment_parcels::assignment_id.eq(assignment_id)),
        )
        .execute(conn)?;
        diesel::delete(
            concept_assignments::table
                .filter(concept_assignments::assignment_id.eq(assignment_id)),
        )
        .execute(conn)?;

        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(audit, now))
            .execute(conn)?;

        debug!(assignment_id, "Deleted draft assignment");
        Ok(())
    })
}
}

backend_fn! {
/// Aborts an assignment and force-rejects its open candidatures.
///
/// One transaction covers the version-checked abort, the candidature
/// cascade, and the audit event. A failure anywhere leaves everything
/// unchanged.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment` - The assignment after the abort transition
/// * `expected_version` - The version read at load time
/// * `audit` - The audit event recording the abort
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The new version and the number of force-rejected candidatures.
///
/// # Errors
///
/// Returns `StaleVersion` if another writer advanced the record first.
pub fn abort_with_cascade(
    conn: &mut _,
    assignment: &ConceptAssignment,
    expected_version: i64,
    audit: &AuditEvent,
    now: &str,
) -> Result<(i64, usize), PersistenceError> {
    let assignment_id: i64 = assignment.assignment_id.ok_or_else(|| {
        PersistenceError::ReconstructionError(String::from(
            "Cannot abort an assignment that was never persisted",
        ))
    })?;

    conn.transaction(|conn| {
        let (start, end) = window_columns(assignment)?;
        let affected: usize = diesel::update(
            concept_assignments::table
                .filter(concept_assignments::assignment_id.eq(assignment_id))
                .filter(concept_assignments::version.eq(expected_version)),
        )
        .set((
            concept_assignments::state.eq(assignment.state.as_str()),
            concept_assignments::assignment_start.eq(start),
            concept_assignments::assignment_end.eq(end),
            concept_assignments::version.eq(expected_version + 1),
            concept_assignments::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        if affected == 0 {
            return Err(PersistenceError::StaleVersion {
                entity: "assignment",
                id: assignment_id,
            });
        }

        let rejected: usize = diesel::update(
            candidatures::table
                .filter(candidatures::assignment_id.eq(assignment_id))
                .filter(candidatures::state.eq_any(["EDITING", "SUBMITTED"])),
        )
        .set((
            candidatures::state.eq("REJECTED"),
            candidatures::version.eq(candidatures::version + 1),
            candidatures::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(audit, now))
            .execute(conn)?;

        debug!(assignment_id, rejected, "Aborted assignment with cascade");
        Ok((expected_version + 1, rejected))
    })
}
}

backend_fn! {
/// Aborts an assignment and creates its replacement draft atomically.
///
/// The fork operation of abort-and-redraft: the original moves to
/// `ABORTED` (with cascade), the replacement draft is inserted, and both
/// audit events are written, all in one transaction. A crash between the
/// steps can never leave one side without the other.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment` - The original after the abort transition
/// * `expected_version` - The version read at load time
/// * `fork` - The replacement draft (no parcels, copied payload)
/// * `abort_audit` - The audit event for the abort
/// * `fork_audit` - The audit event for the draft creation
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The new version of the original, the number of force-rejected
/// candidatures, and the ID of the new draft.
///
/// # Errors
///
/// Returns `StaleVersion` if another writer advanced the original first.
pub fn abort_and_redraft(
    conn: &mut _,
    assignment: &ConceptAssignment,
    expected_version: i64,
    fork: &ConceptAssignment,
    abort_audit: &AuditEvent,
    fork_audit: &AuditEvent,
    now: &str,
) -> Result<(i64, usize, i64), PersistenceError> {
    let assignment_id: i64 = assignment.assignment_id.ok_or_else(|| {
        PersistenceError::ReconstructionError(String::from(
            "Cannot abort an assignment that was never persisted",
        ))
    })?;

    conn.transaction(|conn| {
        let (start, end) = window_columns(assignment)?;
        let affected: usize = diesel::update(
            concept_assignments::table
                .filter(concept_assignments::assignment_id.eq(assignment_id))
                .filter(concept_assignments::version.eq(expected_version)),
        )
        .set((
            concept_assignments::state.eq(assignment.state.as_str()),
            concept_assignments::assignment_start.eq(start),
            concept_assignments::assignment_end.eq(end),
            concept_assignments::version.eq(expected_version + 1),
            concept_assignments::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        if affected == 0 {
            return Err(PersistenceError::StaleVersion {
                entity: "assignment",
                id: assignment_id,
            });
        }

        let rejected: usize = diesel::update(
            candidatures::table
                .filter(candidatures::assignment_id.eq(assignment_id))
                .filter(candidatures::state.eq_any(["EDITING", "SUBMITTED"])),
        )
        .set((
            candidatures::state.eq("REJECTED"),
            candidatures::version.eq(candidatures::version + 1),
            candidatures::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        diesel::insert_into(concept_assignments::table)
            .values(&NewAssignmentRow::from_assignment(fork, now)?)
            .execute(conn)?;
        let fork_id: i64 = conn.last_insert_id()?;

        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(abort_audit, now))
            .execute(conn)?;

        let mut scoped: AuditEvent = fork_audit.clone();
        scoped.assignment_id = Some(fork_id);
        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(&scoped, now))
            .execute(conn)?;

        debug!(
            assignment_id,
            fork_id, rejected, "Aborted assignment and created replacement draft"
        );
        Ok((expected_version + 1, rejected, fork_id))
    })
}
}
