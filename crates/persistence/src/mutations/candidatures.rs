// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidature mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;
use vergabe_audit::AuditEvent;
use vergabe_domain::Candidature;

use crate::backend::PersistenceBackend;
use crate::data_models::{NewAuditEventRow, NewCandidatureRow};
use crate::diesel_schema::{audit_events, candidatures};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a new candidature.
///
/// The audit event is written in the same transaction, scoped to the
/// freshly assigned ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `candidature` - The candidature to insert
/// * `audit` - The audit event recording the creation
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The candidature ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails (including a violated
/// one-per-applicant unique constraint).
pub fn insert_candidature(
    conn: &mut _,
    candidature: &Candidature,
    audit: &AuditEvent,
    now: &str,
) -> Result<i64, PersistenceError> {
    conn.transaction(|conn| {
        diesel::insert_into(candidatures::table)
            .values(&NewCandidatureRow::from_candidature(candidature, now))
            .execute(conn)?;
        let candidature_id: i64 = conn.last_insert_id()?;

        let mut scoped: AuditEvent = audit.clone();
        scoped.candidature_id = Some(candidature_id);
        diesel::insert_into(audit_events::table)
            .values(&NewAuditEventRow::from_event(&scoped, now))
            .execute(conn)?;

        debug!(candidature_id, "Inserted candidature");
        Ok(candidature_id)
    })
}
}

backend_fn! {
/// Persists a transitioned candidature under an optimistic version check.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `candidature` - The candidature after the transition
/// * `expected_version` - The version read at load time
/// * `audit` - The audit event recording the transition
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The new version of the candidature.
///
/// # Errors
///
/// Returns `StaleVersion` if another writer advanced the record first,
/// `NotFound` if the record no longer exists.
pub fn update_candidature_if_version(
    conn: &mut _,
    candidature: &Candidature,
    expected_version: i64,
    audit: &AuditEvent,
    now: &str,
) -> Result<i64, PersistenceError> {
    let candidature_id: i64 = candidature.candidature_id.ok_or_else(|| {
        PersistenceError::ReconstructionError(String::from(
            "Cannot update a candidature that was never persisted",
        ))
    })?;

    conn.transaction(|conn| {
        let affected: usize = diesel::update(
            candidatures::table
                .filter(candidatures::candidature_id.eq(candidature_id))
                .filter(candidatures::version.eq(expected_version)),
        )
        .set((
            candidatures::state.eq(candidature.state.as_str()),
            candidatures::content.eq(&candidature.content),
            candidatures::version.eq(expected_version + 1),
            candidatures::updated_at.eq(Some(now.to_string())),
        ))
        .execute(conn)?;

        if affected == 0 {
            let exists: i64 = candidatures::table
                .filter(candidatures::candidature_id.eq(candidature_id))
                .count()
                .get_result(conn)?;
            return Err(if exists > 0 {
                PersistenceError::StaleVersion {
                    entity: "candidature",
                    id: candidature_id,
                }
            } else {
                PersistenceError::NotFound(format!(
                    "Candidature {candidature_id} does not exist"
                ))
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
/// Force-rejects all open candidatures of an assignment.
///
/// The standalone form of the abort cascade. The abort mutations run the
/// same statement inside their own transaction; this entry point exists
/// for collaborators that only need the cascade.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment whose open candidatures to reject
/// * `now` - The current instant in storage form
///
/// # Returns
///
/// The number of candidatures transitioned to `REJECTED`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn reject_open_candidatures(
    conn: &mut _,
    assignment_id: i64,
    now: &str,
) -> Result<usize, PersistenceError> {
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

    debug!(assignment_id, rejected, "Force-rejected open candidatures");
    Ok(rejected)
}
}
