// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use vergabe_audit::AuditEvent;

use crate::data_models::{AuditEventRow, audit_event_from_row};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves an audit event by ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event_id` - The event ID to retrieve
///
/// # Errors
///
/// Returns an error if the event is not found.
pub fn get_audit_event(conn: &mut _, event_id: i64) -> Result<AuditEvent, PersistenceError> {
    let row: Option<AuditEventRow> = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select((
            audit_events::event_id,
            audit_events::assignment_id,
            audit_events::candidature_id,
            audit_events::actor_id,
            audit_events::actor_type,
            audit_events::cause_id,
            audit_events::cause_description,
            audit_events::action_name,
            audit_events::action_details,
            audit_events::before_snapshot,
            audit_events::after_snapshot,
        ))
        .first::<AuditEventRow>(conn)
        .optional()?;

    let row: AuditEventRow = row.ok_or_else(|| {
        PersistenceError::NotFound(format!("Audit event {event_id} does not exist"))
    })?;

    Ok(audit_event_from_row(row))
}
}

backend_fn! {
/// Retrieves the ordered audit timeline for an assignment.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_audit_timeline(
    conn: &mut _,
    assignment_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::assignment_id.eq(assignment_id))
        .order(audit_events::event_id.asc())
        .select((
            audit_events::event_id,
            audit_events::assignment_id,
            audit_events::candidature_id,
            audit_events::actor_id,
            audit_events::actor_type,
            audit_events::cause_id,
            audit_events::cause_description,
            audit_events::action_name,
            audit_events::action_details,
            audit_events::before_snapshot,
            audit_events::after_snapshot,
        ))
        .load::<AuditEventRow>(conn)?;

    Ok(rows.into_iter().map(audit_event_from_row).collect())
}
}
