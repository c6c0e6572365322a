// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use vergabe_audit::AuditEvent;

use crate::backend::PersistenceBackend;
use crate::data_models::NewAuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

backend_fn! {
/// Persists a standalone audit event.
///
/// Compound mutations insert their audit rows inside their own
/// transaction; this entry point exists for events with no accompanying
/// state write (e.g., recording a hard delete).
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event` - The audit event to persist
/// * `created_at` - The current instant in storage form
///
/// # Returns
///
/// The event ID assigned to the persisted audit event.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn persist_audit_event(
    conn: &mut _,
    event: &AuditEvent,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(audit_events::table)
        .values(&NewAuditEventRow::from_event(event, created_at))
        .execute(conn)?;

    conn.last_insert_id()
}
}
