// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The lease-based scan lock.
//!
//! Any number of fleet instances contend for a named lock row; whoever
//! claims it owns the scan until the lease expires. Claiming is a single
//! transaction against the durable store, so two instances can never both
//! hold the lock within one lease window. An instance that crashes simply
//! lets its lease run out; there is no explicit cancel.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::NewLockRow;
use crate::diesel_schema::scheduler_locks;
use crate::error::PersistenceError;

backend_fn! {
/// Attempts to claim the named lock until `locked_until`.
///
/// The claim succeeds when the row is absent, its lease has expired, or
/// the caller already holds it (re-entrant renewal). Timestamps are
/// whole-second UTC RFC 3339 strings, so the TEXT comparison is
/// chronological.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lock_name` - The lock identifier
/// * `holder` - The instance attempting the claim
/// * `now` - The current instant in storage form
/// * `locked_until` - The lease expiry in storage form
///
/// # Returns
///
/// `true` if the caller now holds the lock, `false` if another live
/// holder kept it. Losing the claim is expected steady-state behavior in
/// a multi-instance deployment, not an error.
///
/// # Errors
///
/// Returns an error only for real database failures.
pub fn try_acquire_scan_lock(
    conn: &mut _,
    lock_name: &str,
    holder: &str,
    now: &str,
    locked_until: &str,
) -> Result<bool, PersistenceError> {
    conn.transaction(|conn| {
        let claimed: usize = diesel::update(
            scheduler_locks::table
                .filter(scheduler_locks::lock_name.eq(lock_name))
                .filter(
                    scheduler_locks::locked_until
                        .le(now)
                        .or(scheduler_locks::locked_by.eq(holder)),
                ),
        )
        .set((
            scheduler_locks::locked_by.eq(holder),
            scheduler_locks::locked_until.eq(locked_until),
        ))
        .execute(conn)?;

        if claimed == 1 {
            debug!(lock_name, holder, locked_until, "Renewed scan lock");
            return Ok(true);
        }

        let existing: i64 = scheduler_locks::table
            .filter(scheduler_locks::lock_name.eq(lock_name))
            .count()
            .get_result(conn)?;
        if existing > 0 {
            // A live holder kept the row.
            return Ok(false);
        }

        match diesel::insert_into(scheduler_locks::table)
            .values(&NewLockRow {
                lock_name,
                locked_by: holder,
                locked_until,
            })
            .execute(conn)
        {
            Ok(_) => {
                debug!(lock_name, holder, locked_until, "Acquired scan lock");
                Ok(true)
            }
            // Another instance inserted between our check and our insert.
            Err(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => Ok(false),
            Err(e) => Err(e.into()),
        }
    })
}
}

backend_fn! {
/// Releases the named lock if the caller still holds it.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lock_name` - The lock identifier
/// * `holder` - The instance releasing the lock
///
/// # Returns
///
/// `true` if the lock was released, `false` if the caller no longer held
/// it (the lease expired and someone else claimed it).
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn release_scan_lock(
    conn: &mut _,
    lock_name: &str,
    holder: &str,
) -> Result<bool, PersistenceError> {
    let released: usize = diesel::delete(
        scheduler_locks::table
            .filter(scheduler_locks::lock_name.eq(lock_name))
            .filter(scheduler_locks::locked_by.eq(holder)),
    )
    .execute(conn)?;

    Ok(released == 1)
}
}

backend_fn! {
/// Reads the current holder and expiry of the named lock.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lock_name` - The lock identifier
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_scan_lock(
    conn: &mut _,
    lock_name: &str,
) -> Result<Option<(String, String)>, PersistenceError> {
    Ok(scheduler_locks::table
        .filter(scheduler_locks::lock_name.eq(lock_name))
        .select((scheduler_locks::locked_by, scheduler_locks::locked_until))
        .first::<(String, String)>(conn)
        .optional()?)
}
}
