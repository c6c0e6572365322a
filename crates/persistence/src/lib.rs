// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Vergabe concept-assignment system.
//!
//! This crate provides database persistence for concept assignments,
//! candidatures, the scheduler's lease lock, and audit events. It is
//! built on Diesel and supports multiple database backends.
//!
//! ## Database Backend Support
//!
//! - **`SQLite`** (default) — development, unit tests, and integration
//!   tests. Always available, no external infrastructure.
//! - **`MariaDB`/`MySQL`** — compiled by default, validated via explicit
//!   opt-in tests marked `#[ignore]` that expect a prepared server behind
//!   `DATABASE_URL`.
//!
//! ## Migration Strategy
//!
//! Due to `SQL` syntax differences between backends, migrations live in
//! two schema-equivalent directories:
//!
//! - `migrations/` — `SQLite` syntax (default)
//! - `migrations_mysql/` — `MySQL`/`MariaDB` syntax
//!
//! ## Concurrency Model
//!
//! Every mutation of an assignment or candidature is a compare-and-set on
//! the record's `version` column. The scheduler's scan lock is a lease
//! row claimed atomically in the same store. There are no in-process
//! locks; gateway and scheduler may run in different processes.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::{MysqlConnection, SqliteConnection};
use time::{Duration, OffsetDateTime};
use vergabe_audit::AuditEvent;
use vergabe_domain::{ApplicantRef, Candidature, ConceptAssignment, ParcelRef};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so
/// test databases never collide regardless of timing.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Macro to generate monomorphic backend-specific query/mutation functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_mysql` taking `&mut MysqlConnection`
///
/// This approach is required because Diesel's type system requires
/// concrete backend types at compile time and cannot handle generic
/// backend functions without unwieldy bounds.
///
/// # Constraints
///
/// - The macro ONLY duplicates function bodies and substitutes connection
///   types
/// - No logic, branching, or dispatch occurs within the macro
/// - Backend dispatch happens exclusively in the `Persistence` adapter
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            // Generate SQLite version
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            // Generate MySQL version
            $(#[$meta])*
            $vis fn [<$name _mysql>] (
                $conn: &mut MysqlConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

use data_models::storage_timestamp;

/// Internal enum for backend-specific database connections.
pub enum BackendConnection {
    Sqlite(SqliteConnection),
    Mysql(MysqlConnection),
}

/// Persistence adapter for assignments, candidatures, locks, and audit
/// events.
///
/// Backend selection happens once at construction time and is transparent
/// to callers.
pub struct Persistence {
    pub(crate) conn: BackendConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via an atomic
    /// counter, ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("vergabe_memdb_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a `MySQL`/`MariaDB`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `database_url` - The `MySQL` connection URL
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_mysql(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: MysqlConnection = backend::mysql::initialize_database(database_url)?;
        backend::mysql::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Mysql(conn),
        })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        use backend::PersistenceBackend;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.verify_foreign_key_enforcement(),
            BackendConnection::Mysql(conn) => conn.verify_foreign_key_enforcement(),
        }
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    /// Inserts a new draft assignment with its parcels and creation audit
    /// event.
    ///
    /// # Returns
    ///
    /// The assignment ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn create_assignment(
        &mut self,
        assignment: &ConceptAssignment,
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::assignments::insert_assignment_sqlite(conn, assignment, audit, &now_str)
            }
            BackendConnection::Mysql(conn) => {
                mutations::assignments::insert_assignment_mysql(conn, assignment, audit, &now_str)
            }
        }
    }

    /// Loads an assignment with its parcels and current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment does not exist.
    pub fn get_assignment(&mut self, assignment_id: i64) -> Result<ConceptAssignment, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::assignments::get_assignment_sqlite(conn, assignment_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::assignments::get_assignment_mysql(conn, assignment_id)
            }
        }
    }

    /// Lists all assignments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_assignments(&mut self) -> Result<Vec<ConceptAssignment>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::assignments::list_assignments_sqlite(conn),
            BackendConnection::Mysql(conn) => queries::assignments::list_assignments_mysql(conn),
        }
    }

    /// Lists assignments whose time-triggered transition is due.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_due_assignments(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<Vec<ConceptAssignment>, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::assignments::list_due_assignments_sqlite(conn, &now_str)
            }
            BackendConnection::Mysql(conn) => {
                queries::assignments::list_due_assignments_mysql(conn, &now_str)
            }
        }
    }

    /// Persists a transitioned assignment under an optimistic version
    /// check, writing the audit event in the same transaction.
    ///
    /// # Returns
    ///
    /// The new version of the assignment.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::StaleVersion`] if another writer
    /// advanced the record first.
    pub fn update_assignment_if_version(
        &mut self,
        assignment: &ConceptAssignment,
        expected_version: i64,
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::assignments::update_assignment_if_version_sqlite(
                    conn,
                    assignment,
                    expected_version,
                    audit,
                    &now_str,
                )
            }
            BackendConnection::Mysql(conn) => {
                mutations::assignments::update_assignment_if_version_mysql(
                    conn,
                    assignment,
                    expected_version,
                    audit,
                    &now_str,
                )
            }
        }
    }

    /// Replaces the parcel set of a draft assignment.
    ///
    /// # Returns
    ///
    /// The new version of the assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment is not a draft or the version
    /// check fails.
    pub fn update_draft_parcels(
        &mut self,
        assignment_id: i64,
        expected_version: i64,
        parcels: &[ParcelRef],
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::assignments::update_draft_parcels_sqlite(
                    conn,
                    assignment_id,
                    expected_version,
                    parcels,
                    audit,
                    &now_str,
                )
            }
            BackendConnection::Mysql(conn) => mutations::assignments::update_draft_parcels_mysql(
                conn,
                assignment_id,
                expected_version,
                parcels,
                audit,
                &now_str,
            ),
        }
    }

    /// Hard-deletes a draft assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment is not a draft or does not
    /// exist.
    pub fn delete_draft_assignment(
        &mut self,
        assignment_id: i64,
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::assignments::delete_draft_assignment_sqlite(
                    conn,
                    assignment_id,
                    audit,
                    &now_str,
                )
            }
            BackendConnection::Mysql(conn) => {
                mutations::assignments::delete_draft_assignment_mysql(
                    conn,
                    assignment_id,
                    audit,
                    &now_str,
                )
            }
        }
    }

    /// Aborts an assignment and force-rejects its open candidatures in
    /// one transaction.
    ///
    /// # Returns
    ///
    /// The new version and the number of force-rejected candidatures.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::StaleVersion`] if another writer
    /// advanced the record first; the whole unit rolls back.
    pub fn abort_assignment(
        &mut self,
        assignment: &ConceptAssignment,
        expected_version: i64,
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<(i64, usize), PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::assignments::abort_with_cascade_sqlite(
                conn,
                assignment,
                expected_version,
                audit,
                &now_str,
            ),
            BackendConnection::Mysql(conn) => mutations::assignments::abort_with_cascade_mysql(
                conn,
                assignment,
                expected_version,
                audit,
                &now_str,
            ),
        }
    }

    /// Aborts an assignment and creates its replacement draft atomically.
    ///
    /// # Returns
    ///
    /// The new version of the original, the number of force-rejected
    /// candidatures, and the ID of the new draft.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::StaleVersion`] if another writer
    /// advanced the original first; the whole unit rolls back.
    #[allow(clippy::too_many_arguments)]
    pub fn abort_and_redraft(
        &mut self,
        assignment: &ConceptAssignment,
        expected_version: i64,
        fork: &ConceptAssignment,
        abort_audit: &AuditEvent,
        fork_audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<(i64, usize, i64), PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::assignments::abort_and_redraft_sqlite(
                conn,
                assignment,
                expected_version,
                fork,
                abort_audit,
                fork_audit,
                &now_str,
            ),
            BackendConnection::Mysql(conn) => mutations::assignments::abort_and_redraft_mysql(
                conn,
                assignment,
                expected_version,
                fork,
                abort_audit,
                fork_audit,
                &now_str,
            ),
        }
    }

    // ========================================================================
    // Candidatures
    // ========================================================================

    /// Inserts a new candidature with its creation audit event.
    ///
    /// # Returns
    ///
    /// The candidature ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn create_candidature(
        &mut self,
        candidature: &Candidature,
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::candidatures::insert_candidature_sqlite(
                conn,
                candidature,
                audit,
                &now_str,
            ),
            BackendConnection::Mysql(conn) => mutations::candidatures::insert_candidature_mysql(
                conn,
                candidature,
                audit,
                &now_str,
            ),
        }
    }

    /// Loads a candidature with its current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidature does not exist.
    pub fn get_candidature(&mut self, candidature_id: i64) -> Result<Candidature, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::candidatures::get_candidature_sqlite(conn, candidature_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::candidatures::get_candidature_mysql(conn, candidature_id)
            }
        }
    }

    /// Finds an applicant's candidature for an assignment, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_candidature_for_applicant(
        &mut self,
        assignment_id: i64,
        applicant: &ApplicantRef,
    ) -> Result<Option<Candidature>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::candidatures::find_candidature_for_applicant_sqlite(
                    conn,
                    assignment_id,
                    applicant.value(),
                )
            }
            BackendConnection::Mysql(conn) => {
                queries::candidatures::find_candidature_for_applicant_mysql(
                    conn,
                    assignment_id,
                    applicant.value(),
                )
            }
        }
    }

    /// Lists all candidatures for an assignment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_candidatures_for_assignment(
        &mut self,
        assignment_id: i64,
    ) -> Result<Vec<Candidature>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::candidatures::list_candidatures_for_assignment_sqlite(conn, assignment_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::candidatures::list_candidatures_for_assignment_mysql(conn, assignment_id)
            }
        }
    }

    /// Counts candidatures still awaiting a decision for an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_undecided_candidatures(
        &mut self,
        assignment_id: i64,
    ) -> Result<usize, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::candidatures::count_undecided_candidatures_sqlite(conn, assignment_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::candidatures::count_undecided_candidatures_mysql(conn, assignment_id)
            }
        }
    }

    /// Persists a transitioned candidature under an optimistic version
    /// check.
    ///
    /// # Returns
    ///
    /// The new version of the candidature.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::StaleVersion`] if another writer
    /// advanced the record first.
    pub fn update_candidature_if_version(
        &mut self,
        candidature: &Candidature,
        expected_version: i64,
        audit: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::candidatures::update_candidature_if_version_sqlite(
                    conn,
                    candidature,
                    expected_version,
                    audit,
                    &now_str,
                )
            }
            BackendConnection::Mysql(conn) => {
                mutations::candidatures::update_candidature_if_version_mysql(
                    conn,
                    candidature,
                    expected_version,
                    audit,
                    &now_str,
                )
            }
        }
    }

    /// Force-rejects all open candidatures of an assignment.
    ///
    /// # Returns
    ///
    /// The number of candidatures transitioned to `REJECTED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn reject_open_candidatures(
        &mut self,
        assignment_id: i64,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::candidatures::reject_open_candidatures_sqlite(
                    conn,
                    assignment_id,
                    &now_str,
                )
            }
            BackendConnection::Mysql(conn) => {
                mutations::candidatures::reject_open_candidatures_mysql(
                    conn,
                    assignment_id,
                    &now_str,
                )
            }
        }
    }

    // ========================================================================
    // Scan lock
    // ========================================================================

    /// Attempts to claim the named scan lock for `lease` from `now`.
    ///
    /// # Returns
    ///
    /// `true` if the caller now holds the lock. `false` means another
    /// live holder kept it; that is expected steady-state behavior, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for real database failures.
    pub fn try_acquire_scan_lock(
        &mut self,
        lock_name: &str,
        holder: &str,
        now: OffsetDateTime,
        lease: Duration,
    ) -> Result<bool, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        let until_str: String = storage_timestamp(now + lease)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::locks::try_acquire_scan_lock_sqlite(
                conn, lock_name, holder, &now_str, &until_str,
            ),
            BackendConnection::Mysql(conn) => mutations::locks::try_acquire_scan_lock_mysql(
                conn, lock_name, holder, &now_str, &until_str,
            ),
        }
    }

    /// Releases the named scan lock if the caller still holds it.
    ///
    /// # Returns
    ///
    /// `true` if the lock was released.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn release_scan_lock(
        &mut self,
        lock_name: &str,
        holder: &str,
    ) -> Result<bool, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::locks::release_scan_lock_sqlite(conn, lock_name, holder)
            }
            BackendConnection::Mysql(conn) => {
                mutations::locks::release_scan_lock_mysql(conn, lock_name, holder)
            }
        }
    }

    /// Reads the current holder and expiry of the named scan lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_scan_lock(
        &mut self,
        lock_name: &str,
    ) -> Result<Option<(String, String)>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::locks::get_scan_lock_sqlite(conn, lock_name)
            }
            BackendConnection::Mysql(conn) => {
                mutations::locks::get_scan_lock_mysql(conn, lock_name)
            }
        }
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists a standalone audit event.
    ///
    /// # Returns
    ///
    /// The event ID assigned to the persisted audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(
        &mut self,
        event: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now_str: String = storage_timestamp(now)?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::audit::persist_audit_event_sqlite(conn, event, &now_str)
            }
            BackendConnection::Mysql(conn) => {
                mutations::audit::persist_audit_event_mysql(conn, event, &now_str)
            }
        }
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::audit::get_audit_event_sqlite(conn, event_id),
            BackendConnection::Mysql(conn) => queries::audit::get_audit_event_mysql(conn, event_id),
        }
    }

    /// Retrieves the ordered audit timeline for an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_audit_timeline(
        &mut self,
        assignment_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::audit::get_audit_timeline_sqlite(conn, assignment_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::audit::get_audit_timeline_mysql(conn, assignment_id)
            }
        }
    }
}
