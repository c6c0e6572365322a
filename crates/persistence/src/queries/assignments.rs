// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Concept assignment queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use vergabe_domain::ConceptAssignment;

use crate::data_models::{AssignmentRow, assignment_from_row};
use crate::diesel_schema::{assignment_parcels, concept_assignments};
use crate::error::PersistenceError;

backend_fn! {
/// Loads a single assignment with its parcels and current version.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
///
/// # Errors
///
/// Returns an error if the assignment does not exist or cannot be
/// reconstructed.
pub fn get_assignment(
    conn: &mut _,
    assignment_id: i64,
) -> Result<ConceptAssignment, PersistenceError> {
    let row: Option<AssignmentRow> = concept_assignments::table
        .filter(concept_assignments::assignment_id.eq(assignment_id))
        .select((
            concept_assignments::assignment_id,
            concept_assignments::assignment_type,
            concept_assignments::state,
            concept_assignments::assignment_start,
            concept_assignments::assignment_end,
            concept_assignments::details,
            concept_assignments::questions_json,
            concept_assignments::attachments_json,
            concept_assignments::version,
        ))
        .first::<AssignmentRow>(conn)
        .optional()?;

    let row: AssignmentRow = row.ok_or_else(|| {
        PersistenceError::NotFound(format!("Assignment {assignment_id} does not exist"))
    })?;

    let parcels: Vec<String> = assignment_parcels::table
        .filter(assignment_parcels::assignment_id.eq(assignment_id))
        .order(assignment_parcels::parcel_row_id.asc())
        .select(assignment_parcels::parcel_ref)
        .load::<String>(conn)?;

    assignment_from_row(row, parcels)
}
}

backend_fn! {
/// Lists all assignments, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_assignments(conn: &mut _) -> Result<Vec<ConceptAssignment>, PersistenceError> {
    let rows: Vec<AssignmentRow> = concept_assignments::table
        .order(concept_assignments::assignment_id.asc())
        .select((
            concept_assignments::assignment_id,
            concept_assignments::assignment_type,
            concept_assignments::state,
            concept_assignments::assignment_start,
            concept_assignments::assignment_end,
            concept_assignments::details,
            concept_assignments::questions_json,
            concept_assignments::attachments_json,
            concept_assignments::version,
        ))
        .load::<AssignmentRow>(conn)?;

    rows.into_iter()
        .map(|row| {
            let assignment_id: i64 = row.0;
            let parcels: Vec<String> = assignment_parcels::table
                .filter(assignment_parcels::assignment_id.eq(assignment_id))
                .order(assignment_parcels::parcel_row_id.asc())
                .select(assignment_parcels::parcel_ref)
                .load::<String>(conn)?;
            assignment_from_row(row, parcels)
        })
        .collect()
}
}

backend_fn! {
/// Lists assignments with a due time-triggered transition.
///
/// An assignment is due when it is `WAITING` and its start has passed, or
/// `ACTIVE` and its end has passed. Stored timestamps are whole-second
/// UTC RFC 3339 strings, so the TEXT comparison is chronological.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `now` - The current instant in storage form
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_due_assignments(
    conn: &mut _,
    now: &str,
) -> Result<Vec<ConceptAssignment>, PersistenceError> {
    let select_columns = (
        concept_assignments::assignment_id,
        concept_assignments::assignment_type,
        concept_assignments::state,
        concept_assignments::assignment_start,
        concept_assignments::assignment_end,
        concept_assignments::details,
        concept_assignments::questions_json,
        concept_assignments::attachments_json,
        concept_assignments::version,
    );

    let mut rows: Vec<AssignmentRow> = concept_assignments::table
        .filter(concept_assignments::state.eq("WAITING"))
        .filter(concept_assignments::assignment_start.le(now))
        .order(concept_assignments::assignment_id.asc())
        .select(select_columns)
        .load::<AssignmentRow>(conn)?;

    let closing: Vec<AssignmentRow> = concept_assignments::table
        .filter(concept_assignments::state.eq("ACTIVE"))
        .filter(concept_assignments::assignment_end.le(now))
        .order(concept_assignments::assignment_id.asc())
        .select(select_columns)
        .load::<AssignmentRow>(conn)?;
    rows.extend(closing);

    rows.into_iter()
        .map(|row| {
            let assignment_id: i64 = row.0;
            let parcels: Vec<String> = assignment_parcels::table
                .filter(assignment_parcels::assignment_id.eq(assignment_id))
                .order(assignment_parcels::parcel_row_id.asc())
                .select(assignment_parcels::parcel_ref)
                .load::<String>(conn)?;
            assignment_from_row(row, parcels)
        })
        .collect()
}
}
