// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidature queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::cast::ToPrimitive;
use vergabe_domain::Candidature;

use crate::data_models::{CandidatureRow, candidature_from_row};
use crate::diesel_schema::candidatures;
use crate::error::PersistenceError;

backend_fn! {
/// Loads a single candidature with its current version.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `candidature_id` - The candidature ID
///
/// # Errors
///
/// Returns an error if the candidature does not exist or cannot be
/// reconstructed.
pub fn get_candidature(
    conn: &mut _,
    candidature_id: i64,
) -> Result<Candidature, PersistenceError> {
    let row: Option<CandidatureRow> = candidatures::table
        .filter(candidatures::candidature_id.eq(candidature_id))
        .select((
            candidatures::candidature_id,
            candidatures::assignment_id,
            candidatures::applicant,
            candidatures::state,
            candidatures::content,
            candidatures::version,
        ))
        .first::<CandidatureRow>(conn)
        .optional()?;

    let row: CandidatureRow = row.ok_or_else(|| {
        PersistenceError::NotFound(format!("Candidature {candidature_id} does not exist"))
    })?;

    candidature_from_row(row)
}
}

backend_fn! {
/// Finds an applicant's candidature for an assignment, if any.
///
/// Used to enforce the one-candidature-per-applicant rule before
/// creation.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
/// * `applicant` - The applicant identifier
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be
/// reconstructed.
pub fn find_candidature_for_applicant(
    conn: &mut _,
    assignment_id: i64,
    applicant: &str,
) -> Result<Option<Candidature>, PersistenceError> {
    let row: Option<CandidatureRow> = candidatures::table
        .filter(candidatures::assignment_id.eq(assignment_id))
        .filter(candidatures::applicant.eq(applicant))
        .select((
            candidatures::candidature_id,
            candidatures::assignment_id,
            candidatures::applicant,
            candidatures::state,
            candidatures::content,
            candidatures::version,
        ))
        .first::<CandidatureRow>(conn)
        .optional()?;

    row.map(candidature_from_row).transpose()
}
}

backend_fn! {
/// Lists all candidatures for an assignment, oldest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_candidatures_for_assignment(
    conn: &mut _,
    assignment_id: i64,
) -> Result<Vec<Candidature>, PersistenceError> {
    let rows: Vec<CandidatureRow> = candidatures::table
        .filter(candidatures::assignment_id.eq(assignment_id))
        .order(candidatures::candidature_id.asc())
        .select((
            candidatures::candidature_id,
            candidatures::assignment_id,
            candidatures::applicant,
            candidatures::state,
            candidatures::content,
            candidatures::version,
        ))
        .load::<CandidatureRow>(conn)?;

    rows.into_iter().map(candidature_from_row).collect()
}
}

backend_fn! {
/// Counts candidatures still awaiting a decision for an assignment.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `assignment_id` - The assignment ID
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_undecided_candidatures(
    conn: &mut _,
    assignment_id: i64,
) -> Result<usize, PersistenceError> {
    let count: i64 = candidatures::table
        .filter(candidatures::assignment_id.eq(assignment_id))
        .filter(candidatures::state.eq("SUBMITTED"))
        .count()
        .get_result(conn)?;

    count.to_usize().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!("Negative candidature count: {count}"))
    })
}
}
