// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rule validation for assignments at the command boundary.
//!
//! These checks are read-only and produce no audit events. The window
//! ordering itself is enforced by `AssignmentWindow::new`; the checks here
//! cover the rules that need more context than a single constructor.

use time::OffsetDateTime;

use crate::error::DomainError;
use crate::types::{ConceptAssignment, ParcelRef};
use crate::window::{AssignmentWindow, format_timestamp};

/// Validates a parcel set for an assignment.
///
/// # Errors
///
/// Returns an error if the set is empty or contains duplicates.
pub fn validate_parcels(parcels: &[ParcelRef]) -> Result<(), DomainError> {
    if parcels.is_empty() {
        return Err(DomainError::EmptyParcelSet);
    }
    for (index, parcel) in parcels.iter().enumerate() {
        if parcels[..index].contains(parcel) {
            return Err(DomainError::DuplicateParcelRef(parcel.value().to_string()));
        }
    }
    Ok(())
}

/// Validates that a window may be used to start an assignment now.
///
/// The window ordering is already guaranteed by construction. `starts_at`
/// may lie in the past (an immediate start, picked up by the next scan);
/// `ends_at` must still be ahead of the clock.
///
/// # Errors
///
/// Returns an error if the window would already be closed.
pub fn validate_window_for_start(
    window: &AssignmentWindow,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if window.ends_at <= now {
        return Err(DomainError::WindowAlreadyClosed {
            ends_at: format_timestamp(window.ends_at)?,
        });
    }
    Ok(())
}

/// Validates that a draft is complete enough to start.
///
/// Administrator-created drafts satisfy this from the beginning; a forked
/// redraft only satisfies it once parcels have been re-chosen.
///
/// # Errors
///
/// Returns an error if the parcel set is invalid or the details are empty.
pub fn validate_draft_startable(assignment: &ConceptAssignment) -> Result<(), DomainError> {
    validate_parcels(&assignment.parcels)?;
    if assignment.details.trim().is_empty() {
        return Err(DomainError::InvalidDetails(String::from(
            "details must not be empty",
        )));
    }
    Ok(())
}
