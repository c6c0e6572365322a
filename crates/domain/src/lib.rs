// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod types;
mod validation;
mod window;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use types::{
    ApplicantRef, AssignmentState, AssignmentType, Candidature, CandidatureState,
    ConceptAssignment, ParcelRef,
};
pub use validation::{validate_draft_startable, validate_parcels, validate_window_for_start};
pub use window::{AssignmentWindow, format_timestamp, parse_timestamp};
