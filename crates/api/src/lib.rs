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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, AuthenticatedActor, AuthorizationService, Role};
pub use error::{ApiError, translate_core_error, translate_domain_error, translate_persistence_error};
pub use handlers::{
    abort_and_redraft, abort_assignment, create_candidature, create_draft, decide_candidature,
    delete_draft, finish_manually, get_assignment, get_audit_timeline, list_assignments,
    list_candidatures, revoke_candidature, start_assignment, submit_candidature,
    unstart_assignment, update_candidature, update_draft_parcels,
};
pub use request_response::{
    AbortAndRedraftResponse, AbortAssignmentResponse, AssignmentResponse, AuditEventInfo,
    CandidatureResponse, CreateCandidatureRequest, CreateDraftRequest, DecideCandidatureRequest,
    DecideCandidatureResponse, StartAssignmentRequest, UpdateCandidatureRequest,
    UpdateDraftParcelsRequest,
};
