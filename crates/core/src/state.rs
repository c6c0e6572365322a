// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vergabe_audit::AuditEvent;
use vergabe_domain::{Candidature, ConceptAssignment};

/// The result of a successful assignment transition.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects. The caller is responsible for persisting everything in
/// this result as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The assignment after the transition.
    pub assignment: ConceptAssignment,
    /// The replacement draft created by `AbortAndDraft`; `None` otherwise.
    pub forked_draft: Option<ConceptAssignment>,
    /// Whether all open candidatures of this assignment must be
    /// force-rejected in the same unit of work.
    pub rejects_open_candidatures: bool,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of a successful candidature transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatureTransition {
    /// The candidature after the transition.
    pub candidature: Candidature,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
