// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! One scan pass: lock, load due assignments, drain their window events.

use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use vergabe::{Clock, apply, due_event};
use vergabe_audit::{Actor, Cause};
use vergabe_domain::{ConceptAssignment, format_timestamp};
use vergabe_persistence::{Persistence, PersistenceError};

use crate::error::SchedulerError;

/// The fleet-wide lock every instance contends for each period.
pub const SCAN_LOCK_NAME: &str = "assignment-transition-scan";

/// What a single scan pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    /// Whether this instance held the lock. `false` is the normal result
    /// for every instance but one per period.
    pub lock_acquired: bool,
    /// How many due assignments the scan examined.
    pub examined: usize,
    /// How many transitions were applied across all assignments. One
    /// assignment can contribute several during a catch-up.
    pub transitions_applied: usize,
    /// How many assignments were skipped because a concurrent writer won
    /// the version race.
    pub skipped_stale: usize,
    /// How many assignments failed with an unexpected error. Failures
    /// never abort the rest of the batch.
    pub failed: usize,
}

/// What advancing one assignment did.
struct AdvanceOutcome {
    applied: usize,
    lost_race: bool,
}

/// Runs one scan pass.
///
/// 1. Contend for the lease lock; losing it means another instance scans
///    this period.
/// 2. Load every assignment whose window boundary has passed.
/// 3. Per assignment, drain `due_event` in order (`Waiting` to `Active`
///    before `Active` to `Review`), persisting each step under the
///    version check. A lost race skips that assignment only.
/// 4. Release the lock. If the lease already expired, the next scan
///    simply re-evaluates due-ness from scratch.
///
/// # Errors
///
/// Returns an error only for failures outside per-assignment work (lock
/// claim, due query). Per-assignment errors are logged and counted.
pub fn run_scan(
    persistence: &mut Persistence,
    clock: &dyn Clock,
    instance_id: &str,
    lease: Duration,
) -> Result<ScanOutcome, SchedulerError> {
    let now: OffsetDateTime = clock.now();
    let mut outcome: ScanOutcome = ScanOutcome::default();

    if !persistence.try_acquire_scan_lock(SCAN_LOCK_NAME, instance_id, now, lease)? {
        debug!(instance_id, "Scan lock held by another instance; skipping this period");
        return Ok(outcome);
    }
    outcome.lock_acquired = true;

    let due: Vec<ConceptAssignment> = persistence.list_due_assignments(now)?;
    outcome.examined = due.len();

    for assignment in due {
        let assignment_id: Option<i64> = assignment.assignment_id;
        match advance_assignment(persistence, assignment, instance_id, now) {
            Ok(advanced) => {
                outcome.transitions_applied += advanced.applied;
                if advanced.lost_race {
                    outcome.skipped_stale += 1;
                }
            }
            // One bad record must not strand its siblings.
            Err(e) => {
                warn!(
                    assignment_id = assignment_id.unwrap_or(-1),
                    error = %e,
                    "Failed to advance assignment; continuing scan"
                );
                outcome.failed += 1;
            }
        }
    }

    if !persistence.release_scan_lock(SCAN_LOCK_NAME, instance_id)? {
        // The lease ran out mid-scan and someone else claimed it. Safe:
        // every write above was version-checked.
        warn!(instance_id, "Scan outlived its lease");
    }

    debug!(
        instance_id,
        examined = outcome.examined,
        transitions = outcome.transitions_applied,
        skipped = outcome.skipped_stale,
        failed = outcome.failed,
        "Scan pass complete"
    );
    Ok(outcome)
}

/// Drains the due window events of one assignment, in order.
///
/// An assignment whose start and end both passed during downtime
/// traverses `Active` on its way to `Review`, emitting an audit event
/// for every step.
fn advance_assignment(
    persistence: &mut Persistence,
    mut assignment: ConceptAssignment,
    instance_id: &str,
    now: OffsetDateTime,
) -> Result<AdvanceOutcome, SchedulerError> {
    let mut applied: usize = 0;

    while let Some(event) = due_event(&assignment, now) {
        let cause: Cause = scan_cause(now)?;
        let result = apply(
            &assignment,
            &event,
            Actor::scheduler(instance_id),
            cause,
            now,
        )?;

        match persistence.update_assignment_if_version(
            &result.assignment,
            assignment.version,
            &result.audit_event,
            now,
        ) {
            Ok(new_version) => {
                applied += 1;
                assignment = result.assignment;
                assignment.version = new_version;
            }
            // A concurrent admin command won; it knew better.
            Err(PersistenceError::StaleVersion { .. }) => {
                return Ok(AdvanceOutcome {
                    applied,
                    lost_race: true,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(AdvanceOutcome {
        applied,
        lost_race: false,
    })
}

/// The cause recorded for scheduler-driven transitions.
fn scan_cause(now: OffsetDateTime) -> Result<Cause, SchedulerError> {
    let stamp: String = format_timestamp(now).map_err(vergabe::CoreError::from)?;
    Ok(Cause::new(
        format!("scan-{stamp}"),
        String::from("Scheduled window transition"),
    ))
}
