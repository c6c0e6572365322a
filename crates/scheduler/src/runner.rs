// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The async scan loop one fleet instance runs.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace};
use vergabe::SystemClock;
use vergabe_persistence::Persistence;

use crate::scan::run_scan;

/// Operational tuning for the scan loop.
///
/// The values are not correctness-critical; correctness comes from the
/// per-record version checks. The lease only needs to comfortably exceed
/// a scan.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often each instance wakes and contends for the lock.
    pub scan_interval: StdDuration,
    /// How long a claimed lock lives without renewal.
    pub lock_lease: Duration,
    /// This instance's identity, recorded as the lock holder and as the
    /// audit actor of scheduler-driven transitions.
    pub instance_id: String,
}

impl SchedulerConfig {
    /// Generates a random instance identity.
    #[must_use]
    pub fn random_instance_id() -> String {
        format!("vergabe-{:08x}", rand::random::<u32>())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scan_interval: StdDuration::from_secs(30),
            lock_lease: Duration::seconds(150),
            instance_id: Self::random_instance_id(),
        }
    }
}

/// Runs the scan loop until the task is dropped.
///
/// Every tick contends for the lock; losing it is the quiet, normal
/// outcome for all instances but one. Errors are logged and the loop
/// keeps going; the next tick re-evaluates everything from scratch.
pub async fn run_scheduler(persistence: Arc<Mutex<Persistence>>, config: SchedulerConfig) {
    let clock: SystemClock = SystemClock;
    let mut ticker = tokio::time::interval(config.scan_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        instance_id = %config.instance_id,
        scan_interval_secs = config.scan_interval.as_secs(),
        "Scheduler loop started"
    );

    loop {
        ticker.tick().await;

        let mut persistence = persistence.lock().await;
        match run_scan(
            &mut persistence,
            &clock,
            &config.instance_id,
            config.lock_lease,
        ) {
            Ok(outcome) if outcome.lock_acquired => {
                debug!(
                    examined = outcome.examined,
                    transitions = outcome.transitions_applied,
                    skipped = outcome.skipped_stale,
                    failed = outcome.failed,
                    "Scan complete"
                );
            }
            Ok(_) => trace!("Scan lock held by another instance"),
            Err(e) => error!(error = %e, "Scan failed; will retry next period"),
        }
    }
}
