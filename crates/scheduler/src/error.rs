// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;
use vergabe::CoreError;
use vergabe_persistence::PersistenceError;

/// Errors that abort a whole scan.
///
/// Losing the lock or a single record's version race is NOT an error;
/// both are counted in the scan outcome and the scan continues.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The store failed outside a per-record operation.
    #[error("persistence failure during scan: {0}")]
    Persistence(#[from] PersistenceError),
    /// The state machine rejected a transition the scan derived itself.
    #[error("transition rejected during scan: {0}")]
    Transition(#[from] CoreError),
}
