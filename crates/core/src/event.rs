// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;

/// An event represents administrator or scheduler intent as data only.
///
/// Events are the only way to request assignment state changes. Admin
/// events arrive through the command gateway; window events are raised by
/// the scheduler when the clock passes a window boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Publish a draft with a window: `Draft` to `Waiting`.
    Start {
        /// When the window opens. May already have passed (immediate start).
        starts_at: OffsetDateTime,
        /// When the window closes. Must be in the future.
        ends_at: OffsetDateTime,
    },
    /// Withdraw a waiting assignment back to `Draft`, clearing the window.
    Unstart,
    /// Cancel the procedure: `Active` or `Review` to `Aborted`.
    Abort,
    /// Cancel and fork: the original to `Aborted`, plus a fresh sibling
    /// draft that copies the payload.
    AbortAndDraft,
    /// Operator escape hatch: `Active` to `Review`, or `Review` to `Finished`.
    FinishManually,
    /// The clock passed `starts_at`: `Waiting` to `Active`.
    WindowOpened,
    /// The clock passed `ends_at`: `Active` to `Review`.
    WindowClosed,
}

impl Event {
    /// The action name recorded for this event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "StartAssignment",
            Self::Unstart => "UnstartAssignment",
            Self::Abort => "AbortAssignment",
            Self::AbortAndDraft => "AbortAndRedraft",
            Self::FinishManually => "FinishAssignment",
            Self::WindowOpened => "WindowOpened",
            Self::WindowClosed => "WindowClosed",
        }
    }
}
