// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assignment window handling.
//!
//! ## Invariants
//!
//! - `ends_at` is strictly after `starts_at`; the constructor is the only
//!   way to build a window.
//! - Stored timestamps are whole-second UTC RFC 3339 strings, so TEXT
//!   comparison in the database is chronological comparison.

use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

use crate::error::DomainError;

/// The publication window of a started assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentWindow {
    /// When the assignment becomes active and candidatures may be created.
    pub starts_at: OffsetDateTime,
    /// When the assignment closes and moves into review.
    pub ends_at: OffsetDateTime,
}

impl AssignmentWindow {
    /// Creates a window, enforcing the ordering invariant.
    ///
    /// # Errors
    ///
    /// Returns an error if `ends_at` is not strictly after `starts_at`.
    pub fn new(starts_at: OffsetDateTime, ends_at: OffsetDateTime) -> Result<Self, DomainError> {
        if ends_at <= starts_at {
            return Err(DomainError::InvalidWindow {
                reason: format!("ends_at ({ends_at}) must be after starts_at ({starts_at})"),
            });
        }
        Ok(Self { starts_at, ends_at })
    }

    /// Whether the window has opened at the given instant.
    #[must_use]
    pub fn open_at(&self, now: OffsetDateTime) -> bool {
        now >= self.starts_at
    }

    /// Whether the window has closed at the given instant.
    #[must_use]
    pub fn closed_at(&self, now: OffsetDateTime) -> bool {
        now >= self.ends_at
    }
}

/// Formats a timestamp for storage.
///
/// The value is normalized to UTC and truncated to whole seconds so that
/// stored strings sort chronologically.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be rendered as RFC 3339.
pub fn format_timestamp(ts: OffsetDateTime) -> Result<String, DomainError> {
    let utc: OffsetDateTime = ts.to_offset(UtcOffset::UTC);
    let truncated: OffsetDateTime =
        utc.replace_nanosecond(0)
            .map_err(|e| DomainError::InvalidTimestamp {
                value: ts.to_string(),
                reason: e.to_string(),
            })?;
    truncated
        .format(&Rfc3339)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: ts.to_string(),
            reason: e.to_string(),
        })
}

/// Parses a stored RFC 3339 timestamp.
///
/// # Errors
///
/// Returns an error if the value is not valid RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| DomainError::InvalidTimestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
