//! Time and timestamp helpers.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// UTC timestamp used for refresh attempts and snapshot times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether at least `interval` has passed between `last` and `now`.
///
/// Both instants come from a monotonic clock, so wall-clock steps never
/// hold a refresh back. `None` means there was no previous attempt, which
/// always counts as due.
#[must_use]
pub fn is_due(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    last.is_none_or(|last| now.saturating_duration_since(last) >= interval)
}
