//! Clock port — where "now" comes from.

use std::sync::Arc;
use std::time::Instant;

use cozyhub_domain::time::{self, Timestamp};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Wall-clock time, for display and snapshots.
    fn now(&self) -> Timestamp;

    /// Monotonic time, for measuring intervals.
    fn instant(&self) -> Instant;
}

/// System clock backed by [`chrono::Utc::now`] and [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn instant(&self) -> Instant {
        (**self).instant()
    }
}
