//! Per-caller command cooldowns.
//!
//! Every accepted invocation records a timestamp for its caller. A second
//! invocation inside the window is rejected with the time left, and the
//! rejection leaves the original timestamp alone, so spamming during a
//! cooldown never extends it.
//!
//! Entries expire on their own: a stale entry reads as absent, and the store
//! drops stale entries at most once per window while it is being written to.
//! The console is never checked or recorded.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::caller::CallerId;
use crate::clock::{Clock, SystemClock};

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Accepted and recorded.
    Allowed,
    /// Console caller; not checked and not recorded.
    Exempt,
    /// Rejected; the caller must wait this long.
    Cooling(Duration),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Cooling(_))
    }
}

/// Concurrent cooldown store keyed by [`CallerId`].
pub struct Cooldowns {
    window: Duration,
    entries: DashMap<CallerId, Instant>,
    clock: Arc<dyn Clock>,
    last_sweep: Mutex<Instant>,
}

impl Cooldowns {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            window,
            entries: DashMap::new(),
            clock,
            last_sweep: Mutex::new(now),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks the caller against the window and records the attempt if it
    /// is accepted.
    ///
    /// The check and the write happen under the same per-key lock, so two
    /// concurrent invocations by one caller cannot both be accepted.
    pub fn check_and_record(&self, caller: &CallerId) -> Admission {
        if caller.is_console() {
            return Admission::Exempt;
        }

        let now = self.clock.now();
        let admission = match self.entries.entry(*caller) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < self.window {
                    Admission::Cooling(self.window - elapsed)
                } else {
                    entry.insert(now);
                    Admission::Allowed
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Admission::Allowed
            }
        };

        match admission {
            Admission::Cooling(remaining) => {
                tracing::debug!(caller = %caller, remaining_ms = remaining.as_millis() as u64, "command on cooldown");
            }
            _ => self.maybe_sweep(now),
        }

        admission
    }

    /// Time left for `caller`, without recording anything.
    pub fn remaining(&self, caller: &CallerId) -> Option<Duration> {
        let now = self.clock.now();
        let last = *self.entries.get(caller)?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    /// Number of entries still inside their window.
    pub fn active(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|e| now.saturating_duration_since(*e.value()) < self.window)
            .count()
    }

    /// Number of entries physically held, stale or not.
    pub fn stored(&self) -> usize {
        self.entries.len()
    }

    /// Drops every stale entry now.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.purge(now)
    }

    fn purge(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
        before.saturating_sub(self.entries.len())
    }

    fn maybe_sweep(&self, now: Instant) {
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last_sweep) < self.window {
            return;
        }
        *last_sweep = now;
        drop(last_sweep);

        let purged = self.purge(now);
        if purged > 0 {
            tracing::debug!(purged, "dropped expired cooldown entries");
        }
    }
}
