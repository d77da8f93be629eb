//! Session wall-clock.
//!
//! Measures total session time, not active-audio time: pauses between
//! verses and manual pauses all count.

use bridge_traits::Clock;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Elapsed whole seconds since the current session started.
pub struct SessionClock {
    clock: Arc<dyn Clock>,
    started_at: Mutex<Option<DateTime<Utc>>>,
    // Highest value handed out since the last start; keeps readings monotonic
    // when the wall clock steps backwards.
    high_water: AtomicU64,
}

impl SessionClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            started_at: Mutex::new(None),
            high_water: AtomicU64::new(0),
        }
    }

    /// Capture the reference instant.
    pub fn start(&self) {
        *self.started_at.lock() = Some(self.clock.now());
        self.high_water.store(0, Ordering::SeqCst);
    }

    /// Forget the reference instant; `elapsed` reads zero until restarted.
    pub fn reset(&self) {
        *self.started_at.lock() = None;
        self.high_water.store(0, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.started_at.lock().is_some()
    }

    /// Whole seconds since [`start`](Self::start). Never negative, never decreasing.
    pub fn elapsed(&self) -> u64 {
        let Some(started_at) = *self.started_at.lock() else {
            return 0;
        };

        let secs = (self.clock.now() - started_at).num_seconds().max(0) as u64;
        let previous = self.high_water.fetch_max(secs, Ordering::SeqCst);
        previous.max(secs)
    }
}

impl std::fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClock")
            .field("started_at", &*self.started_at.lock())
            .finish()
    }
}
