//! Time-related abstractions.
//!
//! Thin re-exports of `tokio::time`. The controller's inter-verse pause and
//! the media load ceiling are both expressed with these types, which lets
//! tests drive them with virtual time:
//!
//! ```rust,ignore
//! #[core_async::test(start_paused)]
//! async fn pause_elapses() {
//!     let deadline = core_async::time::sleep(Duration::from_secs(5));
//!     core_async::time::advance(Duration::from_secs(5)).await;
//!     deadline.await;
//! }
//! ```

pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval, Sleep};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use tokio::time::Instant;

#[cfg(feature = "test-util")]
pub use tokio::time::{advance, pause, resume};

/// Returns the current time as milliseconds since UNIX_EPOCH.
///
/// Falls back to zero if the system clock reports a time before the epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Converts a floating-point second count into a [`Duration`], clamping
/// negative and non-finite inputs to zero.
pub fn secs_f64(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
