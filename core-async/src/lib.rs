//! Async runtime facade for the recitation core.
//!
//! Every `core-*` crate reaches the executor through this crate instead of
//! naming tokio directly. Keeping the runtime behind one seam means the
//! playback controller, its timers and its tests all agree on which clock
//! and which executor they run on.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Sleep, timeout, instants and (with `test-util`) virtual time
//! - `sync`: Channels, locks and cancellation
//! - `runtime`: Blocking entry points for sync callers and tests
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(5)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
// Multiplexing over channels, timers and cancellation in actor loops.
pub use tokio::select;
pub use time::{sleep, Duration, Instant};
