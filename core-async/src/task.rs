//! Task spawning.
//!
//! The playback controller runs as one long-lived task and hands every
//! potentially slow media call (load, play) to short-lived helper tasks so
//! the controller loop never blocks on the platform.

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
