//! Runtime utilities that abstract over the underlying async executor.
//!
//! The attribute macros in `core-async-macros` expand to calls into this
//! module, so test binaries never construct a Tokio runtime by hand.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Runs the provided future on a current-thread runtime whose clock starts paused.
///
/// While paused, the runtime auto-advances virtual time whenever every task
/// is idle, so a pending `sleep` or `timeout` resolves instantly in wall-clock
/// terms. Tests use [`crate::time::advance`] to step the clock explicitly.
#[cfg(feature = "test-util")]
pub fn block_on_paused<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("core_async::runtime::block_on_paused: failed to build Tokio runtime")
        .block_on(future)
}
