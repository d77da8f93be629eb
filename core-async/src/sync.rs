//! Synchronization primitives.
//!
//! Re-exports the async-aware Tokio primitives the controller is built from:
//! `mpsc` for transport commands, `oneshot` for command replies, `watch` for
//! the published read-model, `broadcast` for media notifications and the
//! event bus, and [`CancellationToken`] for shutdown.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! # async fn example() {
//! let (tx, mut rx) = watch::channel(0u32);
//! tx.send(7).unwrap();
//! rx.changed().await.unwrap();
//! assert_eq!(*rx.borrow(), 7);
//! # }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

pub use tokio_util::sync::CancellationToken;
