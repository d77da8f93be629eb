//! Workspace umbrella crate.
//!
//! Host applications depend on `recitation-workspace` and pick a feature:
//! `service` (default) pulls in the full [`core_service`] façade, while
//! `playback-only` exposes just the playback engine for hosts that wire their
//! own runtime.

#[cfg(feature = "service")]
pub use core_service as service;

#[cfg(feature = "playback-only")]
pub use core_playback as playback;
