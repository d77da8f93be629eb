//! # Recitation Playback Engine
//!
//! Plays an ordered list of verses one after another, inserting a
//! configurable silence between them.
//!
//! ## Overview
//!
//! This crate handles:
//! - Resolving a verse to its primary and alternative audio URLs
//! - Loading each verse with a timeout and falling back to the alternative
//! - The transport state machine (play, pause, seek, skip, repeat)
//! - Pause-gated chaining from one verse to the next
//! - Session timing and completion detection
//! - A read-model snapshot for presentation code
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::{PlaybackController, PlayerConfig};
//!
//! let controller = PlaybackController::builder(media_element)
//!     .config(PlayerConfig::default().with_pause_duration(3))
//!     .listener(listener)
//!     .spawn()?;
//!
//! controller.set_sequence(verses).await?;
//! controller.wait_for(|s| !s.is_loading).await?;
//! controller.play().await?;
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod enrichment;
pub mod error;
pub mod listener;
pub mod media;
pub mod resolver;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use clock::SessionClock;
pub use config::{PlayerConfig, ResolverConfig, PAUSE_DURATION_RANGE};
pub use controller::{ControllerBuilder, PlaybackController};
pub use enrichment::enrich_translations;
pub use error::{PlaybackError, Result};
pub use listener::{NoopListener, PlaybackListener, SessionSummary};
pub use media::MediaSource;
pub use resolver::{audio_file_name, AudioCandidate, AudioResolver, AudioResourceResolver};
pub use view::{PlayerPhase, PlayerSnapshot};
