//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the recitation core:
//! - Logging and tracing setup
//! - Host bridge configuration
//! - Event bus for session lifecycle events
//!
//! ## Overview
//!
//! Every other crate in the workspace depends on this one for the logging
//! conventions and the event types it publishes. Nothing here knows how a
//! verse is played; that lives in `core-playback`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
