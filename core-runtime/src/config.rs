//! # Runtime Configuration
//!
//! Collects the host bridges and shared infrastructure the recitation core
//! runs against.
//!
//! ## Overview
//!
//! [`RuntimeConfig`] is assembled with a builder and validated fail-fast:
//! a missing required bridge is reported at build time with an actionable
//! message instead of surfacing later as a playback failure.
//!
//! ## Required Dependencies
//!
//! - `MediaElement` - The platform playable handle
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - Session timing (default: [`SystemClock`])
//! - `EventBus` - Lifecycle event fan-out (default: a fresh bus)
//! - `LoggingConfig` - Installed by the service layer when present
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::RuntimeConfig;
//! use std::sync::Arc;
//!
//! let config = RuntimeConfig::builder()
//!     .media_element(Arc::new(HtmlAudioElement::new()))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::RuntimeConfig;
//!
//! // No MediaElement injected
//! let config = RuntimeConfig::builder()
//!     .build()
//!     .expect("Should fail - missing media element");
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::logging::LoggingConfig;
use bridge_traits::{Clock, MediaElement, SystemClock};
use std::sync::Arc;

/// Host bridges and shared infrastructure for one recitation core instance.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Platform playable handle (required)
    pub media_element: Arc<dyn MediaElement>,

    /// Wall clock used for session timing
    pub clock: Arc<dyn Clock>,

    /// Bus that lifecycle events are published on
    pub event_bus: EventBus,

    /// Logging setup to install, if the host wants the core to own it
    pub logging: Option<LoggingConfig>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("media_element", &"MediaElement { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_bus", &self.event_bus)
            .field("logging", &self.logging)
            .finish()
    }
}

impl RuntimeConfig {
    /// Creates a new builder for constructing a `RuntimeConfig`.
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }
}

fn media_element_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaElement".to_string(),
        message: "A MediaElement implementation is required to play verse audio. \
                  Web: wrap an HTMLAudioElement. \
                  Desktop/Mobile: inject the platform's native player handle."
            .to_string(),
    }
}

/// Builder for [`RuntimeConfig`].
#[derive(Default)]
pub struct RuntimeConfigBuilder {
    media_element: Option<Arc<dyn MediaElement>>,
    clock: Option<Arc<dyn Clock>>,
    event_bus: Option<EventBus>,
    logging: Option<LoggingConfig>,
}

impl RuntimeConfigBuilder {
    /// Sets the platform playable handle. Required.
    pub fn media_element(mut self, element: Arc<dyn MediaElement>) -> Self {
        self.media_element = Some(element);
        self
    }

    /// Overrides the wall clock, typically with a fixed clock in tests.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Publishes lifecycle events on an existing bus instead of a new one.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Asks the service layer to install this logging setup on start.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the final `RuntimeConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when no `MediaElement` was set.
    pub fn build(self) -> Result<RuntimeConfig> {
        let media_element = self.media_element.ok_or_else(media_element_missing_error)?;

        Ok(RuntimeConfig {
            media_element,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_bus: self.event_bus.unwrap_or_default(),
            logging: self.logging,
        })
    }
}
