//! # Player Configuration
//!
//! Settings for the playback controller and the audio resolver.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted inter-verse pause lengths, in seconds.
pub const PAUSE_DURATION_RANGE: RangeInclusive<u32> = 1..=30;

/// Playback controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Silence inserted between the end of one verse and the load of the next.
    ///
    /// Default: 5 seconds. Must fall within [`PAUSE_DURATION_RANGE`].
    #[serde(default = "default_pause_duration")]
    pub pause_duration: u32,

    /// Whether an explicit session repeat restarts from the first verse.
    ///
    /// Default: false.
    #[serde(default)]
    pub auto_repeat: bool,

    /// Ceiling for a single candidate load.
    ///
    /// Default: 15 seconds.
    #[serde(default = "default_load_timeout")]
    pub load_timeout: Duration,

    /// Offset applied by rewind and forward.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_seek_step")]
    pub seek_step: Duration,

    /// Volume primed on every successfully loaded source.
    ///
    /// Default: 0.8.
    #[serde(default = "default_volume")]
    pub default_volume: f32,

    /// Where verse audio is fetched from.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            pause_duration: default_pause_duration(),
            auto_repeat: false,
            load_timeout: default_load_timeout(),
            seek_step: default_seek_step(),
            default_volume: default_volume(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Set the inter-verse pause.
    pub fn with_pause_duration(mut self, secs: u32) -> Self {
        self.pause_duration = secs;
        self
    }

    /// Set the auto-repeat flag.
    pub fn with_auto_repeat(mut self, enabled: bool) -> Self {
        self.auto_repeat = enabled;
        self
    }

    /// Set the per-candidate load ceiling.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        validate_pause_duration(self.pause_duration)?;

        if self.load_timeout.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "load_timeout must be > 0".to_string(),
            ));
        }

        if self.seek_step.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "seek_step must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "default_volume must be between 0.0 and 1.0, got {}",
                self.default_volume
            )));
        }

        self.resolver.validate()
    }
}

/// Check an inter-verse pause length against [`PAUSE_DURATION_RANGE`].
pub fn validate_pause_duration(secs: u32) -> Result<()> {
    if PAUSE_DURATION_RANGE.contains(&secs) {
        Ok(())
    } else {
        Err(PlaybackError::InvalidConfig(format!(
            "pause_duration must be between {} and {} seconds, got {}",
            PAUSE_DURATION_RANGE.start(),
            PAUSE_DURATION_RANGE.end(),
            secs
        )))
    }
}

/// Audio host and reciter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL; reciter directories live directly beneath it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Reciter tried first.
    #[serde(default = "default_primary_reciter")]
    pub primary_reciter: String,

    /// Reciter tried when the primary source fails.
    #[serde(default = "default_alternative_reciter")]
    pub alternative_reciter: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            primary_reciter: default_primary_reciter(),
            alternative_reciter: default_alternative_reciter(),
        }
    }
}

impl ResolverConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }
        if self.primary_reciter.trim().is_empty() || self.alternative_reciter.trim().is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "reciter identifiers cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_pause_duration() -> u32 {
    5
}

fn default_load_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_seek_step() -> Duration {
    Duration::from_secs(10)
}

fn default_volume() -> f32 {
    0.8
}

fn default_base_url() -> String {
    "https://everyayah.com/data".to_string()
}

fn default_primary_reciter() -> String {
    "Alafasy_128kbps".to_string()
}

fn default_alternative_reciter() -> String {
    "AbdurRahmaanAs-Sudais_128kbps".to_string()
}
