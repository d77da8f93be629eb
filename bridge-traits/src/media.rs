//! Media element bridge.
//!
//! A [`MediaElement`] is the single playable handle a host platform exposes
//! (an `HTMLAudioElement` in a browser shell, a native player object on
//! desktop or mobile). The core never decodes audio itself; it points the
//! element at a URL, waits for it to become playable, and reacts to the
//! notifications the element publishes.
//!
//! Implementations own the actual fetch/decode pipeline. Calling
//! [`MediaElement::load`] must discard whatever source was previously
//! attached, so a late completion of an older load can only ever describe a
//! source that is no longer current. The core tags its load attempts and
//! ignores such stale completions.

use crate::error::Result;
use async_trait::async_trait;
use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Notification published by a media element while a source is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MediaEvent {
    /// The playback clock of the current source advanced.
    TimeUpdate {
        /// Position from the start of the current source.
        position: Duration,
    },
    /// The length of the current source became known.
    MetadataLoaded {
        /// Total length of the current source.
        duration: Duration,
    },
    /// The current source played through to its end.
    ///
    /// Fires once per play-through and never as a result of `pause`.
    Ended,
}

/// Outcome of a successful [`MediaElement::load`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaReady {
    /// Total length of the loaded source, or zero when the platform could not
    /// determine it.
    pub duration: Duration,
}

impl MediaReady {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

/// Platform playable handle driven exclusively by the playback controller.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Replace the current source with `url` and resolve once it can play
    /// through without stalling.
    ///
    /// Resolves with [`BridgeError::Decode`](crate::BridgeError::Decode) when
    /// the source cannot be fetched or decoded. Implementations are not
    /// required to time out; the caller imposes its own ceiling.
    async fn load(&self, url: &str) -> Result<MediaReady>;

    /// Start or resume playback of the current source.
    ///
    /// Resolves once audio is actually running and fails with
    /// [`BridgeError::Rejected`](crate::BridgeError::Rejected) when the host
    /// refuses (autoplay policy) or the stream cannot be decoded.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the current position.
    fn pause(&self);

    /// Move the playback position of the current source.
    fn set_position(&self, position: Duration);

    /// Current playback position of the current source.
    fn position(&self) -> Duration;

    /// Set output volume, normalized to `0.0..=1.0`.
    fn set_volume(&self, volume: f32);

    /// Detach the current source and release any platform resources.
    fn unload(&self);

    /// Subscribe to notifications for the lifetime of the element.
    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_event_serializes_with_kind_tag() {
        let json = serde_json::to_string(&MediaEvent::Ended).unwrap();
        assert_eq!(json, r#"{"kind":"Ended"}"#);

        let parsed: MediaEvent = serde_json::from_str(
            r#"{"kind":"MetadataLoaded","duration":{"secs":12,"nanos":0}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            MediaEvent::MetadataLoaded {
                duration: Duration::from_secs(12)
            }
        );
    }

    #[test]
    fn media_ready_keeps_duration() {
        let ready = MediaReady::new(Duration::from_millis(4500));
        assert_eq!(ready.duration, Duration::from_millis(4500));
    }
}
