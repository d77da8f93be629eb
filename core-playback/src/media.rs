//! # Media Source
//!
//! Wraps the host [`MediaElement`] with the guarantees the controller relies
//! on: a load ceiling, volume priming on ready, and seeks clamped to the
//! loaded source.
//!
//! `MediaSource` is cheap to clone so load attempts can run on helper tasks;
//! all clones drive the same element. Which source counts as loaded is
//! decided by the controller through [`MediaSource::attach`] once it has
//! checked that a completed load is still the current one.

use crate::error::{PlaybackError, Result};
use bridge_traits::{BridgeError, MediaElement, MediaEvent, MediaReady};
use core_async::sync::broadcast;
use core_async::time::{self, Duration};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct LoadedSource {
    url: Option<String>,
    duration: Duration,
}

/// The single playable handle owned by a playback controller.
#[derive(Clone)]
pub struct MediaSource {
    element: Arc<dyn MediaElement>,
    load_timeout: Duration,
    volume: f32,
    loaded: Arc<Mutex<LoadedSource>>,
}

impl MediaSource {
    pub fn new(element: Arc<dyn MediaElement>, load_timeout: Duration, volume: f32) -> Self {
        Self {
            element,
            load_timeout,
            volume: volume.clamp(0.0, 1.0),
            loaded: Arc::new(Mutex::new(LoadedSource::default())),
        }
    }

    /// Point the element at `url` and wait until it can play through.
    ///
    /// Exactly one outcome per call: ready (volume primed), a decode error,
    /// or [`PlaybackError::LoadTimeout`] when the element stays silent past
    /// the ceiling.
    pub async fn load(&self, url: &str) -> Result<MediaReady> {
        debug!(url = %core_runtime::logging::strip_url(url), "Loading media source");

        match time::timeout(self.load_timeout, self.element.load(url)).await {
            Ok(Ok(ready)) => {
                self.element.set_volume(self.volume);
                Ok(ready)
            }
            Ok(Err(err)) => Err(PlaybackError::LoadDecodeError {
                url: url.to_string(),
                reason: err.to_string(),
            }),
            Err(_) => Err(PlaybackError::LoadTimeout {
                url: url.to_string(),
            }),
        }
    }

    /// Start or resume playback of the loaded source.
    pub async fn play(&self) -> Result<()> {
        self.element.play().await.map_err(|err| match err {
            BridgeError::Rejected(reason) | BridgeError::Decode(reason) => {
                PlaybackError::PlaybackRejected(reason)
            }
            other => PlaybackError::PlaybackRejected(other.to_string()),
        })
    }

    pub fn pause(&self) {
        self.element.pause();
    }

    /// Move to `position`, clamped to `[0, duration]`; returns the position applied.
    pub fn seek(&self, position: Duration) -> Duration {
        let clamped = position.min(self.duration());
        self.element.set_position(clamped);
        clamped
    }

    pub fn position(&self) -> Duration {
        self.element.position()
    }

    /// Record `url` as the loaded source.
    pub fn attach(&self, url: &str, duration: Duration) {
        let mut loaded = self.loaded.lock();
        loaded.url = Some(url.to_string());
        loaded.duration = duration;
    }

    /// Forget the loaded source; the element itself is left alone.
    pub fn detach(&self) {
        *self.loaded.lock() = LoadedSource::default();
    }

    /// Update the known length of the loaded source.
    pub fn set_duration(&self, duration: Duration) {
        self.loaded.lock().duration = duration;
    }

    pub fn duration(&self) -> Duration {
        self.loaded.lock().duration
    }

    pub fn current_url(&self) -> Option<String> {
        self.loaded.lock().url.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().url.is_some()
    }

    /// Stop playback and release the element's platform resources.
    pub fn release(&self) {
        self.element.pause();
        self.element.unload();
        self.detach();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.element.subscribe()
    }
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSource")
            .field("load_timeout", &self.load_timeout)
            .field("volume", &self.volume)
            .field("loaded", &*self.loaded.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{LoadOutcome, ScriptedMediaElement};

    fn source(element: &Arc<ScriptedMediaElement>) -> MediaSource {
        MediaSource::new(element.clone(), Duration::from_secs(15), 0.8)
    }

    #[core_async::test]
    async fn ready_primes_volume() {
        let element = Arc::new(ScriptedMediaElement::new());
        element.script("a.mp3", LoadOutcome::Ready(Duration::from_secs(7)));

        let ready = source(&element).load("a.mp3").await.unwrap();

        assert_eq!(ready.duration, Duration::from_secs(7));
        assert_eq!(element.volume(), Some(0.8));
    }

    #[core_async::test]
    async fn decode_error_is_reported_with_url() {
        let element = Arc::new(ScriptedMediaElement::new());
        element.script("bad.mp3", LoadOutcome::DecodeError("404".into()));

        let err = source(&element).load("bad.mp3").await.unwrap_err();

        assert!(matches!(err, PlaybackError::LoadDecodeError { ref url, .. } if url == "bad.mp3"));
        assert_eq!(element.volume(), None);
    }

    #[core_async::test(start_paused)]
    async fn silent_element_times_out() {
        let element = Arc::new(ScriptedMediaElement::new());
        element.script("slow.mp3", LoadOutcome::Hang);

        let err = source(&element).load("slow.mp3").await.unwrap_err();

        assert_eq!(
            err,
            PlaybackError::LoadTimeout {
                url: "slow.mp3".into()
            }
        );
    }

    #[core_async::test]
    async fn rejected_play_maps_reason() {
        let element = Arc::new(ScriptedMediaElement::new());
        element.reject_play("NotAllowedError");

        let err = source(&element).play().await.unwrap_err();
        assert_eq!(err, PlaybackError::PlaybackRejected("NotAllowedError".into()));
    }

    #[test]
    fn seek_clamps_to_loaded_duration() {
        let element = Arc::new(ScriptedMediaElement::new());
        let media = source(&element);
        media.attach("a.mp3", Duration::from_secs(12));

        assert_eq!(media.seek(Duration::from_secs(30)), Duration::from_secs(12));
        assert_eq!(element.position(), Duration::from_secs(12));
        assert_eq!(media.seek(Duration::from_secs(4)), Duration::from_secs(4));
    }

    #[test]
    fn release_detaches_and_unloads() {
        let element = Arc::new(ScriptedMediaElement::new());
        let media = source(&element);
        media.attach("a.mp3", Duration::from_secs(3));

        media.release();

        assert!(!media.is_loaded());
        assert_eq!(media.duration(), Duration::ZERO);
        assert!(element.was_unloaded());
    }
}
