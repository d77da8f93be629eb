//! In-memory [`MediaElement`] for driving the controller in tests.
//!
//! Each URL can be scripted with a [`LoadOutcome`]; unscripted URLs become
//! ready with a five second duration. Notifications are only published when
//! a test asks for them, so the order of `TimeUpdate`/`Ended` is explicit.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, MediaElement, MediaEvent, MediaReady};
use core_async::sync::broadcast;
use core_async::time::{self, Duration};
use parking_lot::Mutex;
use std::collections::HashMap;

/// How a scripted load resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Becomes playable immediately with the given duration.
    Ready(Duration),
    /// Becomes playable after `delay` with the given duration.
    Delayed { delay: Duration, duration: Duration },
    /// Fails to fetch or decode.
    DecodeError(String),
    /// Never resolves.
    Hang,
}

#[derive(Debug, Default)]
struct ElementState {
    scripts: HashMap<String, LoadOutcome>,
    loads: Vec<String>,
    current: Option<String>,
    playing: bool,
    play_calls: usize,
    play_rejection: Option<String>,
    position: Duration,
    volume: Option<f32>,
    unloaded: bool,
}

/// Scripted media element.
pub struct ScriptedMediaElement {
    state: Mutex<ElementState>,
    events: broadcast::Sender<MediaEvent>,
}

impl ScriptedMediaElement {
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(ElementState::default()),
            events,
        }
    }

    /// Decide how loads of `url` resolve from now on.
    pub fn script(&self, url: impl Into<String>, outcome: LoadOutcome) {
        self.state.lock().scripts.insert(url.into(), outcome);
    }

    /// Make every subsequent `play` fail with `reason`.
    pub fn reject_play(&self, reason: impl Into<String>) {
        self.state.lock().play_rejection = Some(reason.into());
    }

    /// Let `play` succeed again.
    pub fn allow_play(&self) {
        self.state.lock().play_rejection = None;
    }

    /// Publish a notification as if the platform raised it.
    pub fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    /// Play the current source through to its end.
    pub fn finish(&self, duration: Duration) {
        {
            let mut state = self.state.lock();
            state.playing = false;
            state.position = duration;
        }
        self.emit(MediaEvent::TimeUpdate { position: duration });
        self.emit(MediaEvent::Ended);
    }

    /// Every URL passed to `load`, in call order.
    pub fn loads(&self) -> Vec<String> {
        self.state.lock().loads.clone()
    }

    pub fn current_source(&self) -> Option<String> {
        self.state.lock().current.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }

    /// Volume last applied, if any.
    pub fn volume(&self) -> Option<f32> {
        self.state.lock().volume
    }

    pub fn was_unloaded(&self) -> bool {
        self.state.lock().unloaded
    }
}

impl Default for ScriptedMediaElement {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaElement for ScriptedMediaElement {
    async fn load(&self, url: &str) -> BridgeResult<MediaReady> {
        let outcome = {
            let mut state = self.state.lock();
            state.loads.push(url.to_string());
            state.current = Some(url.to_string());
            state.playing = false;
            state.position = Duration::ZERO;
            state
                .scripts
                .get(url)
                .cloned()
                .unwrap_or(LoadOutcome::Ready(Self::DEFAULT_DURATION))
        };

        match outcome {
            LoadOutcome::Ready(duration) => Ok(MediaReady::new(duration)),
            LoadOutcome::Delayed { delay, duration } => {
                time::sleep(delay).await;
                Ok(MediaReady::new(duration))
            }
            LoadOutcome::DecodeError(reason) => Err(BridgeError::Decode(reason)),
            LoadOutcome::Hang => std::future::pending().await,
        }
    }

    async fn play(&self) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        if let Some(reason) = state.play_rejection.clone() {
            return Err(BridgeError::Rejected(reason));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn set_position(&self, position: Duration) {
        self.state.lock().position = position;
    }

    fn position(&self) -> Duration {
        self.state.lock().position
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = Some(volume);
    }

    fn unload(&self) {
        let mut state = self.state.lock();
        state.unloaded = true;
        state.current = None;
        state.playing = false;
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}
