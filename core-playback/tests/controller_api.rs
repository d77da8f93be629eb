//! Drives the controller through its public API with a host-style media
//! element and a custom resolver.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, MediaElement, MediaEvent, MediaReady, Verse};
use core_async::sync::broadcast;
use core_async::time::Duration;
use core_playback::{
    AudioCandidate, AudioResolver, NoopListener, PlaybackController, PlayerConfig, PlayerPhase,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Element that knows a fixed set of URLs and reports every other one as missing.
struct LocalLibrary {
    available: Vec<&'static str>,
    requested: Mutex<Vec<String>>,
    events: broadcast::Sender<MediaEvent>,
}

impl LocalLibrary {
    fn new(available: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            available,
            requested: Mutex::new(Vec::new()),
            events: broadcast::channel(16).0,
        })
    }
}

#[async_trait]
impl MediaElement for LocalLibrary {
    async fn load(&self, url: &str) -> BridgeResult<MediaReady> {
        self.requested.lock().push(url.to_string());
        if self.available.contains(&url) {
            Ok(MediaReady::new(Duration::from_secs(8)))
        } else {
            Err(BridgeError::Decode(format!("{url} not found")))
        }
    }

    async fn play(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn pause(&self) {}

    fn set_position(&self, _position: Duration) {}

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn set_volume(&self, _volume: f32) {}

    fn unload(&self) {}

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}

struct MirrorResolver;

impl AudioResolver for MirrorResolver {
    fn resolve(&self, surah_id: u32, verse_number: u32) -> Vec<AudioCandidate> {
        ["main", "mirror", "backup"]
            .into_iter()
            .map(|host| AudioCandidate {
                reciter: host.to_string(),
                url: format!("{host}://{surah_id}/{verse_number}"),
            })
            .collect()
    }

    fn preferred_reciter(&self) -> &str {
        "main"
    }
}

fn controller(element: Arc<LocalLibrary>) -> PlaybackController {
    PlaybackController::builder(element)
        .resolver(Arc::new(MirrorResolver))
        .listener(Arc::new(NoopListener))
        .spawn()
        .unwrap()
}

#[core_async::test]
async fn custom_resolver_candidates_are_tried_in_order() {
    let element = LocalLibrary::new(vec!["mirror://18/10"]);
    let controller = controller(element.clone());

    controller
        .set_sequence(vec![Verse::new(18, 10, "ayah", "verse")])
        .await
        .unwrap();
    let ready = controller
        .wait_for(|s| s.phase() == PlayerPhase::Ready)
        .await
        .unwrap();

    assert_eq!(ready.duration, 8.0);
    assert_eq!(
        *element.requested.lock(),
        vec!["main://18/10".to_string(), "mirror://18/10".to_string()]
    );
}

#[core_async::test]
async fn at_most_two_candidates_are_attempted() {
    let element = LocalLibrary::new(vec!["backup://18/10"]);
    let controller = controller(element.clone());

    controller
        .set_sequence(vec![Verse::new(18, 10, "ayah", "verse")])
        .await
        .unwrap();
    let failed = controller
        .wait_for(|s| s.phase() == PlayerPhase::Error)
        .await
        .unwrap();

    assert!(failed.error.is_some());
    assert_eq!(element.requested.lock().len(), 2);
}

#[core_async::test]
async fn snapshot_serializes_for_presentation() {
    let element = LocalLibrary::new(vec!["main://1/1"]);
    let controller = controller(element);

    controller
        .set_sequence(vec![Verse::new(1, 1, "ayah", "verse")])
        .await
        .unwrap();
    let ready = controller
        .wait_for(|s| s.duration > 0.0)
        .await
        .unwrap();

    let json = serde_json::to_value(&ready).unwrap();
    assert_eq!(json["isLoading"], false);
    assert_eq!(json["verseCount"], 1);
    assert_eq!(json["pauseDurationSecs"], 5);
    assert_eq!(json["currentVerse"]["surahId"], 1);
}

#[test]
fn player_config_fills_missing_fields_with_defaults() {
    let config: PlayerConfig =
        serde_json::from_str(r#"{ "pause_duration": 12, "auto_repeat": true }"#).unwrap();

    assert_eq!(config.pause_duration, 12);
    assert!(config.auto_repeat);
    assert_eq!(config.load_timeout, Duration::from_secs(15));
    assert_eq!(config.resolver.primary_reciter, "Alafasy_128kbps");
    assert!(config.validate().is_ok());
}
