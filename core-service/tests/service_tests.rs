use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, TranslationProvider, Verse, VerseCatalog};
use core_playback::test_utils::ScriptedMediaElement;
use core_playback::{PlaybackError, PlayerConfig, PlayerPhase};
use core_runtime::config::RuntimeConfig;
use core_runtime::events::{CoreEvent, RecitationEvent};
use core_service::{CoreError, RecitationService};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;
use std::time::Duration;

mock! {
    Catalog {}

    #[async_trait]
    impl VerseCatalog for Catalog {
        async fn verses(&self, surah_id: u32, start: u32, end: u32) -> BridgeResult<Vec<Verse>>;
    }
}

mock! {
    Translations {}

    #[async_trait]
    impl TranslationProvider for Translations {
        async fn translation(&self, surah_id: u32, verse_number: u32) -> BridgeResult<String>;
    }
}

fn ikhlas(start: u32, end: u32) -> Vec<Verse> {
    (start..=end)
        .map(|number| Verse::new(112, number, format!("ayah {number}"), "local"))
        .collect()
}

fn runtime(element: &Arc<ScriptedMediaElement>) -> RuntimeConfig {
    RuntimeConfig::builder()
        .media_element(element.clone())
        .build()
        .unwrap()
}

#[core_async::test]
async fn selection_is_fetched_enriched_and_queued() {
    let element = Arc::new(ScriptedMediaElement::new());

    let mut catalog = MockCatalog::new();
    catalog
        .expect_verses()
        .with(eq(112), eq(1), eq(4))
        .times(1)
        .returning(|_, start, end| Ok(ikhlas(start, end)));

    let mut translations = MockTranslations::new();
    translations
        .expect_translation()
        .returning(|_, number| Ok(format!("translation {number}")));

    let service = RecitationService::builder(runtime(&element))
        .catalog(Arc::new(catalog))
        .translations(Arc::new(translations))
        .start()
        .unwrap();
    let mut events = service.events();

    assert_eq!(service.start_selection(112, 1, 4).await.unwrap(), 4);

    let ready = service
        .controller()
        .wait_for(|s| !s.is_loading && s.duration > 0.0)
        .await
        .unwrap();
    assert_eq!(ready.verse_count, 4);
    assert_eq!(
        ready.current_verse.map(|verse| verse.translation),
        Some("translation 1".to_string())
    );

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Recitation(RecitationEvent::SessionStarted {
            surah_id: 112,
            verse_count: 4
        })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Recitation(RecitationEvent::PlaybackStateChanged {
            phase: PlayerPhase::Loading
        })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Recitation(RecitationEvent::PlaybackStateChanged {
            phase: PlayerPhase::Ready
        })
    );
}

#[core_async::test(start_paused)]
async fn completed_session_reaches_the_bus() {
    let element = Arc::new(ScriptedMediaElement::new());
    let service = RecitationService::builder(runtime(&element))
        .player_config(PlayerConfig::default().with_pause_duration(1))
        .start()
        .unwrap();
    let mut events = service
        .events()
        .filter(|event| {
            !matches!(
                event,
                CoreEvent::Recitation(RecitationEvent::PlaybackStateChanged { .. })
            )
        });

    service.load_sequence(ikhlas(1, 2)).await.unwrap();
    let controller = service.controller();
    controller
        .wait_for(|s| !s.is_loading && s.duration > 0.0)
        .await
        .unwrap();
    controller.play().await.unwrap();

    element.finish(Duration::from_secs(5));
    controller
        .wait_for(|s| s.current_index == 1 && s.is_playing)
        .await
        .unwrap();
    element.finish(Duration::from_secs(5));
    controller.wait_for(|s| s.session_completed).await.unwrap();

    let mut received = Vec::new();
    while let Some(Ok(event)) = events.try_recv() {
        received.push(event);
    }

    let CoreEvent::Recitation(RecitationEvent::SessionCompleted { summary }) =
        received.last().cloned().unwrap()
    else {
        panic!("expected session completion last, got {received:?}");
    };
    assert_eq!(summary.surah_id, 112);
    assert_eq!(summary.start_verse, 1);
    assert_eq!(summary.end_verse, 2);
    assert_eq!(summary.verses_completed, 2);
    assert_eq!(summary.pause_duration_secs, 1);

    assert!(received.contains(&CoreEvent::Recitation(RecitationEvent::InterVersePause {
        upcoming_index: 1,
        pause_secs: 1
    })));
    assert!(received.contains(&CoreEvent::Recitation(RecitationEvent::VerseChanged {
        index: 1,
        surah_id: 112,
        verse_number: 2
    })));
}

#[core_async::test]
async fn failed_load_is_published() {
    let element = Arc::new(ScriptedMediaElement::new());
    let service = RecitationService::builder(runtime(&element))
        .start()
        .unwrap();
    let mut failures = service.events().filter(|event| {
        matches!(
            event,
            CoreEvent::Recitation(RecitationEvent::LoadFailed { .. })
        )
    });

    for url in element_urls(112, 1) {
        element.script(
            url,
            core_playback::test_utils::LoadOutcome::DecodeError("404".into()),
        );
    }
    service.load_sequence(ikhlas(1, 1)).await.unwrap();

    let event = failures.recv().await.unwrap();
    assert_eq!(
        event,
        CoreEvent::Recitation(RecitationEvent::LoadFailed {
            index: 0,
            message: "Audio unavailable. Please check your internet connection and try again."
                .to_string()
        })
    );
}

fn element_urls(surah_id: u32, verse_number: u32) -> Vec<String> {
    use core_playback::{AudioResolver, AudioResourceResolver};
    AudioResourceResolver::default()
        .resolve(surah_id, verse_number)
        .into_iter()
        .map(|candidate| candidate.url)
        .collect()
}

#[core_async::test]
async fn selection_arguments_are_validated() {
    let element = Arc::new(ScriptedMediaElement::new());
    let mut catalog = MockCatalog::new();
    catalog.expect_verses().never();

    let service = RecitationService::builder(runtime(&element))
        .catalog(Arc::new(catalog))
        .start()
        .unwrap();

    assert!(matches!(
        service.start_selection(1, 5, 2).await,
        Err(CoreError::InvalidSelection(_))
    ));
    assert!(matches!(
        service.start_selection(1, 0, 3).await,
        Err(CoreError::InvalidSelection(_))
    ));
}

#[core_async::test]
async fn selection_without_catalog_reports_missing_capability() {
    let element = Arc::new(ScriptedMediaElement::new());
    let service = RecitationService::builder(runtime(&element))
        .start()
        .unwrap();

    let err = service.start_selection(1, 1, 7).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::CapabilityMissing { ref capability, .. } if capability == "VerseCatalog"
    ));
    assert!(element.loads().is_empty());
}

#[core_async::test]
async fn catalog_failures_propagate() {
    let element = Arc::new(ScriptedMediaElement::new());
    let mut catalog = MockCatalog::new();
    catalog
        .expect_verses()
        .returning(|surah_id, _, _| Err(BridgeError::NotFound(format!("surah {surah_id}"))));

    let service = RecitationService::builder(runtime(&element))
        .catalog(Arc::new(catalog))
        .start()
        .unwrap();

    let err = service.start_selection(200, 1, 3).await.unwrap_err();
    assert!(matches!(err, CoreError::Bridge(BridgeError::NotFound(_))));
    assert_eq!(service.snapshot().verse_count, 0);
}

#[test]
fn missing_media_element_fails_fast() {
    let err: CoreError = RuntimeConfig::builder().build().unwrap_err().into();

    assert!(matches!(
        err,
        CoreError::Runtime(core_runtime::Error::CapabilityMissing { ref capability, .. })
            if capability == "MediaElement"
    ));
}

#[core_async::test]
async fn invalid_player_config_is_rejected() {
    let element = Arc::new(ScriptedMediaElement::new());
    let err = RecitationService::builder(runtime(&element))
        .player_config(PlayerConfig::default().with_pause_duration(0))
        .start()
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Playback(PlaybackError::InvalidConfig(_))
    ));
}

#[core_async::test]
async fn shutdown_closes_the_session() {
    let element = Arc::new(ScriptedMediaElement::new());
    let service = RecitationService::builder(runtime(&element))
        .start()
        .unwrap();
    service.load_sequence(ikhlas(1, 3)).await.unwrap();

    service.shutdown().await;

    assert!(element.was_unloaded());
    assert!(matches!(
        service.load_sequence(ikhlas(1, 3)).await,
        Err(CoreError::Playback(PlaybackError::ControllerClosed))
    ));
}
