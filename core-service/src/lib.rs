//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media element,
//! clock, verse catalog, translations) into the recitation core. A host builds
//! a [`RuntimeConfig`], hands it to [`RecitationService::builder`], and drives
//! playback through the returned service while observing progress on the
//! event bus.
//!
//! ```ignore
//! use core_runtime::config::RuntimeConfig;
//! use core_service::RecitationService;
//!
//! let runtime = RuntimeConfig::builder()
//!     .media_element(Arc::new(HtmlAudioElement::new()))
//!     .build()?;
//! let service = RecitationService::builder(runtime)
//!     .catalog(Arc::new(QuranApi::new()))
//!     .start()?;
//!
//! service.start_selection(1, 1, 7).await?;
//! ```

pub mod error;
pub mod events;

pub use error::{CoreError, Result};
pub use events::EventBusListener;

use bridge_traits::{TranslationProvider, Verse, VerseCatalog};
use core_playback::{
    enrich_translations, AudioResolver, PlaybackController, PlaybackListener, PlayerConfig,
    PlayerSnapshot,
};
use core_runtime::config::RuntimeConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::logging::init_logging;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Builder for [`RecitationService`].
pub struct ServiceBuilder {
    runtime: RuntimeConfig,
    player: PlayerConfig,
    catalog: Option<Arc<dyn VerseCatalog>>,
    translations: Option<Arc<dyn TranslationProvider>>,
    listener: Option<Arc<dyn PlaybackListener>>,
    resolver: Option<Arc<dyn AudioResolver>>,
}

impl ServiceBuilder {
    pub fn player_config(mut self, config: PlayerConfig) -> Self {
        self.player = config;
        self
    }

    /// Source for [`RecitationService::start_selection`].
    pub fn catalog(mut self, catalog: Arc<dyn VerseCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Enables best-effort translation enrichment of every new sequence.
    pub fn translations(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.translations = Some(provider);
        self
    }

    /// Host listener called alongside the event bus.
    pub fn listener(mut self, listener: Arc<dyn PlaybackListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn AudioResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Install logging (when configured) and spawn the playback controller.
    ///
    /// Must be called from within the async runtime.
    pub fn start(self) -> Result<RecitationService> {
        if let Some(logging) = self.runtime.logging.clone() {
            if let Err(err) = init_logging(logging) {
                warn!(error = %err, "Logging already initialized, keeping existing subscriber");
            }
        }

        let mut bus_listener = EventBusListener::new(self.runtime.event_bus.clone());
        if let Some(listener) = self.listener {
            bus_listener = bus_listener.with_forward(listener);
        }

        let mut controller = PlaybackController::builder(self.runtime.media_element.clone())
            .config(self.player)
            .clock(self.runtime.clock.clone())
            .listener(Arc::new(bus_listener));
        if let Some(resolver) = self.resolver {
            controller = controller.resolver(resolver);
        }
        let controller = controller.spawn()?;

        info!("Recitation service started");

        Ok(RecitationService {
            runtime: self.runtime,
            controller,
            catalog: self.catalog,
            translations: self.translations,
        })
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct RecitationService {
    runtime: RuntimeConfig,
    controller: PlaybackController,
    catalog: Option<Arc<dyn VerseCatalog>>,
    translations: Option<Arc<dyn TranslationProvider>>,
}

impl RecitationService {
    pub fn builder(runtime: RuntimeConfig) -> ServiceBuilder {
        ServiceBuilder {
            runtime,
            player: PlayerConfig::default(),
            catalog: None,
            translations: None,
            listener: None,
            resolver: None,
        }
    }

    /// Fetch verses `start..=end` of `surah_id` and make them the active sequence.
    ///
    /// Returns the number of verses queued. The first verse starts loading
    /// immediately but does not play until [`PlaybackController::play`].
    #[instrument(skip(self))]
    pub async fn start_selection(&self, surah_id: u32, start: u32, end: u32) -> Result<usize> {
        if start == 0 || end < start {
            return Err(CoreError::InvalidSelection(format!(
                "verse range {}..={} is empty or not 1-based",
                start, end
            )));
        }

        let catalog = self.catalog.as_ref().ok_or_else(|| CoreError::CapabilityMissing {
            capability: "VerseCatalog".to_string(),
            message: "A VerseCatalog is required to select verses by range. \
                      Supply one with ServiceBuilder::catalog or call load_sequence directly."
                .to_string(),
        })?;

        let verses = catalog.verses(surah_id, start, end).await?;
        self.load_sequence(verses).await
    }

    /// Make `verses` the active sequence, enriching translations first when a
    /// provider is configured.
    pub async fn load_sequence(&self, verses: Vec<Verse>) -> Result<usize> {
        let verses = match &self.translations {
            Some(provider) => enrich_translations(verses, provider.as_ref()).await,
            None => verses,
        };

        let count = verses.len();
        self.controller.set_sequence(verses).await?;
        Ok(count)
    }

    /// Transport handle for the running session.
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.controller.snapshot()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.runtime.event_bus
    }

    /// Subscribe to every recitation event published from now on.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.runtime.event_bus.subscribe())
    }

    /// Stop the controller and release the media element.
    pub async fn shutdown(&self) {
        self.controller.shutdown().await;
        info!("Recitation service stopped");
    }
}

impl std::fmt::Debug for RecitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecitationService")
            .field("runtime", &self.runtime)
            .field("controller", &self.controller)
            .field("catalog", &self.catalog.is_some())
            .field("translations", &self.translations.is_some())
            .finish()
    }
}
