//! Republishes controller lifecycle callbacks on the event bus.

use bridge_traits::Verse;
use core_playback::{PlaybackListener, PlayerPhase, SessionSummary};
use core_runtime::events::{CoreEvent, EventBus, RecitationEvent};
use std::sync::Arc;
use tracing::trace;

/// [`PlaybackListener`] that turns every callback into a [`RecitationEvent`].
///
/// An optional host listener is called first, so hosts can still react to
/// callbacks directly while the bus feeds everything else.
pub struct EventBusListener {
    bus: EventBus,
    forward: Option<Arc<dyn PlaybackListener>>,
}

impl EventBusListener {
    pub fn new(bus: EventBus) -> Self {
        Self { bus, forward: None }
    }

    pub fn with_forward(mut self, listener: Arc<dyn PlaybackListener>) -> Self {
        self.forward = Some(listener);
        self
    }

    fn emit(&self, event: RecitationEvent) {
        // No subscribers is not an error for a fire-and-forget bus.
        if self.bus.emit(CoreEvent::Recitation(event)).is_err() {
            trace!("Recitation event dropped, no subscribers");
        }
    }
}

impl PlaybackListener for EventBusListener {
    fn on_verse_changed(&self, index: usize, verse: &Verse) {
        if let Some(forward) = &self.forward {
            forward.on_verse_changed(index, verse);
        }
        self.emit(RecitationEvent::VerseChanged {
            index,
            surah_id: verse.surah_id,
            verse_number: verse.number,
        });
    }

    fn on_session_complete(&self, summary: &SessionSummary) {
        if let Some(forward) = &self.forward {
            forward.on_session_complete(summary);
        }
        self.emit(RecitationEvent::SessionCompleted {
            summary: summary.clone(),
        });
    }

    fn on_session_started(&self, surah_id: u32, verse_count: usize) {
        if let Some(forward) = &self.forward {
            forward.on_session_started(surah_id, verse_count);
        }
        self.emit(RecitationEvent::SessionStarted {
            surah_id,
            verse_count,
        });
    }

    fn on_inter_verse_pause(&self, upcoming_index: usize, pause_secs: u32) {
        if let Some(forward) = &self.forward {
            forward.on_inter_verse_pause(upcoming_index, pause_secs);
        }
        self.emit(RecitationEvent::InterVersePause {
            upcoming_index,
            pause_secs,
        });
    }

    fn on_load_failed(&self, index: usize, message: &str) {
        if let Some(forward) = &self.forward {
            forward.on_load_failed(index, message);
        }
        self.emit(RecitationEvent::LoadFailed {
            index,
            message: message.to_string(),
        });
    }

    fn on_phase_changed(&self, phase: PlayerPhase) {
        if let Some(forward) = &self.forward {
            forward.on_phase_changed(phase);
        }
        self.emit(RecitationEvent::PlaybackStateChanged { phase });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_runtime::events::EventStream;

    #[core_async::test]
    async fn callbacks_become_bus_events() {
        let bus = EventBus::new(16);
        let mut stream = EventStream::new(bus.subscribe());
        let listener = EventBusListener::new(bus);

        listener.on_session_started(36, 12);
        listener.on_verse_changed(1, &Verse::new(36, 2, "ayah", "verse"));
        listener.on_phase_changed(PlayerPhase::InterVersePause);

        assert_eq!(
            stream.recv().await.unwrap(),
            CoreEvent::Recitation(RecitationEvent::SessionStarted {
                surah_id: 36,
                verse_count: 12
            })
        );
        assert_eq!(
            stream.recv().await.unwrap(),
            CoreEvent::Recitation(RecitationEvent::VerseChanged {
                index: 1,
                surah_id: 36,
                verse_number: 2
            })
        );
        assert_eq!(
            stream.recv().await.unwrap(),
            CoreEvent::Recitation(RecitationEvent::PlaybackStateChanged {
                phase: PlayerPhase::InterVersePause
            })
        );
    }

    #[test]
    fn emitting_without_subscribers_is_silent() {
        let listener = EventBusListener::new(EventBus::new(4));
        listener.on_load_failed(0, "Audio unavailable");
    }
}
