//! # Event Bus System
//!
//! Broadcasts recitation lifecycle events using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The playback controller reports what happens during a session (verse
//! changes, inter-verse pauses, load failures, completion) through a
//! listener; the service layer republishes those notifications here so any
//! number of independent consumers (session persistence, preference sync,
//! UI toasts, analytics) can subscribe without the controller knowing them.
//!
//! ```text
//! ┌────────────────────┐  listener  ┌──────────┐  subscribe  ┌───────────────┐
//! │ PlaybackController ├───────────>│ EventBus ├────────────>│ Session store │
//! └────────────────────┘            │          ├────────────>│ UI            │
//!                                   └──────────┘             └───────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, RecitationEvent};
//!
//! let bus = EventBus::new(16);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Recitation(RecitationEvent::VerseChanged {
//!     index: 1,
//!     surah_id: 1,
//!     verse_number: 2,
//! }))
//! .ok();
//!
//! assert!(matches!(stream.try_recv(), Ok(CoreEvent::Recitation(_))));
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind and missed `n`
//!   events. Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: every sender was dropped. Treat as shutdown.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Recitation session events
    Recitation(RecitationEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Recitation(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Recitation(RecitationEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Recitation(RecitationEvent::SessionCompleted { .. }) => EventSeverity::Info,
            CoreEvent::Recitation(RecitationEvent::SessionStarted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Recitation Events
// ============================================================================

/// Coarse playback phase, as presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPhase {
    /// Nothing loaded, or stopped.
    Idle,
    /// A load attempt is outstanding.
    Loading,
    /// A source is loaded and paused at some position.
    Ready,
    /// Audio is running.
    Playing,
    /// Silence between the end of one verse and the load of the next.
    InterVersePause,
    /// The final verse finished.
    Completed,
    /// The last operation failed; the controller is still usable.
    Error,
}

/// Summary of a finished recitation session, handed to callers for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Surah the session belonged to.
    pub surah_id: u32,
    /// First verse number of the sequence.
    pub start_verse: u32,
    /// Last verse number of the sequence.
    pub end_verse: u32,
    /// Number of verses played through.
    pub verses_completed: usize,
    /// Wall-clock seconds since the session started.
    pub elapsed_secs: u64,
    /// Inter-verse pause in effect when the session finished.
    pub pause_duration_secs: u32,
    /// Identifier of the preferred reciter.
    pub reciter: String,
}

/// Events emitted over the course of a recitation session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RecitationEvent {
    /// A new verse sequence was supplied.
    SessionStarted {
        /// Surah of the sequence.
        surah_id: u32,
        /// Number of verses in the sequence.
        verse_count: usize,
    },
    /// The active verse changed (or is about to, during an inter-verse pause).
    VerseChanged {
        /// 0-based index into the sequence.
        index: usize,
        /// Surah of the verse.
        surah_id: u32,
        /// 1-based verse number within the surah.
        verse_number: u32,
    },
    /// A verse ended and the controller is waiting before loading the next.
    InterVersePause {
        /// Index that will be loaded when the pause elapses.
        upcoming_index: usize,
        /// Length of the pause.
        pause_secs: u32,
    },
    /// Every audio candidate for a verse failed to load.
    LoadFailed {
        /// Index of the verse that could not be loaded.
        index: usize,
        /// User-facing error message.
        message: String,
    },
    /// The coarse playback phase changed.
    PlaybackStateChanged {
        /// New phase.
        phase: PlayerPhase,
    },
    /// The last verse of the sequence finished playing.
    SessionCompleted {
        /// Session totals.
        summary: SessionSummary,
    },
}

impl RecitationEvent {
    fn description(&self) -> &str {
        match self {
            RecitationEvent::SessionStarted { .. } => "Recitation session started",
            RecitationEvent::VerseChanged { .. } => "Active verse changed",
            RecitationEvent::InterVersePause { .. } => "Pausing between verses",
            RecitationEvent::LoadFailed { .. } => "Verse audio unavailable",
            RecitationEvent::PlaybackStateChanged { .. } => "Playback state changed",
            RecitationEvent::SessionCompleted { .. } => "Recitation session completed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for [`CoreEvent`]s.
///
/// Cheap to clone; clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    ///
    /// let _subscriber = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventSeverity, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let failures = EventStream::new(event_bus.subscribe())
///     .filter(|event| event.severity() == EventSeverity::Error);
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse_changed(index: usize) -> CoreEvent {
        CoreEvent::Recitation(RecitationEvent::VerseChanged {
            index,
            surah_id: 36,
            verse_number: index as u32 + 1,
        })
    }

    fn summary() -> SessionSummary {
        SessionSummary {
            surah_id: 1,
            start_verse: 1,
            end_verse: 7,
            verses_completed: 7,
            elapsed_secs: 95,
            pause_duration_secs: 5,
            reciter: "Alafasy_128kbps".to_string(),
        }
    }

    #[core_async::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[core_async::test]
    async fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(10);
        assert!(bus.emit(verse_changed(0)).is_err());
    }

    #[core_async::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = verse_changed(3);
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[core_async::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).filter(|event| {
            matches!(
                event,
                CoreEvent::Recitation(RecitationEvent::SessionCompleted { .. })
            )
        });

        bus.emit(verse_changed(0)).ok();
        let completed = CoreEvent::Recitation(RecitationEvent::SessionCompleted {
            summary: summary(),
        });
        bus.emit(completed.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), completed);
    }

    #[core_async::test]
    async fn test_try_recv_skips_filtered_events() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| event.severity() == EventSeverity::Error);

        bus.emit(verse_changed(0)).ok();
        assert!(stream.try_recv().is_none());

        bus.emit(CoreEvent::Recitation(RecitationEvent::LoadFailed {
            index: 0,
            message: "Audio unavailable".to_string(),
        }))
        .ok();
        assert!(matches!(stream.try_recv(), Some(Ok(_))));
    }

    #[core_async::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(verse_changed(i)).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity_and_description() {
        let failed = CoreEvent::Recitation(RecitationEvent::LoadFailed {
            index: 2,
            message: "Audio unavailable".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);
        assert_eq!(failed.description(), "Verse audio unavailable");

        let pause = CoreEvent::Recitation(RecitationEvent::InterVersePause {
            upcoming_index: 1,
            pause_secs: 5,
        });
        assert_eq!(pause.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = CoreEvent::Recitation(RecitationEvent::SessionCompleted {
            summary: summary(),
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Recitation");
        assert_eq!(json["payload"]["event"], "SessionCompleted");
        assert_eq!(json["payload"]["summary"]["versesCompleted"], 7);

        let parsed: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
