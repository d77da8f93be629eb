//! Lifecycle callbacks.
//!
//! The controller calls these from its own task, in the order things happen.
//! Implementations should return quickly; anything slow (persistence, network)
//! belongs on a task of its own.

use bridge_traits::Verse;

pub use core_runtime::events::SessionSummary;
use core_runtime::events::PlayerPhase;

/// Receives session lifecycle notifications from a playback controller.
///
/// Only [`on_verse_changed`](Self::on_verse_changed) and
/// [`on_session_complete`](Self::on_session_complete) are required.
pub trait PlaybackListener: Send + Sync {
    /// The active verse changed.
    ///
    /// During an inter-verse pause this fires for the *upcoming* verse as
    /// soon as the pause begins, before its audio loads.
    fn on_verse_changed(&self, index: usize, verse: &Verse);

    /// The final verse of the sequence finished playing.
    fn on_session_complete(&self, summary: &SessionSummary);

    /// A new verse sequence was supplied.
    fn on_session_started(&self, _surah_id: u32, _verse_count: usize) {}

    /// A verse ended and the controller will wait `pause_secs` before the next.
    fn on_inter_verse_pause(&self, _upcoming_index: usize, _pause_secs: u32) {}

    /// Every candidate for the verse at `index` failed.
    fn on_load_failed(&self, _index: usize, _message: &str) {}

    /// The coarse playback phase changed.
    fn on_phase_changed(&self, _phase: PlayerPhase) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl PlaybackListener for NoopListener {
    fn on_verse_changed(&self, _index: usize, _verse: &Verse) {}

    fn on_session_complete(&self, _summary: &SessionSummary) {}
}
