//! # Player Read-Model
//!
//! The externally visible state of a playback controller. A fresh
//! [`PlayerSnapshot`] is published after every input the controller
//! processes; presentation code reads or subscribes to it and never touches
//! the controller's internals.

use bridge_traits::Verse;
use serde::{Deserialize, Serialize};

pub use core_runtime::events::PlayerPhase;

/// Point-in-time view of a playback controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Audio is running.
    pub is_playing: bool,
    /// In the silence between two verses (not a manual pause).
    pub is_paused: bool,
    /// A load attempt is outstanding.
    pub is_loading: bool,
    /// Playback position within the current verse, in seconds.
    pub current_time: f64,
    /// Length of the current verse, in seconds; zero until known.
    pub duration: f64,
    /// `current_time / duration` as a percentage, always within `0..=100`.
    pub progress_percent: f64,
    /// Last user-facing failure message.
    pub error: Option<String>,
    /// Verse at `current_index`, if the sequence is non-empty.
    pub current_verse: Option<Verse>,
    /// 0-based position in the sequence.
    pub current_index: usize,
    /// Number of verses in the active sequence.
    pub verse_count: usize,
    /// The final verse played through.
    pub session_completed: bool,
    /// Verses before the current one.
    pub completed_count: usize,
    /// Verses after the current one.
    pub remaining_count: usize,
    /// Whole seconds since the session started.
    pub session_elapsed_secs: u64,
    /// Inter-verse pause currently in effect.
    pub pause_duration_secs: u32,
    /// Whether an explicit session repeat restarts from the first verse.
    pub auto_repeat: bool,
}

impl PlayerSnapshot {
    /// Coarse phase derived from the flags, most specific first.
    pub fn phase(&self) -> PlayerPhase {
        if self.is_loading {
            PlayerPhase::Loading
        } else if self.is_playing {
            PlayerPhase::Playing
        } else if self.is_paused {
            PlayerPhase::InterVersePause
        } else if self.session_completed {
            PlayerPhase::Completed
        } else if self.error.is_some() {
            PlayerPhase::Error
        } else if self.duration > 0.0 || self.current_time > 0.0 {
            PlayerPhase::Ready
        } else {
            PlayerPhase::Idle
        }
    }

    /// `m:ss` rendering of the current verse position.
    pub fn current_time_label(&self) -> String {
        format_clock(self.current_time.max(0.0) as u64)
    }

    /// `m:ss` rendering of the session time.
    pub fn session_time_label(&self) -> String {
        format_clock(self.session_elapsed_secs)
    }
}

/// Percentage of `current` through `duration`, clamped to `0..=100`.
///
/// Zero whenever the duration is unknown.
pub fn progress_percent(current: f64, duration: f64) -> f64 {
    if duration > 0.0 && current.is_finite() && duration.is_finite() {
        (current / duration * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Verses before `index`.
pub fn completed_count(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}

/// Verses after `index`.
pub fn remaining_count(index: usize, len: usize) -> usize {
    len.saturating_sub(index).saturating_sub(1)
}

/// Render whole seconds as `m:ss`.
///
/// ```
/// use core_playback::view::format_clock;
///
/// assert_eq!(format_clock(0), "0:00");
/// assert_eq!(format_clock(95), "1:35");
/// assert_eq!(format_clock(3600), "60:00");
/// ```
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
