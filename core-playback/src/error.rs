//! # Playback Error Types
//!
//! Error taxonomy for verse loading and transport operations.
//!
//! Every failure a transport operation reports is also written to the
//! `error` field of the published [`PlayerSnapshot`](crate::view::PlayerSnapshot)
//! as [`PlaybackError::user_message`]. Argument errors
//! ([`IndexOutOfBounds`](PlaybackError::IndexOutOfBounds),
//! [`InvalidConfig`](PlaybackError::InvalidConfig)) are the exception: they
//! leave the controller untouched and are only returned.

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    // ========================================================================
    // Load Errors
    // ========================================================================
    /// A candidate neither became playable nor failed within the load ceiling.
    #[error("Timed out loading {url}")]
    LoadTimeout { url: String },

    /// A candidate could not be fetched or decoded.
    #[error("Failed to load {url}: {reason}")]
    LoadDecodeError { url: String, reason: String },

    /// Every candidate for a verse failed to load.
    #[error("Audio unavailable for verse {surah_id}:{verse_number}")]
    AudioUnavailable { surah_id: u32, verse_number: u32 },

    /// A newer request replaced this one before it finished.
    #[error("Superseded by a newer request")]
    Superseded,

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The platform refused to start playback (autoplay policy, decode error).
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// `play` was invoked before any source was loaded. A load has been started.
    #[error("No audio loaded")]
    NoAudioLoaded,

    /// `play` was invoked while a load attempt is outstanding.
    #[error("Audio is still loading")]
    StillLoading,

    /// The active verse sequence is empty.
    #[error("No verses in the active sequence")]
    EmptySequence,

    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// Verse index outside the active sequence.
    #[error("Verse index {index} out of bounds for sequence of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A configuration value is outside its accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The controller task has shut down.
    #[error("Playback controller is closed")]
    ControllerClosed,
}

impl PlaybackError {
    /// Fixed text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::LoadTimeout { .. }
            | PlaybackError::LoadDecodeError { .. }
            | PlaybackError::AudioUnavailable { .. } => {
                "Audio unavailable. Please check your internet connection and try again."
                    .to_string()
            }
            PlaybackError::PlaybackRejected(reason) => {
                format!("Playback failed: {}. Click play again to retry.", reason)
            }
            PlaybackError::NoAudioLoaded => {
                "Loading audio, please try again in a moment...".to_string()
            }
            PlaybackError::StillLoading => "Audio is still loading, please wait...".to_string(),
            PlaybackError::EmptySequence => "No verses available to play".to_string(),
            PlaybackError::Superseded => "Loading a different verse...".to_string(),
            PlaybackError::IndexOutOfBounds { .. } => {
                "That verse is not in this session.".to_string()
            }
            PlaybackError::InvalidConfig(detail) => format!("Invalid setting: {}", detail),
            PlaybackError::ControllerClosed => "The player has been closed.".to_string(),
        }
    }

    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadTimeout { .. }
                | PlaybackError::LoadDecodeError { .. }
                | PlaybackError::AudioUnavailable { .. }
                | PlaybackError::PlaybackRejected(_)
                | PlaybackError::NoAudioLoaded
                | PlaybackError::StillLoading
                | PlaybackError::Superseded
        )
    }

    /// Returns `true` if the error leaves controller state untouched and is
    /// therefore not recorded in the read-model.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::IndexOutOfBounds { .. } | PlaybackError::InvalidConfig(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
