//! Core playback types: track identity, player state, and progress.

use core_embed::resolver::PlatformKind;
use serde::{Deserialize, Serialize};

/// Display metadata attached to a playback request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Display title for the track.
    pub title: Option<String>,
    /// Display artist string.
    pub artist: Option<String>,
    /// Artwork image URL.
    pub artwork_url: Option<String>,
}

/// The current track: URL plus resolved platform.
///
/// Immutable once resolved; a new `play()` call derives a fresh reference.
/// URL and platform together form the track identity used to detect stale
/// channel messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub url: String,
    pub platform: PlatformKind,
    pub metadata: Option<TrackMetadata>,
}

/// Playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// No track loaded.
    #[default]
    Idle,
    /// Sandbox mounting or waiting for `ready`.
    Loading,
    Playing,
    Paused,
    /// Renderable failure; cleared by the next `play()`.
    Error,
}

impl PlayerState {
    /// Returns `true` while a track is loaded and not failed.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlayerState::Loading | PlayerState::Playing | PlayerState::Paused
        )
    }
}

/// Playback position.
///
/// For the preview-only platform the duration is a fixed preview length and
/// the current time comes from the local simulator; for the other platforms
/// both fields are sandbox-reported and authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    pub current_ms: u64,
    pub duration_ms: u64,
    /// Position as a percentage of duration, in `0..=100`.
    pub percentage: f32,
}

impl Progress {
    /// Progress at the start of a not-yet-ready track.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a progress value, deriving the percentage from the position.
    pub fn from_position(current_ms: u64, duration_ms: u64) -> Self {
        let percentage = if duration_ms == 0 {
            0.0
        } else {
            ((current_ms as f64 / duration_ms as f64) * 100.0).clamp(0.0, 100.0) as f32
        };
        Self {
            current_ms,
            duration_ms,
            percentage,
        }
    }
}

/// Read-only view of the orchestrator, published after every mutation.
#[derive(Debug, Clone, Default)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub track: Option<TrackRef>,
    pub progress: Progress,
    /// The preview embed is ready and waiting for a tap inside its chrome.
    pub manual_play_required: bool,
}
