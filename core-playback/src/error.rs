//! # Player Error Types
//!
//! Errors surfaced by the playback orchestrator. Malformed and stale channel
//! messages are deliberately absent: those are recovered locally (dropped)
//! and never become errors.

use bridge_traits::BridgeError;
use core_embed::EmbedError;
use thiserror::Error;

/// Errors that can occur during playback orchestration.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// URL did not match any supported platform's track shape.
    #[error("Unrecognized track URL: {0}")]
    InvalidUrl(String),

    /// Track resolved to a platform but no embeddable payload could be built.
    #[error("Payload generation failed: {0}")]
    PayloadGeneration(String),

    /// The platform SDK reported a runtime error inside the sandbox
    /// (e.g., video unavailable, embedding disabled).
    #[error("Sandbox error on {platform}: {message}")]
    Sandbox {
        platform: String,
        code: Option<i64>,
        message: String,
    },

    /// No `ready` event arrived within the configured window.
    #[error("Sandbox did not become ready in time")]
    ReadyTimeout,

    /// Seeking requires a known duration.
    #[error("Seek unavailable before duration is known")]
    SeekUnavailable,

    /// Operation requires a loaded track.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Player configuration failed validation.
    #[error("Invalid player configuration: {0}")]
    InvalidConfig(String),

    /// Host bridge failure (mount, post, or teardown).
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl From<EmbedError> for PlayerError {
    fn from(err: EmbedError) -> Self {
        match err {
            EmbedError::InvalidUrl(url) => PlayerError::InvalidUrl(url),
            other => PlayerError::PayloadGeneration(other.to_string()),
        }
    }
}

impl PlayerError {
    /// Returns `true` if a subsequent `play()` with a different URL can be
    /// expected to succeed.
    pub fn is_track_specific(&self) -> bool {
        matches!(
            self,
            PlayerError::InvalidUrl(_)
                | PlayerError::PayloadGeneration(_)
                | PlayerError::Sandbox { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
