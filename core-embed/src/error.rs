//! # Embed Error Types
//!
//! Errors for platform resolution, payload generation, and external handoff.

use thiserror::Error;

use crate::resolver::PlatformKind;

/// Errors that can occur while resolving or embedding a track.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// URL does not match any supported platform's track shape.
    #[error("Unrecognized track URL: {0}")]
    InvalidUrl(String),

    /// URL resolved to a platform but no embeddable id could be derived.
    #[error("Cannot derive an embeddable {platform} id from: {url}")]
    PayloadGeneration { platform: PlatformKind, url: String },

    /// Neither the deep link nor the web URL could be handed to the OS.
    #[error("External handoff failed: {0}")]
    ExternalOpen(String),
}

impl EmbedError {
    /// Returns `true` if the error means the URL should never be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            EmbedError::InvalidUrl(_) | EmbedError::PayloadGeneration { .. }
        )
    }
}

/// Result type for embed operations.
pub type Result<T> = std::result::Result<T, EmbedError>;
