//! # Channel Wire Protocol
//!
//! The JSON messages exchanged with the sandbox, as tagged unions. Commands
//! flow host → sandbox keyed by `action`; events flow sandbox → host keyed by
//! `type`. Messages are transient and never persisted.
//!
//! Unknown event tags deserialize to [`SandboxEvent::Unknown`] so the
//! drop-silently policy is enforced by the type, not by call sites
//! remembering to handle stray strings.

use serde::{Deserialize, Serialize};

/// Host-issued command, delivered into the sandbox as stringified JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    Play,
    Pause,
    #[serde(rename_all = "camelCase")]
    SeekTo { percentage: f32 },
    #[serde(rename_all = "camelCase")]
    SetVolume { volume: f32 },
}

impl Command {
    /// Serialize for channel delivery.
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Sandbox-emitted event.
///
/// Every payload tags its events with the platform's wire name; the
/// orchestrator uses that declared identity to drop messages from a
/// superseded sandbox. The tag is defaulted rather than required so that a
/// well-formed event lacking it is still applied (it simply claims no
/// identity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SandboxEvent {
    #[serde(rename_all = "camelCase")]
    Ready {
        #[serde(default)]
        platform: String,
        /// Track duration in milliseconds as reported by the embed.
        #[serde(default)]
        duration: u64,
    },
    Play {
        #[serde(default)]
        platform: String,
    },
    Pause {
        #[serde(default)]
        platform: String,
    },
    Finish {
        #[serde(default)]
        platform: String,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        #[serde(default)]
        platform: String,
        #[serde(default)]
        current_time: u64,
        #[serde(default)]
        duration: u64,
        #[serde(default)]
        percentage: f32,
    },
    Buffering {
        #[serde(default)]
        platform: String,
    },
    /// Preview embed is ready but can only be started by a tap inside its
    /// own chrome.
    ManualPlayRequired {
        #[serde(default)]
        platform: String,
    },
    /// User pressed play inside the preview embed chrome.
    TrackPlay {
        #[serde(default)]
        platform: String,
    },
    /// User pressed pause inside the preview embed chrome.
    TrackPause {
        #[serde(default)]
        platform: String,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        #[serde(default)]
        platform: String,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        code: Option<i64>,
    },
    /// Any tag outside the taxonomy; routed to the drop-silently path.
    #[serde(other)]
    Unknown,
}

impl SandboxEvent {
    /// The platform identity this event claims, if it claims one.
    pub fn platform(&self) -> Option<&str> {
        let tag = match self {
            SandboxEvent::Ready { platform, .. }
            | SandboxEvent::Play { platform }
            | SandboxEvent::Pause { platform }
            | SandboxEvent::Finish { platform }
            | SandboxEvent::Progress { platform, .. }
            | SandboxEvent::Buffering { platform }
            | SandboxEvent::ManualPlayRequired { platform }
            | SandboxEvent::TrackPlay { platform }
            | SandboxEvent::TrackPause { platform }
            | SandboxEvent::Error { platform, .. } => platform.as_str(),
            SandboxEvent::Unknown => return None,
        };
        (!tag.is_empty()).then_some(tag)
    }
}
