//! Playback telemetry sink.
//!
//! The core reports coarse playback milestones to an analytics collector
//! owned by the host. Events are fire-and-forget: a failed or slow sink must
//! never stall playback, so the core detaches every `record` call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{error::Result, platform::PlatformSendSync};

/// Playback milestone being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    Play,
    Pause,
    Finish,
    Error,
    Backgrounded,
}

/// Structured telemetry event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Milestone kind
    pub kind: TelemetryKind,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Wire tag of the platform the current track resolved to, when known
    pub platform: Option<String>,
    /// Structured fields (error codes, track URLs)
    pub fields: HashMap<String, String>,
}

impl TelemetryEvent {
    pub fn new(kind: TelemetryKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            platform: None,
            fields: HashMap::new(),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Telemetry sink trait
///
/// Forwards playback milestones to the host analytics pipeline. Implementations
/// should buffer and batch as they see fit; the core neither retries nor
/// awaits delivery guarantees.
///
/// # Security
///
/// Implementations should ensure no PII beyond the track URL is recorded, and
/// that collection respects the host's consent configuration.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait TelemetrySink: PlatformSendSync {
    /// Forward one event to the host collector
    async fn record(&self, event: TelemetryEvent) -> Result<()>;

    /// Flush any buffered events
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// No-op sink for hosts without an analytics pipeline.
#[derive(Debug, Clone, Default)]
pub struct NullTelemetrySink;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl TelemetrySink for NullTelemetrySink {
    async fn record(&self, _event: TelemetryEvent) -> Result<()> {
        Ok(())
    }
}
