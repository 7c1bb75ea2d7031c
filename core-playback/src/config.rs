//! # Player Configuration
//!
//! Tuning knobs for the orchestrator: simulated-progress cadence, the
//! fallback preview length, and the optional readiness watchdog.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Interval between simulated progress ticks for the preview platform.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_progress_tick")]
    pub progress_tick: Duration,

    /// Preview length assumed when a preview embed reports no duration of
    /// its own.
    ///
    /// Default: 30 seconds.
    #[serde(default = "default_preview_duration")]
    pub preview_duration: Duration,

    /// Optional readiness watchdog: if set and no `ready` event arrives
    /// within the window after mounting, the player transitions to `error`.
    ///
    /// Default: disabled — a silent embed stays in `loading`, matching the
    /// behavior hosts shipped with.
    #[serde(default)]
    pub ready_timeout: Option<Duration>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_tick: default_progress_tick(),
            preview_duration: default_preview_duration(),
            ready_timeout: None,
        }
    }
}

impl PlayerConfig {
    /// Enable the readiness watchdog.
    pub fn with_ready_timeout(mut self, window: Duration) -> Self {
        self.ready_timeout = Some(window);
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_tick.is_zero() {
            return Err("progress_tick must be > 0".to_string());
        }

        if self.preview_duration.is_zero() {
            return Err("preview_duration must be > 0".to_string());
        }

        if self.ready_timeout.is_some_and(|window| window.is_zero()) {
            return Err("ready_timeout, when set, must be > 0".to_string());
        }

        Ok(())
    }
}

fn default_progress_tick() -> Duration {
    Duration::from_millis(500)
}

fn default_preview_duration() -> Duration {
    Duration::from_secs(30)
}
