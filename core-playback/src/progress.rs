//! Simulated progress for the preview-only platform.
//!
//! The preview embed reports no progress, so elapsed time is measured
//! locally from the injected clock between the embed chrome's `trackPlay`
//! and `trackPause` signals. Ticks are synthesized on a fixed interval and
//! fed through the same dispatch path as real sandbox events, tagged with
//! the generation they belong to so a superseded track can never receive
//! them.

use std::{sync::Arc, time::Duration};

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::{
    orchestrator::{Inbound, InboundKind},
    protocol::SandboxEvent,
};

pub(crate) struct ProgressSimulator {
    clock: Arc<dyn Clock>,
    tick: Duration,
    /// Elapsed time accumulated across pause/resume cycles.
    elapsed: Duration,
    started_at: Option<DateTime<Utc>>,
    cancel: Option<CancellationToken>,
}

impl ProgressSimulator {
    pub fn new(clock: Arc<dyn Clock>, tick: Duration) -> Self {
        Self {
            clock,
            tick,
            elapsed: Duration::ZERO,
            started_at: None,
            cancel: None,
        }
    }

    /// Begin (or resume) ticking against the given preview duration.
    ///
    /// Emits a synthetic `progress` event per tick and exactly one synthetic
    /// `finish` once elapsed time reaches the preview duration.
    pub fn start(
        &mut self,
        generation: u64,
        platform: &str,
        preview: Duration,
        tx: UnboundedSender<Inbound>,
    ) {
        self.stop_ticking();
        let started = self.clock.now();
        self.started_at = Some(started);

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        let clock = Arc::clone(&self.clock);
        let base = self.elapsed;
        let tick = self.tick;
        let platform = platform.to_string();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // the first tick completes immediately; skip it so ticks land on
            // the cadence boundary
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let run = (clock.now() - started).to_std().unwrap_or_default();
                let elapsed = base + run;
                let finished = elapsed >= preview;

                let event = synthetic_progress(&platform, elapsed, preview);
                if tx
                    .send(Inbound {
                        generation,
                        kind: InboundKind::Synthetic(event),
                    })
                    .is_err()
                {
                    break;
                }

                if finished {
                    let _ = tx.send(Inbound {
                        generation,
                        kind: InboundKind::Synthetic(SandboxEvent::Finish { platform }),
                    });
                    break;
                }
            }
        });
    }

    /// Stop ticking, folding the current run into the accumulated elapsed
    /// time so a later `start` resumes where the preview left off.
    pub fn pause(&mut self) {
        if let Some(started) = self.started_at.take() {
            let run = (self.clock.now() - started).to_std().unwrap_or_default();
            self.elapsed += run;
        }
        self.stop_ticking();
    }

    /// Cancel ticking and forget all accumulated progress.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.stop_ticking();
    }

    fn stop_ticking(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}

/// Percentage of the preview elapsed, bounded to `0..=100`.
pub(crate) fn simulated_percentage(elapsed: Duration, preview: Duration) -> f32 {
    if preview.is_zero() {
        return 0.0;
    }
    ((elapsed.as_secs_f64() / preview.as_secs_f64()).min(1.0) * 100.0) as f32
}

fn synthetic_progress(platform: &str, elapsed: Duration, preview: Duration) -> SandboxEvent {
    let current = elapsed.min(preview);
    SandboxEvent::Progress {
        platform: platform.to_string(),
        current_time: current.as_millis() as u64,
        duration: preview.as_millis() as u64,
        percentage: simulated_percentage(elapsed, preview),
    }
}
