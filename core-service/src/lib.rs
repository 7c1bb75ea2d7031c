//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (sandbox surface,
//! external opener, telemetry, clock, lifecycle observer) into the playback
//! core. Hosts construct one [`PlayerService`] per app session and inject it
//! wherever views need playback: the service owns the single orchestrator
//! instance that makes the at-most-one-sandbox rule meaningful. Sharing
//! beyond that is the host's dependency-injection concern, not a hidden
//! global here.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use tracing::warn;

use bridge_traits::{
    external::ExternalOpener,
    lifecycle::{LifecycleObserver, LifecycleState},
    sandbox::SandboxHost,
    telemetry::{TelemetryEvent, TelemetryKind, TelemetrySink},
    time::{Clock, SystemClock},
};
use core_playback::{Player, PlayerConfig, PlayerState};

/// Aggregated handle to all bridge dependencies the playback core requires.
pub struct PlayerDependencies {
    pub sandbox_host: Arc<dyn SandboxHost>,
    pub external_opener: Arc<dyn ExternalOpener>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub clock: Arc<dyn Clock>,
    /// Optional: without it, background playback goes unreported.
    pub lifecycle: Option<Arc<dyn LifecycleObserver>>,
}

impl PlayerDependencies {
    /// Construct a dependency bundle from the required bridge handles.
    pub fn new(
        sandbox_host: Arc<dyn SandboxHost>,
        external_opener: Arc<dyn ExternalOpener>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            sandbox_host,
            external_opener,
            telemetry,
            clock: Arc::new(SystemClock),
            lifecycle: None,
        }
    }

    /// Replace the system clock (deterministic tests, host-driven time).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach a lifecycle observer for background-playback telemetry.
    pub fn with_lifecycle(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle = Some(observer);
        self
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct PlayerService {
    player: Player,
    deps: Arc<PlayerDependencies>,
}

impl PlayerService {
    /// Create the service and its single orchestrator instance.
    pub fn new(deps: PlayerDependencies, config: PlayerConfig) -> Result<Self> {
        let deps = Arc::new(deps);
        let player = Player::new(
            Arc::clone(&deps.sandbox_host),
            Arc::clone(&deps.clock),
            Arc::clone(&deps.telemetry),
            config,
        )?;

        if let Some(observer) = deps.lifecycle.clone() {
            spawn_lifecycle_watch(observer, player.clone(), Arc::clone(&deps.telemetry));
        }

        Ok(Self { player, deps })
    }

    /// The playback orchestrator.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<PlayerDependencies> {
        Arc::clone(&self.deps)
    }

    /// Hand a track off to the OS: deep link first, web URL as fallback.
    ///
    /// The UI takes this path when
    /// [`Player::can_control_in_sandbox`](core_playback::Player::can_control_in_sandbox)
    /// says in-sandbox controls are unavailable.
    pub async fn open_externally(&self, url: &str) -> Result<()> {
        core_embed::deeplink::open_externally(url, self.deps.external_opener.as_ref()).await?;
        Ok(())
    }
}

/// Report background playback to telemetry.
///
/// Backgrounding does not pause the sandbox; whether the OS suspends the
/// renderer is outside this layer's control, so the only action taken is the
/// report itself.
fn spawn_lifecycle_watch(
    observer: Arc<dyn LifecycleObserver>,
    player: Player,
    telemetry: Arc<dyn TelemetrySink>,
) {
    tokio::spawn(async move {
        let mut stream = match observer.subscribe_changes().await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(target: "core_service", %err, "lifecycle observer unavailable");
                return;
            }
        };

        while let Some(state) = stream.next().await {
            if state == LifecycleState::Background && player.state() == PlayerState::Playing {
                let mut event = TelemetryEvent::new(TelemetryKind::Backgrounded);
                if let Some(track) = player.current_track() {
                    event = event
                        .with_platform(track.platform.as_str())
                        .with_field("url", track.url);
                }
                if let Err(err) = telemetry.record(event).await {
                    warn!(target: "core_service", %err, "telemetry sink rejected backgrounded event");
                }
            }
        }
    });
}
