//! # Playback Orchestrator
//!
//! Owns the current track identity, player state, and progress. Consumes
//! channel events, applies per-platform quirks, and issues commands.
//!
//! ## State machine
//!
//! `idle → loading → {playing ⇄ paused} → idle` on finish/stop; any state
//! `→ error` on a sandbox error; `error → loading` on the next `play()`.
//!
//! ## Ownership model
//!
//! There is exactly one live sandbox and one current track at a time.
//! Concurrent `play()` calls serialize last-write-wins: a new `play()`
//! supersedes and tears down any in-flight sandbox. Every mount bumps a
//! generation counter; inbound frames carry the generation they were created
//! under and frames from a superseded generation are dropped before they can
//! touch state. Events additionally declare a platform identity which must
//! match the current track.
//!
//! Commands are fire-and-forget: the machine never assumes a command took
//! effect until the corresponding event arrives, so UI-visible state updates
//! only on message receipt.

use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use bridge_traits::{
    sandbox::{SandboxHost, SandboxMessageStream},
    telemetry::{TelemetryEvent, TelemetryKind, TelemetrySink},
    time::Clock,
};
use core_embed::{
    payload,
    resolver::{self, Capabilities, PlatformKind},
};

use crate::{
    channel::MessageChannel,
    config::PlayerConfig,
    error::{PlayerError, Result},
    progress::ProgressSimulator,
    protocol::{Command, SandboxEvent},
    types::{PlayerSnapshot, PlayerState, Progress, TrackMetadata, TrackRef},
};

/// Where an inbound frame originated.
///
/// Sandbox-reported progress is only authoritative for platforms that report
/// progress; synthetic frames come from the local simulator and always apply.
pub(crate) enum InboundKind {
    Sandbox(SandboxEvent),
    Synthetic(SandboxEvent),
    ReadyTimeout,
}

/// One unit of work for the dispatch loop, tagged with the sandbox
/// generation it belongs to.
pub(crate) struct Inbound {
    pub generation: u64,
    pub kind: InboundKind,
}

struct ActiveSandbox {
    channel: MessageChannel,
    capabilities: Capabilities,
    watchdog: Option<CancellationToken>,
}

/// The playback orchestrator handle.
///
/// Cheap to clone; all clones share one state machine. Construct exactly one
/// per app session and inject it where views need it — the single-instance
/// contract is what makes "at most one sandbox alive" meaningful.
#[derive(Clone)]
pub struct Player {
    core: Arc<Mutex<PlayerCore>>,
    snapshot: Arc<RwLock<PlayerSnapshot>>,
}

impl Player {
    /// Create an orchestrator over the given host bridges.
    pub fn new(
        host: Arc<dyn SandboxHost>,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn TelemetrySink>,
        config: PlayerConfig,
    ) -> Result<Self> {
        config.validate().map_err(PlayerError::InvalidConfig)?;

        let snapshot = Arc::new(RwLock::new(PlayerSnapshot::default()));
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel::<Inbound>();

        let simulator = ProgressSimulator::new(Arc::clone(&clock), config.progress_tick);
        let core = Arc::new(Mutex::new(PlayerCore {
            host,
            telemetry,
            config,
            snapshot: Arc::clone(&snapshot),
            inbound_tx,
            state: PlayerState::Idle,
            track: None,
            progress: Progress::zero(),
            manual_play_required: false,
            generation: 0,
            sandbox: None,
            simulator,
        }));

        // Dispatch loop: the single logical thread of control for all
        // message-driven mutation. Holds only a weak handle so dropping the
        // last Player clone ends the loop.
        let dispatch_core = Arc::downgrade(&core);
        tokio::spawn(async move {
            while let Some(frame) = inbound_rx.recv().await {
                let Some(core) = dispatch_core.upgrade() else {
                    break;
                };
                let mut core = core.lock().await;
                core.handle(frame).await;
            }
        });

        Ok(Self { core, snapshot })
    }

    /// Start playback of a track URL.
    ///
    /// Calling with the current track's URL while paused resumes in place
    /// without remounting; any other call resolves the platform, builds a
    /// fresh payload, and supersedes whatever sandbox was live.
    pub async fn play(&self, url: &str, metadata: Option<TrackMetadata>) -> Result<()> {
        self.core.lock().await.play(url, metadata).await
    }

    /// Issue a pause command. No-op unless currently playing.
    pub async fn pause(&self) -> Result<()> {
        self.core.lock().await.pause().await
    }

    /// Issue a resume command. No-op unless currently paused.
    pub async fn resume(&self) -> Result<()> {
        self.core.lock().await.resume().await
    }

    /// Tear down the sandbox and reset to idle, regardless of current state.
    pub async fn stop(&self) -> Result<()> {
        self.core.lock().await.stop().await
    }

    /// Seek to a position as a percentage of duration.
    ///
    /// Valid only once a duration is known; out-of-range percentages are
    /// clamped to `[0, 100]` before the command is sent.
    pub async fn seek_to(&self, percentage: f32) -> Result<()> {
        self.core.lock().await.seek_to(percentage).await
    }

    /// Set playback volume, clamped to `[0.0, 1.0]`.
    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.core.lock().await.set_volume(volume).await
    }

    /// Whether the given URL is the current track.
    pub fn is_current_track(&self, url: &str) -> bool {
        self.snapshot
            .read()
            .track
            .as_ref()
            .is_some_and(|track| track.url == url)
    }

    /// Whether a platform's embed honors host playback commands.
    ///
    /// The UI uses this to decide between in-sandbox controls and the
    /// open-externally affordance.
    pub fn can_control_in_sandbox(platform: PlatformKind) -> bool {
        platform.capabilities().controllable
    }

    pub fn state(&self) -> PlayerState {
        self.snapshot.read().state
    }

    pub fn progress(&self) -> Progress {
        self.snapshot.read().progress
    }

    pub fn current_track(&self) -> Option<TrackRef> {
        self.snapshot.read().track.clone()
    }

    /// Whether the preview embed is waiting for a tap inside its chrome.
    pub fn manual_play_required(&self) -> bool {
        self.snapshot.read().manual_play_required
    }
}

struct PlayerCore {
    host: Arc<dyn SandboxHost>,
    telemetry: Arc<dyn TelemetrySink>,
    config: PlayerConfig,
    snapshot: Arc<RwLock<PlayerSnapshot>>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,

    state: PlayerState,
    track: Option<TrackRef>,
    progress: Progress,
    manual_play_required: bool,
    generation: u64,
    sandbox: Option<ActiveSandbox>,
    simulator: ProgressSimulator,
}

impl PlayerCore {
    async fn play(&mut self, url: &str, metadata: Option<TrackMetadata>) -> Result<()> {
        // Same track while paused resumes in place; everything else reloads.
        // The ordering of these checks is load-bearing for perceived UX.
        if self.state == PlayerState::Paused
            && self.track.as_ref().is_some_and(|track| track.url == url)
        {
            debug!(target: "core_playback::orchestrator", %url, "resuming current track in place");
            return self.send_command(Command::Play).await;
        }

        let resolved = resolver::resolve(url);
        if resolved.platform == PlatformKind::Unrecognized {
            let err = PlayerError::InvalidUrl(url.to_string());
            self.fail_play(url, metadata, resolved.platform, &err).await;
            return Err(err);
        }

        let content = match payload::generate(url, resolved.platform) {
            Ok(content) => content,
            Err(embed_err) => {
                let err = PlayerError::from(embed_err);
                self.fail_play(url, metadata, resolved.platform, &err).await;
                return Err(err);
            }
        };

        // Supersede any live sandbox before mounting the new one; this bumps
        // the generation so in-flight frames from the old instance die at
        // the dispatch gate.
        self.teardown_current().await;

        self.track = Some(TrackRef {
            url: url.to_string(),
            platform: resolved.platform,
            metadata,
        });
        self.state = PlayerState::Loading;
        self.progress = Progress::zero();
        self.manual_play_required = false;
        self.publish();

        let mount = match self.host.mount(content).await {
            Ok(mount) => mount,
            Err(bridge_err) => {
                let err = PlayerError::Bridge(bridge_err);
                self.enter_error(Some(resolved.platform), &err);
                return Err(err);
            }
        };

        let generation = self.generation;
        self.spawn_pump(generation, mount.messages);
        let watchdog = self
            .config
            .ready_timeout
            .map(|window| self.spawn_watchdog(generation, window));

        self.sandbox = Some(ActiveSandbox {
            channel: MessageChannel::new(Arc::clone(&self.host), mount.id),
            capabilities: resolved.capabilities,
            watchdog,
        });
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        if self.state != PlayerState::Playing {
            return Ok(());
        }
        self.send_command(Command::Pause).await
    }

    async fn resume(&mut self) -> Result<()> {
        if self.state != PlayerState::Paused {
            return Ok(());
        }
        self.send_command(Command::Play).await
    }

    async fn seek_to(&mut self, percentage: f32) -> Result<()> {
        if self.progress.duration_ms == 0 {
            return Err(PlayerError::SeekUnavailable);
        }
        let percentage = percentage.clamp(0.0, 100.0);
        self.send_command(Command::SeekTo { percentage }).await
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.send_command(Command::SetVolume { volume }).await
    }

    async fn stop(&mut self) -> Result<()> {
        self.teardown_current().await;
        self.state = PlayerState::Idle;
        self.track = None;
        self.progress = Progress::zero();
        self.manual_play_required = false;
        self.publish();
        Ok(())
    }

    async fn handle(&mut self, frame: Inbound) {
        if frame.generation != self.generation {
            debug!(
                target: "core_playback::orchestrator",
                frame_generation = frame.generation,
                current_generation = self.generation,
                "dropping frame from superseded sandbox"
            );
            return;
        }

        match frame.kind {
            InboundKind::ReadyTimeout => {
                if self.state == PlayerState::Loading {
                    let err = PlayerError::ReadyTimeout;
                    let platform = self.track.as_ref().map(|track| track.platform);
                    self.enter_error(platform, &err);
                }
            }
            InboundKind::Sandbox(event) => self.apply_event(event, false).await,
            InboundKind::Synthetic(event) => self.apply_event(event, true).await,
        }
    }

    async fn apply_event(&mut self, event: SandboxEvent, synthetic: bool) {
        // Only play() exits the error state, and no event applies without a
        // current track.
        if self.track.is_none() || self.state == PlayerState::Error {
            debug!(target: "core_playback::orchestrator", "dropping event outside an active track");
            return;
        }

        // Identity guard: a declared platform must match the current track.
        if let Some(declared) = event.platform() {
            let current = self.track.as_ref().map(|track| track.platform.as_str());
            if current != Some(declared) {
                debug!(
                    target: "core_playback::orchestrator",
                    declared,
                    "dropping event for superseded track identity"
                );
                return;
            }
        }

        let Some(capabilities) = self.sandbox.as_ref().map(|sandbox| sandbox.capabilities)
        else {
            debug!(target: "core_playback::orchestrator", "dropping event with no live sandbox");
            return;
        };
        let platform = self.track.as_ref().map(|track| track.platform);

        match event {
            SandboxEvent::Ready { duration, .. } => {
                if let Some(watchdog) = self
                    .sandbox
                    .as_mut()
                    .and_then(|sandbox| sandbox.watchdog.take())
                {
                    watchdog.cancel();
                }

                let duration_ms = if duration == 0 && capabilities.preview_only {
                    self.config.preview_duration.as_millis() as u64
                } else {
                    duration
                };
                self.progress = Progress::from_position(0, duration_ms);

                if capabilities.controllable {
                    // Auto-play contract: the caller already expressed intent
                    // by calling play; state stays loading until the embed
                    // confirms with a play event.
                    if let Err(err) = self.send_command(Command::Play).await {
                        warn!(target: "core_playback::orchestrator", %err, "auto-play command failed");
                    }
                } else {
                    // Manual-play contract: only a tap inside the embed
                    // chrome can start the preview.
                    self.state = PlayerState::Paused;
                }
                self.publish();
            }
            SandboxEvent::ManualPlayRequired { .. } => {
                self.manual_play_required = true;
                self.publish();
            }
            SandboxEvent::Play { .. } => {
                self.state = PlayerState::Playing;
                self.manual_play_required = false;
                self.publish();
                self.emit(TelemetryKind::Play);
            }
            SandboxEvent::TrackPlay { .. } => {
                self.state = PlayerState::Playing;
                self.manual_play_required = false;
                let preview = if self.progress.duration_ms > 0 {
                    Duration::from_millis(self.progress.duration_ms)
                } else {
                    self.config.preview_duration
                };
                if let Some(platform) = platform {
                    self.simulator.start(
                        self.generation,
                        platform.as_str(),
                        preview,
                        self.inbound_tx.clone(),
                    );
                }
                self.publish();
                self.emit(TelemetryKind::Play);
            }
            SandboxEvent::Pause { .. } => {
                self.state = PlayerState::Paused;
                self.publish();
                self.emit(TelemetryKind::Pause);
            }
            SandboxEvent::TrackPause { .. } => {
                self.simulator.pause();
                self.state = PlayerState::Paused;
                self.publish();
                self.emit(TelemetryKind::Pause);
            }
            SandboxEvent::Progress {
                current_time,
                duration,
                percentage,
                ..
            } => {
                // Only authoritative reporters or the local simulator may
                // move progress.
                if synthetic || capabilities.reports_progress {
                    self.progress = Progress {
                        current_ms: current_time,
                        duration_ms: duration,
                        percentage: percentage.clamp(0.0, 100.0),
                    };
                    self.publish();
                }
            }
            SandboxEvent::Finish { .. } => {
                self.simulator.reset();
                self.state = PlayerState::Idle;
                self.track = None;
                self.progress = Progress::zero();
                self.manual_play_required = false;
                self.publish();
                self.emit_with_platform(TelemetryKind::Finish, platform);
            }
            SandboxEvent::Error { error, code, .. } => {
                let err = PlayerError::Sandbox {
                    platform: platform
                        .map_or("unknown", |platform| platform.as_str())
                        .to_string(),
                    code,
                    message: error.unwrap_or_else(|| "unspecified sandbox error".to_string()),
                };
                self.enter_error(platform, &err);
            }
            SandboxEvent::Buffering { .. } => {
                // The state machine has no buffering state; surface nothing.
                debug!(target: "core_playback::orchestrator", "embed buffering");
            }
            SandboxEvent::Unknown => {
                // Decode already filters these; nothing to do.
            }
        }
    }

    /// A failed play still supersedes whatever was live: the old sandbox is
    /// torn down and the attempted track becomes current, so the error UI
    /// can offer the open-externally affordance for it.
    async fn fail_play(
        &mut self,
        url: &str,
        metadata: Option<TrackMetadata>,
        platform: PlatformKind,
        err: &PlayerError,
    ) {
        self.teardown_current().await;
        self.track = Some(TrackRef {
            url: url.to_string(),
            platform,
            metadata,
        });
        self.progress = Progress::zero();
        self.enter_error(
            (platform != PlatformKind::Unrecognized).then_some(platform),
            err,
        );
    }

    async fn send_command(&mut self, command: Command) -> Result<()> {
        let Some(sandbox) = &self.sandbox else {
            return Err(PlayerError::NoTrackLoaded);
        };
        sandbox.channel.send(&command).await
    }

    /// Cancel the simulator and watchdog, tear the live sandbox down, and
    /// bump the generation so stragglers from it are dropped.
    async fn teardown_current(&mut self) {
        self.generation += 1;
        self.simulator.reset();
        if let Some(sandbox) = self.sandbox.take() {
            if let Some(watchdog) = sandbox.watchdog {
                watchdog.cancel();
            }
            let id = sandbox.channel.instance();
            if let Err(err) = self.host.teardown(id).await {
                warn!(target: "core_playback::orchestrator", %id, %err, "sandbox teardown failed");
            }
        }
    }

    fn spawn_pump(&self, generation: u64, mut messages: Box<dyn SandboxMessageStream>) {
        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            while let Some(raw) = messages.next().await {
                let Some(event) = MessageChannel::decode(&raw) else {
                    continue;
                };
                let frame = Inbound {
                    generation,
                    kind: InboundKind::Sandbox(event),
                };
                if tx.send(frame).is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_watchdog(&self, generation: u64, window: Duration) -> CancellationToken {
        let token = CancellationToken::new();
        let guard = token.clone();
        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(window) => {
                    let _ = tx.send(Inbound {
                        generation,
                        kind: InboundKind::ReadyTimeout,
                    });
                }
            }
        });
        token
    }

    fn enter_error(&mut self, platform: Option<PlatformKind>, err: &PlayerError) {
        warn!(target: "core_playback::orchestrator", %err, "entering error state");
        self.simulator.reset();
        self.state = PlayerState::Error;
        self.manual_play_required = false;
        self.publish();

        let mut event =
            TelemetryEvent::new(TelemetryKind::Error).with_field("message", err.to_string());
        if let Some(platform) = platform {
            event = event.with_platform(platform.as_str());
        }
        if let PlayerError::Sandbox {
            code: Some(code), ..
        } = err
        {
            event = event.with_field("code", code.to_string());
        }
        self.record(event);
    }

    fn emit(&self, kind: TelemetryKind) {
        let mut event = TelemetryEvent::new(kind);
        if let Some(track) = &self.track {
            event = event
                .with_platform(track.platform.as_str())
                .with_field("url", track.url.clone());
        }
        self.record(event);
    }

    fn emit_with_platform(&self, kind: TelemetryKind, platform: Option<PlatformKind>) {
        let mut event = TelemetryEvent::new(kind);
        if let Some(platform) = platform {
            event = event.with_platform(platform.as_str());
        }
        self.record(event);
    }

    /// Fire-and-forget telemetry: a slow sink must never stall dispatch.
    fn record(&self, event: TelemetryEvent) {
        let sink = Arc::clone(&self.telemetry);
        tokio::spawn(async move {
            if let Err(err) = sink.record(event).await {
                debug!(target: "core_playback::orchestrator", %err, "telemetry sink rejected event");
            }
        });
    }

    fn publish(&self) {
        *self.snapshot.write() = PlayerSnapshot {
            state: self.state,
            track: self.track.clone(),
            progress: self.progress,
            manual_play_required: self.manual_play_required,
        };
    }
}
