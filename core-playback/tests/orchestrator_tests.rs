//! Integration tests for the playback orchestrator.
//!
//! A mock sandbox host stands in for the embedded renderer: tests mount
//! tracks through the public API, then drive the state machine by posting
//! the JSON events a real embed would emit.

use std::sync::Mutex as StdMutex;
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use bridge_traits::{
    error::Result as BridgeResult,
    sandbox::{SandboxContent, SandboxHost, SandboxInstanceId, SandboxMessageStream, SandboxMount},
    telemetry::{TelemetryEvent, TelemetryKind, TelemetrySink},
    time::Clock,
};
use core_playback::{Player, PlayerConfig, PlayerError, PlayerState, PlatformKind};

const SC_TRACK: &str = "https://soundcloud.com/forss/flickermood";
const SP_TRACK: &str = "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC";
const YT_TRACK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

// ============================================================================
// Mock host, clock, and telemetry sink
// ============================================================================

struct MountRecord {
    id: SandboxInstanceId,
    platform: String,
    sender: UnboundedSender<String>,
}

#[derive(Default)]
struct MockHost {
    mounts: StdMutex<Vec<MountRecord>>,
    posts: StdMutex<Vec<(SandboxInstanceId, String)>>,
    teardowns: StdMutex<Vec<SandboxInstanceId>>,
}

impl MockHost {
    fn mount_count(&self) -> usize {
        self.mounts.lock().unwrap().len()
    }

    fn mount_id(&self, index: usize) -> SandboxInstanceId {
        self.mounts.lock().unwrap()[index].id
    }

    fn mount_platform(&self, index: usize) -> String {
        self.mounts.lock().unwrap()[index].platform.clone()
    }

    /// Post a raw message as if the sandbox at `index` emitted it.
    fn emit(&self, index: usize, raw: &str) {
        let mounts = self.mounts.lock().unwrap();
        mounts[index].sender.send(raw.to_string()).ok();
    }

    fn posted_commands(&self) -> Vec<String> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, raw)| raw.clone())
            .collect()
    }

    fn torn_down(&self) -> Vec<SandboxInstanceId> {
        self.teardowns.lock().unwrap().clone()
    }
}

#[async_trait]
impl SandboxHost for MockHost {
    async fn mount(&self, content: SandboxContent) -> BridgeResult<SandboxMount> {
        let (sender, receiver) = unbounded_channel();
        let id = SandboxInstanceId::new();
        self.mounts.lock().unwrap().push(MountRecord {
            id,
            platform: content.platform,
            sender,
        });
        Ok(SandboxMount {
            id,
            messages: Box::new(MockStream { receiver }),
        })
    }

    async fn post(&self, id: SandboxInstanceId, message: String) -> BridgeResult<()> {
        self.posts.lock().unwrap().push((id, message));
        Ok(())
    }

    async fn teardown(&self, id: SandboxInstanceId) -> BridgeResult<()> {
        self.teardowns.lock().unwrap().push(id);
        Ok(())
    }
}

struct MockStream {
    receiver: UnboundedReceiver<String>,
}

#[async_trait]
impl SandboxMessageStream for MockStream {
    async fn next(&mut self) -> Option<String> {
        self.receiver.recv().await
    }
}

struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now: StdMutex::new(Utc::now()),
        }
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
struct RecordingSink {
    events: StdMutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    fn kinds(&self) -> Vec<TelemetryKind> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.kind)
            .collect()
    }

    fn events_of(&self, kind: TelemetryKind) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn record(&self, event: TelemetryEvent) -> BridgeResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    player: Player,
    host: Arc<MockHost>,
    clock: Arc<ManualClock>,
    telemetry: Arc<RecordingSink>,
}

fn harness_with(config: PlayerConfig) -> Harness {
    let host = Arc::new(MockHost::default());
    let clock = Arc::new(ManualClock::new());
    let telemetry = Arc::new(RecordingSink::default());
    let player = Player::new(
        host.clone(),
        clock.clone(),
        telemetry.clone(),
        config,
    )
    .unwrap();
    Harness {
        player,
        host,
        clock,
        telemetry,
    }
}

fn harness() -> Harness {
    harness_with(PlayerConfig::default())
}

/// Let the pump and dispatch tasks process everything queued so far.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Advance both virtual clocks in lockstep and let tasks run.
async fn advance(harness: &Harness, by: Duration) {
    harness.clock.advance(by);
    tokio::time::advance(by).await;
    settle().await;
}

// ============================================================================
// Resolution and error propagation
// ============================================================================

#[tokio::test]
async fn unrecognized_url_errors_without_mounting() {
    let h = harness();

    let err = h.player.play("https://example.com/not/a/track", None).await;
    assert!(matches!(err, Err(PlayerError::InvalidUrl(_))));
    assert_eq!(h.player.state(), PlayerState::Error);
    assert_eq!(h.host.mount_count(), 0);
    assert!(h.host.posted_commands().is_empty());
}

#[tokio::test]
async fn unextractable_track_id_fails_payload_generation() {
    let h = harness();

    // resolves to the preview platform, but the id is not embeddable
    let err = h
        .player
        .play("https://open.spotify.com/track/not-an-id", None)
        .await;
    assert!(matches!(err, Err(PlayerError::PayloadGeneration(_))));
    assert_eq!(h.player.state(), PlayerState::Error);
    assert_eq!(h.host.mount_count(), 0);
}

#[tokio::test]
async fn error_state_accepts_a_subsequent_play() {
    let h = harness();

    h.player.play("https://example.com/nope", None).await.ok();
    assert_eq!(h.player.state(), PlayerState::Error);

    h.player.play(SC_TRACK, None).await.unwrap();
    assert_eq!(h.player.state(), PlayerState::Loading);
    assert_eq!(h.host.mount_count(), 1);
}

// ============================================================================
// Controllable platforms: auto-play contract
// ============================================================================

#[tokio::test]
async fn full_stream_scenario_ready_autoplay_playing() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();
    assert_eq!(h.player.state(), PlayerState::Loading);
    assert_eq!(h.player.progress().duration_ms, 0);
    assert_eq!(h.host.mount_platform(0), "soundcloud");

    h.host.emit(
        0,
        r#"{"type":"ready","platform":"soundcloud","duration":180000}"#,
    );
    settle().await;

    // ready on a controllable platform always auto-issues play
    assert_eq!(h.host.posted_commands(), vec![r#"{"action":"play"}"#]);
    // but state only changes once the embed confirms
    assert_eq!(h.player.state(), PlayerState::Loading);
    assert_eq!(h.player.progress().duration_ms, 180_000);

    h.host.emit(0, r#"{"type":"play","platform":"soundcloud"}"#);
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Playing);
    assert!(h.player.is_current_track(SC_TRACK));
    assert_eq!(h.telemetry.kinds(), vec![TelemetryKind::Play]);
}

#[tokio::test]
async fn sandbox_progress_is_authoritative_for_controllable_platforms() {
    let h = harness();

    h.player.play(YT_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"youtube","duration":240000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"youtube"}"#);
    h.host.emit(
        0,
        r#"{"type":"progress","platform":"youtube","currentTime":60000,"duration":240000,"percentage":25.0}"#,
    );
    settle().await;

    let progress = h.player.progress();
    assert_eq!(progress.current_ms, 60_000);
    assert_eq!(progress.duration_ms, 240_000);
    assert!((progress.percentage - 25.0).abs() < f32::EPSILON);
}

// ============================================================================
// Preview platform: manual-play contract
// ============================================================================

#[tokio::test]
async fn preview_ready_never_autoplays() {
    let h = harness();

    h.player.play(SP_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"spotify","duration":30000}"#,
    );
    h.host.emit(0, r#"{"type":"manualPlayRequired","platform":"spotify"}"#);
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Paused);
    assert!(h.player.manual_play_required());
    assert!(h.host.posted_commands().is_empty());
    assert_eq!(h.player.progress().duration_ms, 30_000);
}

#[tokio::test(start_paused = true)]
async fn preview_progress_is_simulated_and_finishes_once() {
    let h = harness();

    h.player.play(SP_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"spotify","duration":2000}"#,
    );
    settle().await;
    h.host.emit(0, r#"{"type":"trackPlay","platform":"spotify"}"#);
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Playing);

    let mut last = 0.0f32;
    let mut finished = false;
    for _ in 0..8 {
        advance(&h, Duration::from_millis(500)).await;
        if h.player.state() == PlayerState::Idle {
            finished = true;
            break;
        }
        let progress = h.player.progress();
        assert!(progress.percentage >= last);
        assert!((0.0..=100.0).contains(&progress.percentage));
        last = progress.percentage;
    }

    assert!(finished, "simulated preview never finished");
    assert_eq!(h.player.progress().duration_ms, 0);
    assert!(!h.player.is_current_track(SP_TRACK));
    assert_eq!(
        h.telemetry.events_of(TelemetryKind::Finish).len(),
        1,
        "finish must fire exactly once"
    );
}

#[tokio::test(start_paused = true)]
async fn preview_pause_preserves_elapsed_progress() {
    let h = harness();

    h.player.play(SP_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"spotify","duration":10000}"#,
    );
    settle().await;
    h.host.emit(0, r#"{"type":"trackPlay","platform":"spotify"}"#);
    settle().await;

    advance(&h, Duration::from_secs(2)).await;
    h.host.emit(0, r#"{"type":"trackPause","platform":"spotify"}"#);
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Paused);
    let at_pause = h.player.progress().current_ms;
    assert!(at_pause >= 1_500, "expected ~2s elapsed, got {at_pause}ms");

    // no ticks land against a paused track
    advance(&h, Duration::from_secs(3)).await;
    assert_eq!(h.player.progress().current_ms, at_pause);

    // resuming continues from where the preview left off
    h.host.emit(0, r#"{"type":"trackPlay","platform":"spotify"}"#);
    settle().await;
    advance(&h, Duration::from_secs(1)).await;
    assert!(h.player.progress().current_ms > at_pause);
}

// ============================================================================
// Resume-in-place and supersession
// ============================================================================

#[tokio::test]
async fn same_url_while_paused_resumes_without_remounting() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"soundcloud","duration":180000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"soundcloud"}"#);
    h.host.emit(0, r#"{"type":"pause","platform":"soundcloud"}"#);
    settle().await;
    assert_eq!(h.player.state(), PlayerState::Paused);

    h.player.play(SC_TRACK, None).await.unwrap();
    settle().await;

    // ready auto-play + the resume command, but still a single mount
    assert_eq!(h.host.mount_count(), 1);
    assert_eq!(
        h.host.posted_commands(),
        vec![r#"{"action":"play"}"#, r#"{"action":"play"}"#]
    );
}

#[tokio::test]
async fn new_play_supersedes_and_stale_messages_are_dropped() {
    let h = harness();

    h.player.play(YT_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"youtube","duration":240000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"youtube"}"#);
    settle().await;
    assert_eq!(h.player.state(), PlayerState::Playing);

    h.player.play(SP_TRACK, None).await.unwrap();
    settle().await;

    // the first sandbox was torn down
    assert_eq!(h.host.torn_down(), vec![h.host.mount_id(0)]);
    assert_eq!(h.player.state(), PlayerState::Loading);
    assert_eq!(h.player.progress().duration_ms, 0);

    // stragglers from the torn-down instance must not mutate state
    h.host.emit(0, r#"{"type":"pause","platform":"youtube"}"#);
    h.host.emit(
        0,
        r#"{"type":"progress","platform":"youtube","currentTime":120000,"duration":240000,"percentage":50.0}"#,
    );
    h.host.emit(0, r#"{"type":"error","platform":"youtube","error":"gone"}"#);
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Loading);
    assert_eq!(h.player.progress().duration_ms, 0);
    assert!(h.player.is_current_track(SP_TRACK));
}

// ============================================================================
// Malformed messages
// ============================================================================

#[tokio::test]
async fn malformed_messages_never_change_state() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"soundcloud","duration":180000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"soundcloud"}"#);
    settle().await;
    assert_eq!(h.player.state(), PlayerState::Playing);
    let progress = h.player.progress();

    h.host.emit(0, "{not json");
    h.host.emit(0, "");
    h.host.emit(0, r#"{"type":"detach","platform":"soundcloud"}"#);
    h.host.emit(0, "[1,2,3]");
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Playing);
    assert_eq!(h.player.progress(), progress);
}

// ============================================================================
// Commands: seek, volume, pause/resume gating
// ============================================================================

#[tokio::test]
async fn seek_clamps_out_of_range_percentages() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"soundcloud","duration":180000}"#,
    );
    settle().await;

    h.player.seek_to(-10.0).await.unwrap();
    h.player.seek_to(140.0).await.unwrap();

    let posted = h.host.posted_commands();
    assert!(posted.contains(&r#"{"action":"seekTo","percentage":0.0}"#.to_string()));
    assert!(posted.contains(&r#"{"action":"seekTo","percentage":100.0}"#.to_string()));
}

#[tokio::test]
async fn seek_requires_a_known_duration() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();
    // still loading: duration is unknown
    let err = h.player.seek_to(50.0).await;
    assert!(matches!(err, Err(PlayerError::SeekUnavailable)));
}

#[tokio::test]
async fn volume_is_clamped_before_sending() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();
    h.player.set_volume(1.5).await.unwrap();
    h.player.set_volume(-0.5).await.unwrap();

    let posted = h.host.posted_commands();
    assert!(posted.contains(&r#"{"action":"setVolume","volume":1.0}"#.to_string()));
    assert!(posted.contains(&r#"{"action":"setVolume","volume":0.0}"#.to_string()));
}

#[tokio::test]
async fn pause_and_resume_are_gated_by_state() {
    let h = harness();

    h.player.play(SC_TRACK, None).await.unwrap();

    // loading: neither pause nor resume issues anything
    h.player.pause().await.unwrap();
    h.player.resume().await.unwrap();
    assert!(h.host.posted_commands().is_empty());

    h.host.emit(
        0,
        r#"{"type":"ready","platform":"soundcloud","duration":180000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"soundcloud"}"#);
    settle().await;
    let baseline = h.host.posted_commands().len();

    h.player.pause().await.unwrap();
    assert_eq!(h.host.posted_commands().len(), baseline + 1);
    // state is still playing until the embed confirms, so resume is a no-op
    h.player.resume().await.unwrap();
    assert_eq!(h.host.posted_commands().len(), baseline + 1);

    h.host.emit(0, r#"{"type":"pause","platform":"soundcloud"}"#);
    settle().await;
    assert_eq!(h.player.state(), PlayerState::Paused);

    h.player.resume().await.unwrap();
    assert_eq!(
        h.host.posted_commands().last().map(String::as_str),
        Some(r#"{"action":"play"}"#)
    );
}

// ============================================================================
// Stop, finish, and sandbox errors
// ============================================================================

#[tokio::test]
async fn stop_tears_down_unconditionally() {
    let h = harness();

    h.player.play(YT_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"youtube","duration":240000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"youtube"}"#);
    settle().await;

    h.player.stop().await.unwrap();
    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.player.current_track(), None);
    assert_eq!(h.player.progress().duration_ms, 0);
    assert_eq!(h.host.torn_down(), vec![h.host.mount_id(0)]);

    // idle stop is still fine
    h.player.stop().await.unwrap();
    assert_eq!(h.player.state(), PlayerState::Idle);
}

#[tokio::test]
async fn finish_resets_progress_and_returns_to_idle() {
    let h = harness();

    h.player.play(YT_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"youtube","duration":240000}"#,
    );
    h.host.emit(0, r#"{"type":"play","platform":"youtube"}"#);
    h.host.emit(0, r#"{"type":"finish","platform":"youtube"}"#);
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.player.progress().current_ms, 0);
    assert_eq!(h.player.progress().duration_ms, 0);
    assert!(!h.player.is_current_track(YT_TRACK));
    assert_eq!(h.telemetry.events_of(TelemetryKind::Finish).len(), 1);
}

#[tokio::test]
async fn sandbox_errors_reach_telemetry_with_platform_and_code() {
    let h = harness();

    h.player.play(YT_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"error","platform":"youtube","error":"Video unavailable","code":101}"#,
    );
    settle().await;

    assert_eq!(h.player.state(), PlayerState::Error);
    let errors = h.telemetry.events_of(TelemetryKind::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].platform.as_deref(), Some("youtube"));
    assert_eq!(errors[0].fields.get("code").map(String::as_str), Some("101"));
}

#[tokio::test(start_paused = true)]
async fn ready_timeout_errors_when_enabled() {
    let h = harness_with(PlayerConfig::default().with_ready_timeout(Duration::from_secs(5)));

    h.player.play(SC_TRACK, None).await.unwrap();
    assert_eq!(h.player.state(), PlayerState::Loading);
    settle().await;

    advance(&h, Duration::from_secs(5)).await;
    assert_eq!(h.player.state(), PlayerState::Error);
}

#[tokio::test(start_paused = true)]
async fn ready_cancels_the_watchdog() {
    let h = harness_with(PlayerConfig::default().with_ready_timeout(Duration::from_secs(5)));

    h.player.play(SC_TRACK, None).await.unwrap();
    h.host.emit(
        0,
        r#"{"type":"ready","platform":"soundcloud","duration":180000}"#,
    );
    settle().await;

    advance(&h, Duration::from_secs(10)).await;
    assert_ne!(h.player.state(), PlayerState::Error);
}

// ============================================================================
// Capability queries
// ============================================================================

#[tokio::test]
async fn sandbox_control_capability_is_static() {
    assert!(Player::can_control_in_sandbox(PlatformKind::SoundCloud));
    assert!(Player::can_control_in_sandbox(PlatformKind::YouTube));
    assert!(!Player::can_control_in_sandbox(PlatformKind::Spotify));
    assert!(!Player::can_control_in_sandbox(PlatformKind::Unrecognized));
}
