//! # Playback Orchestration
//!
//! Normalizes three incompatible embed behaviors into one playback state
//! machine driven over an asynchronous, best-effort message channel.
//!
//! ## Overview
//!
//! This module handles:
//! - The JSON wire protocol spoken between host and sandbox
//! - The playback state machine, including per-platform quirks (auto-play on
//!   ready for controllable embeds, manual start for the preview embed)
//! - Simulated progress for the preview platform, which reports none of its
//!   own
//! - Staleness guarding so a superseded sandbox can never mutate state
//!
//! ## Architecture
//!
//! All mutation flows through one async-mutex-guarded core: public API calls
//! and the inbound message pump serialize on it, so the state machine runs in
//! a single logical thread of control. Commands into the sandbox are
//! fire-and-forget; UI-visible state changes only on event receipt. Read-only
//! state is served from a lock-free-ish snapshot so views never contend with
//! the core.

pub mod channel;
pub mod config;
pub mod error;
pub mod orchestrator;
mod progress;
pub mod protocol;
pub mod types;

pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
pub use orchestrator::Player;
pub use protocol::{Command, SandboxEvent};
pub use types::{PlayerSnapshot, PlayerState, Progress, TrackMetadata, TrackRef};

// The resolver vocabulary is part of this crate's public API surface.
pub use core_embed::resolver::{Capabilities, PlatformKind};
