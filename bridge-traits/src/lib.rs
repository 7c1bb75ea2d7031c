//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and
//! platform-specific implementations. Each trait represents a capability that
//! the core requires but that must be implemented differently per platform
//! (iOS, Android, desktop, web).
//!
//! ## Traits
//!
//! ### Sandbox Surface
//! - [`SandboxHost`](sandbox::SandboxHost) - Mount, message, and tear down the
//!   embedded content renderer hosting third-party widget code
//!
//! ### Platform Integration
//! - [`ExternalOpener`](external::ExternalOpener) - Hand a URI off to the OS
//!   (deep links, default browser)
//! - [`LifecycleObserver`](lifecycle::LifecycleObserver) - App
//!   foreground/background transitions
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`TelemetrySink`](telemetry::TelemetrySink) - Forward playback analytics
//!   to the host collector
//!
//! ## Platform Requirements
//!
//! Each supported platform must ship concrete adapters for every required
//! bridge trait:
//!
//! | Platform | Sandbox surface          | External opener       |
//! |----------|--------------------------|-----------------------|
//! | iOS      | WKWebView                | UIApplication openURL |
//! | Android  | WebView                  | Intent.ACTION_VIEW    |
//! | Desktop  | embedded webview window  | system open handler   |
//!
//! ## Message Contract
//!
//! The sandbox surface is reachable only via asynchronous string messages.
//! Mounted content posts stringified JSON to the host through the injected
//! `window.__embedHost.postMessage(...)` entry point, and receives host
//! commands through a `message` event dispatched on the sandbox `window`.
//! There is no synchronous call in either direction; every acknowledgment
//! arrives later as a separate inbound message.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for
//! consistent error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Include error context (e.g., sandbox instance ids, URIs)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds on native targets to support
//! safe concurrent usage across async tasks. WebAssembly builds relax those
//! bounds via the [`platform`] marker traits.

pub mod error;
pub mod external;
pub mod lifecycle;
pub mod platform;
pub mod sandbox;
pub mod telemetry;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use external::ExternalOpener;
pub use lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState};
pub use sandbox::{SandboxContent, SandboxHost, SandboxInstanceId, SandboxMessageStream, SandboxMount};
pub use telemetry::{TelemetryEvent, TelemetryKind, TelemetrySink};
pub use time::{Clock, SystemClock};
