//! Sandbox surface traits and supporting content types.
//!
//! These abstractions allow the playback core to drive an embedded, isolated
//! content renderer (a webview or equivalent) that hosts third-party platform
//! widget code. The renderer is reachable only via asynchronous string
//! messages: the core posts stringified JSON commands into the sandbox, and
//! the sandbox posts stringified JSON events back out. Host applications are
//! expected to provide concrete implementations that satisfy their platform
//! constraints (iOS, Android, desktop, web).

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};
use uuid::Uuid;

/// Unique identifier for sandbox instances managed by a host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SandboxInstanceId(Uuid);

impl SandboxInstanceId {
    /// Generate a new instance identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SandboxInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SandboxInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Renderable content handed to the host for mounting.
///
/// The `html` document carries the third-party embed widget plus the inline
/// command listener and event emitter scripts. `base_url` is the document
/// origin the renderer should load the markup under; several embed providers
/// refuse to initialize from an opaque `about:blank` origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxContent {
    /// Wire tag of the platform whose widget this content hosts.
    pub platform: String,
    /// Complete HTML document, including inline bridge scripts.
    pub html: String,
    /// Origin to load the document under, when the renderer supports it.
    pub base_url: Option<String>,
}

impl SandboxContent {
    /// Create new sandbox content for the given platform tag.
    pub fn new(platform: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            html: html.into(),
            base_url: None,
        }
    }

    /// Attach a document origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// A mounted sandbox instance: its identity plus the inbound message stream.
///
/// The stream yields raw strings exactly as posted by the sandboxed content
/// and ends when the instance is torn down. Parsing and validation happen in
/// the core, never in the host adapter.
pub struct SandboxMount {
    /// Identity of the mounted instance.
    pub id: SandboxInstanceId,
    /// Messages posted by the sandboxed content, in arrival order.
    pub messages: Box<dyn SandboxMessageStream>,
}

/// Trait for host adapters that own the embedded content renderer.
///
/// At most one instance per mount; the core enforces the single-live-sandbox
/// rule, the host only needs to honor mount/teardown calls individually.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SandboxHost: PlatformSendSync {
    /// Mount new content in a fresh renderer instance.
    ///
    /// Returns the instance identity together with the stream of messages the
    /// content will post back to the host. Implementations must inject the
    /// `window.__embedHost.postMessage` entry point before the document's own
    /// scripts run.
    async fn mount(&self, content: SandboxContent) -> Result<SandboxMount>;

    /// Deliver a command message into a mounted instance.
    ///
    /// Delivery is best-effort and fire-and-forget: a successful return means
    /// the message was handed to the renderer, not that the content acted on
    /// it.
    async fn post(&self, id: SandboxInstanceId, message: String) -> Result<()>;

    /// Destroy a mounted instance and release its renderer resources.
    ///
    /// The instance's message stream ends after teardown. Tearing down an
    /// unknown instance returns [`BridgeError::SandboxNotFound`](crate::BridgeError::SandboxNotFound).
    async fn teardown(&self, id: SandboxInstanceId) -> Result<()>;
}

/// Stream of raw messages posted by a mounted sandbox instance.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SandboxMessageStream: PlatformSend {
    /// Get the next posted message.
    ///
    /// Returns `None` when the instance has been torn down.
    async fn next(&mut self) -> Option<String>;
}
