//! # Message Channel Adapter
//!
//! The only point where host and sandbox exchange data. Outbound commands
//! are serialized and posted fire-and-forget; inbound strings are decoded
//! into [`SandboxEvent`]s, with malformed or unknown-tagged messages dropped
//! here so they can never reach the state machine.

use std::sync::Arc;

use bridge_traits::sandbox::{SandboxHost, SandboxInstanceId};
use tracing::debug;

use crate::{
    error::Result,
    protocol::{Command, SandboxEvent},
};

/// Host side of the bidirectional bridge to one mounted sandbox.
#[derive(Clone)]
pub struct MessageChannel {
    host: Arc<dyn SandboxHost>,
    id: SandboxInstanceId,
}

impl MessageChannel {
    pub fn new(host: Arc<dyn SandboxHost>, id: SandboxInstanceId) -> Self {
        Self { host, id }
    }

    /// Identity of the sandbox instance this channel belongs to.
    pub fn instance(&self) -> SandboxInstanceId {
        self.id
    }

    /// Deliver a command. Fire-and-forget: success means the message reached
    /// the renderer, not that the embed acted on it.
    pub async fn send(&self, command: &Command) -> Result<()> {
        let wire = command.to_wire();
        debug!(target: "core_playback::channel", id = %self.id, %wire, "posting command");
        self.host.post(self.id, wire).await?;
        Ok(())
    }

    /// Decode one inbound message.
    ///
    /// Returns `None` for anything outside the event taxonomy: unparseable
    /// JSON, non-object payloads, or unknown tags. Dropping happens silently
    /// (a debug log only) per the channel's never-crash contract.
    pub fn decode(raw: &str) -> Option<SandboxEvent> {
        match serde_json::from_str::<SandboxEvent>(raw) {
            Ok(SandboxEvent::Unknown) => {
                debug!(target: "core_playback::channel", %raw, "dropping unknown event tag");
                None
            }
            Ok(event) => Some(event),
            Err(err) => {
                debug!(target: "core_playback::channel", %err, "dropping malformed message");
                None
            }
        }
    }
}
