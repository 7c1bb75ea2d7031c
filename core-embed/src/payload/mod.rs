//! # Sandbox Content Generator
//!
//! One payload builder per platform. Every payload is a complete HTML
//! document bundling three pieces:
//!
//! 1. the platform's own embeddable widget, pointed at a normalized embed URL
//!    derived from the track URL;
//! 2. an inline command listener that receives host-issued
//!    `{action: play|pause|seekTo|setVolume}` messages and forwards them to
//!    the platform SDK where one exists;
//! 3. an inline event emitter that translates the SDK's native events into
//!    the shared JSON wire protocol and posts them to the host.
//!
//! Generation fails closed: a URL that resolves to a platform but yields no
//! embeddable id returns [`EmbedError::PayloadGeneration`] instead of
//! rendering a broken widget.

mod soundcloud;
mod spotify;
mod youtube;

pub use spotify::SPOTIFY_PREVIEW_MS;

use bridge_traits::sandbox::SandboxContent;

use crate::{
    error::{EmbedError, Result},
    resolver::PlatformKind,
};

/// Shared bridge glue injected into every payload.
///
/// `emitToHost` serializes an event object and posts it through the host's
/// injected entry point, falling back to frame messaging for plain-iframe
/// hosts. `onHostCommand` subscribes a handler to host-issued command
/// messages; anything that is not a JSON string carrying an `action` tag is
/// ignored so stray frame traffic can never reach the SDK calls.
const BRIDGE_GLUE_JS: &str = r#"
    function emitToHost(message) {
      var payload;
      try { payload = JSON.stringify(message); } catch (_err) { return; }
      if (window.__embedHost && typeof window.__embedHost.postMessage === "function") {
        window.__embedHost.postMessage(payload);
      } else if (window.parent && window.parent !== window) {
        window.parent.postMessage(payload, "*");
      }
    }
    function onHostCommand(handler) {
      window.addEventListener("message", function (event) {
        if (typeof event.data !== "string") return;
        var command;
        try { command = JSON.parse(event.data); } catch (_err) { return; }
        if (!command || typeof command.action !== "string") return;
        handler(command);
      });
    }
"#;

/// Build the sandbox content for a resolved track.
///
/// `Unrecognized` yields [`EmbedError::InvalidUrl`]; the per-platform
/// builders yield [`EmbedError::PayloadGeneration`] when the track URL
/// carries no embeddable id.
pub fn generate(track_url: &str, platform: PlatformKind) -> Result<SandboxContent> {
    match platform {
        PlatformKind::SoundCloud => soundcloud::build(track_url),
        PlatformKind::Spotify => spotify::build(track_url),
        PlatformKind::YouTube => youtube::build(track_url),
        PlatformKind::Unrecognized => Err(EmbedError::InvalidUrl(track_url.to_string())),
    }
}

/// Quote a value as a JavaScript string literal.
///
/// Serializing through JSON keeps embedded quotes, backslashes, and line
/// separators from breaking out of the script context; `</` is additionally
/// escaped so a value can never terminate the surrounding script element.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}
