//! Spotify track-embed payload.
//!
//! The embed exposes no control API: playback starts from a tap on the
//! embed's own play button, and only a fixed-length preview is available.
//! The payload therefore forwards no host commands. It reports readiness
//! with the fixed preview duration, asks the host for a manual start, and
//! surfaces the embed chrome's own play and pause signals as `trackPlay` /
//! `trackPause` so the host can run its progress simulation.

use bridge_traits::sandbox::SandboxContent;

use crate::{
    error::{EmbedError, Result},
    payload::BRIDGE_GLUE_JS,
    resolver::{spotify_track_id, PlatformKind},
};

/// Preview length the embed plays without an authenticated session, in
/// milliseconds. Reported as the track duration in the `ready` event.
pub const SPOTIFY_PREVIEW_MS: u64 = 30_000;

const EMBED_TRACK_BASE: &str = "https://open.spotify.com/embed/track/";
const EMBED_ORIGIN: &str = "https://open.spotify.com";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <style>html, body { margin: 0; padding: 0; background: transparent; }</style>
  </head>
  <body>
    <iframe id="sp-embed" width="100%" height="80" frameborder="0"
      allow="encrypted-media" src="__EMBED_SRC__"></iframe>
    <script>
__BRIDGE_GLUE__
      var PREVIEW_MS = __PREVIEW_MS__;
      var playing = false;

      // No embed control API exists; host commands are received and dropped.
      onHostCommand(function (_command) {});

      // The embed chrome reports its own playback through frame messages.
      window.addEventListener("message", function (event) {
        if (event.origin !== "__EMBED_ORIGIN__") return;
        var data = event.data;
        if (typeof data === "string") {
          try { data = JSON.parse(data); } catch (_err) { return; }
        }
        if (!data || data.type !== "playback_update") return;
        var payload = data.payload || {};
        if (payload.isPaused === false && !playing) {
          playing = true;
          emitToHost({ type: "trackPlay", platform: "spotify" });
        } else if (payload.isPaused === true && playing) {
          playing = false;
          emitToHost({ type: "trackPause", platform: "spotify" });
        }
      });

      window.addEventListener("load", function () {
        emitToHost({ type: "ready", platform: "spotify", duration: PREVIEW_MS });
        emitToHost({ type: "manualPlayRequired", platform: "spotify" });
      });
    </script>
  </body>
</html>
"#;

pub(crate) fn build(track_url: &str) -> Result<SandboxContent> {
    let track_id = spotify_track_id(track_url).ok_or_else(|| EmbedError::PayloadGeneration {
        platform: PlatformKind::Spotify,
        url: track_url.to_string(),
    })?;

    let html = PAGE_TEMPLATE
        .replace("__EMBED_SRC__", &format!("{EMBED_TRACK_BASE}{track_id}"))
        .replace("__EMBED_ORIGIN__", EMBED_ORIGIN)
        .replace("__PREVIEW_MS__", &SPOTIFY_PREVIEW_MS.to_string())
        .replace("__BRIDGE_GLUE__", BRIDGE_GLUE_JS);

    Ok(SandboxContent::new(PlatformKind::Spotify.as_str(), html).with_base_url(EMBED_ORIGIN))
}
