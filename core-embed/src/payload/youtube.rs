//! YouTube iframe payload.
//!
//! The iframe player is driven purely for its audio track. The IFrame API
//! gives full programmatic control, but unlike the SoundCloud widget it has
//! no progress callback, so the payload samples the player on a fixed
//! interval while playing and emits authoritative progress itself.

use bridge_traits::sandbox::SandboxContent;

use crate::{
    error::{EmbedError, Result},
    payload::{js_string, BRIDGE_GLUE_JS},
    resolver::{youtube_video_id, PlatformKind},
};

const IFRAME_API_JS_URL: &str = "https://www.youtube.com/iframe_api";
const PLAYER_ORIGIN: &str = "https://www.youtube.com";
const PROGRESS_INTERVAL_MS: u32 = 500;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <style>html, body, #yt-player { margin: 0; padding: 0; width: 100%; height: 100%; }</style>
  </head>
  <body>
    <div id="yt-player"></div>
    <script src="__IFRAME_API__"></script>
    <script>
__BRIDGE_GLUE__
      var VIDEO_ID = __VIDEO_ID__;
      var player = null;
      var progressTimer = null;

      function durationMs() {
        return player && player.getDuration ? Math.round(player.getDuration() * 1000) : 0;
      }
      function emitProgress() {
        if (!player || !player.getCurrentTime) return;
        var duration = durationMs();
        var current = Math.round(player.getCurrentTime() * 1000);
        emitToHost({
          type: "progress",
          platform: "youtube",
          currentTime: current,
          duration: duration,
          percentage: duration > 0 ? Math.min(100, (current / duration) * 100) : 0
        });
      }
      function startProgress() {
        if (progressTimer === null) {
          progressTimer = setInterval(emitProgress, __PROGRESS_INTERVAL__);
        }
      }
      function stopProgress() {
        if (progressTimer !== null) {
          clearInterval(progressTimer);
          progressTimer = null;
        }
      }

      function onYouTubeIframeAPIReady() {
        player = new YT.Player("yt-player", {
          width: "100%",
          height: "100%",
          videoId: VIDEO_ID,
          playerVars: { playsinline: 1, rel: 0, modestbranding: 1 },
          events: {
            onReady: function () {
              emitToHost({ type: "ready", platform: "youtube", duration: durationMs() });
            },
            onStateChange: function (event) {
              switch (event.data) {
                case YT.PlayerState.PLAYING:
                  emitToHost({ type: "play", platform: "youtube" });
                  startProgress();
                  break;
                case YT.PlayerState.PAUSED:
                  emitToHost({ type: "pause", platform: "youtube" });
                  stopProgress();
                  break;
                case YT.PlayerState.ENDED:
                  stopProgress();
                  emitProgress();
                  emitToHost({ type: "finish", platform: "youtube" });
                  break;
                case YT.PlayerState.BUFFERING:
                  emitToHost({ type: "buffering", platform: "youtube" });
                  break;
              }
            },
            onError: function (event) {
              stopProgress();
              emitToHost({
                type: "error",
                platform: "youtube",
                error: "player reported an error",
                code: event.data
              });
            }
          }
        });
      }

      onHostCommand(function (command) {
        if (!player) return;
        switch (command.action) {
          case "play":
            player.playVideo();
            break;
          case "pause":
            player.pauseVideo();
            break;
          case "seekTo":
            var duration = player.getDuration ? player.getDuration() : 0;
            if (duration > 0 && typeof command.percentage === "number") {
              player.seekTo(duration * (command.percentage / 100), true);
            }
            break;
          case "setVolume":
            if (typeof command.volume === "number") {
              player.setVolume(Math.max(0, Math.min(1, command.volume)) * 100);
            }
            break;
        }
      });
    </script>
  </body>
</html>
"#;

pub(crate) fn build(track_url: &str) -> Result<SandboxContent> {
    let video_id = youtube_video_id(track_url).ok_or_else(|| EmbedError::PayloadGeneration {
        platform: PlatformKind::YouTube,
        url: track_url.to_string(),
    })?;

    let html = PAGE_TEMPLATE
        .replace("__IFRAME_API__", IFRAME_API_JS_URL)
        .replace("__VIDEO_ID__", &js_string(&video_id))
        .replace("__PROGRESS_INTERVAL__", &PROGRESS_INTERVAL_MS.to_string())
        .replace("__BRIDGE_GLUE__", BRIDGE_GLUE_JS);

    Ok(SandboxContent::new(PlatformKind::YouTube.as_str(), html).with_base_url(PLAYER_ORIGIN))
}
