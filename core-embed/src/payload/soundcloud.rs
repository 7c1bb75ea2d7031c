//! SoundCloud widget payload.
//!
//! The widget ships a full control and event API (`SC.Widget`), so this
//! payload forwards every host command as a native widget call and relays
//! the widget's native events, including authoritative progress.

use bridge_traits::sandbox::SandboxContent;
use url::Url;

use crate::{
    error::{EmbedError, Result},
    payload::BRIDGE_GLUE_JS,
    resolver::{soundcloud_permalink, PlatformKind},
};

const WIDGET_PLAYER_URL: &str = "https://w.soundcloud.com/player/";
const WIDGET_API_JS_URL: &str = "https://w.soundcloud.com/player/api.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <style>html, body { margin: 0; padding: 0; background: transparent; }</style>
  </head>
  <body>
    <iframe id="sc-widget" width="100%" height="166" scrolling="no" frameborder="no"
      allow="autoplay" src="__WIDGET_SRC__"></iframe>
    <script src="__WIDGET_API__"></script>
    <script>
__BRIDGE_GLUE__
      var widget = SC.Widget(document.getElementById("sc-widget"));
      var trackDuration = 0;

      widget.bind(SC.Widget.Events.READY, function () {
        widget.getDuration(function (ms) {
          trackDuration = ms || 0;
          emitToHost({ type: "ready", platform: "soundcloud", duration: trackDuration });
        });
      });
      widget.bind(SC.Widget.Events.PLAY, function () {
        emitToHost({ type: "play", platform: "soundcloud" });
      });
      widget.bind(SC.Widget.Events.PAUSE, function () {
        emitToHost({ type: "pause", platform: "soundcloud" });
      });
      widget.bind(SC.Widget.Events.PLAY_PROGRESS, function (progress) {
        emitToHost({
          type: "progress",
          platform: "soundcloud",
          currentTime: Math.round(progress.currentPosition || 0),
          duration: trackDuration,
          percentage: (progress.relativePosition || 0) * 100
        });
      });
      widget.bind(SC.Widget.Events.FINISH, function () {
        emitToHost({ type: "finish", platform: "soundcloud" });
      });
      widget.bind(SC.Widget.Events.ERROR, function () {
        emitToHost({ type: "error", platform: "soundcloud", error: "widget reported an error" });
      });

      onHostCommand(function (command) {
        switch (command.action) {
          case "play":
            widget.play();
            break;
          case "pause":
            widget.pause();
            break;
          case "seekTo":
            if (trackDuration > 0 && typeof command.percentage === "number") {
              widget.seekTo(trackDuration * (command.percentage / 100));
            }
            break;
          case "setVolume":
            if (typeof command.volume === "number") {
              widget.setVolume(Math.max(0, Math.min(1, command.volume)) * 100);
            }
            break;
        }
      });
    </script>
  </body>
</html>
"#;

pub(crate) fn build(track_url: &str) -> Result<SandboxContent> {
    let permalink =
        soundcloud_permalink(track_url).ok_or_else(|| EmbedError::PayloadGeneration {
            platform: PlatformKind::SoundCloud,
            url: track_url.to_string(),
        })?;

    let widget_src = Url::parse_with_params(
        WIDGET_PLAYER_URL,
        &[
            ("url", permalink.as_str()),
            ("auto_play", "false"),
            ("hide_related", "true"),
            ("show_comments", "false"),
            ("show_teaser", "false"),
            ("visual", "false"),
        ],
    )
    .map_err(|_| EmbedError::PayloadGeneration {
        platform: PlatformKind::SoundCloud,
        url: track_url.to_string(),
    })?;

    let html = PAGE_TEMPLATE
        .replace("__WIDGET_SRC__", widget_src.as_str())
        .replace("__WIDGET_API__", WIDGET_API_JS_URL)
        .replace("__BRIDGE_GLUE__", BRIDGE_GLUE_JS);

    Ok(SandboxContent::new(PlatformKind::SoundCloud.as_str(), html)
        .with_base_url("https://soundcloud.com"))
}
