//! # Deep-Link-Out Fallback
//!
//! When a platform cannot be controlled inside the sandbox, the surrounding
//! UI offers to hand the track off to the platform's own app. The handoff
//! tries a platform-native deep-link URI first and falls back to the
//! original web URL through the OS default handler.
//!
//! This path belongs to the UI layer; the orchestrator never calls it.

use bridge_traits::external::ExternalOpener;
use tracing::debug;

use crate::{
    error::{EmbedError, Result},
    resolver::{resolve, spotify_track_id, youtube_video_id, PlatformKind},
};

/// Construct the platform-native deep-link URI for a track URL, when the
/// platform has one.
///
/// SoundCloud registers universal links for its web permalinks, so the web
/// URL already opens the app where installed and no separate scheme is
/// needed.
pub fn deep_link(track_url: &str) -> Option<String> {
    match resolve(track_url).platform {
        PlatformKind::Spotify => spotify_track_id(track_url).map(|id| format!("spotify:track:{id}")),
        PlatformKind::YouTube => youtube_video_id(track_url).map(|id| format!("vnd.youtube://{id}")),
        PlatformKind::SoundCloud | PlatformKind::Unrecognized => None,
    }
}

/// Hand a track off to the OS: deep link first, original URL as fallback.
///
/// Returns an error only when both attempts fail.
pub async fn open_externally(track_url: &str, opener: &dyn ExternalOpener) -> Result<()> {
    if let Some(uri) = deep_link(track_url) {
        match opener.open(&uri).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                debug!(target: "core_embed::deeplink", %uri, %err, "deep link rejected, falling back to web URL");
            }
        }
    }

    opener
        .open(track_url)
        .await
        .map_err(|err| EmbedError::ExternalOpen(err.to_string()))
}
