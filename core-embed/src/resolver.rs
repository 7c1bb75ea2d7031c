//! # Platform Resolver
//!
//! Pure, synchronous classification of track URLs into the platform kinds the
//! player can host, plus per-platform track-id extraction shared by the
//! payload builders and the deep-link fallback.
//!
//! Resolution is pattern-based against the known URL shapes of each service
//! and performs no network or I/O, so it is idempotent and side-effect-free
//! by construction.

use serde::{Deserialize, Serialize};
use url::Url;

/// Platform a track URL resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Full-stream widget embed with a complete programmatic control API.
    SoundCloud,
    /// Preview-only track embed; playback starts from a tap inside the embed
    /// chrome and cannot be driven by the host.
    Spotify,
    /// Video iframe player driven purely for its audio track.
    YouTube,
    /// URL matched no supported platform shape.
    Unrecognized,
}

impl PlatformKind {
    /// Wire tag used in channel messages and sandbox content.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::SoundCloud => "soundcloud",
            PlatformKind::Spotify => "spotify",
            PlatformKind::YouTube => "youtube",
            PlatformKind::Unrecognized => "unrecognized",
        }
    }

    /// Static capability descriptor for this platform kind.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            PlatformKind::SoundCloud | PlatformKind::YouTube => Capabilities {
                controllable: true,
                reports_progress: true,
                preview_only: false,
            },
            PlatformKind::Spotify => Capabilities {
                controllable: false,
                reports_progress: false,
                preview_only: true,
            },
            PlatformKind::Unrecognized => Capabilities {
                controllable: false,
                reports_progress: false,
                preview_only: false,
            },
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the player may assume about a platform's embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Embed honors host-issued play/pause/seek commands.
    pub controllable: bool,
    /// Embed reports authoritative progress; otherwise progress is simulated.
    pub reports_progress: bool,
    /// Embed plays a fixed-length preview, not the full track.
    pub preview_only: bool,
}

impl Capabilities {
    /// Controllable embeds are auto-played once ready; the others wait for a
    /// manual tap inside the embed chrome.
    pub fn requires_manual_start(&self) -> bool {
        !self.controllable
    }
}

/// Result of resolving a track URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub platform: PlatformKind,
    pub capabilities: Capabilities,
}

/// Classify a track URL.
///
/// Never fails: anything that does not match a supported shape resolves to
/// [`PlatformKind::Unrecognized`].
pub fn resolve(track_url: &str) -> Resolved {
    let platform = classify(track_url);
    Resolved {
        platform,
        capabilities: platform.capabilities(),
    }
}

fn classify(track_url: &str) -> PlatformKind {
    let Ok(parsed) = Url::parse(track_url.trim()) else {
        return PlatformKind::Unrecognized;
    };

    // spotify:track:<id> URIs have no host component.
    if parsed.scheme() == "spotify" {
        return if parsed.path().starts_with("track:") {
            PlatformKind::Spotify
        } else {
            PlatformKind::Unrecognized
        };
    }

    if !matches!(parsed.scheme(), "http" | "https") {
        return PlatformKind::Unrecognized;
    }

    let Some(host) = parsed.host_str() else {
        return PlatformKind::Unrecognized;
    };
    let host = host.trim_start_matches("www.");

    match host {
        "open.spotify.com" => {
            if spotify_track_path(&parsed) {
                PlatformKind::Spotify
            } else {
                PlatformKind::Unrecognized
            }
        }
        "soundcloud.com" | "m.soundcloud.com" | "on.soundcloud.com" => {
            if soundcloud_permalink(track_url).is_some() {
                PlatformKind::SoundCloud
            } else {
                PlatformKind::Unrecognized
            }
        }
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtu.be" => {
            if youtube_video_id(track_url).is_some() {
                PlatformKind::YouTube
            } else {
                PlatformKind::Unrecognized
            }
        }
        _ => PlatformKind::Unrecognized,
    }
}

/// Whether the path has a `/track/` segment, possibly behind a locale prefix.
///
/// Classification is deliberately looser than id extraction: a malformed id
/// under a track path is a payload-generation failure, not an unrecognized
/// URL.
fn spotify_track_path(parsed: &Url) -> bool {
    let mut segments: Vec<&str> = match parsed.path_segments() {
        Some(segments) => segments.filter(|s| !s.is_empty()).collect(),
        None => return false,
    };
    if segments
        .first()
        .is_some_and(|s| s.starts_with("intl-") || *s == "embed")
    {
        segments.remove(0);
    }
    segments.first() == Some(&"track")
}

/// Extract a Spotify track id from a track URL or `spotify:track:` URI.
///
/// Ids are 22-character base62 strings; anything else is rejected so the
/// payload builder fails closed instead of rendering a broken widget.
pub fn spotify_track_id(track_url: &str) -> Option<String> {
    let parsed = Url::parse(track_url.trim()).ok()?;

    let candidate = if parsed.scheme() == "spotify" {
        parsed.path().strip_prefix("track:")?.to_string()
    } else {
        if parsed.host_str()?.trim_start_matches("www.") != "open.spotify.com" {
            return None;
        }
        let mut segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
        if segments
            .first()
            .is_some_and(|s| s.starts_with("intl-") || *s == "embed")
        {
            segments.remove(0);
        }
        match segments.as_slice() {
            ["track", id] => (*id).to_string(),
            _ => return None,
        }
    };

    let valid = candidate.len() == 22 && candidate.bytes().all(|b| b.is_ascii_alphanumeric());
    valid.then_some(candidate)
}

/// Extract a YouTube video id from any of the supported URL shapes.
pub fn youtube_video_id(track_url: &str) -> Option<String> {
    let parsed = Url::parse(track_url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.trim_start_matches("www.");

    let candidate = match host {
        "youtu.be" => parsed
            .path_segments()?
            .find(|s| !s.is_empty())
            .map(str::to_string)?,
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => {
            let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
            match segments.as_slice() {
                ["watch"] => parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned())?,
                ["shorts", id] | ["embed", id] | ["live", id] => (*id).to_string(),
                _ => return None,
            }
        }
        _ => return None,
    };

    let valid = candidate.len() == 11
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    valid.then_some(candidate)
}

// Profile pages, system pages, and set/like listings share the track
// permalink's host; they are excluded by segment shape and these reserved
// names.
const SOUNDCLOUD_RESERVED_USERS: &[&str] = &[
    "discover", "stream", "search", "upload", "you", "messages", "notifications", "settings",
    "tags", "charts", "people", "pages", "jobs", "imprint", "terms-of-use",
];
const SOUNDCLOUD_RESERVED_PAGES: &[&str] = &[
    "tracks", "albums", "sets", "reposts", "likes", "followers", "following", "comments",
    "popular-tracks",
];

/// Extract a canonical SoundCloud track permalink.
///
/// Track permalinks are `https://soundcloud.com/{user}/{track}`; short links
/// from `on.soundcloud.com` are passed through for the widget to resolve.
pub fn soundcloud_permalink(track_url: &str) -> Option<String> {
    let parsed = Url::parse(track_url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.trim_start_matches("www.");
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

    match host {
        "on.soundcloud.com" => match segments.as_slice() {
            [token] => Some(format!("https://on.soundcloud.com/{token}")),
            _ => None,
        },
        "soundcloud.com" | "m.soundcloud.com" => match segments.as_slice() {
            [user, track]
                if !SOUNDCLOUD_RESERVED_USERS.contains(user)
                    && !SOUNDCLOUD_RESERVED_PAGES.contains(track) =>
            {
                Some(format!("https://soundcloud.com/{user}/{track}"))
            }
            _ => None,
        },
        _ => None,
    }
}
