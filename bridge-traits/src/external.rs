//! External URI handoff.
//!
//! When a platform cannot be controlled inside the sandbox, the surrounding
//! UI offers to open the track in the platform's own app or the default
//! browser. The opener is the only OS-level capability this crate asks for.

use crate::{error::Result, platform::PlatformSendSync};

/// Trait for handing a URI off to the operating system.
///
/// # Platform Notes
///
/// - **iOS**: `UIApplication.open(_:)`; custom schemes require
///   `LSApplicationQueriesSchemes` entries
/// - **Android**: `Intent.ACTION_VIEW`; an unresolvable intent must surface as
///   an error, not a silent no-op
/// - **Desktop**: `xdg-open` / `open` / `ShellExecute`
///
/// # Example
///
/// ```ignore
/// use bridge_traits::external::ExternalOpener;
///
/// async fn open_track(opener: &dyn ExternalOpener) {
///     if opener.open("spotify:track:4uLU6hMCjMI75M1A2tKUQC").await.is_err() {
///         // no native handler installed, fall back to the web URL
///         let _ = opener.open("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC").await;
///     }
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ExternalOpener: PlatformSendSync {
    /// Ask the OS to open the given URI with its registered handler.
    ///
    /// Returns an error when no handler exists for the URI's scheme or the
    /// handoff is rejected; callers use that to drive scheme fallback.
    async fn open(&self, uri: &str) -> Result<()>;
}
