//! # Embed Resolution & Content Generation
//!
//! Maps track URLs onto the third-party platforms the player can host, and
//! builds the sandboxed content that wraps each platform's embed widget.
//!
//! ## Overview
//!
//! This crate handles:
//! - Platform resolution: URL → platform kind + static capability descriptor
//! - Sandbox content generation: one payload builder per platform, each
//!   bundling the platform widget with an inline command listener and event
//!   emitter speaking the shared JSON wire protocol
//! - Deep-link-out fallback for platforms that cannot be controlled in the
//!   sandbox
//!
//! Resolution is pure and synchronous so it can be tested exhaustively
//! against a URL corpus; only the deep-link handoff touches the host bridge.

pub mod deeplink;
pub mod error;
pub mod payload;
pub mod resolver;

pub use deeplink::{deep_link, open_externally};
pub use error::{EmbedError, Result};
pub use payload::generate;
pub use resolver::{resolve, Capabilities, PlatformKind, Resolved};
