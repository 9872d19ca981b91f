//! Content auto-moderation for the Corvid platform.
//!
//! The moderator is constructed once during bootstrap, initialised from the
//! instance settings snapshot before the HTTP surface starts, and invoked by
//! the background queue to scan note content. When no scan API is configured
//! the service stays in a disabled state where scans are skipped rather than
//! failing.

mod client;
mod error;
mod service;

pub use client::{IffyClient, ScanVerdict};
pub use error::ModerationError;
pub use service::{AutoModerator, ScanOutcome};
