#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Database-backed instance settings for Corvid.
//!
//! Layout: `model.rs` (typed settings models), `error.rs` (typed failures),
//! `service.rs` (the `ConfigService` facade over the `meta` singleton row).

pub mod error;
pub mod model;
pub mod service;

pub use error::{ConfigError, ConfigResult};
pub use model::{ConfidenceThreshold, InstanceSettings, ModerationSettings};
pub use service::ConfigService;
