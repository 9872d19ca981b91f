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

//! Corvid worker bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (sequential service wiring), `executor.rs` (the
//! background job executor), `supervisor.rs` (readiness signalling to a
//! parent supervisor).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Error surface for bootstrap failures.
pub mod error;
/// Background job execution wiring.
pub mod executor;
/// Readiness signalling to a supervising parent process.
pub mod supervisor;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
