//! HTTP surface for the Corvid platform.
//!
//! Layout: `state.rs` (shared handler state and the configuration facade),
//! `release.rs` (outbound release feed client), `http/` (router, error
//! wrapper, and the endpoint handlers).

pub mod http;
mod release;
mod state;

pub use http::router::ApiServer;
pub use release::{DEFAULT_RELEASE_URL, ReleaseClient};
pub use state::{ApiState, ConfigFacade};
