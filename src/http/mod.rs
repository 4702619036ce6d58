//! HTTP client module with status checking and request timeouts.

mod client;
mod status;

pub use client::{DEFAULT_TIMEOUT_SECS, HttpClient, build_client};
pub use status::UnexpectedStatus;
