//! Core plumbing shared by the maria4rs crates.
//!
//! Provides the common error type, resolver configuration and an HTTP client
//! with bounded timeouts and idempotent, cache-aware file downloads.

pub mod config;
pub mod error;
pub mod http;

pub use config::ResolverConfig;
pub use error::{CoreError, Result};
pub use http::{FetchStatus, HttpClient};
