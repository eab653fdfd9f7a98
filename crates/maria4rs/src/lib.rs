//! Embedded MariaDB provisioning.
//!
//! Locates a Java runtime, fetches the MariaDB4j jars and their transitive
//! dependencies from Maven Central, and drives the engine lifecycle.

pub mod config;
pub mod engine;
pub mod error;
pub mod provision;
pub mod runtime;
pub mod server;

pub use config::ServerConfig;
pub use engine::{DatabaseEngine, EngineSettings, SqlCommand};
pub use error::{Result, ServerError};
pub use provision::{Provisioned, provision, provision_with};
pub use runtime::{JavaRuntime, RuntimeProbe, java_major_version, parse_java_version};
pub use server::EmbeddedServer;

// Re-export the resolver surface
pub use maria4rs_core::ResolverConfig;
pub use maria4rs_maven::{ArtifactCoordinate, DependencyWalker, MavenCentralRegistry, ResolutionReport};
