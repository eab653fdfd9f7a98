//! pom.xml parsing and transitive Maven artifact fetching.
//!
//! This crate resolves a set of root Maven coordinates into a flat directory
//! of jar and pom files: descriptors are parsed with property expansion and
//! dependency management, missing versions are looked up on Maven Central
//! and every `groupId:artifactId` is fetched at most once per run.

pub mod error;
pub mod parser;
pub mod properties;
pub mod registry;
pub mod resolver;
pub mod types;

pub use error::{MavenError, Result};
pub use parser::{ParsedDescriptor, PomDocument, parse_descriptor, parse_pom_xml};
pub use properties::resolve_properties;
pub use registry::{MavenCentralRegistry, MavenRepository, artifact_url};
pub use resolver::{
    ArtifactOutcome, DependencyWalker, OutcomeStatus, ResolutionReport, VisitedSet,
    default_roots, roots_from_pom,
};
pub use types::{
    ArtifactCoordinate, ArtifactKind, CoordinateKey, DependencyDeclaration, ManagedVersionTable,
    MavenScope, PropertyTable,
};
