//! Domain types for Maven artifacts and pom.xml dependencies.

use crate::error::MavenError;
use std::collections::HashMap;
use std::fmt;

/// Property name -> resolved value, accumulated while parsing one descriptor.
pub type PropertyTable = HashMap<String, String>;

/// Version-independent identity of an artifact: `groupId:artifactId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey {
    pub group_id: String,
    pub artifact_id: String,
}

impl CoordinateKey {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl ArtifactCoordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version,
        }
    }

    pub fn versioned(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, Some(version.into()))
    }

    /// Identity used for deduplication. The version is deliberately not part
    /// of it: the first version seen for a `groupId:artifactId` wins.
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::new(&self.group_id, &self.artifact_id)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{version}", self.group_id, self.artifact_id),
            None => write!(f, "{}:{}", self.group_id, self.artifact_id),
        }
    }
}

impl std::str::FromStr for ArtifactCoordinate {
    type Err = MavenError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || MavenError::InvalidCoordinates {
            coordinates: s.to_string(),
        };
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [g, a] if !g.is_empty() && !a.is_empty() => Ok(Self::new(*g, *a, None)),
            [g, a, v] if !g.is_empty() && !a.is_empty() && !v.is_empty() => {
                Ok(Self::versioned(*g, *a, *v))
            }
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MavenScope {
    #[default]
    Compile,
    Test,
    Runtime,
    Provided,
    System,
    Import,
}

impl MavenScope {
    /// Whether artifacts in this scope belong on a runtime classpath.
    pub const fn is_fetched(&self) -> bool {
        !matches!(self, Self::Test | Self::Provided)
    }
}

impl std::str::FromStr for MavenScope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "test" => Self::Test,
            "runtime" => Self::Runtime,
            "provided" => Self::Provided,
            "system" => Self::System,
            "import" => Self::Import,
            _ => Self::Compile,
        })
    }
}

/// A `<dependency>` entry after property expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: MavenScope,
    pub optional: bool,
}

impl DependencyDeclaration {
    /// Test, provided and optional dependencies never enter the graph.
    pub const fn is_excluded(&self) -> bool {
        self.optional || !self.scope.is_fetched()
    }

    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::new(&self.group_id, &self.artifact_id)
    }

    pub fn to_coordinate(&self) -> ArtifactCoordinate {
        ArtifactCoordinate::new(&self.group_id, &self.artifact_id, self.version.clone())
    }
}

/// Versions pinned by a `<dependencyManagement>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedVersionTable {
    versions: HashMap<CoordinateKey, String>,
}

impl ManagedVersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a managed version. The first entry for a coordinate wins.
    pub fn insert(&mut self, key: CoordinateKey, version: String) {
        self.versions.entry(key).or_insert(version);
    }

    pub fn get(&self, group_id: &str, artifact_id: &str) -> Option<&str> {
        self.versions
            .get(&CoordinateKey::new(group_id, artifact_id))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Jar,
    Pom,
}

impl ArtifactKind {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jar => "jar",
            Self::Pom => "pom",
        }
    }
}

/// Whether `value` can be used as part of a file name without leaving the
/// directory it is joined onto.
pub fn is_safe_file_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
}

/// On-disk name of an artifact file: `<artifactId>-<version>.<ext>`.
pub fn artifact_file_name(artifact_id: &str, version: &str, kind: ArtifactKind) -> String {
    format!("{artifact_id}-{version}.{}", kind.extension())
}
