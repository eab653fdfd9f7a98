//! Resolver configuration.
//!
//! Values come from (lowest to highest precedence) built-in defaults, an
//! optional JSON file and `MARIA4RS_*` environment variables.

use crate::error::{CoreError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maven Central repository root used to build artifact URLs.
pub const DEFAULT_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2/";

/// Maven Central Solr search endpoint used for latest-version lookups.
pub const DEFAULT_SEARCH_URL: &str = "https://search.maven.org/solrsearch/select";

pub const ENV_JARS_DIR: &str = "MARIA4RS_JARS_DIR";
pub const ENV_REPOSITORY_URL: &str = "MARIA4RS_REPOSITORY_URL";
pub const ENV_SEARCH_URL: &str = "MARIA4RS_SEARCH_URL";

/// Settings for dependency resolution and artifact download.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory receiving `<artifactId>-<version>.{jar,pom}` files.
    pub dependencies_dir: PathBuf,
    pub repository_url: String,
    pub search_url: String,
    pub registry_timeout_secs: u64,
    pub download_timeout_secs: u64,
    /// Maximum transitive depth walked below a root artifact.
    pub max_depth: usize,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            dependencies_dir: PathBuf::from("mariadb4j_jars"),
            repository_url: DEFAULT_REPOSITORY_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            registry_timeout_secs: 10,
            download_timeout_secs: 300,
            max_depth: 64,
            user_agent: concat!("maria4rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ResolverConfig {
    /// Creates a default configuration rooted at `dependencies_dir`.
    pub fn with_dependencies_dir(dependencies_dir: impl Into<PathBuf>) -> Self {
        Self {
            dependencies_dir: dependencies_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded resolver configuration");
        Self::from_json_str(&content)
    }

    /// Applies overrides from a variable lookup (normally `std::env::var`).
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_JARS_DIR) {
            self.dependencies_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_REPOSITORY_URL) {
            self.repository_url = url;
        }
        if let Some(url) = lookup(ENV_SEARCH_URL) {
            self.search_url = url;
        }
        self
    }

    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.repository_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig("repository_url is empty".into()));
        }
        if self.search_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig("search_url is empty".into()));
        }
        if self.registry_timeout_secs == 0 || self.download_timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(CoreError::InvalidConfig(
                "max_depth must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub const fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
