//! Host configuration: server settings plus the embedded resolver settings.

use crate::error::{Result, ServerError};
use maria4rs_core::ResolverConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "MARIA4RS_CONFIG";
pub const ENV_PORT: &str = "MARIA4RS_PORT";
pub const ENV_DATA_DIR: &str = "MARIA4RS_DATA_DIR";

/// Name of the file recording the last located Java executable.
pub const RUNTIME_MARKER_FILE: &str = "path.config";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// MariaDB data directory; created on server start.
    pub data_dir: PathBuf,
    /// Required Java major version.
    pub java_version: u32,
    /// Directory holding the runtime marker file.
    pub state_dir: PathBuf,
    pub resolver: ResolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            port: 3306,
            data_dir: home.join("mariadb4j_data"),
            java_version: 17,
            state_dir: dirs::data_local_dir()
                .map(|d| d.join("maria4rs"))
                .unwrap_or_else(|| home.join(".maria4rs")),
            resolver: ResolverConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(maria4rs_core::CoreError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded server configuration");
        Self::from_json_str(&content)
    }

    /// Loads the file named by `MARIA4RS_CONFIG` (defaults otherwise) and
    /// applies environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match lookup(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        let config = base.with_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .parse()
                .map_err(|_| ServerError::InvalidConfig(format!("{ENV_PORT}={port}")))?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        self.resolver = self.resolver.with_overrides(lookup);
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ServerError::InvalidConfig("port must be non-zero".into()));
        }
        self.resolver.validate()?;
        Ok(())
    }

    pub fn marker_path(&self) -> PathBuf {
        self.state_dir.join(RUNTIME_MARKER_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3306);
        assert_eq!(config.java_version, 17);
        assert!(config.data_dir.ends_with("mariadb4j_data"));
        assert!(config.marker_path().ends_with(RUNTIME_MARKER_FILE));
    }

    #[test]
    fn test_nested_resolver_json() {
        let config = ServerConfig::from_json_str(
            r#"{"port": 3307, "resolver": {"dependencies_dir": "/opt/jars", "max_depth": 8}}"#,
        )
        .unwrap();
        assert_eq!(config.port, 3307);
        assert_eq!(config.resolver.dependencies_dir, PathBuf::from("/opt/jars"));
        assert_eq!(config.resolver.max_depth, 8);
        assert_eq!(config.java_version, 17);
    }

    #[test]
    fn test_invalid_json() {
        assert!(ServerConfig::from_json_str("{port: }").is_err());
        assert!(matches!(
            ServerConfig::from_json_str(r#"{"port": 0}"#),
            Err(ServerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::load_with(lookup(&[
            (ENV_PORT, "3310"),
            (ENV_DATA_DIR, "/var/lib/maria"),
            ("MARIA4RS_JARS_DIR", "/tmp/jars"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3310);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/maria"));
        assert_eq!(config.resolver.dependencies_dir, PathBuf::from("/tmp/jars"));
    }

    #[test]
    fn test_bad_port_override() {
        let result = ServerConfig::load_with(lookup(&[(ENV_PORT, "not-a-port")]));
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maria4rs.json");
        std::fs::write(&path, r#"{"port": 4000, "java_version": 21}"#).unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let config =
            ServerConfig::load_with(lookup(&[(ENV_CONFIG, path_str.as_str()), (ENV_PORT, "4001")]))
                .unwrap();
        assert_eq!(config.port, 4001);
        assert_eq!(config.java_version, 21);
    }

    #[test]
    fn test_missing_config_file() {
        let result = ServerConfig::load_with(lookup(&[(ENV_CONFIG, "/nonexistent/maria4rs.json")]));
        assert!(matches!(result, Err(ServerError::Io(_))));
    }
}
