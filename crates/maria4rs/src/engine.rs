//! Command surface of the JVM-hosted database engine.
//!
//! The engine itself lives behind this trait; the host only drives its
//! lifecycle and hands it the classpath produced by dependency resolution.

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Jar files making up the engine classpath.
    pub classpath: Vec<PathBuf>,
}

/// A statement run through the engine's bundled command-line client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCommand {
    pub user: String,
    pub password: Option<String>,
    pub database: Option<String>,
    pub sql: String,
}

impl SqlCommand {
    /// Statement executed as the administrative `root` account.
    pub fn admin(sql: impl Into<String>) -> Self {
        Self {
            user: "root".to_string(),
            password: None,
            database: Some("mysql".to_string()),
            sql: sql.into(),
        }
    }
}

#[async_trait]
pub trait DatabaseEngine: Send + Sync {
    async fn start(&mut self, settings: &EngineSettings) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;

    async fn create_db(&self, name: &str) -> Result<()>;

    async fn run(&self, command: &SqlCommand) -> Result<()>;
}
