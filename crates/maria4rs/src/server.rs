use crate::config::ServerConfig;
use crate::engine::{DatabaseEngine, EngineSettings, SqlCommand};
use crate::error::{Result, ServerError};
use std::path::PathBuf;

/// Lifecycle wrapper around an embedded MariaDB engine.
pub struct EmbeddedServer<E> {
    engine: E,
    settings: EngineSettings,
    started: bool,
}

impl<E: DatabaseEngine> EmbeddedServer<E> {
    pub fn new(engine: E, settings: EngineSettings) -> Self {
        Self {
            engine,
            settings,
            started: false,
        }
    }

    pub fn from_config(engine: E, config: &ServerConfig, classpath: Vec<PathBuf>) -> Self {
        Self::new(
            engine,
            EngineSettings {
                port: config.port,
                data_dir: config.data_dir.clone(),
                classpath,
            },
        )
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Creates the data directory and starts the engine.
    pub async fn start_server(&mut self) -> Result<()> {
        tokio::fs::create_dir_all(&self.settings.data_dir).await?;
        if let Err(e) = self.engine.start(&self.settings).await {
            tracing::error!(port = self.settings.port, error = %e, "failed to start MariaDB server");
            return Err(e);
        }
        self.started = true;
        tracing::info!(port = self.settings.port, "MariaDB server started");
        Ok(())
    }

    /// Stops the engine if it was started. Failures are logged, not returned.
    pub async fn stop_server(&mut self) {
        if !self.started {
            return;
        }
        match self.engine.stop().await {
            Ok(()) => {
                self.started = false;
                tracing::info!("MariaDB server stopped");
            }
            Err(e) => tracing::error!(error = %e, "failed to stop MariaDB server"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.started && self.engine.is_running()
    }

    fn ensure_started(&self) -> Result<()> {
        if self.started {
            Ok(())
        } else {
            Err(ServerError::NotRunning)
        }
    }

    pub async fn create_database(&self, name: &str) -> Result<()> {
        self.ensure_started()?;
        self.engine.create_db(name).await.inspect_err(|e| {
            tracing::error!(database = %name, error = %e, "failed to create database");
        })?;
        tracing::info!(database = %name, "database created");
        Ok(())
    }

    /// Creates `user@host` and grants it every privilege.
    pub async fn create_user(&self, user: &str, password: &str, host: &str) -> Result<()> {
        self.ensure_started()?;
        let account = format!("{}@{}", quote_literal(user), quote_literal(host));
        let statements = [
            format!(
                "CREATE USER {account} IDENTIFIED BY {};",
                quote_literal(password)
            ),
            format!("GRANT ALL PRIVILEGES ON *.* TO {account} WITH GRANT OPTION;"),
            "FLUSH PRIVILEGES;".to_string(),
        ];

        for sql in statements {
            self.engine
                .run(&SqlCommand::admin(sql))
                .await
                .inspect_err(|e| {
                    tracing::error!(user = %user, host = %host, error = %e, "failed to create user");
                })?;
        }
        tracing::info!(user = %user, host = %host, "user created with all privileges");
        Ok(())
    }

    pub async fn execute_query(
        &self,
        query: &str,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<()> {
        self.ensure_started()?;
        let command = SqlCommand {
            user: user.to_string(),
            password: (!password.is_empty()).then(|| password.to_string()),
            database: Some(database.to_string()),
            sql: query.to_string(),
        };
        self.engine.run(&command).await.inspect_err(|e| {
            tracing::error!(query = %query, error = %e, "failed to execute query");
        })?;
        tracing::info!(query = %query, "executed query");
        Ok(())
    }

    pub async fn shutdown(mut self) {
        self.stop_server().await;
    }
}

/// Renders `value` as a single-quoted SQL string literal.
fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "''");
    format!("'{escaped}'")
}
