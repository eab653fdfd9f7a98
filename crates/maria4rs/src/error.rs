use maria4rs_core::CoreError;
use maria4rs_maven::MavenError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Java {target} runtime not found")]
    Runtime { target: u32 },

    #[error("MariaDB server is not running")]
    NotRunning,

    #[error("Database engine failed to {operation}: {message}")]
    Engine { operation: String, message: String },

    #[error(transparent)]
    Maven(#[from] MavenError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;

impl ServerError {
    pub fn engine(operation: &str, message: impl Into<String>) -> Self {
        Self::Engine {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
