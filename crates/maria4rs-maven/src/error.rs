//! Errors specific to pom.xml handling and Maven resolution.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MavenError {
    #[error("Failed to parse pom.xml: {message}")]
    ParseError { message: String },

    #[error("Invalid Maven coordinates '{coordinates}': expected 'groupId:artifactId[:version]'")]
    InvalidCoordinates { coordinates: String },

    #[error("Maven Central request failed for '{package}': {source}")]
    RegistryError {
        package: String,
        #[source]
        source: maria4rs_core::CoreError,
    },

    #[error("Failed to parse Maven Central API response for '{package}': {source}")]
    ApiResponseError {
        package: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] maria4rs_core::CoreError),
}

pub type Result<T> = std::result::Result<T, MavenError>;

impl MavenError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }
}
