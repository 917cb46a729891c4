use thiserror::Error;

/// Top-level error type for the Sahayak core.
///
/// Subsystem crates define their own error types and convert into this one
/// where they cross into configuration or authentication.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SahayakError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SahayakError {
    fn from(err: toml::de::Error) -> Self {
        SahayakError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SahayakError {
    fn from(err: toml::ser::Error) -> Self {
        SahayakError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SahayakError {
    fn from(err: serde_json::Error) -> Self {
        SahayakError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Sahayak core operations.
pub type Result<T> = std::result::Result<T, SahayakError>;
