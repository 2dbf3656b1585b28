use thiserror::Error;

/// Common error type for the MaxiGauge bridge components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
