// for error definitions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid construction input (zero capacity, zero threshold, empty server list)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend failed to produce a result for a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// Data serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected or internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// implement conversions from serde_json::Error to PipelineError
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

// define a Result type alias for convenience
pub type Result<T> = std::result::Result<T, PipelineError>;
