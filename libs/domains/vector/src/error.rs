use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Embedding input must not be blank")]
    EmptyInput,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u64, actual: u64 },

    #[error("Embedding provider rate limited the request")]
    RateLimited,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    /// Transient failures worth retrying; everything else fails fast.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VectorError::RateLimited | VectorError::Transport(_))
    }
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::Index(err.to_string())
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VectorError::InvalidResponse(err.to_string())
        } else {
            VectorError::Transport(err.to_string())
        }
    }
}

impl From<core_config::ConfigError> for VectorError {
    fn from(err: core_config::ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}
