use thiserror::Error;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the command.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A cached value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
