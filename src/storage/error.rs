use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session store connection error: {0}")]
    ConnectionError(String),

    #[error("Session store command failed: {0}")]
    CommandError(String),

    #[error("Session value serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

#[cfg(feature = "cache")]
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            StoreError::ConnectionError(err.to_string())
        } else {
            StoreError::CommandError(err.to_string())
        }
    }
}

#[cfg(feature = "cache")]
impl From<bb8::RunError<redis::RedisError>> for StoreError {
    fn from(err: bb8::RunError<redis::RedisError>) -> Self {
        StoreError::ConnectionError(err.to_string())
    }
}
