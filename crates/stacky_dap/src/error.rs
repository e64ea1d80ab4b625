use thiserror::Error;

/// Gateway errors.
#[derive(Error, Debug)]
pub enum DapError {
    #[error("Failed to start debug adapter: {0}")]
    StartFailed(String),

    #[error("Request '{command}' failed: {message}")]
    RequestFailed { command: String, message: String },

    #[error("Request '{0}' timed out")]
    Timeout(String),

    #[error("Debug adapter connection closed")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DapError>;
