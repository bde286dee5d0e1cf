//! Error types for the session crate.

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while managing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The key-value store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error in the file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid JSON
    #[error("Corrupt session file: {0}")]
    Json(#[from] serde_json::Error),

    /// Sign-in was rejected or could not reach the server
    #[error("Sign-in failed: {0}")]
    Auth(String),
}

impl SessionError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
