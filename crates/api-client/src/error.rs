//! Error types for the API client

use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// A 2xx response without the fields the client needs
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => {
                // Retry on connection errors, timeouts
                e.is_connect() || e.is_timeout()
            }
            Self::ApiResponse { status, .. } => {
                // Retry on 5xx errors and 429 (rate limited)
                *status >= 500 || *status == 429
            }
            Self::Config(_) | Self::Json(_) | Self::InvalidResponse(_) | Self::InvalidUrl(_) => {
                false
            }
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if the server rejected the credentials or token
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiResponse { status: 401 | 403, .. })
    }

    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiResponse { message, .. } => message.clone(),
            Self::Request(_) => "Network error or server not responding".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::api_response(503, "down").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(!ApiError::api_response(400, "bad").is_retryable());
        assert!(!ApiError::InvalidResponse("no token".into()).is_retryable());
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::api_response(401, "expired").is_unauthorized());
        assert!(ApiError::api_response(401, "expired").is_client_error());
        assert!(!ApiError::api_response(500, "boom").is_unauthorized());
    }

    #[test]
    fn test_user_message() {
        let err = ApiError::api_response(401, "No active account found");
        assert_eq!(err.user_message(), "No active account found");
    }
}
