//! Error types for the scanning service client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the scanning service
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, connection refused, timeout)
    #[error("scanning service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// Service answered with a status outside the 2xx range
    #[error("scanning service returned status {status}: {message}")]
    NonSuccessStatus {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    DecodeFailure(String),
}

impl ClientError {
    /// Create a non-success error from status code and body
    pub fn non_success(status: u16, message: impl Into<String>) -> Self {
        Self::NonSuccessStatus {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a transport failure that may succeed on retry
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NonSuccessStatus { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::NonSuccessStatus { status, .. } if *status >= 500)
    }
}
