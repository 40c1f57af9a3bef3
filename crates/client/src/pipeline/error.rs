//! Request pipeline errors.

use thiserror::Error;

/// Message used when a failed response carries no `{ error }` envelope.
pub const UNKNOWN_SERVER_ERROR: &str = "unknown";

/// Every way a pipeline request can fail.
///
/// A raw 401 is never surfaced as-is: it becomes [`ApiError::Unauthorized`]
/// only after a refresh was attempted and failed, or when no refresh was
/// applicable.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request could not be built (bad path, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A successful response had an empty body where a value was expected.
    #[error("Server returned no response body")]
    NoResponseBody,

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decoding(String),

    /// The server answered with a 4xx/5xx status.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Authentication failed and could not be recovered by a refresh.
    #[error("Unauthorized - please sign in again")]
    Unauthorized,

    /// The request never produced a response (DNS, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// HTTP status for server errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the session is no longer usable.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            Self::Decoding(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ApiError::Server {
            status: 404,
            message: "Item not found".to_string(),
        };
        assert_eq!(err.to_string(), "Server error 404: Item not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_unauthorized_predicate() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::NoResponseBody.is_unauthorized());
        assert_eq!(ApiError::Unauthorized.status(), None);
    }
}
