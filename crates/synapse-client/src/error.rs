//! Client error types.

use thiserror::Error;

use crate::storm::DecodeError;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the Cortex (e.g. `AuthDeny`, `NoSuchView`).
        code: String,
        /// Error message from the Cortex.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server answered with a body of an unexpected shape.
    #[error("Unexpected response from {endpoint}: {body}")]
    UnexpectedResponse {
        /// API path that was called.
        endpoint: String,
        /// The body as received.
        body: String,
    },

    /// Stream error.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Response body is not valid UTF-8 text.
    #[error("Response body is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A Storm envelope violated its schema under the strict policy.
    #[error("Storm message on line {line}: {source}")]
    Decode {
        /// 1-based line number within the response body.
        line: usize,
        #[source]
        source: DecodeError,
    },
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
            || matches!(self, Error::Api { status: 401, .. })
            || matches!(self, Error::Api { code, .. } if code == "AuthDeny" || code == "NotAuthenticated")
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the Cortex (`{"status": "err", "code": .., "mesg": ..}`).
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub mesg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = Error::Api {
            status: 404,
            code: "NoSuchFile".to_string(),
            message: "missing".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_server_error());

        let err = Error::Api {
            status: 200,
            code: "AuthDeny".to_string(),
            message: "denied".to_string(),
        };
        assert!(err.is_auth_error());

        let err = Error::Api {
            status: 503,
            code: "unknown".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert!(err.is_server_error());
    }

    #[test]
    fn test_decode_error_display_includes_line() {
        let err = Error::Decode {
            line: 3,
            source: DecodeError::UnknownTag("warn".to_string()),
        };
        assert!(err.to_string().contains("line 3"));
    }
}
