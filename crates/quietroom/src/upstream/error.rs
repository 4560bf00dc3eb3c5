//! Error types for calls to the QuietRoom API.

use thiserror::Error;

/// Errors that can occur while talking to the QuietRoom API.
#[derive(Debug, Error, Clone)]
pub enum QuietRoomError {
    /// Required search input was missing or malformed; nothing was sent
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The building or room does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Server returned a status we don't handle
    #[error("Unexpected response ({status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },
}

impl QuietRoomError {
    /// Returns true if the requested room or building does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuietRoomError::NotFound { .. })
    }

    /// Returns true if this error is potentially transient.
    ///
    /// Nothing retries automatically; this only decides how the failure is reported.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuietRoomError::Network { .. } => true,
            QuietRoomError::UnexpectedResponse { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for QuietRoomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            QuietRoomError::ParseError {
                message: err.to_string(),
            }
        } else {
            QuietRoomError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for QuietRoomError {
    fn from(err: url::ParseError) -> Self {
        QuietRoomError::UrlError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for QuietRoomError {
    fn from(err: serde_json::Error) -> Self {
        QuietRoomError::ParseError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let not_found = QuietRoomError::NotFound {
            resource: "OKT/N999".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_retryable());

        let bad_gateway = QuietRoomError::UnexpectedResponse {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(bad_gateway.is_retryable());

        let bad_request = QuietRoomError::UnexpectedResponse {
            status: 400,
            message: "Bad Request".to_string(),
        };
        assert!(!bad_request.is_retryable());
    }

    #[test]
    fn test_url_error_conversion() {
        let err: QuietRoomError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, QuietRoomError::UrlError { .. }));
    }
}
