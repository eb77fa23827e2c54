//! Error types for the InfoSight client.
//!
//! Every operation returns [`InfoSightResult`]. API faults are kept apart from
//! transport and decode failures so callers can match on them.

use thiserror::Error;

use crate::types::FaultResponse;

/// Result type alias for InfoSight operations.
pub type InfoSightResult<T> = Result<T, InfoSightError>;

/// Error type for InfoSight client operations.
#[derive(Debug, Error)]
pub enum InfoSightError {
    /// Configuration error (invalid base URL, unusable header value, ...).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Network-level failure while performing the HTTP exchange.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message from the underlying HTTP stack.
        message: String,
    },

    /// The OAuth2 token could not be obtained.
    #[error("Token acquisition failed: {message}")]
    Token {
        /// Error message.
        message: String,
        /// HTTP status returned by the token endpoint, if any.
        status: Option<u16>,
    },

    /// The response body did not match the expected envelope.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Error message from the JSON decoder.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// The API answered with a fault envelope (HTTP status above 399).
    #[error("{0}")]
    Fault(FaultResponse),

    /// The request context deadline elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The request context was cancelled.
    #[error("Request cancelled")]
    Cancelled,
}

impl InfoSightError {
    /// Returns true if this error is an API fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, InfoSightError::Fault(_))
    }

    /// Returns the fault envelope, if this error carries one.
    pub fn fault(&self) -> Option<&FaultResponse> {
        match self {
            InfoSightError::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns the HTTP status code associated with this error, if known.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            InfoSightError::Fault(fault) => Some(fault.status_code),
            InfoSightError::Token { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn decode(err: &serde_json::Error, body: &[u8]) -> Self {
        InfoSightError::Decode {
            message: err.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

impl From<reqwest::Error> for InfoSightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InfoSightError::Timeout
        } else {
            InfoSightError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for InfoSightError {
    fn from(err: url::ParseError) -> Self {
        InfoSightError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fault, FaultDetail};

    fn forbidden(fault: Option<Fault>) -> FaultResponse {
        FaultResponse {
            status: "403 Forbidden".to_string(),
            status_code: 403,
            fault,
        }
    }

    #[test]
    fn test_fault_error_displays_fault_string() {
        let error = InfoSightError::Fault(forbidden(Some(Fault {
            fault_string: Some("forbidden".to_string()),
            detail: Some(FaultDetail {
                error_code: Some("E403".to_string()),
            }),
        })));

        assert_eq!(error.to_string(), "forbidden");
        assert!(error.is_fault());
        assert_eq!(error.status_code(), Some(403));
    }

    #[test]
    fn test_fault_error_falls_back_to_status_line() {
        let error = InfoSightError::Fault(forbidden(None));
        assert_eq!(error.to_string(), "403 Forbidden");
    }

    #[test]
    fn test_non_fault_errors() {
        let error = InfoSightError::Transport {
            message: "connection refused".to_string(),
        };
        assert!(!error.is_fault());
        assert!(error.fault().is_none());
        assert_eq!(error.status_code(), None);

        let error = InfoSightError::Token {
            message: "invalid_client".to_string(),
            status: Some(401),
        };
        assert_eq!(error.status_code(), Some(401));
    }

    #[test]
    fn test_url_parse_error_is_configuration() {
        let err = url::Url::parse("not a url").unwrap_err();
        let error = InfoSightError::from(err);
        assert!(matches!(error, InfoSightError::Configuration { .. }));
    }
}
