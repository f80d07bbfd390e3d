//! Error types for the `oauth-connect` crate.
//!
//! Follows the same pattern as the other layers: a root Error struct holding an error kind
//! and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth-connect.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-connect.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// A provider endpoint answered with something other than HTTP 200.
    Transport {
        status: u16,
        reason: String,
        body: String,
    },
    /// A 200 response did not contain a field the exchange depends on.
    MissingCredentialField { field: String, body: String },
    /// The provider does not implement the requested operation (e.g. refresh).
    UnsupportedOperation(String),
    /// Programming or deployment defect: unsupported signature method, missing app keys.
    Configuration,
    /// An OAuth 1.0a callback arrived without a matching stored request token.
    SessionStateMissing,
    /// The session carrier itself failed to read or write.
    Session,
    /// A 200 response body could not be decoded.
    Decode,
    Token(TokenErrorKind),
    Http(HttpErrorKind),
}

/// Errors from token store operations.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    NotFound,
}

/// Errors raised by the transport before any status code is available.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// Returns the HTTP status carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.error_kind {
            ErrorKind::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Transport {
                status,
                reason,
                body,
            } => write!(
                f,
                "Provider error: status={}:reason={}:content={}",
                status, reason, body
            ),
            ErrorKind::MissingCredentialField { field, body } => {
                write!(f, "Missing field `{}` in provider response: {}", field, body)
            }
            ErrorKind::UnsupportedOperation(operation) => {
                write!(f, "Operation not supported: {}", operation)
            }
            ErrorKind::Configuration => write!(f, "Configuration error: {}", self.detail()),
            ErrorKind::SessionStateMissing => {
                write!(f, "No matching request token in session, restart the login")
            }
            ErrorKind::Session => write!(f, "Session error: {}", self.detail()),
            ErrorKind::Decode => write!(f, "Decode error: {}", self.detail()),
            ErrorKind::Token(kind) => write!(f, "Token error: {:?}: {}", kind, self.detail()),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}: {}", kind, self.detail()),
        }
    }
}

impl Error {
    fn detail(&self) -> String {
        self.source
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_default()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Decode,
        }
    }
}

/// Helper function to create transport errors from a non-200 response.
pub fn transport_error(status: u16, reason: &str, body: &str) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Transport {
            status,
            reason: reason.to_string(),
            body: body.to_string(),
        },
    }
}

/// Helper function to create missing field errors.
pub fn missing_field_error(field: &str, body: &str) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::MissingCredentialField {
            field: field.to_string(),
            body: body.to_string(),
        },
    }
}

/// Helper function to create unsupported operation errors.
pub fn unsupported_error(operation: &str) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::UnsupportedOperation(operation.to_string()),
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Configuration,
    }
}

/// Helper function to create decode errors.
pub fn decode_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Decode,
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// The callback did not match any stored request token.
pub fn session_state_missing() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::SessionStateMissing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display_carries_status_and_body() {
        let err = transport_error(401, "Unauthorized", "{\"error\":\"invalid_grant\"}");
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "Provider error: status=401:reason=Unauthorized:content={\"error\":\"invalid_grant\"}"
        );
    }

    #[test]
    fn test_config_error_exposes_message_as_source() {
        let err = config_error("unsupported signature method: PLAINTEXT");
        assert_eq!(err.error_kind, ErrorKind::Configuration);
        assert!(err.to_string().contains("PLAINTEXT"));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_non_transport_error_has_no_status() {
        assert_eq!(unsupported_error("refresh").status(), None);
    }
}
