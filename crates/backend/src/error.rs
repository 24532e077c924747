//! Errors returned by backend calls.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service rejected the credentials or token.
    #[error("{0}")]
    Auth(String),

    /// A row could not be decoded.
    #[error("Decode error in {table}: {reason}")]
    Decode { table: String, reason: String },

    /// A row decoded but violates the record's constraints.
    #[error("Invalid {table} row: {reason}")]
    Invalid { table: String, reason: String },

    /// No row matched.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client misconfiguration (bad URL, bad header value).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// The human-readable message to show the user.
    ///
    /// For service errors this is the service's own `message`/`msg`/
    /// `error_description` text, passed through verbatim.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Auth(message) => message.clone(),
            Self::Http(e) if e.is_timeout() => "The backend did not respond in time".to_string(),
            Self::Http(_) => "Could not reach the backend".to_string(),
            other => other.to_string(),
        }
    }

    /// HTTP status of an API error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for [`BackendError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Pull the service's message out of an error body.
///
/// The REST layer uses `message`, the auth layer `msg` or
/// `error_description`, storage uses `message` or `error`. Falls back to the
/// raw body (truncated) when it isn't JSON.
pub(crate) fn parse_error(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    let message = if message.is_empty() {
        format!("HTTP {status}")
    } else {
        message
    };

    BackendError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_field() {
        let err = parse_error(400, r#"{"code": "23505", "message": "duplicate key"}"#);
        assert_eq!(err.message(), "duplicate key");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_parse_error_auth_fields() {
        let err = parse_error(400, r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#);
        assert_eq!(err.message(), "Invalid login credentials");
        let err = parse_error(422, r#"{"msg": "Email not confirmed"}"#);
        assert_eq!(err.message(), "Email not confirmed");
    }

    #[test]
    fn test_parse_error_plain_body() {
        let err = parse_error(502, "Bad Gateway");
        assert_eq!(err.message(), "Bad Gateway");
        let err = parse_error(500, "");
        assert_eq!(err.message(), "HTTP 500");
    }
}
