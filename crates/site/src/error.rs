//! Unified error handling for the site.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forgepilot_backend::BackendError;
use thiserror::Error;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hosted backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a backend error, keeping "not found" as a 404.
    #[must_use]
    pub fn from_backend(err: BackendError, what: &str) -> Self {
        if err.is_not_found() {
            Self::NotFound(what.to_string())
        } else {
            Self::Backend(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Backend(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Site request error"
            );
        }

        let status = match &self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Backend messages are meant for people; internal details are not
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Backend(err) => err.message(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context for the signed-in admin.
pub fn set_sentry_user(id: Option<String>, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id,
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("post acme-launch".to_string());
        assert_eq!(err.to_string(), "Not found: post acme-launch");

        let err = AppError::BadRequest("missing file".to_string());
        assert_eq!(err.to_string(), "Bad request: missing file");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Api {
                status: 500,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_from_backend_keeps_not_found() {
        let err = AppError::from_backend(BackendError::NotFound("posts/1".into()), "post");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
