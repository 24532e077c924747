//! Admin credential gate error types.

use forgepilot_backend::BackendError;
use thiserror::Error;

/// Errors that can occur while checking admin credentials.
#[derive(Debug, Error)]
pub enum GateError {
    /// No admin email or password hash has been stored.
    #[error("No admin credentials configured. Set them from the CLI or the dashboard.")]
    NotConfigured,

    /// Email or password did not match. Deliberately doesn't say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The hosted backend failed or rejected the sign-in.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The server session could not be updated.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Text shown on the login page.
    ///
    /// Backend failures are passed through verbatim from the service.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured | Self::InvalidCredentials => self.to_string(),
            Self::Backend(e) => e.message(),
            Self::Session(_) | Self::Internal(_) => {
                "Something went wrong signing you in. Please try again.".to_string()
            }
        }
    }

    /// Whether the login form should be disabled until an operator acts.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}
