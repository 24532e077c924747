//! Session-related types.
//!
//! Keys are namespaced so the admin identity can't collide with anything
//! else a future feature keeps in the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys for authentication data.
pub mod keys {
    /// Local admin flag, set by the credential gate in local session mode.
    pub const LOCAL_ADMIN: &str = "forgepilot.admin_auth";

    /// Hosted auth session (tokens, expiry, user), set in hosted session mode.
    pub const HOSTED_SESSION: &str = "forgepilot.hosted_session";

    /// One-shot message shown on the next rendered page.
    pub const FLASH: &str = "forgepilot.flash";
}

/// The local admin flag.
///
/// Records who passed the credential gate so the guard can compare against
/// the configured email on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAdmin {
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

impl LocalAdmin {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            signed_in_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

/// A message that survives exactly one redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, FlashKind::Error)
    }
}

/// Store a flash message. Failures are logged; a lost toast is not worth an error page.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return the pending flash message.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.ok().flatten()
}
