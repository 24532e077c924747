//! The single admin credential row.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordError};
use crate::types::{Email, RowId};

/// Who may administer the site.
///
/// Stored as the only row of `admin_config`. Both columns may be null on a
/// fresh install; the login gate treats that as "not configured".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminCredential {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub admin_email: Option<String>,
    pub admin_password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AdminCredential {
    /// The configured email, if one is set and parses.
    #[must_use]
    pub fn email(&self) -> Option<Email> {
        self.admin_email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .and_then(|e| Email::parse(e).ok())
    }

    /// The stored hash, if set.
    #[must_use]
    pub fn password_hash(&self) -> Option<&str> {
        self.admin_password_hash
            .as_deref()
            .filter(|h| !h.trim().is_empty())
    }

    /// Both an email and a hash are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.email().is_some() && self.password_hash().is_some()
    }
}

// Redact the hash.
impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("id", &self.id)
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password_hash",
                &self.admin_password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Record for AdminCredential {
    const TABLE: &'static str = "admin_config";
    const ORDER_BY: Option<&'static str> = None;

    fn id(&self) -> Option<RowId> {
        self.id
    }

    // Null columns are legal (unconfigured install); set columns must be sane.
    fn validate(&self) -> Result<(), RecordError> {
        if let Some(email) = self.admin_email.as_deref().filter(|e| !e.trim().is_empty()) {
            super::check_email("admin_email", email)?;
        }
        Ok(())
    }
}
