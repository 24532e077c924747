//! Site-wide settings, social links and integration tokens.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordError};
use crate::types::RowId;

/// The single `site_settings` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub site_name: String,
    pub tagline: String,
    pub contact_email: String,
    pub logo_url: String,
    pub footer_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for SiteSettings {
    const TABLE: &'static str = "site_settings";
    const ORDER_BY: Option<&'static str> = None;

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("site_name", &self.site_name)?;
        if !self.contact_email.trim().is_empty() {
            super::check_email("contact_email", &self.contact_email)?;
        }
        super::optional_url("logo_url", &self.logo_url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub platform: String,
    pub url: String,
    pub position: i32,
}

impl Record for SocialLink {
    const TABLE: &'static str = "social_links";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("platform", &self.platform)?;
        super::require("url", &self.url)?;
        super::optional_url("url", &self.url)?;
        super::non_negative("position", self.position)
    }
}

/// A named integration value, such as an analytics measurement ID.
///
/// Values are rendered into the public page head, so they are not secrets,
/// but they are still kept out of logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteToken {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub value: String,
    pub description: String,
}

impl fmt::Debug for SiteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteToken")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Record for SiteToken {
    const TABLE: &'static str = "site_tokens";
    const ORDER_BY: Option<&'static str> = Some("name");

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("name", &self.name)?;
        if !self
            .name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(RecordError::Invalid {
                field: "name",
                reason: "use letters, digits, '_' or '-'".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_contact_email_optional() {
        let settings = SiteSettings {
            site_name: "ForgePilot".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        let bad = SiteSettings {
            contact_email: "hello".into(),
            ..settings
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_token_name_charset() {
        let token = SiteToken {
            name: "GA measurement".into(),
            value: "G-123".into(),
            ..Default::default()
        };
        assert!(token.validate().is_err());
        assert!(!format!("{token:?}").contains("G-123"));
    }
}
