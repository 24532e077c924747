//! Insert-only rows captured from the public site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordError};
use crate::types::RowId;

/// A contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lead {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub const MAX_MESSAGE: usize = 5000;
}

impl Record for Lead {
    const TABLE: &'static str = "leads";
    const ORDER_BY: Option<&'static str> = Some("created_at");
    const DESCENDING: bool = true;

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("name", &self.name)?;
        super::check_email("email", &self.email)?;
        super::require("message", &self.message)?;
        if self.message.chars().count() > Self::MAX_MESSAGE {
            return Err(RecordError::Invalid {
                field: "message",
                reason: format!("must be at most {} characters", Self::MAX_MESSAGE),
            });
        }
        Ok(())
    }
}

/// A page-view or click event reported by the landing page script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub event: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for AnalyticsEvent {
    const TABLE: &'static str = "analytics_events";
    const ORDER_BY: Option<&'static str> = Some("created_at");
    const DESCENDING: bool = true;

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("event", &self.event)?;
        if self.event.len() > 64 {
            return Err(RecordError::Invalid {
                field: "event",
                reason: "must be at most 64 characters".into(),
            });
        }
        if !self.path.starts_with('/') {
            return Err(RecordError::Invalid {
                field: "path",
                reason: "must be site-relative".into(),
            });
        }
        Ok(())
    }
}
