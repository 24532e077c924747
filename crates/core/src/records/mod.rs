//! Typed rows of the hosted backend's tables.
//!
//! Every table the site reads or writes has a record type here. Records are
//! plain serde structs; the backend crate decodes JSON rows into them and
//! calls [`Record::validate`] before handing them out, so handlers never see
//! a row that violates the constraints below.

mod admin;
mod capture;
mod cms;
mod sections;
mod settings;

pub use admin::AdminCredential;
pub use capture::{AnalyticsEvent, Lead};
pub use cms::{Page, PortfolioItem, Post, ResultMetric, reading_time_minutes};
pub use sections::{Benefit, Faq, PricingPlan, Section, Service, TeamMember, Testimonial};
pub use settings::{SiteSettings, SiteToken, SocialLink};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{Email, RowId, Slug};

/// Reasons a row fails validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

/// A row of a backend table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name in the hosted backend.
    const TABLE: &'static str;
    /// Column used to order list reads.
    const ORDER_BY: Option<&'static str> = Some("position");
    /// Whether list reads are ordered descending.
    const DESCENDING: bool = false;

    /// Primary key, absent for rows not yet inserted.
    fn id(&self) -> Option<RowId>;

    /// Check the row's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    fn validate(&self) -> Result<(), RecordError>;
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), RecordError> {
    if value.trim().is_empty() {
        Err(RecordError::Required(field))
    } else {
        Ok(())
    }
}

/// Empty means "no link"; anything else must be absolute http(s) or site-relative.
pub(crate) fn optional_url(field: &'static str, value: &str) -> Result<(), RecordError> {
    let value = value.trim();
    if value.is_empty()
        || value.starts_with("https://")
        || value.starts_with("http://")
        || value.starts_with('/')
        || value.starts_with('#')
        || value.starts_with("mailto:")
    {
        Ok(())
    } else {
        Err(RecordError::Invalid {
            field,
            reason: format!("{value:?} is not a URL"),
        })
    }
}

pub(crate) fn check_slug(field: &'static str, value: &str) -> Result<(), RecordError> {
    Slug::parse(value)
        .map(|_| ())
        .map_err(|e| RecordError::Invalid {
            field,
            reason: e.to_string(),
        })
}

pub(crate) fn check_email(field: &'static str, value: &str) -> Result<(), RecordError> {
    Email::parse(value)
        .map(|_| ())
        .map_err(|e| RecordError::Invalid {
            field,
            reason: e.to_string(),
        })
}

pub(crate) fn non_negative(field: &'static str, value: i32) -> Result<(), RecordError> {
    if value < 0 {
        Err(RecordError::OutOfRange {
            field,
            min: 0,
            max: i64::from(i32::MAX),
        })
    } else {
        Ok(())
    }
}
