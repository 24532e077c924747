//! Portfolio items, blog posts and free-standing pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordError};
use crate::types::{PublishStatus, RowId};

/// Average reading speed used for estimates.
const WORDS_PER_MINUTE: usize = 200;

/// Estimated reading time of a markdown body, at least one minute.
#[must_use]
pub fn reading_time_minutes(body: &str) -> usize {
    body.split_whitespace().count().div_ceil(WORDS_PER_MINUTE).max(1)
}

/// A headline number on a case study, e.g. `{"label": "Conversion", "value": "+38%"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultMetric {
    pub label: String,
    pub value: String,
}

/// A case study.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub title: String,
    pub slug: String,
    pub client: String,
    pub summary: String,
    /// Markdown.
    pub body: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    /// Edited as free-text JSON in the dashboard.
    pub results: Vec<ResultMetric>,
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub position: i32,
}

impl Record for PortfolioItem {
    const TABLE: &'static str = "portfolio_items";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("title", &self.title)?;
        super::check_slug("slug", &self.slug)?;
        super::optional_url("cover_image", &self.cover_image)?;
        if self.results.iter().any(|r| r.label.trim().is_empty()) {
            return Err(RecordError::Invalid {
                field: "results",
                reason: "every result needs a label".into(),
            });
        }
        super::non_negative("position", self.position)
    }
}

/// A blog post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// Markdown.
    pub body: String,
    pub cover_image: String,
    pub author: String,
    pub tags: Vec<String>,
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    #[must_use]
    pub fn reading_time(&self) -> usize {
        reading_time_minutes(&self.body)
    }
}

impl Record for Post {
    const TABLE: &'static str = "posts";
    const ORDER_BY: Option<&'static str> = Some("published_at");
    const DESCENDING: bool = true;

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("title", &self.title)?;
        super::check_slug("slug", &self.slug)?;
        super::optional_url("cover_image", &self.cover_image)
    }
}

/// A CMS page served at `/{slug}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub slug: String,
    pub title: String,
    /// Markdown.
    pub body: String,
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Slugs that would shadow a fixed route.
    pub const RESERVED: &'static [&'static str] = &[
        "admin-login",
        "auth",
        "logout",
        "dashboard",
        "portfolio",
        "blog",
        "contact",
        "api",
        "health",
        "static",
    ];
}

impl Record for Page {
    const TABLE: &'static str = "pages";
    const ORDER_BY: Option<&'static str> = Some("title");

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("title", &self.title)?;
        super::check_slug("slug", &self.slug)?;
        if Self::RESERVED.contains(&self.slug.as_str()) {
            return Err(RecordError::Invalid {
                field: "slug",
                reason: format!("{:?} is reserved", self.slug),
            });
        }
        Ok(())
    }
}
