//! Status and key enums shared by content records.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Publication status of portfolio items, posts and pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

impl PublishStatus {
    /// Value stored in the backend and used in form selects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    /// Parse a form value. Unknown values are treated as drafts.
    #[must_use]
    pub fn from_form(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("published") {
            Self::Published
        } else {
            Self::Draft
        }
    }

    #[must_use]
    pub const fn is_published(self) -> bool {
        matches!(self, Self::Published)
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable sections of the landing page.
///
/// Each key owns at most one row in the `sections` table; the row carries the
/// heading copy while the items (benefits, plans, ...) live in their own tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    #[default]
    Hero,
    Benefits,
    Services,
    Pricing,
    Testimonials,
    Team,
    Faq,
    Cta,
}

impl SectionKey {
    /// Landing page order.
    pub const ALL: [Self; 8] = [
        Self::Hero,
        Self::Benefits,
        Self::Services,
        Self::Pricing,
        Self::Testimonials,
        Self::Team,
        Self::Faq,
        Self::Cta,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Benefits => "benefits",
            Self::Services => "services",
            Self::Pricing => "pricing",
            Self::Testimonials => "testimonials",
            Self::Team => "team",
            Self::Faq => "faq",
            Self::Cta => "cta",
        }
    }

    /// Human label for dashboard tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::Benefits => "Benefits",
            Self::Services => "Services",
            Self::Pricing => "Pricing",
            Self::Testimonials => "Testimonials",
            Self::Team => "Team",
            Self::Faq => "FAQ",
            Self::Cta => "Call to action",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value.trim())
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_form() {
        assert_eq!(PublishStatus::from_form("Published"), PublishStatus::Published);
        assert_eq!(PublishStatus::from_form("draft"), PublishStatus::Draft);
        assert_eq!(PublishStatus::from_form("whatever"), PublishStatus::Draft);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&PublishStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }

    #[test]
    fn test_section_key_parse() {
        for key in SectionKey::ALL {
            assert_eq!(SectionKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SectionKey::parse("footer"), None);
    }
}
