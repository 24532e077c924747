//! Landing page sections and the item tables they list.

use serde::{Deserialize, Serialize};

use super::{Record, RecordError};
use crate::types::{Price, RowId, SectionKey};

const fn default_true() -> bool {
    true
}

/// Heading copy for one landing page section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub key: SectionKey,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub cta_label: String,
    pub cta_url: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub position: i32,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            id: None,
            key: SectionKey::default(),
            title: String::new(),
            subtitle: String::new(),
            body: String::new(),
            cta_label: String::new(),
            cta_url: String::new(),
            visible: true,
            position: 0,
        }
    }
}

impl Record for Section {
    const TABLE: &'static str = "sections";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("title", &self.title)?;
        super::optional_url("cta_url", &self.cta_url)?;
        if !self.cta_url.trim().is_empty() {
            super::require("cta_label", &self.cta_label)?;
        }
        super::non_negative("position", self.position)
    }
}

/// One card of the benefits grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Benefit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub position: i32,
}

impl Record for Benefit {
    const TABLE: &'static str = "benefits";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("title", &self.title)?;
        super::require("description", &self.description)?;
        super::non_negative("position", self.position)
    }
}

/// A service the agency offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub features: Vec<String>,
    pub position: i32,
}

impl Record for Service {
    const TABLE: &'static str = "services";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("title", &self.title)?;
        super::non_negative("position", self.position)
    }
}

/// A pricing tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub price: Price,
    /// Billing period label, e.g. "month" or "project".
    pub period: String,
    pub description: String,
    pub features: Vec<String>,
    pub highlighted: bool,
    pub cta_label: String,
    pub cta_url: String,
    pub position: i32,
}

impl Record for PricingPlan {
    const TABLE: &'static str = "pricing_plans";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("name", &self.name)?;
        if self.price.is_negative() {
            return Err(RecordError::Invalid {
                field: "price",
                reason: "cannot be negative".into(),
            });
        }
        super::optional_url("cta_url", &self.cta_url)?;
        super::non_negative("position", self.position)
    }
}

/// A client quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub author: String,
    pub role: String,
    pub company: String,
    pub quote: String,
    pub avatar_url: String,
    pub rating: u8,
    pub position: i32,
}

impl Testimonial {
    pub const MAX_RATING: u8 = 5;
}

impl Default for Testimonial {
    fn default() -> Self {
        Self {
            id: None,
            author: String::new(),
            role: String::new(),
            company: String::new(),
            quote: String::new(),
            avatar_url: String::new(),
            rating: Self::MAX_RATING,
            position: 0,
        }
    }
}

impl Record for Testimonial {
    const TABLE: &'static str = "testimonials";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("author", &self.author)?;
        super::require("quote", &self.quote)?;
        super::optional_url("avatar_url", &self.avatar_url)?;
        if !(1..=Self::MAX_RATING).contains(&self.rating) {
            return Err(RecordError::OutOfRange {
                field: "rating",
                min: 1,
                max: i64::from(Self::MAX_RATING),
            });
        }
        super::non_negative("position", self.position)
    }
}

/// A member of the agency team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub photo_url: String,
    pub position: i32,
}

impl Record for TeamMember {
    const TABLE: &'static str = "team_members";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("name", &self.name)?;
        super::optional_url("photo_url", &self.photo_url)?;
        super::non_negative("position", self.position)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub question: String,
    pub answer: String,
    pub position: i32,
}

impl Record for Faq {
    const TABLE: &'static str = "faqs";

    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn validate(&self) -> Result<(), RecordError> {
        super::require("question", &self.question)?;
        super::require("answer", &self.answer)?;
        super::non_negative("position", self.position)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_section_visible_defaults_true() {
        let row: Section = serde_json::from_str(r#"{"key": "faq", "title": "Questions"}"#).unwrap();
        assert!(row.visible);
        assert_eq!(row.key, SectionKey::Faq);
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_missing_arrays_default_empty() {
        let row: Service = serde_json::from_str(r#"{"title": "Design"}"#).unwrap();
        assert!(row.features.is_empty());
        let row: PricingPlan = serde_json::from_str(r#"{"name": "Starter"}"#).unwrap();
        assert!(row.features.is_empty());
        assert!(!row.highlighted);
    }

    #[test]
    fn test_rating_range() {
        let mut t = Testimonial {
            author: "Sam".into(),
            quote: "Great work".into(),
            ..Default::default()
        };
        assert!(t.validate().is_ok());
        t.rating = 0;
        assert!(matches!(
            t.validate(),
            Err(RecordError::OutOfRange { field: "rating", .. })
        ));
        t.rating = 6;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_cta_url_needs_label() {
        let section = Section {
            title: "Ready?".into(),
            cta_url: "/#contact".into(),
            ..Default::default()
        };
        assert_eq!(section.validate(), Err(RecordError::Required("cta_label")));
    }

    #[test]
    fn test_negative_price_rejected() {
        let plan: PricingPlan = serde_json::from_str(
            r#"{"name": "Odd", "price": {"amount": "-5", "currency_code": "USD"}}"#,
        )
        .unwrap();
        assert!(plan.validate().is_err());
    }
}
