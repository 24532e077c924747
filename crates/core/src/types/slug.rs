//! URL slugs for portfolio items, posts and CMS pages.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
    #[error("slug cannot start or end with a hyphen")]
    EdgeHyphen,
}

/// A URL path segment: lowercase ASCII letters, digits and single hyphens.
///
/// ```
/// use forgepilot_core::Slug;
///
/// assert_eq!(Slug::parse("case-study-1").unwrap().as_str(), "case-study-1");
/// assert_eq!(Slug::slugify("Hello, World!").as_str(), "hello-world");
/// assert!(Slug::parse("Not A Slug").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 120;

    /// Parse an already-formed slug.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the input is not a valid slug.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(SlugError::EdgeHyphen);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a free-form title.
    ///
    /// Non-alphanumeric runs collapse into one hyphen. A title with no usable
    /// characters yields `"untitled"`.
    #[must_use]
    pub fn slugify(title: &str) -> Self {
        let mut out = String::with_capacity(title.len());
        let mut pending_hyphen = false;
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }
        out.truncate(Self::MAX_LENGTH);
        while out.ends_with('-') {
            out.pop();
        }
        if out.is_empty() {
            out.push_str("untitled");
        }
        Self(out)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
