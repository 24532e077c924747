//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty (after trimming).
    #[error("email cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty or has no dot.
    #[error("email domain is invalid")]
    InvalidDomain,
    /// The input contains whitespace.
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// An email address.
///
/// Parsing trims surrounding whitespace, so form input such as
/// `" admin@agency.ai "` is accepted. The original casing is preserved;
/// comparisons that should ignore case go through [`Email::matches`].
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol, non-empty local part
/// - Domain containing at least one dot, not at either end
/// - No inner whitespace
///
/// ## Examples
///
/// ```
/// use forgepilot_core::Email;
///
/// let email = Email::parse(" Admin@Agency.AI ").unwrap();
/// assert_eq!(email.as_str(), "Admin@Agency.AI");
/// assert!(email.matches("admin@agency.ai"));
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("user@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first constraint violated.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::AtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::AtSymbol);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, d)| d)
    }

    /// Compare against another address ignoring case.
    ///
    /// The admin gate and the dashboard guard both treat `Admin@Agency.AI`
    /// and `admin@agency.ai` as the same identity.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }

    /// Returns the address lowercased.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("admin@agency.ai").is_ok());
        assert!(Email::parse("hello+forms@forgepilot.io").is_ok());
        assert!(Email::parse("team@mail.forgepilot.co.uk").is_ok());
    }

    #[test]
    fn test_parse_trims_input() {
        let email = Email::parse("  admin@agency.ai\n").unwrap();
        assert_eq!(email.as_str(), "admin@agency.ai");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("agency.ai"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("a@b@agency.ai"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("@agency.ai"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("admin@agency"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("admin@.ai"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("ad min@agency.ai"), Err(EmailError::Whitespace));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@agency.ai", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_matches_ignores_case() {
        let email = Email::parse("admin@agency.ai").unwrap();
        assert!(email.matches("Admin@Agency.AI"));
        assert!(email.matches("ADMIN@AGENCY.AI "));
        assert!(!email.matches("admin@agency.io"));
        assert!(!email.matches(""));
    }

    #[test]
    fn test_normalized_keeps_original() {
        let email = Email::parse("Admin@Agency.AI").unwrap();
        assert_eq!(email.normalized(), "admin@agency.ai");
        assert_eq!(email.to_string(), "Admin@Agency.AI");
        assert_eq!(email.domain(), "Agency.AI");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Email = serde_json::from_str("\"admin@agency.ai\"").unwrap();
        assert_eq!(ok.as_str(), "admin@agency.ai");
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
