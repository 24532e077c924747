//! Password verification policies.

use std::fmt;

/// Password accepted by installs that never changed the default.
pub const LEGACY_DEFAULT_PASSWORD: &str = "admin123";

/// bcrypt digest older installs shipped as the stored hash for
/// [`LEGACY_DEFAULT_PASSWORD`].
pub const LEGACY_ADMIN_DIGEST: &str =
    "$2b$10$rOvHPGkwMkZ1nYp0eZq6XuB8xk3cZ0oZ9bq5Kp0N3wYy1r2T8mF6G";

/// How a submitted password is checked against the stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordPolicy {
    /// bcrypt only. A stored value that isn't a bcrypt hash never matches.
    #[default]
    Strict,
    /// Accepts the historical defaults and falls back to plain comparison
    /// when the stored value isn't a bcrypt hash. Opt-in via
    /// `ADMIN_PASSWORD_POLICY=legacy`.
    Legacy,
}

impl PasswordPolicy {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Legacy => "legacy",
        }
    }

    /// Check `password` against `stored`.
    ///
    /// Runs bcrypt, so call it off the async runtime.
    #[must_use]
    pub fn verify(self, password: &str, stored: &str) -> bool {
        match self {
            Self::Strict => bcrypt::verify(password, stored).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored admin hash is not a valid bcrypt hash");
                false
            }),
            Self::Legacy => {
                if stored == LEGACY_DEFAULT_PASSWORD || stored == LEGACY_ADMIN_DIGEST {
                    return password == LEGACY_DEFAULT_PASSWORD;
                }
                match bcrypt::verify(password, stored) {
                    Ok(valid) => valid,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Stored admin hash is not bcrypt, comparing as plain text"
                        );
                        password == stored
                    }
                }
            }
        }
    }
}

impl fmt::Display for PasswordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shortest new admin password accepted from the dashboard or the CLI.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a new admin password.
///
/// # Errors
///
/// Returns the bcrypt error for an out-of-range cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_literal_default() {
        let policy = PasswordPolicy::Legacy;
        assert!(policy.verify("admin123", "admin123"));
        assert!(!policy.verify("admin1234", "admin123"));
        assert!(!policy.verify("", "admin123"));
    }

    #[test]
    fn test_legacy_digest_only_accepts_default() {
        let policy = PasswordPolicy::Legacy;
        assert!(policy.verify("admin123", LEGACY_ADMIN_DIGEST));
        assert!(!policy.verify(LEGACY_ADMIN_DIGEST, LEGACY_ADMIN_DIGEST));
        assert!(!policy.verify("hunter22", LEGACY_ADMIN_DIGEST));
    }

    #[test]
    fn test_legacy_plaintext_fallback() {
        let policy = PasswordPolicy::Legacy;
        assert!(policy.verify("plain-stored", "plain-stored"));
        assert!(!policy.verify("other", "plain-stored"));
    }

    #[test]
    fn test_bcrypt_hash_under_both_policies() {
        let hash = hash_password("correct horse", 4).unwrap();
        for policy in [PasswordPolicy::Strict, PasswordPolicy::Legacy] {
            assert!(policy.verify("correct horse", &hash), "{policy}");
            assert!(!policy.verify("correct horse ", &hash), "{policy}");
            assert!(!policy.verify("admin123", &hash), "{policy}");
        }
    }

    #[test]
    fn test_strict_rejects_legacy_values() {
        let policy = PasswordPolicy::Strict;
        assert!(!policy.verify("admin123", "admin123"));
        assert!(!policy.verify("admin123", LEGACY_ADMIN_DIGEST));
        assert!(!policy.verify("plain-stored", "plain-stored"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(PasswordPolicy::parse("LEGACY"), Some(PasswordPolicy::Legacy));
        assert_eq!(PasswordPolicy::parse("strict"), Some(PasswordPolicy::Strict));
        assert_eq!(PasswordPolicy::parse("lenient"), None);
        assert_eq!(PasswordPolicy::default(), PasswordPolicy::Strict);
    }
}
