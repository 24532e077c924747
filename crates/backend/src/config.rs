//! Connection settings for the hosted platform.

use std::time::Duration;

use secrecy::SecretString;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hosted platform configuration.
///
/// Implements `Debug` manually to redact keys.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,
    /// Public (anon) API key, sent on every request
    pub anon_key: SecretString,
    /// Service key for table writes; falls back to the anon key
    pub service_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: SecretString) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key,
            service_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_service_key(mut self, key: SecretString) -> Self {
        self.service_key = Some(key);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("service_key", &self.service_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = BackendConfig::new("https://x.supabase.co/", SecretString::from("k"));
        assert_eq!(config.url, "https://x.supabase.co");
    }

    #[test]
    fn test_debug_redacts() {
        let config = BackendConfig::new("https://x.supabase.co", SecretString::from("anon-123"))
            .with_service_key(SecretString::from("service-456"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("anon-123"));
        assert!(!debug.contains("service-456"));
    }
}
