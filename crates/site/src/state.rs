//! Application state shared across handlers.

use std::sync::Arc;

use forgepilot_backend::{AuthEvents, Backend, BackendError};
use forgepilot_core::AdminCredential;

use crate::config::SiteConfig;
use crate::content::ContentCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, configuration and the landing content cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    backend: Backend,
    content: ContentCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SiteConfig, backend: Backend) -> Self {
        let content = ContentCache::new(config.content_cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                content,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the backend services.
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    /// Get a reference to the landing content cache.
    #[must_use]
    pub fn content(&self) -> &ContentCache {
        &self.inner.content
    }

    /// Auth-state change broadcaster of the active auth provider.
    #[must_use]
    pub fn auth_events(&self) -> &AuthEvents {
        self.inner.backend.auth().events()
    }

    /// The configured admin credential row.
    ///
    /// A missing row reads as an unconfigured credential rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the backend call fails.
    pub async fn admin_credential(&self) -> Result<AdminCredential, BackendError> {
        Ok(self
            .inner
            .backend
            .repo::<AdminCredential>()
            .single()
            .await?
            .unwrap_or_default())
    }
}
