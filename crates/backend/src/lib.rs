//! ForgePilot backend client.
//!
//! All persistence and identity live in a hosted backend-as-a-service. This
//! crate is the only code that talks to it.
//!
//! # Architecture
//!
//! - [`TableStore`], [`ObjectStore`] and [`AuthProvider`] are the seams; the
//!   site only ever holds them as trait objects inside a [`Backend`].
//! - [`HostedClient`] implements them over HTTPS; [`MemoryBackend`] in-process.
//! - [`Repository`] layers typed, validated records over a [`TableStore`].
//! - [`AuthEvents`] fans auth-state changes out to subscribers.
//!
//! # Example
//!
//! ```rust,ignore
//! use forgepilot_backend::{Backend, BackendConfig};
//! use forgepilot_core::Post;
//!
//! let backend = Backend::hosted(&BackendConfig::new(url, anon_key))?;
//! let posts = backend.repo::<Post>().list().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod hosted;
pub mod memory;
pub mod query;
pub mod repository;
pub mod store;

use std::sync::Arc;

pub use auth::{AuthEvent, AuthEventKind, AuthEvents, AuthSession, AuthUser, Subscription};
pub use config::BackendConfig;
pub use error::BackendError;
pub use hosted::HostedClient;
pub use memory::MemoryBackend;
pub use query::{Direction, Query};
pub use repository::Repository;
pub use store::{AuthProvider, ObjectStore, Row, TableStore};

use forgepilot_core::Record;

/// The three backend services, shared by every request.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct Backend {
    tables: Arc<dyn TableStore>,
    objects: Arc<dyn ObjectStore>,
    auth: Arc<dyn AuthProvider>,
    memory: Option<MemoryBackend>,
}

impl Backend {
    /// Connect to the hosted platform.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built from `config`.
    pub fn hosted(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Arc::new(HostedClient::new(config)?);
        Ok(Self {
            tables: client.clone(),
            objects: client.clone(),
            auth: client,
            memory: None,
        })
    }

    /// Run against an in-process backend.
    #[must_use]
    pub fn memory(backend: MemoryBackend) -> Self {
        let shared = Arc::new(backend.clone());
        Self {
            tables: shared.clone(),
            objects: shared.clone(),
            auth: shared,
            memory: Some(backend),
        }
    }

    #[must_use]
    pub fn tables(&self) -> &Arc<dyn TableStore> {
        &self.tables
    }

    #[must_use]
    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    /// The in-process backend, when running without a hosted platform.
    #[must_use]
    pub const fn as_memory(&self) -> Option<&MemoryBackend> {
        self.memory.as_ref()
    }

    /// Typed access to `T`'s table.
    #[must_use]
    pub fn repo<T: Record>(&self) -> Repository<T> {
        Repository::new(Arc::clone(&self.tables))
    }
}
