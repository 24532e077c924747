//! The seams between the site and whatever hosts its data.

use async_trait::async_trait;
use forgepilot_core::RowId;
use serde_json::{Map, Value};

use crate::auth::{AuthEvents, AuthSession, AuthUser};
use crate::error::BackendError;
use crate::query::Query;

/// An untyped table row.
pub type Row = Map<String, Value>;

/// Table reads and writes.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, BackendError>;

    /// Insert a row and return it as stored (with its generated id).
    async fn insert(&self, table: &str, row: Row) -> Result<Row, BackendError>;

    async fn update(&self, table: &str, id: RowId, row: Row) -> Result<Row, BackendError>;

    async fn delete(&self, table: &str, id: RowId) -> Result<(), BackendError>;

    /// Insert, or merge into the row with the same id.
    async fn upsert(&self, table: &str, row: Row) -> Result<Row, BackendError>;
}

/// File storage with public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` inside `bucket`, replacing any existing object.
    /// Returns the object path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Password sign-in against the hosted identity service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError>;

    async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError>;

    /// Resolve the user behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    /// Auth-state changes made through this provider.
    fn events(&self) -> &AuthEvents;
}
