//! In-process backend with the same contract as the hosted one.
//!
//! Used by tests and by local development (`FORGEPILOT_BACKEND=memory`).
//! Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use forgepilot_core::{AuthUserId, RowId};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::auth::{AuthEvent, AuthEventKind, AuthEvents, AuthSession, AuthUser};
use crate::error::BackendError;
use crate::query::Query;
use crate::store::{AuthProvider, ObjectStore, Row, TableStore};

const INVALID_LOGIN: &str = "Invalid login credentials";

/// Stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    objects: HashMap<(String, String), StoredObject>,
    // lowercased email -> (user, password)
    users: HashMap<String, (AuthUser, String)>,
    access_tokens: HashMap<String, AuthUser>,
    refresh_tokens: HashMap<String, AuthUser>,
}

/// In-memory tables, objects and password users.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<RwLock<State>>,
    events: AuthEvents,
    session_ttl: Duration,
    public_base: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            events: AuthEvents::new(),
            session_ttl: Duration::hours(1),
            public_base: "/media".to_string(),
        }
    }

    /// Lifetime of issued sessions.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Prefix for [`ObjectStore::public_url`].
    #[must_use]
    pub fn with_public_base(mut self, base: impl Into<String>) -> Self {
        self.public_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Register a password user and return it.
    pub async fn add_user(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: AuthUserId::random(),
            email: Some(email.to_string()),
        };
        self.state
            .write()
            .await
            .users
            .insert(email.to_lowercase(), (user.clone(), password.to_string()));
        user
    }

    /// Fetch a stored object.
    pub async fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.state
            .read()
            .await
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Snapshot of a table, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.state
            .read()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Forget an access token, as if it expired server-side.
    pub async fn revoke_access_token(&self, access_token: &str) {
        self.state.write().await.access_tokens.remove(access_token);
    }

    async fn issue_session(&self, user: AuthUser) -> AuthSession {
        let session = AuthSession {
            access_token: format!("mem-access-{}", uuid::Uuid::new_v4()),
            refresh_token: format!("mem-refresh-{}", uuid::Uuid::new_v4()),
            expires_at: Utc::now() + self.session_ttl,
            user: user.clone(),
        };
        let mut state = self.state.write().await;
        state
            .access_tokens
            .insert(session.access_token.clone(), user.clone());
        state
            .refresh_tokens
            .insert(session.refresh_token.clone(), user);
        session
    }
}

fn row_id(row: &Row) -> Option<String> {
    row.get("id").and_then(Value::as_str).map(str::to_string)
}

fn stamp_new_row(mut row: Row) -> Row {
    if row.get("id").is_none_or(Value::is_null) {
        row.insert("id".into(), Value::String(RowId::random().to_string()));
    }
    if row.get("created_at").is_none_or(Value::is_null) {
        row.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
    }
    row
}

#[async_trait]
impl TableStore for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, BackendError> {
        let state = self.state.read().await;
        let mut rows: Vec<Row> = state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        query.sort(&mut rows);
        if let Some(n) = query.limit_value() {
            rows.truncate(n);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, BackendError> {
        let row = stamp_new_row(row);
        let mut state = self.state.write().await;
        let rows = state.tables.entry(table.to_string()).or_default();
        if let Some(id) = row_id(&row)
            && rows.iter().any(|r| row_id(r).as_deref() == Some(id.as_str()))
        {
            return Err(BackendError::Api {
                status: 409,
                message: format!("duplicate key value violates unique constraint \"{table}_pkey\""),
            });
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: RowId, row: Row) -> Result<Row, BackendError> {
        let id = id.to_string();
        let mut state = self.state.write().await;
        let existing = state
            .tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| row_id(r).as_deref() == Some(id.as_str()))
            })
            .ok_or_else(|| BackendError::NotFound(format!("{table} row {id}")))?;
        for (key, value) in row {
            if key != "id" {
                existing.insert(key, value);
            }
        }
        Ok(existing.clone())
    }

    async fn delete(&self, table: &str, id: RowId) -> Result<(), BackendError> {
        let id = id.to_string();
        if let Some(rows) = self.state.write().await.tables.get_mut(table) {
            rows.retain(|r| row_id(r).as_deref() != Some(id.as_str()));
        }
        Ok(())
    }

    async fn upsert(&self, table: &str, row: Row) -> Result<Row, BackendError> {
        if let Some(id) = row_id(&row).and_then(|id| id.parse::<RowId>().ok()) {
            let exists = self
                .state
                .read()
                .await
                .tables
                .get(table)
                .is_some_and(|rows| rows.iter().any(|r| row_id(r) == Some(id.to_string())));
            if exists {
                return self.update(table, id, row).await;
            }
        }
        self.insert(table, row).await
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        self.state.write().await.objects.insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.public_base)
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let user = {
            let state = self.state.read().await;
            match state.users.get(&email.trim().to_lowercase()) {
                Some((user, stored)) if stored == password => user.clone(),
                _ => return Err(BackendError::Auth(INVALID_LOGIN.to_string())),
            }
        };
        let session = self.issue_session(user).await;
        self.events
            .emit(AuthEvent::new(AuthEventKind::SignedIn, Some(&session.user)));
        Ok(session)
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError> {
        {
            let mut state = self.state.write().await;
            state.access_tokens.remove(&session.access_token);
            state.refresh_tokens.remove(&session.refresh_token);
        }
        self.events
            .emit(AuthEvent::new(AuthEventKind::SignedOut, Some(&session.user)));
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        self.state
            .read()
            .await
            .access_tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| BackendError::Auth("invalid JWT: unable to parse or verify signature".into()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let user = self
            .state
            .write()
            .await
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| BackendError::Auth("Invalid Refresh Token: Refresh Token Not Found".into()))?;
        let session = self.issue_session(user).await;
        self.events.emit(AuthEvent::new(
            AuthEventKind::TokenRefreshed,
            Some(&session.user),
        ));
        Ok(session)
    }

    fn events(&self) -> &AuthEvents {
        &self.events
    }
}
