//! HTTPS client for the hosted platform.
//!
//! Speaks the Supabase-compatible API surface:
//!
//! - `/rest/v1/{table}` - PostgREST tables
//! - `/auth/v1/...` - GoTrue password sign-in, user lookup, refresh, logout
//! - `/storage/v1/object/...` - bucket uploads and public URLs
//!
//! Every request carries the anon key in the `apikey` header. Table and
//! storage calls authenticate with the service key when one is configured.
//! Nothing is retried; the per-request timeout comes from [`BackendConfig`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use forgepilot_core::RowId;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::auth::{AuthEvent, AuthEventKind, AuthEvents, AuthSession, AuthUser};
use crate::config::BackendConfig;
use crate::error::{BackendError, parse_error};
use crate::query::Query;
use crate::store::{AuthProvider, ObjectStore, Row, TableStore};

/// Session lifetime assumed when the token response omits one.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Client for the hosted data, auth and storage APIs.
#[derive(Clone)]
pub struct HostedClient {
    inner: Arc<HostedClientInner>,
}

struct HostedClientInner {
    client: reqwest::Client,
    base_url: String,
    data_key: SecretString,
    events: AuthEvents,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                Utc::now() + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
            });
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

impl HostedClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| BackendError::Config(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        url::Url::parse(&config.url)
            .map_err(|e| BackendError::Config(format!("Invalid backend URL: {e}")))?;

        Ok(Self {
            inner: Arc::new(HostedClientInner {
                client,
                base_url: config.url.trim_end_matches('/').to_string(),
                data_key: config
                    .service_key
                    .clone()
                    .unwrap_or_else(|| config.anon_key.clone()),
                events: AuthEvents::new(),
            }),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.inner.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.inner.base_url)
    }

    fn data_bearer(&self) -> String {
        format!("Bearer {}", self.inner.data_key.expose_secret())
    }

    /// Decode a success body or turn the error body into a [`BackendError`].
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(parse_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Decode {
            table: "response".to_string(),
            reason: e.to_string(),
        })
    }

    /// Like [`Self::handle_response`], but every failure is an auth failure
    /// carrying the service's message.
    async fn handle_auth_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        match Self::handle_response(response).await {
            Err(BackendError::Api { message, .. }) => Err(BackendError::Auth(message)),
            other => other,
        }
    }

    async fn token(&self, grant_type: &str, body: serde_json::Value) -> Result<AuthSession, BackendError> {
        let response = self
            .inner
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = Self::handle_auth_response(response).await?;
        Ok(token.into_session())
    }

    fn first_row(rows: Vec<Row>, what: impl FnOnce() -> String) -> Result<Row, BackendError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(what()))
    }
}

#[async_trait]
impl TableStore for HostedClient {
    #[instrument(skip(self, query), fields(table = %table))]
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.rest_url(table))
            .header(AUTHORIZATION, self.data_bearer())
            .query(&query.to_params())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: &str, row: Row) -> Result<Row, BackendError> {
        let response = self
            .inner
            .client
            .post(self.rest_url(table))
            .header(AUTHORIZATION, self.data_bearer())
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Row> = Self::handle_response(response).await?;
        Self::first_row(rows, || format!("inserted {table} row"))
    }

    #[instrument(skip(self, row), fields(table = %table, id = %id))]
    async fn update(&self, table: &str, id: RowId, row: Row) -> Result<Row, BackendError> {
        let response = self
            .inner
            .client
            .patch(self.rest_url(table))
            .header(AUTHORIZATION, self.data_bearer())
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Row> = Self::handle_response(response).await?;
        Self::first_row(rows, || format!("{table} row {id}"))
    }

    #[instrument(skip(self), fields(table = %table, id = %id))]
    async fn delete(&self, table: &str, id: RowId) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .delete(self.rest_url(table))
            .header(AUTHORIZATION, self.data_bearer())
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &body));
        }
        Ok(())
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn upsert(&self, table: &str, row: Row) -> Result<Row, BackendError> {
        let response = self
            .inner
            .client
            .post(self.rest_url(table))
            .header(AUTHORIZATION, self.data_bearer())
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Row> = Self::handle_response(response).await?;
        Self::first_row(rows, || format!("upserted {table} row"))
    }
}

#[async_trait]
impl ObjectStore for HostedClient {
    #[instrument(skip(self, bytes), fields(bucket = %bucket, path = %path, size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(url)
            .header(AUTHORIZATION, self.data_bearer())
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &body));
        }
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.inner.base_url
        )
    }
}

#[async_trait]
impl AuthProvider for HostedClient {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let session = self
            .token(
                "password",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        self.inner
            .events
            .emit(AuthEvent::new(AuthEventKind::SignedIn, Some(&session.user)));
        Ok(session)
    }

    #[instrument(skip(self, session), fields(user_id = %session.user.id))]
    async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.auth_url("logout"))
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .send()
            .await?;
        let status = response.status();
        // An already-invalid token means the session is gone either way
        if !status.is_success() && status != reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &body));
        }
        self.inner
            .events
            .emit(AuthEvent::new(AuthEventKind::SignedOut, Some(&session.user)));
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let response = self
            .inner
            .client
            .get(self.auth_url("user"))
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        Self::handle_auth_response(response).await
    }

    #[instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let session = self
            .token(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;
        self.inner.events.emit(AuthEvent::new(
            AuthEventKind::TokenRefreshed,
            Some(&session.user),
        ));
        Ok(session)
    }

    fn events(&self) -> &AuthEvents {
        &self.inner.events
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const USER_ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn client(server: &MockServer) -> HostedClient {
        let config = BackendConfig::new(server.uri(), SecretString::from("anon-key"))
            .with_service_key(SecretString::from("service-key"));
        HostedClient::new(&config).unwrap()
    }

    fn token_body() -> serde_json::Value {
        json!({
            "access_token": "access-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 4_102_444_800_i64,
            "refresh_token": "refresh-1",
            "user": { "id": USER_ID, "email": "admin@agency.ai", "aud": "authenticated" }
        })
    }

    #[tokio::test]
    async fn test_select_renders_query_and_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("slug", "eq.hello"))
            .and(query_param("order", "published_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"title": "Hello"}])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client(&server)
            .select(
                "posts",
                &Query::new().eq("slug", "hello").order_by_desc("published_at"),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Hello");
    }

    #[tokio::test]
    async fn test_insert_returns_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/leads"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"name": "Dana"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!([{"id": USER_ID, "name": "Dana"}])),
            )
            .mount(&server)
            .await;

        let mut row = Row::new();
        row.insert("name".into(), json!("Dana"));
        let stored = client(&server).insert("leads", row).await.unwrap();
        assert_eq!(stored["id"], USER_ID);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/faqs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client(&server)
            .update("faqs", RowId::random(), Row::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_api_error_message_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/pages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "42501",
                "message": "permission denied for table pages"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .select("pages", &Query::new())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "permission denied for table pages");
    }

    #[tokio::test]
    async fn test_sign_in_emits_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({"email": "admin@agency.ai", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut sub = client.events().subscribe();
        let session = client
            .sign_in_with_password("admin@agency.ai", "pw")
            .await
            .unwrap();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.email(), Some("admin@agency.ai"));
        assert!(!session.is_expired());

        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, AuthEventKind::SignedIn);
    }

    #[tokio::test]
    async fn test_sign_in_failure_message_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .sign_in_with_password("admin@agency.ai", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Auth(_)));
        assert_eq!(err.message(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_get_user_uses_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": USER_ID, "email": "admin@agency.ai"})),
            )
            .mount(&server)
            .await;

        let user = client(&server).get_user("access-1").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("admin@agency.ai"));
    }

    #[tokio::test]
    async fn test_upload_and_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/media/uploads/a.png"))
            .and(header("content-type", "image/png"))
            .and(header("x-upsert", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "media/uploads/a.png"})))
            .mount(&server)
            .await;

        let client = client(&server);
        let key = client
            .upload("media", "uploads/a.png", vec![0x89, 0x50], "image/png")
            .await
            .unwrap();
        assert_eq!(key, "uploads/a.png");
        assert_eq!(
            client.public_url("media", &key),
            format!("{}/storage/v1/object/public/media/uploads/a.png", server.uri())
        );
    }
}
