//! Integration tests for ForgePilot.
//!
//! The whole site router runs in-process on top of a
//! [`MemoryBackend`], driven with `tower::ServiceExt::oneshot`. No network or
//! hosted project is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p forgepilot-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let app = TestApp::new().await;
//! app.configure_admin("admin@agency.ai", "s3cure-pass").await;
//! let response = app.login("Admin@Agency.AI", "s3cure-pass").await;
//! assert_eq!(response.location(), Some("/dashboard"));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::http::{HeaderMap, Request, Response, StatusCode, header};
use forgepilot_backend::{Backend, MemoryBackend};
use forgepilot_core::AdminCredential;
use forgepilot_site::build_router;
use forgepilot_site::config::{SessionMode, SiteConfig};
use forgepilot_site::middleware::session::SESSION_COOKIE_NAME;
use forgepilot_site::services::auth::hash_password;
use forgepilot_site::state::AppState;
use futures::StreamExt;
use tower::ServiceExt;

/// Fastest bcrypt cost; tests don't need slow hashes.
pub const TEST_BCRYPT_COST: u32 = 4;

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The site router over a fresh memory backend, plus a one-visitor cookie jar.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub memory: MemoryBackend,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    /// Local session mode, strict password policy.
    pub async fn new() -> Self {
        Self::with_config(|config| config.session_mode = SessionMode::Local).await
    }

    /// Start from the memory defaults and adjust before building.
    pub async fn with_config(adjust: impl FnOnce(&mut SiteConfig)) -> Self {
        Self::with_backend(MemoryBackend::new(), adjust).await
    }

    /// Like [`TestApp::with_config`], over a prepared memory backend.
    pub async fn with_backend(memory: MemoryBackend, adjust: impl FnOnce(&mut SiteConfig)) -> Self {
        let mut config = SiteConfig::memory("http://localhost:3000");
        config.bcrypt_cost = TEST_BCRYPT_COST;
        adjust(&mut config);

        let state = AppState::new(config, Backend::memory(memory.clone()));
        Self {
            router: build_router(state.clone()),
            state,
            memory,
            cookie: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        self.state.backend()
    }

    /// Store the admin credential row and a matching hosted auth user.
    pub async fn configure_admin(&self, email: &str, password: &str) {
        let hash = hash_password(password, TEST_BCRYPT_COST).unwrap();
        self.store_credential(Some(email), Some(&hash)).await;
        self.memory.add_user(email, password).await;
    }

    /// Replace the admin credential row as-is, hash included.
    pub async fn store_credential(&self, email: Option<&str>, hash: Option<&str>) {
        let repo = self.backend().repo::<AdminCredential>();
        let existing = repo.single().await.unwrap();
        repo.save(&AdminCredential {
            id: existing.and_then(|c| c.id),
            admin_email: email.map(str::to_string),
            admin_password_hash: hash.map(str::to_string),
            updated_at: None,
        })
        .await
        .unwrap();
    }

    /// Forget the visitor's cookie.
    pub fn clear_cookies(&self) {
        *self.cookie.lock().unwrap() = None;
    }

    /// Run a request with the visitor's cookie and keep any new one.
    async fn dispatch(&self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = self.cookie.lock().unwrap().clone() {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap_or_default().trim();
            if pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                *self.cookie.lock().unwrap() = Some(pair.to_string());
            }
        }
        response
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.dispatch(request).await;
        let status = response.status();
        let headers = response.headers().clone();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// POST an urlencoded form.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// POST a raw body with the given content type.
    pub async fn post_body(&self, path: &str, content_type: &str, body: impl Into<Body>) -> TestResponse {
        self.send(
            Request::post(path)
                .header(header::CONTENT_TYPE, content_type)
                .body(body.into())
                .unwrap(),
        )
        .await
    }

    /// GET a server-sent events endpoint and leave the body open.
    pub async fn open_events(&self, path: &str) -> EventStream {
        let response = self
            .dispatch(Request::get(path).body(Body::empty()).unwrap())
            .await;
        EventStream {
            status: response.status(),
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_form("/admin-login", &[("email", email), ("password", password)])
            .await
    }
}

/// How long [`EventStream::next_event`] waits for the server.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A server-sent events response read frame by frame.
pub struct EventStream {
    pub status: StatusCode,
    body: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Data of the next event called `name`.
    ///
    /// Other events and keep-alive comments are skipped. Returns `None` once
    /// the stream has ended or nothing arrived within [`EVENT_TIMEOUT`].
    pub async fn next_event(&mut self, name: &str) -> Option<String> {
        let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
        loop {
            while let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let mut event = None;
                let mut data = Vec::new();
                for line in frame.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = Some(value.trim().to_string());
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push(value.trim_start().to_string());
                    }
                }
                if event.as_deref() == Some(name) {
                    return Some(data.join("\n"));
                }
            }

            let chunk = tokio::time::timeout_at(deadline, self.body.next())
                .await
                .ok()??
                .unwrap();
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}
