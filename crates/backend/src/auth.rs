//! Auth sessions and the auth-state event stream.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use forgepilot_core::AuthUserId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Sessions this close to expiry are treated as expired.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// A user of the hosted auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: AuthUserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Whether the access token is expired (or about to be) at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_LEEWAY_SECS) <= now
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The user's email, if the service returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// What happened to an auth session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    /// The admin's email or password changed.
    UserUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user_id: Option<AuthUserId>,
    pub email: Option<String>,
}

impl AuthEvent {
    #[must_use]
    pub fn new(kind: AuthEventKind, user: Option<&AuthUser>) -> Self {
        Self {
            kind,
            user_id: user.map(|u| u.id),
            email: user.and_then(|u| u.email.clone()),
        }
    }
}

/// Fan-out of auth-state changes to any number of subscribers.
///
/// Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: AuthEvent) {
        tracing::debug!(kind = ?event.kind, subscribers = self.tx.receiver_count(), "auth event");
        let _ = self.tx.send(event);
    }

    /// Start receiving events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription to [`AuthEvents`].
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: Option<broadcast::Receiver<AuthEvent>>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Returns `None` once unsubscribed or when the publisher is gone. A
    /// subscriber that fell behind skips the missed events and gets the next
    /// one.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Stop receiving events.
    pub fn unsubscribe(&mut self) {
        self.rx = None;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}
