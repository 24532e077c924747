//! JSON and streaming endpoints.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use chrono::Utc;
use forgepilot_backend::{AuthEvent, AuthEventKind};
use forgepilot_core::{AnalyticsEvent, Email};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::guard::{configured_admin_email, evaluate, stored_identity};
use crate::middleware::{GuardState, Identity, RequireAdmin};
use crate::state::AppState;

/// How often an idle watch stream re-checks the session on its own.
const WATCH_RECHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Body of `POST /api/events`.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub event: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl EventPayload {
    fn into_record(self) -> AnalyticsEvent {
        AnalyticsEvent {
            id: None,
            event: self.event.trim().to_string(),
            path: if self.path.is_empty() {
                "/".to_string()
            } else {
                self.path
            },
            referrer: self.referrer.filter(|r| !r.trim().is_empty()),
            created_at: Some(Utc::now()),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", post(capture_event))
        .route("/api/session/watch", get(session_watch))
}

/// Record an analytics event.
///
/// Fire-and-forget: the answer is 202 whether or not the event was stored.
/// The body is parsed by hand because `sendBeacon` posts JSON as text/plain.
///
/// POST /api/events
#[instrument(skip_all)]
pub async fn capture_event(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let payload = match serde_json::from_slice::<EventPayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed analytics event");
            return StatusCode::ACCEPTED;
        }
    };

    let record = payload.into_record();
    if let Err(e) = state.backend().repo::<AnalyticsEvent>().insert(&record).await {
        tracing::warn!(event = %record.event, error = %e, "Failed to store analytics event");
    }
    StatusCode::ACCEPTED
}

/// Whether an auth event concerns the identity being watched.
fn concerns(identity: &Identity, event: &AuthEvent) -> bool {
    match identity {
        Identity::Hosted(session) => event.user_id == Some(session.user.id),
        Identity::Local(admin) => event
            .email
            .as_deref()
            .and_then(|email| Email::parse(email).ok())
            .is_some_and(|email| email.matches(&admin.email)),
    }
}

/// Re-run the guard for a live watch stream.
///
/// Reads the session store afresh and never writes to it. An expired hosted
/// session reports `checking` until a page request refreshes it.
async fn reevaluate(
    state: &AppState,
    session: &Session,
    watched: &Identity,
    event: Option<&AuthEvent>,
) -> GuardState {
    if let Some(event) = event
        && event.kind == AuthEventKind::SignedOut
        && concerns(watched, event)
    {
        return GuardState::Unauthenticated;
    }

    let identity = stored_identity(session).await;
    let configured = configured_admin_email(state).await;
    let verdict = evaluate(identity.as_ref(), configured.as_ref());
    if verdict != GuardState::Authenticated {
        return verdict;
    }

    match &identity {
        Some(Identity::Hosted(auth_session)) if auth_session.is_expired() => GuardState::Checking,
        Some(Identity::Hosted(auth_session)) => {
            match state.backend().auth().get_user(&auth_session.access_token).await {
                Ok(_) => verdict,
                Err(e) => {
                    tracing::info!(error = %e, "Watched session token no longer valid");
                    GuardState::Unauthenticated
                }
            }
        }
        _ => verdict,
    }
}

fn state_event(state: GuardState) -> Event {
    Event::default().event("state").data(state.as_str())
}

/// Stream guard state changes to an open dashboard page.
///
/// Sends the current state at once, then a new state after each auth event
/// and every [`WATCH_RECHECK_INTERVAL`]. Ends after sending
/// `unauthenticated`, at which point the page navigates to the login form.
///
/// GET /api/session/watch
pub async fn session_watch(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.auth_events().subscribe();
    let watched = admin.identity;

    let events = stream! {
        yield Ok(state_event(GuardState::Authenticated));

        let mut ticker = tokio::time::interval(WATCH_RECHECK_INTERVAL);
        ticker.tick().await;

        loop {
            let next = tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => Some(reevaluate(&state, &session, &watched, Some(&event)).await),
                    None => None,
                },
                _ = ticker.tick() => Some(reevaluate(&state, &session, &watched, None).await),
            };
            let Some(next) = next else {
                break;
            };
            yield Ok(state_event(next));
            if next == GuardState::Unauthenticated {
                tracing::info!("Session watch ended: signed out");
                break;
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}
