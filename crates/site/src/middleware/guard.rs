//! Dashboard route guard.
//!
//! Every dashboard request is evaluated against the current `admin_config`
//! row, so changing the admin email locks out existing sessions on their
//! next request. The states:
//!
//! ```text
//! configured email unknown ──► Checking         (self-refreshing page / 503)
//! no identity in session   ──► Unauthenticated  (identity cleared, redirect / 401)
//! refresh token refused    ──► Unauthenticated  (store untouched, redirect / 401)
//! identity email matches   ──► Authenticated
//! anything else            ──► Unauthenticated
//! ```
//!
//! The same evaluation runs reactively in the session watch stream
//! (`GET /api/session/watch`). The stream outlives its request, so it reads
//! the session store with [`stored_identity`] and never writes to it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{
        HeaderValue, StatusCode,
        header::{ACCEPT, RETRY_AFTER},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};
use forgepilot_backend::AuthSession;
use forgepilot_core::{AuthUserId, Email};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{LocalAdmin, keys};
use crate::state::AppState;

/// How long clients wait before asking again while the guard is checking.
const CHECKING_RETRY_SECS: u32 = 5;

/// Who the session says is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Local flag set by the credential gate.
    Local(LocalAdmin),
    /// Session issued by the hosted auth service.
    Hosted(AuthSession),
}

impl Identity {
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Local(admin) => Some(admin.email.as_str()),
            Self::Hosted(session) => session.email(),
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<AuthUserId> {
        match self {
            Self::Local(_) => None,
            Self::Hosted(session) => Some(session.user.id),
        }
    }
}

/// Outcome of evaluating a session against the configured admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    #[default]
    Checking,
    Unauthenticated,
    Authenticated,
}

impl GuardState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
        }
    }
}

/// Decide the guard state.
///
/// `configured` is the admin email from `admin_config`; `None` means it is
/// unset or could not be loaded.
#[must_use]
pub fn evaluate(identity: Option<&Identity>, configured: Option<&Email>) -> GuardState {
    let Some(configured) = configured else {
        return GuardState::Checking;
    };
    match identity.and_then(Identity::email) {
        Some(email) if configured.matches(email) => GuardState::Authenticated,
        _ => GuardState::Unauthenticated,
    }
}

/// Read the identity stored in the session, without touching the backend.
pub async fn session_identity(session: &Session) -> Option<Identity> {
    match session.get::<AuthSession>(keys::HOSTED_SESSION).await {
        Ok(Some(auth_session)) => return Some(Identity::Hosted(auth_session)),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Unreadable hosted session"),
    }
    match session.get::<LocalAdmin>(keys::LOCAL_ADMIN).await {
        Ok(admin) => admin.map(Identity::Local),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable local admin flag");
            None
        }
    }
}

/// An expired hosted session whose refresh token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshFailed;

/// The session identity, refreshing an expired hosted session first.
///
/// The refreshed session is written back to `session`, so this only works
/// while the request that owns the session is still in flight. Refresh tokens
/// are single-use: when a refresh is refused, the store is read again in case
/// a concurrent request rotated the token first.
///
/// # Errors
///
/// Returns [`RefreshFailed`] if the session could not be refreshed and no
/// newer session is stored.
pub async fn resolve_identity(
    state: &AppState,
    session: &Session,
) -> Result<Option<Identity>, RefreshFailed> {
    let auth_session = match session_identity(session).await {
        Some(Identity::Hosted(auth_session)) if auth_session.is_expired() => auth_session,
        other => return Ok(other),
    };

    match state
        .backend()
        .auth()
        .refresh_session(&auth_session.refresh_token)
        .await
    {
        Ok(refreshed) => {
            if let Err(e) = session.insert(keys::HOSTED_SESSION, &refreshed).await {
                tracing::warn!(error = %e, "Failed to store refreshed session");
            }
            Ok(Some(Identity::Hosted(refreshed)))
        }
        Err(e) => {
            tracing::info!(error = %e, "Session refresh failed");
            rotated_elsewhere(session, &auth_session)
                .await
                .map(|current| Some(Identity::Hosted(current)))
                .ok_or(RefreshFailed)
        }
    }
}

/// A valid hosted session stored after `stale` was read.
async fn rotated_elsewhere(session: &Session, stale: &AuthSession) -> Option<AuthSession> {
    if let Err(e) = session.load().await {
        tracing::warn!(error = %e, "Failed to reload session");
        return None;
    }
    match session_identity(session).await {
        Some(Identity::Hosted(current))
            if current.refresh_token != stale.refresh_token && !current.is_expired() =>
        {
            Some(current)
        }
        _ => None,
    }
}

/// The identity currently in the session store, for callers that outlive
/// their request.
///
/// Never writes: an expired hosted session is returned as-is and left for the
/// next page request to refresh.
pub async fn stored_identity(session: &Session) -> Option<Identity> {
    if let Err(e) = session.load().await {
        tracing::warn!(error = %e, "Failed to reload session");
    }
    session_identity(session).await
}

/// Remove both identity keys from the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_identity(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(keys::LOCAL_ADMIN).await?;
    session.remove_value(keys::HOSTED_SESSION).await?;
    Ok(())
}

/// The configured admin email, or `None` while it is unset or unreadable.
pub async fn configured_admin_email(state: &AppState) -> Option<Email> {
    match state.admin_credential().await {
        Ok(credential) => credential.email(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load admin_config");
            None
        }
    }
}

/// The admin behind an authenticated dashboard request.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub email: String,
    pub identity: Identity,
}

/// Extractor that runs the guard.
///
/// HTML requests are redirected to `/admin-login`; API requests (under
/// `/api/` or asking for JSON) get 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub AdminContext);

/// Why the guard refused a request.
pub enum GuardRejection {
    RedirectToLogin,
    Unauthorized,
    Checking { api: bool },
}

/// Shown while the admin configuration is unknown. Reloads itself.
#[derive(Template, WebTemplate)]
#[template(path = "auth/checking.html")]
pub struct CheckingTemplate {
    pub retry_seconds: u32,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/admin-login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Checking { api: true } => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(RETRY_AFTER, HeaderValue::from(CHECKING_RETRY_SECS))],
                "Checking session",
            )
                .into_response(),
            Self::Checking { api: false } => CheckingTemplate {
                retry_seconds: CHECKING_RETRY_SECS,
            }
            .into_response(),
        }
    }
}

fn wants_json(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
        || parts
            .headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"))
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api = wants_json(parts);
        let denied = if api {
            GuardRejection::Unauthorized
        } else {
            GuardRejection::RedirectToLogin
        };

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            tracing::error!("Session layer missing from dashboard route");
            return Err(denied);
        };

        let configured = configured_admin_email(state).await;
        let Ok(identity) = resolve_identity(state, &session).await else {
            // Signed out for this request only; a concurrent request may be
            // about to store the rotated session.
            clear_sentry_user();
            return Err(match evaluate(None, configured.as_ref()) {
                GuardState::Checking => GuardRejection::Checking { api },
                _ => denied,
            });
        };

        match (evaluate(identity.as_ref(), configured.as_ref()), identity) {
            (GuardState::Authenticated, Some(identity)) => {
                let email = identity.email().unwrap_or_default().to_string();
                set_sentry_user(identity.user_id().map(|id| id.to_string()), &email);
                Ok(Self(AdminContext { email, identity }))
            }
            (GuardState::Checking, _) => Err(GuardRejection::Checking { api }),
            (_, identity) => {
                if identity.is_some() {
                    tracing::warn!(
                        path = %parts.uri.path(),
                        "Session email does not match the configured admin, signing out"
                    );
                }
                if let Err(e) = clear_identity(&session).await {
                    tracing::warn!(error = %e, "Failed to clear session identity");
                }
                clear_sentry_user();
                Err(denied)
            }
        }
    }
}
