//! Admin login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::CspNonce;
use crate::middleware::guard::{GuardState, configured_admin_email, evaluate, resolve_identity};
use crate::models::{Flash, take_flash};
use crate::services::auth::{self, GateError};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    /// The form is disabled until credentials are configured.
    pub blocking: bool,
    pub email: String,
    pub flash: Option<Flash>,
    pub nonce: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin-login", get(login_page).post(login))
        .route("/auth", get(auth_alias))
        .route("/logout", post(logout))
}

/// Render the login page, or skip it when already signed in.
///
/// GET /admin-login
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Response {
    let configured = configured_admin_email(&state).await;
    let identity = resolve_identity(&state, &session).await.ok().flatten();
    if evaluate(identity.as_ref(), configured.as_ref()) == GuardState::Authenticated {
        return Redirect::to("/dashboard").into_response();
    }

    let (error, blocking) = match auth::load_credentials(&state).await {
        Ok(credentials) if credentials.is_configured() => (None, false),
        Ok(_) => {
            let err = GateError::NotConfigured;
            (Some(err.user_message()), err.is_blocking())
        }
        Err(err) => (Some(err.user_message()), false),
    };

    LoginTemplate {
        error,
        blocking,
        email: String::new(),
        flash: take_flash(&session).await,
        nonce,
    }
    .into_response()
}

/// Run the credential gate.
///
/// POST /admin-login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(&state, &session, form.email.trim(), &form.password).await {
        Ok(_) => Redirect::to("/dashboard").into_response(),
        Err(err) => {
            match &err {
                GateError::InvalidCredentials | GateError::NotConfigured => {
                    tracing::info!(error = %err, "Admin login refused");
                }
                _ => tracing::warn!(error = %err, "Admin login failed"),
            }
            LoginTemplate {
                error: Some(err.user_message()),
                blocking: err.is_blocking(),
                email: form.email,
                flash: None,
                nonce,
            }
            .into_response()
        }
    }
}

/// GET /auth
pub async fn auth_alias() -> Redirect {
    Redirect::to("/admin-login")
}

/// Sign out and return to the login page.
///
/// POST /logout
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    if let Err(e) = auth::logout(&state, &session).await {
        tracing::warn!(error = %e, "Logout did not complete cleanly");
    }
    crate::error::clear_sentry_user();
    Redirect::to("/admin-login")
}
