//! Admin credential form.
//!
//! Saving a new email signs every existing session out on its next request,
//! the current one included, because the guard compares against the stored
//! row. Open dashboard tabs hear about it through a `UserUpdated` auth event.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Utc;
use forgepilot_backend::{AuthEvent, AuthEventKind};
use forgepilot_core::{AdminCredential, Email};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Chrome;
use crate::middleware::guard::AdminContext;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::models::{Flash, set_flash};
use crate::services::auth::{MIN_PASSWORD_LENGTH, PasswordPolicy, hash_password};
use crate::state::AppState;

const ADMIN_URL: &str = "/dashboard/admin";

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/admin.html")]
pub struct AdminTemplate {
    pub chrome: Chrome,
    pub email: String,
    pub has_password: bool,
    pub legacy_policy: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm: String,
}

/// A validated form: the email and, if a new one was entered, the password.
#[derive(Debug, PartialEq, Eq)]
struct Validated {
    email: Email,
    password: Option<String>,
}

fn validate(form: &AdminForm, has_password: bool) -> Result<Validated, Vec<String>> {
    let mut errors = Vec::new();

    let email = match Email::parse(form.email.trim()) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(format!("Email: {e}"));
            None
        }
    };

    let password = if form.password.is_empty() {
        if !has_password {
            errors.push("Password is required".to_string());
        }
        None
    } else {
        if form.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }
        if form.password != form.confirm {
            errors.push("Passwords do not match".to_string());
        }
        Some(form.password.clone())
    };

    match email {
        Some(email) if errors.is_empty() => Ok(Validated { email, password }),
        _ => Err(errors),
    }
}

/// Hash on the blocking pool.
async fn hash(password: String, cost: u32) -> Option<String> {
    match tokio::task::spawn_blocking(move || hash_password(&password, cost)).await {
        Ok(Ok(hash)) => Some(hash),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to hash admin password");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Password hashing task failed");
            None
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route(ADMIN_URL, get(show).post(save))
}

async fn render(
    state: &AppState,
    admin: &AdminContext,
    session: &Session,
    nonce: String,
    email: String,
    has_password: bool,
    errors: Vec<String>,
) -> AdminTemplate {
    AdminTemplate {
        chrome: Chrome::new(admin, session, nonce, "admin", "Admin account").await,
        email,
        has_password,
        legacy_policy: state.config().password_policy == PasswordPolicy::Legacy,
        errors,
    }
}

/// GET /dashboard/admin
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let (credential, errors) = match state.admin_credential().await {
        Ok(credential) => (credential, Vec::new()),
        Err(e) => (AdminCredential::default(), vec![e.message()]),
    };
    render(
        &state,
        &admin,
        &session,
        nonce,
        credential.admin_email.clone().unwrap_or_default(),
        credential.password_hash().is_some(),
        errors,
    )
    .await
    .into_response()
}

/// POST /dashboard/admin
///
/// Last writer wins.
#[instrument(skip_all)]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<AdminForm>,
) -> Response {
    let existing = match state.admin_credential().await {
        Ok(credential) => credential,
        Err(e) => {
            let page = render(&state, &admin, &session, nonce, form.email, false, vec![e.message()]);
            return (StatusCode::BAD_GATEWAY, page.await).into_response();
        }
    };
    let has_password = existing.password_hash().is_some();

    let validated = match validate(&form, has_password) {
        Ok(validated) => validated,
        Err(errors) => {
            let page = render(&state, &admin, &session, nonce, form.email, has_password, errors);
            return (StatusCode::UNPROCESSABLE_ENTITY, page.await).into_response();
        }
    };

    let admin_password_hash = match validated.password {
        Some(password) => hash(password, state.config().bcrypt_cost).await,
        None => existing.admin_password_hash.clone(),
    };
    if admin_password_hash.is_none() {
        let errors = vec!["Could not hash the password. Please try again.".to_string()];
        let page = render(&state, &admin, &session, nonce, form.email, has_password, errors);
        return (StatusCode::INTERNAL_SERVER_ERROR, page.await).into_response();
    }

    let email_changed = !validated.email.matches(&admin.email);
    let credential = AdminCredential {
        id: existing.id,
        admin_email: Some(validated.email.normalized()),
        admin_password_hash,
        updated_at: Some(Utc::now()),
    };

    match state.backend().repo::<AdminCredential>().save(&credential).await {
        Ok(_) => {
            tracing::info!(admin = %admin.email, email_changed, "Admin credentials updated");
            state.auth_events().emit(AuthEvent {
                kind: AuthEventKind::UserUpdated,
                user_id: admin.identity.user_id(),
                email: Some(admin.email.clone()),
            });
            let message = if email_changed {
                "Admin credentials saved. Sign in again with the new email."
            } else {
                "Admin credentials saved"
            };
            set_flash(&session, Flash::success(message)).await;
            Redirect::to(ADMIN_URL).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save admin credentials");
            let page = render(
                &state,
                &admin,
                &session,
                nonce,
                form.email,
                has_password,
                vec![e.message()],
            );
            (StatusCode::BAD_GATEWAY, page.await).into_response()
        }
    }
}
