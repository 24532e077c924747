//! Site-wide settings (name, contact email, footer).

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use forgepilot_core::SiteSettings;
use tower_sessions::Session;
use tracing::instrument;

use super::Chrome;
use super::crud::FormTemplate;
use crate::content::defaults;
use crate::forms::{Editable, FormData, FormErrors, with_errors};
use crate::middleware::guard::AdminContext;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::models::{Flash, set_flash};
use crate::state::AppState;

const SETTINGS_URL: &str = "/dashboard/settings";

pub fn router() -> Router<AppState> {
    Router::new().route(SETTINGS_URL, get(show).post(save))
}

async fn render(
    admin: &AdminContext,
    session: &Session,
    nonce: String,
    settings: &SiteSettings,
    errors: &FormErrors,
    extra_error: Option<String>,
    status: StatusCode,
) -> Response {
    let mut messages = errors.messages();
    messages.extend(extra_error);
    let template = FormTemplate {
        chrome: Chrome::new(admin, session, nonce, SiteSettings::KIND, SiteSettings::LABEL).await,
        heading: SiteSettings::LABEL.to_string(),
        action: SETTINGS_URL.to_string(),
        fields: with_errors(settings.fields(), errors),
        errors: messages,
        delete_url: None,
        back_url: "/dashboard".to_string(),
    };
    (status, template).into_response()
}

/// The stored settings row, or the built-in defaults when there is none.
async fn load(state: &AppState) -> Result<SiteSettings, String> {
    match state.backend().repo::<SiteSettings>().single().await {
        Ok(Some(settings)) => Ok(settings),
        Ok(None) => Ok(defaults::settings()),
        Err(e) => Err(e.message()),
    }
}

/// GET /dashboard/settings
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let (settings, error) = match load(&state).await {
        Ok(settings) => (settings, None),
        Err(message) => (defaults::settings(), Some(message)),
    };
    render(
        &admin,
        &session,
        nonce,
        &settings,
        &FormErrors::default(),
        error,
        StatusCode::OK,
    )
    .await
}

/// POST /dashboard/settings
///
/// Last writer wins.
#[instrument(skip_all)]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<FormData>,
) -> Response {
    let mut settings = match load(&state).await {
        Ok(settings) => settings,
        Err(message) => {
            return render(
                &admin,
                &session,
                nonce,
                &defaults::settings(),
                &FormErrors::default(),
                Some(message),
                StatusCode::BAD_GATEWAY,
            )
            .await;
        }
    };

    if let Err(errors) = settings.apply_and_validate(&form) {
        return render(
            &admin,
            &session,
            nonce,
            &settings,
            &errors,
            None,
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
    }

    match state.backend().repo::<SiteSettings>().save(&settings).await {
        Ok(_) => {
            state.content().invalidate();
            tracing::info!(admin = %admin.email, "Site settings saved");
            set_flash(&session, Flash::success("Settings saved")).await;
            Redirect::to(SETTINGS_URL).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save site settings");
            render(
                &admin,
                &session,
                nonce,
                &settings,
                &FormErrors::default(),
                Some(e.message()),
                StatusCode::BAD_GATEWAY,
            )
            .await
        }
    }
}
