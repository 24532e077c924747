//! CMS pages served at `/{slug}`, and the 404 page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use forgepilot_backend::Query;
use forgepilot_core::{Page, PublishStatus};
use tracing::instrument;

use crate::content::render_markdown;
use crate::error::AppError;
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::Layout;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub layout: Layout,
    pub title: String,
    pub body_html: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(show))
}

/// The 404 page.
pub async fn not_found_page(state: &AppState, nonce: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            layout: Layout::load(state, nonce, "Not found").await,
        },
    )
        .into_response()
}

/// Fallback for unmatched routes.
pub async fn not_found(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> Response {
    not_found_page(&state, nonce).await
}

/// Serve a published page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist or is a draft.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<Response, AppError> {
    if Page::RESERVED.contains(&slug.as_str()) {
        return Ok(not_found_page(&state, nonce).await);
    }

    let query = Query::new()
        .eq("slug", &slug)
        .eq("status", PublishStatus::Published.as_str());
    let Some(page) = state.backend().repo::<Page>().find(query).await? else {
        return Ok(not_found_page(&state, nonce).await);
    };

    Ok(PageTemplate {
        layout: Layout::load(&state, nonce, &page.title).await,
        body_html: render_markdown(&page.body),
        title: page.title,
    }
    .into_response())
}
