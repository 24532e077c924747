//! Portfolio (case study) pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use forgepilot_backend::Query;
use forgepilot_core::{PortfolioItem, PublishStatus, ResultMetric};
use tracing::instrument;

use crate::content::render_markdown;
use crate::error::AppError;
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::Layout;
use crate::routes::pages::not_found_page;
use crate::state::AppState;

/// Case study view for templates.
#[derive(Debug, Clone)]
pub struct PortfolioView {
    pub slug: String,
    pub title: String,
    pub client: String,
    pub summary: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub results: Vec<ResultMetric>,
    pub body_html: String,
}

impl From<&PortfolioItem> for PortfolioView {
    fn from(item: &PortfolioItem) -> Self {
        Self {
            slug: item.slug.clone(),
            title: item.title.clone(),
            client: item.client.clone(),
            summary: item.summary.clone(),
            cover_image: item.cover_image.clone(),
            tags: item.tags.clone(),
            results: item.results.clone(),
            body_html: render_markdown(&item.body),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "portfolio/index.html")]
pub struct PortfolioIndexTemplate {
    pub layout: Layout,
    pub items: Vec<PortfolioView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "portfolio/show.html")]
pub struct PortfolioShowTemplate {
    pub layout: Layout,
    pub item: PortfolioView,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolio", get(index))
        .route("/portfolio/{slug}", get(show))
}

fn published() -> Query {
    Query::for_record::<PortfolioItem>().eq("status", PublishStatus::Published.as_str())
}

/// List published case studies.
///
/// GET /portfolio
#[instrument(skip(state, nonce))]
pub async fn index(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, AppError> {
    let items = state
        .backend()
        .repo::<PortfolioItem>()
        .list_where(&published())
        .await?;
    Ok(PortfolioIndexTemplate {
        layout: Layout::load(&state, nonce, "Portfolio").await,
        items: items.iter().map(PortfolioView::from).collect(),
    })
}

/// Show one case study.
///
/// # Errors
///
/// Returns 404 if the item doesn't exist or is a draft.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<Response, AppError> {
    let Some(item) = state
        .backend()
        .repo::<PortfolioItem>()
        .find(published().eq("slug", &slug))
        .await?
    else {
        return Ok(not_found_page(&state, nonce).await);
    };

    Ok(PortfolioShowTemplate {
        layout: Layout::load(&state, nonce, &item.title).await,
        item: PortfolioView::from(&item),
    }
    .into_response())
}
