//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use forgepilot_backend::Query;
use forgepilot_core::{Post, PublishStatus};
use tracing::instrument;

use crate::content::render_markdown;
use crate::error::AppError;
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::Layout;
use crate::routes::pages::not_found_page;
use crate::state::AppState;

/// Post view for templates.
#[derive(Debug, Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub published_on: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub content_html: String,
    pub reading_time_minutes: usize,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            published_on: post
                .published_at
                .map(|d| d.format("%B %-d, %Y").to_string())
                .unwrap_or_default(),
            cover_image: post.cover_image.clone(),
            tags: post.tags.clone(),
            content_html: render_markdown(&post.body),
            reading_time_minutes: post.reading_time(),
        }
    }
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub layout: Layout,
    pub posts: Vec<PostView>,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub layout: Layout,
    pub post: PostView,
    pub recent_posts: Vec<PostView>,
}

/// Number of recent posts to show under a post.
const RECENT_POSTS_COUNT: usize = 3;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog", get(index))
        .route("/blog/{slug}", get(show))
}

fn published() -> Query {
    Query::for_record::<Post>().eq("status", PublishStatus::Published.as_str())
}

/// Display the blog index page with all published posts, newest first.
#[instrument(skip(state, nonce))]
pub async fn index(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, AppError> {
    let posts = state
        .backend()
        .repo::<Post>()
        .list_where(&published())
        .await?;
    Ok(BlogIndexTemplate {
        layout: Layout::load(&state, nonce, "Blog").await,
        posts: posts.iter().map(PostView::from).collect(),
    })
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist or is a draft.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<Response, AppError> {
    let repo = state.backend().repo::<Post>();
    let Some(post) = repo.find(published().eq("slug", &slug)).await? else {
        return Ok(not_found_page(&state, nonce).await);
    };

    // A failing sidebar should not take the post down with it
    let recent_posts = match repo
        .list_where(&published().limit(RECENT_POSTS_COUNT + 1))
        .await
    {
        Ok(posts) => posts
            .iter()
            .filter(|p| p.slug != post.slug)
            .take(RECENT_POSTS_COUNT)
            .map(PostView::from)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load recent posts");
            Vec::new()
        }
    };

    Ok(BlogShowTemplate {
        layout: Layout::load(&state, nonce, &post.title).await,
        post: PostView::from(&post),
        recent_posts,
    }
    .into_response())
}
