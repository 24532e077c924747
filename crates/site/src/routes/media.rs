//! Uploaded files, when running against the in-process backend.
//!
//! A hosted backend serves its own public URLs, so this route only answers
//! for the memory backend and is a 404 otherwise.

use axum::{
    Router,
    extract::{Path, State},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::get,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/media/{bucket}/{*path}", get(serve))
}

/// GET /media/{bucket}/{*path}
pub async fn serve(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Response {
    let Some(memory) = state.backend().as_memory() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match memory.object(&bucket, &path).await {
        Some(object) => (
            [
                (CONTENT_TYPE, object.content_type),
                (CACHE_CONTROL, "public, max-age=3600".to_string()),
            ],
            object.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
