//! Image uploads from the dashboard editors.
//!
//! The browser posts a single `file` field and gets back the public URL,
//! which the editor writes into the image field.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Largest accepted image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Image types the site will serve, with the extension they are stored under.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/svg+xml", "svg"),
];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub path: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/uploads", post(upload))
        // Leave room for multipart framing around the file itself
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// Store an uploaded image in the media bucket.
///
/// POST /dashboard/uploads
///
/// # Errors
///
/// Returns 400 when the `file` field is missing, too large or not an
/// allowed image type, and 502 if the object store rejects it.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let ext = extension_for(&content_type).ok_or_else(|| {
            AppError::BadRequest(format!("unsupported file type '{content_type}'"))
        })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("empty file".to_string()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(format!(
                "file is larger than {} MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let bucket = &state.config().media_bucket;
        let path = format!("uploads/{}.{ext}", Uuid::new_v4());
        let size = bytes.len();
        let path = state
            .backend()
            .objects()
            .upload(bucket, &path, bytes.to_vec(), &content_type)
            .await?;
        let url = state.backend().objects().public_url(bucket, &path);

        tracing::info!(admin = %admin.email, %path, size, "Image uploaded");
        return Ok(Json(UploadResponse { url, path }));
    }

    Err(AppError::BadRequest("missing file".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_allowed_types() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("IMAGE/JPEG"), Some("jpg"));
        assert_eq!(extension_for("image/svg+xml; charset=utf-8"), Some("svg"));
    }

    #[test]
    fn test_extension_for_rejects_other_types() {
        assert_eq!(extension_for("text/html"), None);
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for(""), None);
    }
}
