//! Generic list/create/edit/delete pages for [`Editable`] tables.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use forgepilot_core::RowId;
use tower_sessions::Session;
use tracing::instrument;

use super::Chrome;
use crate::components::DataTable;
use crate::error::AppError;
use crate::forms::{Editable, FieldView, FormData, FormErrors, with_errors};
use crate::middleware::{CspNonce, RequireAdmin};
use crate::models::{Flash, set_flash};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/list.html")]
pub struct ListTemplate {
    pub chrome: Chrome,
    pub heading: &'static str,
    pub singular: &'static str,
    pub table: DataTable,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/form.html")]
pub struct FormTemplate {
    pub chrome: Chrome,
    pub heading: String,
    pub action: String,
    pub fields: Vec<FieldView>,
    pub errors: Vec<String>,
    pub delete_url: Option<String>,
    pub back_url: String,
}

/// Routes for one table, to be nested at `/dashboard/{KIND}`.
pub fn router<T: Editable>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<T>))
        .route("/new", get(new_form::<T>).post(create::<T>))
        .route("/{id}", get(edit_form::<T>).post(update::<T>))
        .route("/{id}/delete", post(delete::<T>))
}

fn list_url<T: Editable>() -> String {
    format!("/dashboard/{}", T::KIND)
}

fn parse_id(id: &str) -> Result<RowId, AppError> {
    id.parse()
        .map_err(|_| AppError::NotFound(format!("row {id}")))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

struct FormPage<'a, T> {
    record: &'a T,
    id: Option<RowId>,
    errors: &'a FormErrors,
    extra_error: Option<String>,
}

impl<T: Editable> FormPage<'_, T> {
    async fn render(
        self,
        admin: &crate::middleware::guard::AdminContext,
        session: &Session,
        nonce: String,
        status: StatusCode,
    ) -> Response {
        let base = list_url::<T>();
        let (heading, action, delete_url) = match self.id {
            Some(id) => (
                format!("Edit {}", T::SINGULAR),
                format!("{base}/{id}"),
                Some(format!("{base}/{id}/delete")),
            ),
            None => (
                format!("New {}", T::SINGULAR),
                format!("{base}/new"),
                None,
            ),
        };
        let mut errors = self.errors.messages();
        errors.extend(self.extra_error);

        let template = FormTemplate {
            chrome: Chrome::new(admin, session, nonce, T::KIND, capitalize(&heading)).await,
            heading: capitalize(&heading),
            action,
            fields: with_errors(self.record.fields(), self.errors),
            errors,
            delete_url,
            back_url: base,
        };
        (status, template).into_response()
    }
}

/// GET /dashboard/{kind}
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn list<T: Editable>(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    let (records, error) = match state.backend().repo::<T>().list().await {
        Ok(records) => (records, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list rows");
            (Vec::new(), Some(e.message()))
        }
    };
    ListTemplate {
        chrome: Chrome::new(&admin, &session, nonce, T::KIND, T::LABEL).await,
        heading: T::LABEL,
        singular: T::SINGULAR,
        table: DataTable::for_records(&records),
        error,
    }
}

/// GET /dashboard/{kind}/new
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn new_form<T: Editable>(
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    FormPage {
        record: &T::default(),
        id: None,
        errors: &FormErrors::default(),
        extra_error: None,
    }
    .render(&admin, &session, nonce, StatusCode::OK)
    .await
}

/// POST /dashboard/{kind}/new
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn create<T: Editable>(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<FormData>,
) -> Response {
    let mut record = T::default();
    if let Err(errors) = record.apply_and_validate(&form) {
        return FormPage {
            record: &record,
            id: None,
            errors: &errors,
            extra_error: None,
        }
        .render(&admin, &session, nonce, StatusCode::UNPROCESSABLE_ENTITY)
        .await;
    }

    match state.backend().repo::<T>().insert(&record).await {
        Ok(_) => {
            state.content().invalidate();
            tracing::info!(admin = %admin.email, "Row created");
            set_flash(&session, Flash::success(format!("{} created", capitalize(T::SINGULAR)))).await;
            Redirect::to(&list_url::<T>()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create row");
            FormPage {
                record: &record,
                id: None,
                errors: &FormErrors::default(),
                extra_error: Some(e.message()),
            }
            .render(&admin, &session, nonce, StatusCode::BAD_GATEWAY)
            .await
        }
    }
}

/// GET /dashboard/{kind}/{id}
///
/// # Errors
///
/// Returns 404 if the row doesn't exist.
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn edit_form<T: Editable>(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let record = state
        .backend()
        .repo::<T>()
        .get(id)
        .await
        .map_err(|e| AppError::from_backend(e, T::SINGULAR))?;

    Ok(FormPage {
        record: &record,
        id: Some(id),
        errors: &FormErrors::default(),
        extra_error: None,
    }
    .render(&admin, &session, nonce, StatusCode::OK)
    .await)
}

/// POST /dashboard/{kind}/{id}
///
/// The stored row is loaded first and the form applied on top of it, so
/// fields the form leaves alone (or rejects leniently) keep their values.
///
/// # Errors
///
/// Returns 404 if the row doesn't exist.
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn update<T: Editable>(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let repo = state.backend().repo::<T>();
    let mut record = repo
        .get(id)
        .await
        .map_err(|e| AppError::from_backend(e, T::SINGULAR))?;

    if let Err(errors) = record.apply_and_validate(&form) {
        return Ok(FormPage {
            record: &record,
            id: Some(id),
            errors: &errors,
            extra_error: None,
        }
        .render(&admin, &session, nonce, StatusCode::UNPROCESSABLE_ENTITY)
        .await);
    }

    match repo.update(id, &record).await {
        Ok(_) => {
            state.content().invalidate();
            tracing::info!(admin = %admin.email, "Row updated");
            set_flash(&session, Flash::success(format!("{} saved", capitalize(T::SINGULAR)))).await;
            Ok(Redirect::to(&list_url::<T>()).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update row");
            Ok(FormPage {
                record: &record,
                id: Some(id),
                errors: &FormErrors::default(),
                extra_error: Some(e.message()),
            }
            .render(&admin, &session, nonce, StatusCode::BAD_GATEWAY)
            .await)
        }
    }
}

/// POST /dashboard/{kind}/{id}/delete
///
/// # Errors
///
/// Returns 404 for a malformed id.
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn delete<T: Editable>(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id)?;
    let flash = match state.backend().repo::<T>().delete(id).await {
        Ok(()) => {
            state.content().invalidate();
            tracing::info!(admin = %admin.email, "Row deleted");
            Flash::success(format!("{} deleted", capitalize(T::SINGULAR)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete row");
            Flash::error(e.message())
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to(&list_url::<T>()))
}
