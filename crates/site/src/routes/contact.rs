//! Contact form.

use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::post,
};
use chrono::Utc;
use forgepilot_core::{Lead, Record};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::models::{Flash, set_flash};
use crate::state::AppState;

/// Where the form lives on the landing page.
const CONTACT_ANCHOR: &str = "/#contact";

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub message: String,
    /// Hidden field; bots fill it in, people don't.
    #[serde(default)]
    pub website: String,
}

impl ContactForm {
    fn into_lead(self) -> Lead {
        Lead {
            id: None,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: self.company.trim().to_string(),
            message: self.message.trim().to_string(),
            created_at: Some(Utc::now()),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

/// Store a lead and send the visitor back to the form with a message.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> impl IntoResponse {
    if !form.website.is_empty() {
        tracing::info!("Dropping contact submission with honeypot filled");
        set_flash(&session, Flash::success("Thanks! We'll be in touch shortly.")).await;
        return Redirect::to(CONTACT_ANCHOR);
    }

    let lead = form.into_lead();
    if let Err(e) = lead.validate() {
        set_flash(&session, Flash::error(format!("Please check the form: {e}"))).await;
        return Redirect::to(CONTACT_ANCHOR);
    }

    let flash = match state.backend().repo::<Lead>().insert(&lead).await {
        Ok(_) => {
            tracing::info!("Lead captured");
            Flash::success("Thanks! We'll be in touch shortly.")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store lead");
            Flash::error(e.message())
        }
    };
    set_flash(&session, flash).await;
    Redirect::to(CONTACT_ANCHOR)
}
