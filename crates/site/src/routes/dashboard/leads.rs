//! Contact form submissions, newest first. Read-only.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use forgepilot_core::Lead;
use tower_sessions::Session;
use tracing::instrument;

use super::Chrome;
use super::crud::ListTemplate;
use crate::components::DataTable;
use crate::forms::{date, truncate};
use crate::middleware::{CspNonce, RequireAdmin};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/leads", get(list))
}

fn table(leads: &[Lead]) -> DataTable {
    let cells = leads
        .iter()
        .map(|lead| {
            vec![
                lead.name.clone(),
                lead.email.clone(),
                lead.company.clone(),
                truncate(&lead.message, 120),
                date(lead.created_at),
            ]
        })
        .collect();
    DataTable::read_only(
        vec!["Name", "Email", "Company", "Message", "Received"],
        cells,
        "No leads yet.",
    )
}

/// GET /dashboard/leads
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    let (leads, error) = match state.backend().repo::<Lead>().list().await {
        Ok(leads) => (leads, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list leads");
            (Vec::new(), Some(e.message()))
        }
    };
    ListTemplate {
        chrome: Chrome::new(&admin, &session, nonce, "leads", "Leads").await,
        heading: "Leads",
        singular: "lead",
        table: table(&leads),
        error,
    }
}
