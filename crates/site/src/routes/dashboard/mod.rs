//! Admin dashboard.
//!
//! Every handler here takes [`RequireAdmin`], so the guard runs on each
//! request before anything is loaded.

mod admin;
mod crud;
mod leads;
mod settings;
mod uploads;

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, response::IntoResponse, routing::get};
use forgepilot_backend::{Backend, BackendError};
use forgepilot_core::{
    Benefit, Faq, Lead, Page, PortfolioItem, Post, PricingPlan, Record, Section, Service,
    SiteToken, SocialLink, TeamMember, Testimonial,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::forms::Editable;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::middleware::guard::AdminContext;
use crate::models::{Flash, take_flash};
use crate::state::AppState;

/// A dashboard navigation link.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: &'static str,
    pub url: String,
    pub active: bool,
}

/// Header, navigation and flash message shared by every dashboard page.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub admin_email: String,
    pub nav: Vec<NavItem>,
    pub flash: Option<Flash>,
    pub nonce: String,
    pub title: String,
}

impl Chrome {
    /// Build the chrome, consuming any pending flash message.
    pub async fn new(
        admin: &AdminContext,
        session: &Session,
        nonce: String,
        active: &str,
        title: impl Into<String>,
    ) -> Self {
        Self {
            admin_email: admin.email.clone(),
            nav: nav(active),
            flash: take_flash(session).await,
            nonce,
            title: title.into(),
        }
    }
}

fn nav_item<T: Editable>() -> (&'static str, &'static str) {
    (T::KIND, T::LABEL)
}

fn nav(active: &str) -> Vec<NavItem> {
    [
        ("", "Overview"),
        nav_item::<Section>(),
        nav_item::<Benefit>(),
        nav_item::<Service>(),
        nav_item::<PricingPlan>(),
        nav_item::<Testimonial>(),
        nav_item::<TeamMember>(),
        nav_item::<Faq>(),
        nav_item::<PortfolioItem>(),
        nav_item::<Post>(),
        nav_item::<Page>(),
        nav_item::<SocialLink>(),
        nav_item::<SiteToken>(),
        ("leads", "Leads"),
        ("settings", "Site settings"),
        ("admin", "Admin account"),
    ]
    .into_iter()
    .map(|(kind, label)| NavItem {
        label,
        url: if kind.is_empty() {
            "/dashboard".to_string()
        } else {
            format!("/dashboard/{kind}")
        },
        active: kind == active,
    })
    .collect()
}

/// One tile of the overview.
#[derive(Debug, Clone)]
pub struct CountCard {
    pub label: &'static str,
    pub url: String,
    /// `None` when the table could not be read.
    pub count: Option<usize>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct OverviewTemplate {
    pub chrome: Chrome,
    pub cards: Vec<CountCard>,
    pub recent_leads: Vec<Lead>,
    pub errors: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(overview))
        .nest(&path::<Section>(), crud::router::<Section>())
        .nest(&path::<Benefit>(), crud::router::<Benefit>())
        .nest(&path::<Service>(), crud::router::<Service>())
        .nest(&path::<PricingPlan>(), crud::router::<PricingPlan>())
        .nest(&path::<Testimonial>(), crud::router::<Testimonial>())
        .nest(&path::<TeamMember>(), crud::router::<TeamMember>())
        .nest(&path::<Faq>(), crud::router::<Faq>())
        .nest(&path::<PortfolioItem>(), crud::router::<PortfolioItem>())
        .nest(&path::<Post>(), crud::router::<Post>())
        .nest(&path::<Page>(), crud::router::<Page>())
        .nest(&path::<SocialLink>(), crud::router::<SocialLink>())
        .nest(&path::<SiteToken>(), crud::router::<SiteToken>())
        .merge(settings::router())
        .merge(admin::router())
        .merge(leads::router())
        .merge(uploads::router())
}

fn path<T: Editable>() -> String {
    format!("/dashboard/{}", T::KIND)
}

async fn count<T: Record>(backend: &Backend) -> Result<usize, BackendError> {
    backend.repo::<T>().list().await.map(|rows| rows.len())
}

fn card<T: Editable>(result: Result<usize, BackendError>, errors: &mut Vec<String>) -> CountCard {
    let count = match result {
        Ok(count) => Some(count),
        Err(e) => {
            errors.push(format!("{}: {}", T::LABEL, e.message()));
            None
        }
    };
    CountCard {
        label: T::LABEL,
        url: path::<T>(),
        count,
    }
}

/// Dashboard overview: row counts and the latest leads.
///
/// GET /dashboard
#[instrument(skip_all)]
pub async fn overview(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    let backend = state.backend();
    let leads = backend.repo::<Lead>();
    let (services, plans, testimonials, team, faqs, portfolio, posts, pages, leads) = tokio::join!(
        count::<Service>(backend),
        count::<PricingPlan>(backend),
        count::<Testimonial>(backend),
        count::<TeamMember>(backend),
        count::<Faq>(backend),
        count::<PortfolioItem>(backend),
        count::<Post>(backend),
        count::<Page>(backend),
        leads.list(),
    );

    let mut errors = Vec::new();
    let cards = vec![
        card::<Service>(services, &mut errors),
        card::<PricingPlan>(plans, &mut errors),
        card::<Testimonial>(testimonials, &mut errors),
        card::<TeamMember>(team, &mut errors),
        card::<Faq>(faqs, &mut errors),
        card::<PortfolioItem>(portfolio, &mut errors),
        card::<Post>(posts, &mut errors),
        card::<Page>(pages, &mut errors),
    ];
    let recent_leads = match leads {
        Ok(leads) => leads.into_iter().take(5).collect(),
        Err(e) => {
            errors.push(format!("Leads: {}", e.message()));
            Vec::new()
        }
    };

    OverviewTemplate {
        chrome: Chrome::new(&admin, &session, nonce, "", "Overview").await,
        cards,
        recent_leads,
        errors,
    }
}
