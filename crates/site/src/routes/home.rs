//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, response::IntoResponse, routing::get};
use forgepilot_core::{Benefit, PricingPlan, Section, Service, TeamMember, Testimonial};
use tower_sessions::Session;
use tracing::instrument;

use crate::content::{LandingContent, render_markdown};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{Flash, take_flash};
use crate::routes::Layout;
use crate::state::AppState;

/// Section heading with its markdown body rendered.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub key: &'static str,
    pub title: String,
    pub subtitle: String,
    pub body_html: String,
    pub cta_label: String,
    pub cta_url: String,
}

impl From<&Section> for SectionView {
    fn from(section: &Section) -> Self {
        Self {
            key: section.key.as_str(),
            title: section.title.clone(),
            subtitle: section.subtitle.clone(),
            body_html: render_markdown(&section.body),
            cta_label: section.cta_label.clone(),
            cta_url: section.cta_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanView {
    pub name: String,
    pub price: String,
    pub period: String,
    pub description: String,
    pub features: Vec<String>,
    pub highlighted: bool,
    pub cta_label: String,
    pub cta_url: String,
}

impl From<&PricingPlan> for PlanView {
    fn from(plan: &PricingPlan) -> Self {
        Self {
            name: plan.name.clone(),
            price: plan.price.display(),
            period: plan.period.clone(),
            description: plan.description.clone(),
            features: plan.features.clone(),
            highlighted: plan.highlighted,
            cta_label: if plan.cta_label.is_empty() {
                "Get started".to_string()
            } else {
                plan.cta_label.clone()
            },
            cta_url: if plan.cta_url.is_empty() {
                "/#contact".to_string()
            } else {
                plan.cta_url.clone()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestimonialView {
    pub author: String,
    pub byline: String,
    pub quote: String,
    pub avatar_url: String,
    pub stars: String,
}

impl From<&Testimonial> for TestimonialView {
    fn from(t: &Testimonial) -> Self {
        let byline = match (t.role.is_empty(), t.company.is_empty()) {
            (false, false) => format!("{}, {}", t.role, t.company),
            (false, true) => t.role.clone(),
            (true, false) => t.company.clone(),
            (true, true) => String::new(),
        };
        Self {
            author: t.author.clone(),
            byline,
            quote: t.quote.clone(),
            avatar_url: t.avatar_url.clone(),
            stars: "★".repeat(usize::from(t.rating)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaqView {
    pub question: String,
    pub answer_html: String,
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionView>,
    pub benefits: Vec<Benefit>,
    pub services: Vec<Service>,
    pub plans: Vec<PlanView>,
    pub testimonials: Vec<TestimonialView>,
    pub team: Vec<TeamMember>,
    pub faqs: Vec<FaqView>,
    pub flash: Option<Flash>,
    /// Organization structured data, already escaped for a script element.
    pub json_ld: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// Organization schema for search engines.
///
/// `</` is escaped so the JSON cannot close its script element.
fn organization_json_ld(content: &LandingContent, base_url: &str) -> String {
    let settings = &content.settings;
    let mut org = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "Organization",
        "name": settings.site_name,
        "url": base_url,
        "sameAs": content.social_links.iter().map(|l| l.url.as_str()).collect::<Vec<_>>(),
    });
    if !settings.contact_email.is_empty() {
        org["email"] = settings.contact_email.clone().into();
    }
    if !settings.logo_url.is_empty() {
        let logo = if settings.logo_url.starts_with('/') {
            format!("{base_url}{}", settings.logo_url)
        } else {
            settings.logo_url.clone()
        };
        org["logo"] = logo.into();
    }
    org.to_string().replace("</", "<\\/")
}

/// Render the landing page.
///
/// GET /
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let content = state.content().landing(state.backend()).await;
    let layout = Layout::new(&content, nonce, &state.config().base_url, "");
    let json_ld = organization_json_ld(&content, &layout.base_url);

    HomeTemplate {
        sections: content.sections.iter().map(SectionView::from).collect(),
        benefits: content.benefits.clone(),
        services: content.services.clone(),
        plans: content.pricing_plans.iter().map(PlanView::from).collect(),
        testimonials: content.testimonials.iter().map(TestimonialView::from).collect(),
        team: content.team.clone(),
        faqs: content
            .faqs
            .iter()
            .map(|f| FaqView {
                question: f.question.clone(),
                answer_html: render_markdown(&f.answer),
            })
            .collect(),
        flash: take_flash(&session).await,
        json_ld,
        layout,
    }
}
