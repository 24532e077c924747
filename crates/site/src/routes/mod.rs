//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public site
//! GET  /                          - Landing page
//! GET  /portfolio                 - Case studies
//! GET  /portfolio/{slug}          - Case study detail
//! GET  /blog                      - Blog index
//! GET  /blog/{slug}               - Blog post
//! POST /contact                   - Lead capture form
//! GET  /media/{bucket}/{*path}    - Uploaded files (in-process backend only)
//! GET  /{slug}                    - CMS page
//!
//! # Auth
//! GET  /admin-login               - Login page
//! POST /admin-login               - Credential gate
//! GET  /auth                      - Alias of /admin-login
//! POST /logout                    - Sign out
//!
//! # Dashboard (guarded)
//! GET  /dashboard                 - Overview
//! GET  /dashboard/{kind}          - Table of one content type
//! GET  /dashboard/{kind}/new      - New row form
//! POST /dashboard/{kind}/new      - Create
//! GET  /dashboard/{kind}/{id}     - Edit form
//! POST /dashboard/{kind}/{id}     - Update
//! POST /dashboard/{kind}/{id}/delete - Delete
//! GET  /dashboard/settings        - Site settings
//! POST /dashboard/settings        - Save site settings
//! GET  /dashboard/admin           - Admin credential
//! POST /dashboard/admin           - Save admin credential
//! GET  /dashboard/leads           - Contact form submissions
//! POST /dashboard/uploads         - Image upload
//!
//! # API
//! POST /api/events                - Analytics events (always 202)
//! GET  /api/session/watch         - Guard state stream (SSE, guarded)
//! ```

pub mod api;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod dashboard;
pub mod home;
pub mod media;
pub mod pages;
pub mod portfolio;

use axum::Router;
use forgepilot_core::SocialLink;

use crate::content::LandingContent;
use crate::state::AppState;

/// Build the router for every page and API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(portfolio::router())
        .merge(blog::router())
        .merge(contact::router())
        .merge(media::router())
        .merge(auth::router())
        .merge(api::router())
        .merge(dashboard::router())
        .merge(pages::router())
        .fallback(pages::not_found)
}

/// A `<meta>` tag rendered from a site token.
#[derive(Debug, Clone)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

/// Header, footer and head data shared by every public page.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Document title.
    pub title: String,
    pub site_name: String,
    pub tagline: String,
    pub logo_url: String,
    pub footer_text: String,
    pub contact_email: String,
    pub social_links: Vec<SocialLink>,
    pub meta_tags: Vec<MetaTag>,
    pub nonce: String,
    /// Base URL for canonical links.
    pub base_url: String,
}

impl Layout {
    #[must_use]
    pub fn new(content: &LandingContent, nonce: String, base_url: &str, title: &str) -> Self {
        let settings = &content.settings;
        let title = if title.is_empty() {
            settings.site_name.clone()
        } else {
            format!("{title} | {}", settings.site_name)
        };
        Self {
            title,
            site_name: settings.site_name.clone(),
            tagline: settings.tagline.clone(),
            logo_url: settings.logo_url.clone(),
            footer_text: settings.footer_text.clone(),
            contact_email: settings.contact_email.clone(),
            social_links: content.social_links.clone(),
            meta_tags: content
                .tokens
                .iter()
                .filter(|t| !t.value.trim().is_empty())
                .map(|t| MetaTag {
                    name: t.name.clone(),
                    content: t.value.clone(),
                })
                .collect(),
            nonce,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Layout for a page, reading site settings through the content cache.
    pub async fn load(state: &AppState, nonce: String, title: &str) -> Self {
        let content = state.content().landing(state.backend()).await;
        Self::new(&content, nonce, &state.config().base_url, title)
    }
}

#[cfg(test)]
mod tests {
    use forgepilot_core::SiteToken;

    use super::*;
    use crate::content::defaults;

    fn content() -> LandingContent {
        LandingContent {
            settings: defaults::settings(),
            sections: Vec::new(),
            benefits: Vec::new(),
            services: Vec::new(),
            pricing_plans: Vec::new(),
            testimonials: Vec::new(),
            team: Vec::new(),
            faqs: Vec::new(),
            social_links: Vec::new(),
            tokens: vec![
                SiteToken {
                    name: "google-site-verification".into(),
                    value: "abc123".into(),
                    ..Default::default()
                },
                SiteToken {
                    name: "unused".into(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_title_includes_site_name() {
        let layout = Layout::new(&content(), String::new(), "https://forgepilot.io/", "Blog");
        assert_eq!(layout.title, "Blog | ForgePilot");
        assert_eq!(layout.base_url, "https://forgepilot.io");

        let home = Layout::new(&content(), String::new(), "https://forgepilot.io", "");
        assert_eq!(home.title, "ForgePilot");
    }

    #[test]
    fn test_blank_tokens_are_not_rendered() {
        let layout = Layout::new(&content(), String::new(), "http://localhost:3000", "");
        assert_eq!(layout.meta_tags.len(), 1);
        assert_eq!(layout.meta_tags[0].name, "google-site-verification");
    }
}
