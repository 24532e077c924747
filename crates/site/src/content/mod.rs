//! Landing page content.
//!
//! The landing page reads nine tables. They are fetched concurrently, any
//! piece that fails or comes back empty falls back to [`defaults`], and the
//! assembled result is cached for a short TTL so a page view costs nothing
//! against the backend most of the time. Dashboard writes invalidate it.

pub mod defaults;
pub mod markdown;

use std::sync::Arc;
use std::time::Duration;

use forgepilot_backend::{Backend, BackendError};
use forgepilot_core::{
    Benefit, Faq, PricingPlan, Section, SectionKey, Service, SiteSettings, SiteToken, SocialLink,
    TeamMember, Testimonial,
};
use moka::future::Cache;

pub use markdown::render_markdown;

/// Everything the landing page renders.
#[derive(Debug, Clone)]
pub struct LandingContent {
    pub settings: SiteSettings,
    /// Visible sections in landing order.
    pub sections: Vec<Section>,
    pub benefits: Vec<Benefit>,
    pub services: Vec<Service>,
    pub pricing_plans: Vec<PricingPlan>,
    pub testimonials: Vec<Testimonial>,
    pub team: Vec<TeamMember>,
    pub faqs: Vec<Faq>,
    pub social_links: Vec<SocialLink>,
    pub tokens: Vec<SiteToken>,
}

impl LandingContent {
    /// Fetch all landing tables concurrently.
    ///
    /// Never fails: each piece degrades to built-in content on its own.
    #[tracing::instrument(skip(backend))]
    pub async fn load(backend: &Backend) -> Self {
        let settings = backend.repo::<SiteSettings>();
        let sections = backend.repo::<Section>();
        let benefits = backend.repo::<Benefit>();
        let services = backend.repo::<Service>();
        let pricing_plans = backend.repo::<PricingPlan>();
        let testimonials = backend.repo::<Testimonial>();
        let team = backend.repo::<TeamMember>();
        let faqs = backend.repo::<Faq>();
        let social_links = backend.repo::<SocialLink>();
        let tokens = backend.repo::<SiteToken>();

        let (
            settings,
            sections,
            benefits,
            services,
            pricing_plans,
            testimonials,
            team,
            faqs,
            social_links,
            tokens,
        ) = tokio::join!(
            settings.single(),
            sections.list(),
            benefits.list(),
            services.list(),
            pricing_plans.list(),
            testimonials.list(),
            team.list(),
            faqs.list(),
            social_links.list(),
            tokens.list(),
        );

        let settings = match settings {
            Ok(Some(settings)) => settings,
            Ok(None) => defaults::settings(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load site settings, using defaults");
                defaults::settings()
            }
        };

        Self {
            settings,
            sections: merge_sections(or_default(sections, "sections", Vec::new)),
            benefits: or_default(benefits, "benefits", defaults::benefits),
            services: or_default(services, "services", defaults::services),
            pricing_plans: or_default(pricing_plans, "pricing_plans", defaults::pricing_plans),
            testimonials: or_default(testimonials, "testimonials", defaults::testimonials),
            team: or_default(team, "team_members", defaults::team),
            faqs: or_default(faqs, "faqs", defaults::faqs),
            social_links: or_default(social_links, "social_links", Vec::new),
            tokens: or_default(tokens, "site_tokens", Vec::new),
        }
    }

    /// The section for `key`, if it is visible.
    #[must_use]
    pub fn section(&self, key: SectionKey) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }
}

fn or_default<T>(
    result: Result<Vec<T>, BackendError>,
    table: &str,
    fallback: impl FnOnce() -> Vec<T>,
) -> Vec<T> {
    match result {
        Ok(rows) if !rows.is_empty() => rows,
        Ok(_) => fallback(),
        Err(e) => {
            tracing::warn!(table, error = %e, "Failed to load landing content, using defaults");
            fallback()
        }
    }
}

/// Stored rows win per key; keys without a row use the built-in heading.
/// Hidden sections are dropped.
fn merge_sections(stored: Vec<Section>) -> Vec<Section> {
    let mut builtin = defaults::sections();
    let mut merged: Vec<Section> = SectionKey::ALL
        .into_iter()
        .filter_map(|key| {
            stored
                .iter()
                .find(|s| s.key == key)
                .cloned()
                .or_else(|| {
                    builtin
                        .iter()
                        .position(|s| s.key == key)
                        .map(|i| builtin.swap_remove(i))
                })
        })
        .filter(|s| s.visible)
        .collect();
    merged.sort_by_key(|s| s.position);
    merged
}

/// Short-lived cache of [`LandingContent`].
#[derive(Clone)]
pub struct ContentCache {
    cache: Cache<(), Arc<LandingContent>>,
}

impl ContentCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// The cached landing content, loading it on a miss.
    pub async fn landing(&self, backend: &Backend) -> Arc<LandingContent> {
        self.cache
            .get_with((), async { Arc::new(LandingContent::load(backend).await) })
            .await
    }

    /// Drop the cached content so the next page view reloads it.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forgepilot_backend::MemoryBackend;

    use super::*;

    #[tokio::test]
    async fn test_empty_backend_uses_defaults() {
        let backend = Backend::memory(MemoryBackend::new());
        let content = LandingContent::load(&backend).await;

        assert_eq!(content.settings.site_name, "ForgePilot");
        assert_eq!(content.sections.len(), SectionKey::ALL.len());
        assert!(!content.faqs.is_empty());
        assert!(content.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_stored_rows_replace_defaults() {
        let backend = Backend::memory(MemoryBackend::new());
        backend
            .repo::<Faq>()
            .insert(&Faq {
                question: "Do you sign NDAs?".into(),
                answer: "Always.".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let content = LandingContent::load(&backend).await;
        assert_eq!(content.faqs.len(), 1);
        assert_eq!(content.faqs[0].question, "Do you sign NDAs?");
    }

    #[tokio::test]
    async fn test_hidden_section_is_skipped() {
        let backend = Backend::memory(MemoryBackend::new());
        backend
            .repo::<Section>()
            .insert(&Section {
                key: SectionKey::Team,
                title: "Team".into(),
                visible: false,
                position: 5,
                ..Default::default()
            })
            .await
            .unwrap();

        let content = LandingContent::load(&backend).await;
        assert!(content.section(SectionKey::Team).is_none());
        assert!(content.section(SectionKey::Hero).is_some());
    }

    #[tokio::test]
    async fn test_cache_serves_until_invalidated() {
        let backend = Backend::memory(MemoryBackend::new());
        let cache = ContentCache::new(Duration::from_secs(60));
        assert_eq!(cache.landing(&backend).await.faqs.len(), 3);

        backend
            .repo::<Faq>()
            .insert(&Faq {
                question: "New?".into(),
                answer: "Yes.".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cache.landing(&backend).await.faqs.len(), 3);

        cache.invalidate();
        assert_eq!(cache.landing(&backend).await.faqs.len(), 1);
    }
}
