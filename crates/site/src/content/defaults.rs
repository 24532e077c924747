//! Built-in landing content.
//!
//! Shown when a table is empty or unreachable, and inserted by `fp-cli seed`.

use forgepilot_core::{
    Benefit, CurrencyCode, Faq, Price, PricingPlan, Section, SectionKey, Service, SiteSettings,
    TeamMember, Testimonial,
};
use rust_decimal::Decimal;

#[must_use]
pub fn settings() -> SiteSettings {
    SiteSettings {
        site_name: "ForgePilot".to_string(),
        tagline: "Product engineering for teams that ship".to_string(),
        contact_email: "hello@forgepilot.io".to_string(),
        footer_text: "Built in small batches, shipped every week.".to_string(),
        ..Default::default()
    }
}

fn section(key: SectionKey, title: &str, subtitle: &str) -> Section {
    Section {
        key,
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        position: SectionKey::ALL
            .iter()
            .position(|k| *k == key)
            .and_then(|p| i32::try_from(p).ok())
            .unwrap_or_default(),
        ..Default::default()
    }
}

/// One heading row per landing section.
#[must_use]
pub fn sections() -> Vec<Section> {
    vec![
        Section {
            body: "We design, build and run web products for startups and scale-ups. \
                   Senior engineers, weekly releases, no hand-offs."
                .to_string(),
            cta_label: "Book a call".to_string(),
            cta_url: "/#contact".to_string(),
            ..section(
                SectionKey::Hero,
                "Ship your product faster",
                "A senior product team on demand",
            )
        },
        section(
            SectionKey::Benefits,
            "Why teams pick us",
            "Less process, more shipped work",
        ),
        section(SectionKey::Services, "What we do", "From first sketch to production"),
        section(SectionKey::Pricing, "Pricing", "Simple plans, cancel any month"),
        section(
            SectionKey::Testimonials,
            "What clients say",
            "A few words from people we've shipped with",
        ),
        section(SectionKey::Team, "The team", "Small on purpose"),
        section(SectionKey::Faq, "Questions", "Straight answers"),
        Section {
            cta_label: "Start a project".to_string(),
            cta_url: "/#contact".to_string(),
            ..section(
                SectionKey::Cta,
                "Have something to build?",
                "Tell us about it. We reply within one business day.",
            )
        },
    ]
}

#[must_use]
pub fn benefits() -> Vec<Benefit> {
    [
        ("Weekly releases", "Working software in production every week, not a deck.", "rocket"),
        ("Senior only", "Every engineer on your project has shipped at scale before.", "star"),
        ("Fixed monthly price", "No hourly billing and no surprise invoices.", "tag"),
    ]
    .into_iter()
    .zip(0..)
    .map(|((title, description, icon), position)| Benefit {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        position,
        ..Default::default()
    })
    .collect()
}

#[must_use]
pub fn services() -> Vec<Service> {
    [
        (
            "Product design",
            "Research, flows and a design system your developers can use.",
            "pen",
            &["User research", "Prototypes", "Design systems"][..],
        ),
        (
            "Web development",
            "Fast, accessible sites and apps on a modern stack.",
            "code",
            &["Marketing sites", "Web apps", "Integrations"][..],
        ),
        (
            "Growth engineering",
            "Experiments, analytics and the plumbing behind them.",
            "chart",
            &["A/B testing", "Analytics", "Performance"][..],
        ),
    ]
    .into_iter()
    .zip(0..)
    .map(|((title, description, icon, features), position)| Service {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        features: features.iter().map(ToString::to_string).collect(),
        position,
        ..Default::default()
    })
    .collect()
}

#[must_use]
pub fn pricing_plans() -> Vec<PricingPlan> {
    vec![
        PricingPlan {
            name: "Sprint".to_string(),
            price: Price::new(Decimal::new(4_900, 0), CurrencyCode::USD),
            period: "project".to_string(),
            description: "Two weeks to validate one idea.".to_string(),
            features: vec!["Discovery workshop".to_string(), "Clickable prototype".to_string()],
            cta_label: "Start a sprint".to_string(),
            cta_url: "/#contact".to_string(),
            position: 0,
            ..Default::default()
        },
        PricingPlan {
            name: "Team".to_string(),
            price: Price::new(Decimal::new(12_000, 0), CurrencyCode::USD),
            period: "month".to_string(),
            description: "A dedicated product team.".to_string(),
            features: vec![
                "Designer and two engineers".to_string(),
                "Weekly releases".to_string(),
                "Shared Slack channel".to_string(),
            ],
            highlighted: true,
            cta_label: "Talk to us".to_string(),
            cta_url: "/#contact".to_string(),
            position: 1,
            ..Default::default()
        },
    ]
}

#[must_use]
pub fn testimonials() -> Vec<Testimonial> {
    vec![Testimonial {
        author: "Maya Chen".to_string(),
        role: "Head of Product".to_string(),
        company: "Northwind".to_string(),
        quote: "They shipped in six weeks what our roadmap had down for two quarters.".to_string(),
        ..Default::default()
    }]
}

#[must_use]
pub fn team() -> Vec<TeamMember> {
    vec![
        TeamMember {
            name: "Sam Ortega".to_string(),
            role: "Founder, engineering".to_string(),
            position: 0,
            ..Default::default()
        },
        TeamMember {
            name: "Priya Nair".to_string(),
            role: "Design lead".to_string(),
            position: 1,
            ..Default::default()
        },
    ]
}

#[must_use]
pub fn faqs() -> Vec<Faq> {
    [
        (
            "How fast can you start?",
            "Usually within two weeks of the first call.",
        ),
        (
            "Do we own the code?",
            "Yes. Everything lives in your repositories from day one.",
        ),
        (
            "Can we pause?",
            "Monthly plans can be paused or cancelled before the next cycle.",
        ),
    ]
    .into_iter()
    .zip(0..)
    .map(|((question, answer), position)| Faq {
        question: question.to_string(),
        answer: answer.to_string(),
        position,
        ..Default::default()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use forgepilot_core::Record;

    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(settings().validate().is_ok());
        assert!(sections().iter().all(|s| s.validate().is_ok()));
        assert!(benefits().iter().all(|b| b.validate().is_ok()));
        assert!(services().iter().all(|s| s.validate().is_ok()));
        assert!(pricing_plans().iter().all(|p| p.validate().is_ok()));
        assert!(testimonials().iter().all(|t| t.validate().is_ok()));
        assert!(team().iter().all(|t| t.validate().is_ok()));
        assert!(faqs().iter().all(|f| f.validate().is_ok()));
    }

    #[test]
    fn test_one_section_per_key() {
        let sections = sections();
        for key in SectionKey::ALL {
            assert_eq!(sections.iter().filter(|s| s.key == key).count(), 1);
        }
    }
}
