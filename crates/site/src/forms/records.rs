//! [`Editable`] for every dashboard-managed table.

use chrono::{DateTime, Utc};
use forgepilot_core::{
    Benefit, CurrencyCode, Faq, Page, PortfolioItem, Post, Price, PricingPlan, PublishStatus,
    Section, SectionKey, Service, SiteSettings, SiteToken, SocialLink, TeamMember, Testimonial,
};

use super::{Editable, FieldView, FormData, FormErrors, FormReader, SelectOption};

fn status_field(status: PublishStatus) -> FieldView {
    FieldView::select(
        "status",
        "Status",
        [PublishStatus::Draft, PublishStatus::Published]
            .into_iter()
            .map(|s| {
                let label = if s.is_published() { "Published" } else { "Draft" };
                SelectOption::new(s.as_str(), label, s == status)
            })
            .collect(),
    )
}

/// First publication stamps the time; unpublishing keeps it.
fn published_at(status: PublishStatus, current: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (status, current) {
        (PublishStatus::Published, None) => Some(Utc::now()),
        (_, current) => current,
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}…", cut.trim_end())
    }
}

pub(crate) fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl Editable for Section {
    const KIND: &'static str = "sections";
    const LABEL: &'static str = "Sections";
    const SINGULAR: &'static str = "section";

    fn columns() -> Vec<&'static str> {
        vec!["Section", "Title", "Visible", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.key.label().to_string(),
            self.title.clone(),
            yes_no(self.visible),
            self.position.to_string(),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::select(
                "key",
                "Section",
                SectionKey::ALL
                    .into_iter()
                    .map(|k| SelectOption::new(k.as_str(), k.label(), k == self.key))
                    .collect(),
            ),
            FieldView::text("title", "Title", &self.title).required(),
            FieldView::text("subtitle", "Subtitle", &self.subtitle),
            FieldView::markdown("body", "Body", &self.body),
            FieldView::text("cta_label", "Button label", &self.cta_label),
            FieldView::url("cta_url", "Button link", &self.cta_url),
            FieldView::checkbox("visible", "Visible", self.visible),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        match SectionKey::parse(&reader.text("key")) {
            Some(key) => self.key = key,
            None => reader.invalid("key", "Section", "unknown section"),
        }
        self.title = reader.required("title", "Title");
        self.subtitle = reader.text("subtitle");
        self.body = reader.body("body");
        self.cta_label = reader.text("cta_label");
        self.cta_url = reader.text("cta_url");
        self.visible = reader.checkbox("visible");
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for Benefit {
    const KIND: &'static str = "benefits";
    const LABEL: &'static str = "Benefits";
    const SINGULAR: &'static str = "benefit";

    fn columns() -> Vec<&'static str> {
        vec!["Title", "Description", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            truncate(&self.description, 80),
            self.position.to_string(),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("title", "Title", &self.title).required(),
            FieldView::textarea("description", "Description", &self.description),
            FieldView::text("icon", "Icon", &self.icon).help("Icon name, e.g. \"rocket\"."),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.title = reader.required("title", "Title");
        self.description = reader.text("description");
        self.icon = reader.text("icon");
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for Service {
    const KIND: &'static str = "services";
    const LABEL: &'static str = "Services";
    const SINGULAR: &'static str = "service";

    fn columns() -> Vec<&'static str> {
        vec!["Title", "Features", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.features.len().to_string(),
            self.position.to_string(),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("title", "Title", &self.title).required(),
            FieldView::textarea("description", "Description", &self.description),
            FieldView::text("icon", "Icon", &self.icon),
            FieldView::lines("features", "Features", &self.features),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.title = reader.required("title", "Title");
        self.description = reader.text("description");
        self.icon = reader.text("icon");
        self.features = reader.lines("features");
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for PricingPlan {
    const KIND: &'static str = "pricing";
    const LABEL: &'static str = "Pricing plans";
    const SINGULAR: &'static str = "plan";

    fn columns() -> Vec<&'static str> {
        vec!["Name", "Price", "Highlighted", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        let price = if self.period.is_empty() {
            self.price.display()
        } else {
            format!("{} / {}", self.price.display(), self.period)
        };
        vec![
            self.name.clone(),
            price,
            yes_no(self.highlighted),
            self.position.to_string(),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("name", "Name", &self.name).required(),
            FieldView::text("price", "Price", self.price.amount.to_string()),
            FieldView::select(
                "currency",
                "Currency",
                CurrencyCode::ALL
                    .into_iter()
                    .map(|c| SelectOption::new(c.code(), c.code(), c == self.price.currency_code))
                    .collect(),
            ),
            FieldView::text("period", "Period", &self.period).help("e.g. \"month\", or blank."),
            FieldView::textarea("description", "Description", &self.description),
            FieldView::lines("features", "Features", &self.features),
            FieldView::checkbox("highlighted", "Highlight this plan", self.highlighted),
            FieldView::text("cta_label", "Button label", &self.cta_label),
            FieldView::url("cta_url", "Button link", &self.cta_url),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.name = reader.required("name", "Name");
        let amount = reader.decimal("price", "Price");
        let currency = CurrencyCode::from_code(&reader.text("currency"))
            .unwrap_or(self.price.currency_code);
        self.price = Price::new(amount, currency);
        self.period = reader.text("period");
        self.description = reader.text("description");
        self.features = reader.lines("features");
        self.highlighted = reader.checkbox("highlighted");
        self.cta_label = reader.text("cta_label");
        self.cta_url = reader.text("cta_url");
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for Testimonial {
    const KIND: &'static str = "testimonials";
    const LABEL: &'static str = "Testimonials";
    const SINGULAR: &'static str = "testimonial";

    fn columns() -> Vec<&'static str> {
        vec!["Author", "Company", "Quote", "Rating"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.author.clone(),
            self.company.clone(),
            truncate(&self.quote, 60),
            format!("{}/{}", self.rating, Self::MAX_RATING),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("author", "Author", &self.author).required(),
            FieldView::text("role", "Role", &self.role),
            FieldView::text("company", "Company", &self.company),
            FieldView::textarea("quote", "Quote", &self.quote).required(),
            FieldView::image("avatar_url", "Avatar", &self.avatar_url),
            FieldView::number("rating", "Rating", self.rating).help("1 to 5."),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.author = reader.required("author", "Author");
        self.role = reader.text("role");
        self.company = reader.text("company");
        self.quote = reader.required("quote", "Quote");
        self.avatar_url = reader.text("avatar_url");
        self.rating = reader.number("rating", "Rating", Self::MAX_RATING);
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for TeamMember {
    const KIND: &'static str = "team";
    const LABEL: &'static str = "Team";
    const SINGULAR: &'static str = "team member";

    fn columns() -> Vec<&'static str> {
        vec!["Name", "Role", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.role.clone(),
            self.position.to_string(),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("name", "Name", &self.name).required(),
            FieldView::text("role", "Role", &self.role),
            FieldView::textarea("bio", "Bio", &self.bio),
            FieldView::image("photo_url", "Photo", &self.photo_url),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.name = reader.required("name", "Name");
        self.role = reader.text("role");
        self.bio = reader.text("bio");
        self.photo_url = reader.text("photo_url");
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for Faq {
    const KIND: &'static str = "faqs";
    const LABEL: &'static str = "FAQs";
    const SINGULAR: &'static str = "question";

    fn columns() -> Vec<&'static str> {
        vec!["Question", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.question.clone(), self.position.to_string()]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("question", "Question", &self.question).required(),
            FieldView::markdown("answer", "Answer", &self.answer).required(),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.question = reader.required("question", "Question");
        self.answer = reader.body("answer");
        if self.answer.trim().is_empty() {
            reader.invalid("answer", "Answer", "cannot be empty");
        }
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for PortfolioItem {
    const KIND: &'static str = "portfolio";
    const LABEL: &'static str = "Portfolio";
    const SINGULAR: &'static str = "case study";

    fn columns() -> Vec<&'static str> {
        vec!["Title", "Client", "Status", "Published"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.client.clone(),
            self.status.as_str().to_string(),
            date(self.published_at),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("title", "Title", &self.title).required(),
            FieldView::text("slug", "Slug", &self.slug).help("Leave blank to derive from the title."),
            FieldView::text("client", "Client", &self.client),
            FieldView::textarea("summary", "Summary", &self.summary),
            FieldView::markdown("body", "Case study", &self.body),
            FieldView::image("cover_image", "Cover image", &self.cover_image),
            FieldView::tags("tags", "Tags", &self.tags),
            FieldView::json("results", "Results (JSON)", &self.results)
                .help("JSON list of {\"label\", \"value\"} pairs."),
            status_field(self.status),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.title = reader.required("title", "Title");
        self.slug = reader.slug("slug", "Slug", &self.title);
        self.client = reader.text("client");
        self.summary = reader.text("summary");
        self.body = reader.body("body");
        self.cover_image = reader.text("cover_image");
        self.tags = reader.tags("tags");
        self.results = reader.json("results", std::mem::take(&mut self.results));
        self.status = reader.status("status");
        self.published_at = published_at(self.status, self.published_at);
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for Post {
    const KIND: &'static str = "posts";
    const LABEL: &'static str = "Blog posts";
    const SINGULAR: &'static str = "post";

    fn columns() -> Vec<&'static str> {
        vec!["Title", "Author", "Status", "Published"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.author.clone(),
            self.status.as_str().to_string(),
            date(self.published_at),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("title", "Title", &self.title).required(),
            FieldView::text("slug", "Slug", &self.slug).help("Leave blank to derive from the title."),
            FieldView::textarea("excerpt", "Excerpt", &self.excerpt),
            FieldView::markdown("body", "Body", &self.body),
            FieldView::image("cover_image", "Cover image", &self.cover_image),
            FieldView::text("author", "Author", &self.author),
            FieldView::tags("tags", "Tags", &self.tags),
            status_field(self.status),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.title = reader.required("title", "Title");
        self.slug = reader.slug("slug", "Slug", &self.title);
        self.excerpt = reader.text("excerpt");
        self.body = reader.body("body");
        self.cover_image = reader.text("cover_image");
        self.author = reader.text("author");
        self.tags = reader.tags("tags");
        self.status = reader.status("status");
        self.published_at = published_at(self.status, self.published_at);
        reader.finish()
    }
}

impl Editable for Page {
    const KIND: &'static str = "pages";
    const LABEL: &'static str = "Pages";
    const SINGULAR: &'static str = "page";

    fn columns() -> Vec<&'static str> {
        vec!["Title", "Path", "Status", "Updated"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            format!("/{}", self.slug),
            self.status.as_str().to_string(),
            date(self.updated_at),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("title", "Title", &self.title).required(),
            FieldView::text("slug", "Slug", &self.slug).help("Served at /{slug}."),
            FieldView::markdown("body", "Body", &self.body),
            status_field(self.status),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.title = reader.required("title", "Title");
        self.slug = reader.slug("slug", "Slug", &self.title);
        if Self::RESERVED.contains(&self.slug.as_str()) {
            reader.invalid("slug", "Slug", "is used by a built-in page");
        }
        self.body = reader.body("body");
        self.status = reader.status("status");
        self.updated_at = Some(Utc::now());
        reader.finish()
    }
}

impl Editable for SocialLink {
    const KIND: &'static str = "social";
    const LABEL: &'static str = "Social links";
    const SINGULAR: &'static str = "link";

    fn columns() -> Vec<&'static str> {
        vec!["Platform", "URL", "Position"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.platform.clone(),
            self.url.clone(),
            self.position.to_string(),
        ]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("platform", "Platform", &self.platform).required(),
            FieldView::url("url", "URL", &self.url).required(),
            FieldView::number("position", "Position", self.position),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.platform = reader.required("platform", "Platform");
        self.url = reader.required("url", "URL");
        self.position = reader.number("position", "Position", 0);
        reader.finish()
    }
}

impl Editable for SiteToken {
    const KIND: &'static str = "tokens";
    const LABEL: &'static str = "Site tokens";
    const SINGULAR: &'static str = "token";

    fn columns() -> Vec<&'static str> {
        vec!["Name", "Description"]
    }

    // Values stay out of the listing.
    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), truncate(&self.description, 80)]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("name", "Name", &self.name)
                .required()
                .help("Rendered as a meta tag named after the token."),
            FieldView::text("value", "Value", &self.value),
            FieldView::text("description", "Description", &self.description),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.name = reader.required("name", "Name");
        self.value = reader.text("value");
        self.description = reader.text("description");
        reader.finish()
    }
}

impl Editable for SiteSettings {
    const KIND: &'static str = "settings";
    const LABEL: &'static str = "Site settings";
    const SINGULAR: &'static str = "settings";

    fn columns() -> Vec<&'static str> {
        vec!["Site name", "Contact email"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.site_name.clone(), self.contact_email.clone()]
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::text("site_name", "Site name", &self.site_name).required(),
            FieldView::text("tagline", "Tagline", &self.tagline),
            FieldView::email("contact_email", "Contact email", &self.contact_email),
            FieldView::image("logo_url", "Logo", &self.logo_url),
            FieldView::text("footer_text", "Footer text", &self.footer_text),
        ]
    }

    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors> {
        let mut reader = FormReader::new(form);
        self.site_name = reader.required("site_name", "Site name");
        self.tagline = reader.text("tagline");
        self.contact_email = reader.email("contact_email", "Contact email");
        self.logo_url = reader.text("logo_url");
        self.footer_text = reader.text("footer_text");
        self.updated_at = Some(Utc::now());
        reader.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forgepilot_core::ResultMetric;
    use rust_decimal::Decimal;

    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_portfolio_malformed_results_keep_stored_value() {
        let mut item = PortfolioItem {
            title: "Acme".into(),
            slug: "acme".into(),
            results: vec![ResultMetric {
                label: "Conversion".into(),
                value: "+32%".into(),
            }],
            ..Default::default()
        };
        let data = form(&[
            ("title", "Acme relaunch"),
            ("slug", "acme"),
            ("results", "{not json"),
            ("status", "published"),
        ]);

        item.apply_and_validate(&data).unwrap();
        assert_eq!(item.title, "Acme relaunch");
        assert_eq!(item.results.len(), 1);
        assert_eq!(item.results[0].value, "+32%");
        assert!(item.published_at.is_some());
    }

    #[test]
    fn test_portfolio_results_field_is_labelled_json() {
        let item = PortfolioItem {
            results: vec![ResultMetric {
                label: "Conversion".into(),
                value: "+32%".into(),
            }],
            ..Default::default()
        };
        let fields = item.fields();
        let results = fields.iter().find(|f| f.name == "results").unwrap();
        assert_eq!(results.label, "Results (JSON)");
        assert_eq!(results.kind, "json");
        assert!(results.value.contains("Conversion"));
    }

    #[test]
    fn test_post_slug_derived_and_publish_stamped_once() {
        let mut post = Post::default();
        post.apply_and_validate(&form(&[("title", "Shipping Faster"), ("status", "published")]))
            .unwrap();
        assert_eq!(post.slug, "shipping-faster");
        let first = post.published_at.unwrap();

        post.apply_and_validate(&form(&[("title", "Shipping Faster"), ("status", "draft")]))
            .unwrap();
        assert_eq!(post.published_at, Some(first));
    }

    #[test]
    fn test_page_reserved_slug_rejected() {
        let mut page = Page::default();
        let errors = page
            .apply_and_validate(&form(&[("title", "Dashboard"), ("slug", "dashboard")]))
            .unwrap_err();
        assert!(errors.for_field("slug").is_some());
    }

    #[test]
    fn test_pricing_plan_reads_price_and_currency() {
        let mut plan = PricingPlan::default();
        plan.apply_and_validate(&form(&[
            ("name", "Growth"),
            ("price", "€4,500"),
            ("currency", "EUR"),
            ("features", "Design\nBuild"),
            ("highlighted", "on"),
        ]))
        .unwrap();
        assert_eq!(plan.price.amount, Decimal::new(4500, 0));
        assert_eq!(plan.price.currency_code, CurrencyCode::EUR);
        assert_eq!(plan.features, vec!["Design", "Build"]);
        assert!(plan.highlighted);
    }

    #[test]
    fn test_testimonial_rating_out_of_range() {
        let mut testimonial = Testimonial::default();
        let errors = testimonial
            .apply_and_validate(&form(&[
                ("author", "Dana"),
                ("quote", "Great work"),
                ("rating", "9"),
            ]))
            .unwrap_err();
        assert!(errors.for_field("rating").is_some());
    }

    #[test]
    fn test_section_unchecked_visibility_hides() {
        let mut section = Section::default();
        section
            .apply_and_validate(&form(&[("key", "team"), ("title", "Our team")]))
            .unwrap();
        assert_eq!(section.key, SectionKey::Team);
        assert!(!section.visible);
    }

    #[test]
    fn test_token_listing_hides_value() {
        let token = SiteToken {
            name: "ga".into(),
            value: "G-SECRET".into(),
            ..Default::default()
        };
        assert!(!token.cells().iter().any(|c| c.contains("G-SECRET")));
    }
}
