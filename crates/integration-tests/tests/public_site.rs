//! Integration tests for the public marketing site.

use axum::http::StatusCode;
use forgepilot_core::{Page, PortfolioItem, Post, PublishStatus};
use forgepilot_integration_tests::TestApp;

// =============================================================================
// Landing Page
// =============================================================================

#[tokio::test]
async fn test_home_renders_built_in_content_on_empty_backend() {
    let app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("ForgePilot"));
    assert!(response.body.contains("Ship your product faster"));
    assert!(response.body.contains("id=\"contact\""));
    assert!(response.body.contains("application/ld+json"));
}

#[tokio::test]
async fn test_security_headers_carry_the_page_nonce() {
    let app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");

    let csp = response.headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("script-src 'self' 'nonce-"));
    assert!(response.body.contains("nonce=\""));

    // A fresh nonce per response
    let again = app.get("/").await;
    assert_ne!(csp, again.headers["content-security-policy"].to_str().unwrap());
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");

    let response = app.get("/health/ready").await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Lead Capture
// =============================================================================

#[tokio::test]
async fn test_contact_form_stores_a_lead() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/contact",
            &[
                ("name", "Dana Reyes"),
                ("email", "dana@example.com"),
                ("company", "Acme"),
                ("message", "We need a new checkout."),
                ("website", ""),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/#contact"));

    let leads = app.memory.rows("leads").await;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["email"], "dana@example.com");
    assert_eq!(leads[0]["company"], "Acme");
}

#[tokio::test]
async fn test_contact_honeypot_is_dropped_silently() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/contact",
            &[
                ("name", "Bot"),
                ("email", "bot@example.com"),
                ("message", "Cheap links"),
                ("website", "http://spam.example"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/#contact"));
    assert!(app.memory.rows("leads").await.is_empty());
}

#[tokio::test]
async fn test_contact_form_rejects_bad_email() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/contact",
            &[("name", "Dana"), ("email", "nope"), ("message", "Hello")],
        )
        .await;
    assert_eq!(response.location(), Some("/#contact"));
    assert!(app.memory.rows("leads").await.is_empty());

    let home = app.get("/").await;
    assert!(home.body.contains("Please check the form"));
}

// =============================================================================
// Analytics
// =============================================================================

#[tokio::test]
async fn test_events_are_recorded() {
    let app = TestApp::new().await;

    let response = app
        .post_body(
            "/api/events",
            "text/plain;charset=UTF-8",
            br#"{"event": "cta_click", "path": "/", "referrer": "https://news.example"}"#.to_vec(),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let events = app.memory.rows("analytics_events").await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "cta_click");
    assert_eq!(events[0]["referrer"], "https://news.example");
}

#[tokio::test]
async fn test_malformed_events_are_accepted_and_ignored() {
    let app = TestApp::new().await;

    let response = app
        .post_body("/api/events", "application/json", b"{not json".to_vec())
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert!(app.memory.rows("analytics_events").await.is_empty());
}

// =============================================================================
// Published Content
// =============================================================================

#[tokio::test]
async fn test_only_published_posts_are_visible() {
    let app = TestApp::new().await;
    let posts = app.backend().repo::<Post>();
    posts
        .insert(&Post {
            title: "Shipping weekly".into(),
            slug: "shipping-weekly".into(),
            body: "We release every Thursday.".into(),
            status: PublishStatus::Published,
            published_at: Some(chrono::Utc::now()),
            ..Default::default()
        })
        .await
        .unwrap();
    posts
        .insert(&Post {
            title: "Unannounced pivot".into(),
            slug: "unannounced-pivot".into(),
            status: PublishStatus::Draft,
            ..Default::default()
        })
        .await
        .unwrap();

    let index = app.get("/blog").await;
    assert_eq!(index.status, StatusCode::OK);
    assert!(index.body.contains("Shipping weekly"));
    assert!(!index.body.contains("Unannounced pivot"));

    let post = app.get("/blog/shipping-weekly").await;
    assert_eq!(post.status, StatusCode::OK);
    assert!(post.body.contains("We release every Thursday."));

    let draft = app.get("/blog/unannounced-pivot").await;
    assert_eq!(draft.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_published_case_studies_are_visible() {
    let app = TestApp::new().await;
    app.backend()
        .repo::<PortfolioItem>()
        .insert(&PortfolioItem {
            title: "Acme replatform".into(),
            slug: "acme-replatform".into(),
            client: "Acme".into(),
            status: PublishStatus::Published,
            published_at: Some(chrono::Utc::now()),
            ..Default::default()
        })
        .await
        .unwrap();

    let index = app.get("/portfolio").await;
    assert!(index.body.contains("Acme replatform"));
    assert_eq!(app.get("/portfolio/acme-replatform").await.status, StatusCode::OK);
    assert_eq!(app.get("/portfolio/missing").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_by_slug() {
    let app = TestApp::new().await;
    let pages = app.backend().repo::<Page>();
    pages
        .insert(&Page {
            slug: "privacy".into(),
            title: "Privacy policy".into(),
            body: "We keep **very little**.".into(),
            status: PublishStatus::Published,
            ..Default::default()
        })
        .await
        .unwrap();
    pages
        .insert(&Page {
            slug: "careers".into(),
            title: "Careers".into(),
            body: "Not yet.".into(),
            status: PublishStatus::Draft,
            ..Default::default()
        })
        .await
        .unwrap();

    let page = app.get("/privacy").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<strong>very little</strong>"));

    assert_eq!(app.get("/careers").await.status, StatusCode::NOT_FOUND);

    let missing = app.get("/no-such-page").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.contains("Page not found"));
}
