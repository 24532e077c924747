//! Integration tests for dashboard create, edit and delete flows.

use axum::http::StatusCode;
use forgepilot_core::{Faq, PortfolioItem, PublishStatus, ResultMetric, SiteSettings};
use forgepilot_integration_tests::TestApp;

const ADMIN_EMAIL: &str = "admin@agency.ai";
const ADMIN_PASSWORD: &str = "s3cure-pass";

async fn signed_in() -> TestApp {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app
}

// =============================================================================
// Create / Update / Delete
// =============================================================================

#[tokio::test]
async fn test_create_edit_delete_faq() {
    let app = signed_in().await;

    let created = app
        .post_form(
            "/dashboard/faqs/new",
            &[("question", "Do you sign NDAs?"), ("answer", "Always."), ("position", "2")],
        )
        .await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    assert_eq!(created.location(), Some("/dashboard/faqs"));

    let list = app.get("/dashboard/faqs").await;
    assert!(list.body.contains("Do you sign NDAs?"));
    assert!(list.body.contains("Question created"));

    let faq = app.backend().repo::<Faq>().list().await.unwrap().remove(0);
    let id = faq.id.unwrap();
    assert_eq!(faq.position, 2);

    let updated = app
        .post_form(
            &format!("/dashboard/faqs/{id}"),
            &[("question", "Do you sign NDAs?"), ("answer", "Yes, mutual ones."), ("position", "2")],
        )
        .await;
    assert_eq!(updated.location(), Some("/dashboard/faqs"));
    let faq = app.backend().repo::<Faq>().get(id).await.unwrap();
    assert_eq!(faq.answer, "Yes, mutual ones.");

    let deleted = app.post_form(&format!("/dashboard/faqs/{id}/delete"), &[]).await;
    assert_eq!(deleted.location(), Some("/dashboard/faqs"));
    assert!(app.backend().repo::<Faq>().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_form_is_redisplayed_with_errors() {
    let app = signed_in().await;

    let response = app
        .post_form("/dashboard/faqs/new", &[("question", ""), ("answer", ""), ("position", "abc")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("field-error"));
    assert!(app.memory.rows("faqs").await.is_empty());
}

#[tokio::test]
async fn test_unknown_row_is_not_found() {
    let app = signed_in().await;

    let response = app
        .get("/dashboard/faqs/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/dashboard/faqs/not-an-id").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Lenient JSON Fields
// =============================================================================

#[tokio::test]
async fn test_malformed_results_keep_stored_value() {
    let app = signed_in().await;
    let stored = app
        .backend()
        .repo::<PortfolioItem>()
        .insert(&PortfolioItem {
            title: "Acme replatform".into(),
            slug: "acme-replatform".into(),
            results: vec![ResultMetric {
                label: "Conversion".into(),
                value: "+38%".into(),
            }],
            ..Default::default()
        })
        .await
        .unwrap();
    let id = stored.id.unwrap();

    let response = app
        .post_form(
            &format!("/dashboard/portfolio/{id}"),
            &[
                ("title", "Acme replatform"),
                ("slug", "acme-replatform"),
                ("results", "[{\"label\": \"Conversion\", "),
                ("status", "published"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/dashboard/portfolio"));

    let item = app.backend().repo::<PortfolioItem>().get(id).await.unwrap();
    assert_eq!(item.results.len(), 1);
    assert_eq!(item.results[0].value, "+38%");
    assert_eq!(item.status, PublishStatus::Published);
    assert!(item.published_at.is_some());
}

// =============================================================================
// Settings and Admin Account
// =============================================================================

#[tokio::test]
async fn test_settings_save_updates_public_layout() {
    let app = signed_in().await;

    let response = app
        .post_form(
            "/dashboard/settings",
            &[
                ("site_name", "Forge Studio"),
                ("tagline", "We ship"),
                ("contact_email", "hello@forge.studio"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/dashboard/settings"));

    let settings = app
        .backend()
        .repo::<SiteSettings>()
        .single()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settings.site_name, "Forge Studio");

    let home = app.get("/").await;
    assert!(home.body.contains("Forge Studio"));
}

#[tokio::test]
async fn test_admin_form_changes_email_and_locks_out_session() {
    let app = signed_in().await;

    let response = app
        .post_form(
            "/dashboard/admin",
            &[("email", "Ops@Agency.AI"), ("password", ""), ("confirm", "")],
        )
        .await;
    assert_eq!(response.location(), Some("/dashboard/admin"));

    let credential = app.state.admin_credential().await.unwrap();
    assert_eq!(credential.admin_email.as_deref(), Some("ops@agency.ai"));

    // The saving session itself no longer matches
    assert_eq!(app.get("/dashboard").await.location(), Some("/admin-login"));

    // The old password still works with the new email
    let response = app.login("ops@agency.ai", ADMIN_PASSWORD).await;
    assert_eq!(response.location(), Some("/dashboard"));
}

#[tokio::test]
async fn test_admin_form_rejects_mismatched_passwords() {
    let app = signed_in().await;

    let response = app
        .post_form(
            "/dashboard/admin",
            &[
                ("email", ADMIN_EMAIL),
                ("password", "brand-new-pass"),
                ("confirm", "brand-new-typo"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Passwords do not match"));

    // Nothing changed
    app.clear_cookies();
    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.location(), Some("/dashboard"));
}

#[tokio::test]
async fn test_admin_form_sets_new_password() {
    let app = signed_in().await;

    let response = app
        .post_form(
            "/dashboard/admin",
            &[
                ("email", ADMIN_EMAIL),
                ("password", "brand-new-pass"),
                ("confirm", "brand-new-pass"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/dashboard/admin"));

    app.clear_cookies();
    let old = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert!(old.body.contains("Invalid email or password"));
    let new = app.login(ADMIN_EMAIL, "brand-new-pass").await;
    assert_eq!(new.location(), Some("/dashboard"));
}

// =============================================================================
// Uploads
// =============================================================================

fn multipart(content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"--XBOUNDARY\r\n");
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"logo\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");
    body
}

#[tokio::test]
async fn test_image_upload_returns_public_url() {
    let app = signed_in().await;

    let response = app
        .post_body(
            "/dashboard/uploads",
            "multipart/form-data; boundary=XBOUNDARY",
            multipart("image/png", b"\x89PNG\r\n\x1a\nfake"),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("/media/media/uploads/"));
    assert!(url.ends_with(".png"));

    let served = app.get(url).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.headers["content-type"], "image/png");
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let app = signed_in().await;

    let response = app
        .post_body(
            "/dashboard/uploads",
            "multipart/form-data; boundary=XBOUNDARY",
            multipart("text/html", b"<script>alert(1)</script>"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
