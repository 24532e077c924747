//! Integration tests for the dashboard route guard.

use axum::http::StatusCode;
use forgepilot_backend::{AuthEvent, AuthEventKind, MemoryBackend};
use forgepilot_integration_tests::TestApp;
use forgepilot_site::config::SessionMode;

const ADMIN_EMAIL: &str = "admin@agency.ai";
const ADMIN_PASSWORD: &str = "s3cure-pass";

async fn signed_in() -> TestApp {
    sign_in(TestApp::new().await).await
}

async fn sign_in(app: TestApp) -> TestApp {
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.location(), Some("/dashboard"));
    app
}

#[tokio::test]
async fn test_no_session_redirects_to_login() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for path in ["/dashboard", "/dashboard/faqs", "/dashboard/faqs/new", "/dashboard/admin"] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/admin-login"), "{path}");
    }
}

#[tokio::test]
async fn test_api_requests_get_unauthorized() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.get("/api/session/watch").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_writes_are_guarded_too() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .post_form("/dashboard/faqs/new", &[("question", "Q"), ("answer", "A")])
        .await;
    assert_eq!(response.location(), Some("/admin-login"));
    assert!(app.memory.rows("faqs").await.is_empty());
}

#[tokio::test]
async fn test_changed_admin_email_signs_out_existing_sessions() {
    let app = signed_in().await;
    assert_eq!(app.get("/dashboard").await.status, StatusCode::OK);

    app.configure_admin("ops@agency.ai", ADMIN_PASSWORD).await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.location(), Some("/admin-login"));

    // The identity was cleared, so restoring the email does not bring it back
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(app.get("/dashboard").await.location(), Some("/admin-login"));
}

#[tokio::test]
async fn test_unknown_configuration_shows_checking_page() {
    let app = signed_in().await;
    app.store_credential(None, None).await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Checking your session"));
    assert!(response.body.contains("http-equiv=\"refresh\""));
}

#[tokio::test]
async fn test_dashboard_pages_render_for_the_admin() {
    let app = signed_in().await;

    for path in [
        "/dashboard/sections",
        "/dashboard/benefits",
        "/dashboard/services",
        "/dashboard/pricing",
        "/dashboard/testimonials",
        "/dashboard/team",
        "/dashboard/faqs",
        "/dashboard/portfolio",
        "/dashboard/posts",
        "/dashboard/pages",
        "/dashboard/social",
        "/dashboard/tokens",
        "/dashboard/leads",
        "/dashboard/settings",
        "/dashboard/admin",
        "/dashboard/faqs/new",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_watch_starts_authenticated() {
    let app = signed_in().await;

    let mut watch = app.open_events("/api/session/watch").await;
    assert_eq!(watch.status, StatusCode::OK);
    assert_eq!(watch.next_event("state").await.as_deref(), Some("authenticated"));
}

#[tokio::test]
async fn test_watch_reports_sign_out() {
    let app = sign_in(TestApp::with_config(|config| config.session_mode = SessionMode::Hosted).await)
        .await;
    let mut watch = app.open_events("/api/session/watch").await;
    assert_eq!(watch.next_event("state").await.as_deref(), Some("authenticated"));

    // Unrelated events leave a valid session alone
    app.state
        .auth_events()
        .emit(AuthEvent::new(AuthEventKind::SignedIn, None));
    assert_eq!(watch.next_event("state").await.as_deref(), Some("authenticated"));

    app.post_form("/logout", &[]).await;
    assert_eq!(watch.next_event("state").await.as_deref(), Some("unauthenticated"));
    // The stream ends after signing out
    assert_eq!(watch.next_event("state").await, None);
}

#[tokio::test]
async fn test_watch_reports_admin_email_change() {
    let app = signed_in().await;
    let mut watch = app.open_events("/api/session/watch").await;
    assert_eq!(watch.next_event("state").await.as_deref(), Some("authenticated"));

    let response = app
        .post_form(
            "/dashboard/admin",
            &[("email", "ops@agency.ai"), ("password", ""), ("confirm", "")],
        )
        .await;
    assert_eq!(response.location(), Some("/dashboard/admin"));

    assert_eq!(watch.next_event("state").await.as_deref(), Some("unauthenticated"));
}

#[tokio::test]
async fn test_expired_hosted_session_survives_the_watch() {
    // Sessions are issued inside the expiry leeway, so every guarded request
    // has to refresh.
    let memory = MemoryBackend::new().with_session_ttl(chrono::Duration::seconds(1));
    let app = sign_in(
        TestApp::with_backend(memory, |config| config.session_mode = SessionMode::Hosted).await,
    )
    .await;
    assert_eq!(app.get("/dashboard").await.status, StatusCode::OK);

    let mut watch = app.open_events("/api/session/watch").await;
    assert_eq!(watch.next_event("state").await.as_deref(), Some("authenticated"));

    app.state
        .auth_events()
        .emit(AuthEvent::new(AuthEventKind::TokenRefreshed, None));
    // The stream leaves the refresh to the next page request
    assert_eq!(watch.next_event("state").await.as_deref(), Some("checking"));

    for _ in 0..2 {
        let response = app.get("/dashboard").await;
        assert_eq!(response.status, StatusCode::OK);
    }
}
