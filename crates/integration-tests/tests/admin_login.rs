//! Integration tests for the admin credential gate.
//!
//! These drive `/admin-login` end to end: form post, session cookie,
//! redirect, and the first dashboard render.

use axum::http::StatusCode;
use forgepilot_integration_tests::{TEST_BCRYPT_COST, TestApp};
use forgepilot_site::config::SessionMode;
use forgepilot_site::services::auth::{LEGACY_DEFAULT_PASSWORD, PasswordPolicy, hash_password};

const ADMIN_EMAIL: &str = "admin@agency.ai";
const ADMIN_PASSWORD: &str = "s3cure-pass";

// =============================================================================
// Successful Login
// =============================================================================

#[tokio::test]
async fn test_login_ignores_email_case_and_opens_dashboard() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.login("Admin@Agency.AI", ADMIN_PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/dashboard"));

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("Overview"));
    assert!(dashboard.body.contains("Admin@Agency.AI"));
}

#[tokio::test]
async fn test_hosted_session_mode_signs_in_with_the_auth_service() {
    let app = TestApp::with_config(|config| config.session_mode = SessionMode::Hosted).await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.location(), Some("/dashboard"));

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains(ADMIN_EMAIL));
}

#[tokio::test]
async fn test_hosted_rejection_is_shown_verbatim() {
    let app = TestApp::with_config(|config| config.session_mode = SessionMode::Hosted).await;
    // Credential row matches, but no hosted user exists for it
    let hash = hash_password(ADMIN_PASSWORD, TEST_BCRYPT_COST).unwrap();
    app.store_credential(Some(ADMIN_EMAIL), Some(&hash)).await;

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid login credentials"));
}

#[tokio::test]
async fn test_login_page_skips_to_dashboard_when_signed_in() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.get("/admin-login").await;
    assert_eq!(response.location(), Some("/dashboard"));
}

// =============================================================================
// Refused Logins
// =============================================================================

#[tokio::test]
async fn test_wrong_password_and_wrong_email_read_the_same() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let wrong_password = app.login(ADMIN_EMAIL, "not-the-password").await;
    let wrong_email = app.login("someone@agency.ai", ADMIN_PASSWORD).await;

    for response in [wrong_password, wrong_email] {
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Invalid email or password"));
    }
    assert_eq!(app.get("/dashboard").await.location(), Some("/admin-login"));
}

#[tokio::test]
async fn test_unconfigured_site_blocks_the_form() {
    let app = TestApp::new().await;

    let page = app.get("/admin-login").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No admin credentials configured"));
    assert!(page.body.contains("disabled"));

    let response = app.login(ADMIN_EMAIL, LEGACY_DEFAULT_PASSWORD).await;
    assert!(response.body.contains("No admin credentials configured"));
}

#[tokio::test]
async fn test_email_without_hash_is_not_configured() {
    let app = TestApp::new().await;
    app.store_credential(Some(ADMIN_EMAIL), None).await;

    let response = app.login(ADMIN_EMAIL, LEGACY_DEFAULT_PASSWORD).await;
    assert!(response.body.contains("No admin credentials configured"));
}

// =============================================================================
// Password Policies
// =============================================================================

#[tokio::test]
async fn test_strict_policy_rejects_plain_text_hash() {
    let app = TestApp::new().await;
    app.store_credential(Some(ADMIN_EMAIL), Some(LEGACY_DEFAULT_PASSWORD))
        .await;

    let response = app.login(ADMIN_EMAIL, LEGACY_DEFAULT_PASSWORD).await;
    assert!(response.body.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_legacy_policy_accepts_historical_default() {
    let app = TestApp::with_config(|config| {
        config.session_mode = SessionMode::Local;
        config.password_policy = PasswordPolicy::Legacy;
    })
    .await;
    app.store_credential(Some(ADMIN_EMAIL), Some(LEGACY_DEFAULT_PASSWORD))
        .await;

    let response = app.login(ADMIN_EMAIL, LEGACY_DEFAULT_PASSWORD).await;
    assert_eq!(response.location(), Some("/dashboard"));

    let admin_page = app.get("/dashboard/admin").await;
    assert!(admin_page.body.contains("legacy password policy is active"));
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestApp::new().await;
    app.configure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.location(), Some("/admin-login"));
    assert_eq!(app.get("/dashboard").await.location(), Some("/admin-login"));
}

#[tokio::test]
async fn test_auth_alias_redirects_to_login() {
    let app = TestApp::new().await;
    let response = app.get("/auth").await;
    assert_eq!(response.location(), Some("/admin-login"));
}
