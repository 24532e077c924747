//! Admin credential gate.
//!
//! Decides whether a submitted email and password may become an admin
//! session. There is exactly one admin, described by the `admin_config` row:
//!
//! 1. Load the row. No email or no hash means the site is not configured and
//!    every attempt fails with [`GateError::NotConfigured`].
//! 2. Compare emails ignoring case. A mismatch fails exactly like a bad
//!    password.
//! 3. Verify the password under the configured [`PasswordPolicy`].
//! 4. Clear any previous identity, rotate the session id, then either sign in
//!    against the hosted auth service or set the local flag.
//!
//! There is no lockout or attempt counting.

mod error;
mod password;

pub use error::GateError;
pub use password::{
    LEGACY_ADMIN_DIGEST, LEGACY_DEFAULT_PASSWORD, MIN_PASSWORD_LENGTH, PasswordPolicy,
    hash_password,
};

use forgepilot_backend::{AuthEvent, AuthEventKind, AuthSession};
use forgepilot_core::{AdminCredential, Email};
use tower_sessions::Session;
use tracing::instrument;

use crate::config::SessionMode;
use crate::middleware::guard::{clear_identity, session_identity};
use crate::middleware::Identity;
use crate::models::{LocalAdmin, keys};
use crate::state::AppState;

/// Fetch the admin credential row.
///
/// # Errors
///
/// Returns [`GateError::Backend`] if the backend call fails.
pub async fn load_credentials(state: &AppState) -> Result<AdminCredential, GateError> {
    Ok(state.admin_credential().await?)
}

/// Check a submitted email and password against the stored credential.
///
/// Returns the submitted email on success. Runs bcrypt, so call it off the
/// async runtime.
///
/// # Errors
///
/// - [`GateError::NotConfigured`] if no email or hash is stored
/// - [`GateError::InvalidCredentials`] if the email or password is wrong
pub fn check(
    email: &str,
    password: &str,
    credentials: &AdminCredential,
    policy: PasswordPolicy,
) -> Result<Email, GateError> {
    let (Some(configured), Some(hash)) = (credentials.email(), credentials.password_hash()) else {
        return Err(GateError::NotConfigured);
    };

    if !configured.matches(email) {
        return Err(GateError::InvalidCredentials);
    }

    if !policy.verify(password, hash) {
        return Err(GateError::InvalidCredentials);
    }

    Email::parse(email).map_err(|_| GateError::InvalidCredentials)
}

/// Run the full login flow for a form submission.
///
/// On success the session holds a fresh identity under a new id and the
/// caller should redirect to `/dashboard`.
///
/// # Errors
///
/// Any [`GateError`]; the caller re-renders the login page with
/// [`GateError::user_message`].
#[instrument(skip(state, session, password))]
pub async fn login(
    state: &AppState,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<Email, GateError> {
    let credentials = load_credentials(state).await?;
    let policy = state.config().password_policy;

    let verified = {
        let email = email.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || check(&email, &password, &credentials, policy))
            .await
            .map_err(|e| GateError::Internal(e.to_string()))??
    };

    clear_identity(session).await?;
    session.cycle_id().await?;

    match state.config().session_mode {
        SessionMode::Hosted => {
            let auth_session: AuthSession = state
                .backend()
                .auth()
                .sign_in_with_password(verified.as_str(), password)
                .await?;
            session.insert(keys::HOSTED_SESSION, &auth_session).await?;
        }
        SessionMode::Local => {
            session
                .insert(keys::LOCAL_ADMIN, LocalAdmin::new(verified.as_str()))
                .await?;
            state.auth_events().emit(AuthEvent {
                kind: AuthEventKind::SignedIn,
                user_id: None,
                email: Some(verified.to_string()),
            });
        }
    }

    tracing::info!(email = %verified, "Admin signed in");
    Ok(verified)
}

/// Sign out and destroy the session.
///
/// A failed hosted sign-out is logged; the local session is destroyed
/// regardless.
///
/// # Errors
///
/// Returns [`GateError::Session`] if the session store fails.
#[instrument(skip(state, session))]
pub async fn logout(state: &AppState, session: &Session) -> Result<(), GateError> {
    match session_identity(session).await {
        Some(Identity::Hosted(auth_session)) => {
            if let Err(e) = state.backend().auth().sign_out(&auth_session).await {
                tracing::warn!(error = %e, "Hosted sign-out failed");
            }
        }
        Some(Identity::Local(admin)) => {
            state.auth_events().emit(AuthEvent {
                kind: AuthEventKind::SignedOut,
                user_id: None,
                email: Some(admin.email),
            });
        }
        None => {}
    }

    session.flush().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn credentials(email: Option<&str>, hash: Option<&str>) -> AdminCredential {
        AdminCredential {
            admin_email: email.map(str::to_string),
            admin_password_hash: hash.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_unconfigured_fails_closed() {
        for creds in [
            credentials(None, None),
            credentials(Some("admin@agency.ai"), None),
            credentials(None, Some("admin123")),
            credentials(Some(""), Some("")),
        ] {
            let err = check("admin@agency.ai", "admin123", &creds, PasswordPolicy::Legacy)
                .unwrap_err();
            assert!(matches!(err, GateError::NotConfigured), "{creds:?}");
        }
    }

    #[test]
    fn test_email_case_is_ignored() {
        let hash = hash_password("s3cure-pass", 4).unwrap();
        let creds = credentials(Some("admin@agency.ai"), Some(&hash));

        let email = check("Admin@Agency.AI", "s3cure-pass", &creds, PasswordPolicy::Strict).unwrap();
        assert_eq!(email.as_str(), "Admin@Agency.AI");
    }

    #[test]
    fn test_email_and_password_mismatch_look_the_same() {
        let hash = hash_password("s3cure-pass", 4).unwrap();
        let creds = credentials(Some("admin@agency.ai"), Some(&hash));

        let wrong_email = check("ops@agency.ai", "s3cure-pass", &creds, PasswordPolicy::Strict)
            .unwrap_err();
        let wrong_password = check("admin@agency.ai", "nope", &creds, PasswordPolicy::Strict)
            .unwrap_err();

        assert_eq!(wrong_email.user_message(), wrong_password.user_message());
        assert!(matches!(wrong_email, GateError::InvalidCredentials));
    }

    #[test]
    fn test_legacy_default_only_under_legacy_policy() {
        let creds = credentials(Some("admin@agency.ai"), Some(LEGACY_ADMIN_DIGEST));
        assert!(check("admin@agency.ai", "admin123", &creds, PasswordPolicy::Legacy).is_ok());
        assert!(check("admin@agency.ai", "admin124", &creds, PasswordPolicy::Legacy).is_err());
        assert!(check("admin@agency.ai", "admin123", &creds, PasswordPolicy::Strict).is_err());
    }
}
