//! Admin credential commands.
//!
//! # Usage
//!
//! ```bash
//! fp-cli admin set -e admin@agency.ai -p 's3cure-pass'
//! fp-cli admin show
//! fp-cli admin check -e admin@agency.ai -p 's3cure-pass' --legacy
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_URL`, `BACKEND_ANON_KEY`, `BACKEND_SERVICE_KEY` - hosted backend
//! - `FORGEPILOT_ADMIN_PASSWORD` - password for `admin set` when `-p` is omitted

use chrono::Utc;
use forgepilot_core::{AdminCredential, Email};
use forgepilot_site::services::auth::{self, GateError, MIN_PASSWORD_LENGTH, PasswordPolicy};
use thiserror::Error;

use super::connect;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password shorter than the minimum.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// bcrypt failed (usually an out-of-range cost).
    #[error("Hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// The stored credential rejected the attempt.
    #[error("Login would be refused: {0}")]
    Refused(GateError),
}

fn validate(email: &str, password: &str) -> Result<Email, AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::PasswordTooShort);
    }
    Ok(email)
}

/// Hash `password` and upsert the single `admin_config` row.
///
/// Sessions signed in under a different email are rejected by the site on
/// their next request.
///
/// # Errors
///
/// Returns an error if the input is invalid, hashing fails, or the backend
/// rejects the write.
pub async fn set(email: &str, password: &str, cost: u32) -> Result<(), Box<dyn std::error::Error>> {
    let email = validate(email, password)?;
    let hash = {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
            .await?
            .map_err(AdminError::from)?
    };

    let backend = connect()?;
    let repo = backend.repo::<AdminCredential>();
    let existing = repo.single().await?;

    repo.save(&AdminCredential {
        id: existing.as_ref().and_then(|c| c.id),
        admin_email: Some(email.normalized()),
        admin_password_hash: Some(hash),
        updated_at: Some(Utc::now()),
    })
    .await?;

    match existing.and_then(|c| c.email()) {
        Some(previous) if !previous.matches(email.as_str()) => tracing::info!(
            "Admin credential updated: {} -> {} (existing sessions will be signed out)",
            previous,
            email
        ),
        _ => tracing::info!("Admin credential set for {}", email),
    }
    tracing::warn!(
        "The hosted auth user is not changed; create or update it in the backend console if ADMIN_SESSION_MODE=hosted"
    );
    Ok(())
}

/// Print the configured admin email.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let backend = connect()?;
    let credential = backend
        .repo::<AdminCredential>()
        .single()
        .await?
        .unwrap_or_default();

    match credential.email() {
        Some(email) => tracing::info!("Admin email: {}", email),
        None => tracing::warn!("No admin email is configured"),
    }
    if credential.password_hash().is_none() {
        tracing::warn!("No admin password is configured");
    }
    if let Some(updated_at) = credential.updated_at {
        tracing::info!("Last updated: {}", updated_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

/// Run the credential gate against the stored row without signing in.
///
/// # Errors
///
/// Returns [`AdminError::Refused`] when the site would reject the attempt.
pub async fn check(
    email: &str,
    password: &str,
    legacy: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = if legacy {
        PasswordPolicy::Legacy
    } else {
        PasswordPolicy::Strict
    };

    let backend = connect()?;
    let credential = backend
        .repo::<AdminCredential>()
        .single()
        .await?
        .unwrap_or_default();

    let (email, password) = (email.to_string(), password.to_string());
    let verified = tokio::task::spawn_blocking(move || {
        auth::check(&email, &password, &credential, policy)
    })
    .await?
    .map_err(AdminError::Refused)?;

    tracing::info!("Login would be accepted for {} (policy: {})", verified, policy);
    Ok(())
}

/// Print a bcrypt hash of `password`.
///
/// # Errors
///
/// Returns [`AdminError::Hash`] for an out-of-range cost.
#[allow(clippy::print_stdout)]
pub fn hash(password: &str, cost: u32) -> Result<(), AdminError> {
    let hash = auth::hash_password(password, cost)?;
    println!("{hash}");
    Ok(())
}
