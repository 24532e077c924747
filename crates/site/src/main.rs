//! ForgePilot site - marketing pages and the admin dashboard.
//!
//! This binary serves both on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - Hosted backend-as-a-service for tables, storage and auth
//! - In-memory sessions (identity and flash messages only)
//!
//! Set `FORGEPILOT_BACKEND=memory` to run without a hosted project; the
//! admin from `FORGEPILOT_ADMIN_EMAIL`/`FORGEPILOT_ADMIN_PASSWORD` is seeded
//! at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::Utc;
use forgepilot_backend::{Backend, MemoryBackend};
use forgepilot_core::AdminCredential;
use forgepilot_site::build_router;
use forgepilot_site::config::{BackendMode, MemoryAdmin, SiteConfig};
use forgepilot_site::services::auth::{PasswordPolicy, hash_password};
use forgepilot_site::state::AppState;
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            // Public site: keep visitor data out of reports
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Store the configured admin in a fresh memory backend.
async fn seed_memory_admin(
    memory: &MemoryBackend,
    backend: &Backend,
    admin: &MemoryAdmin,
    cost: u32,
) -> Result<(), String> {
    let password = admin.password.expose_secret().to_string();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    backend
        .repo::<AdminCredential>()
        .insert(&AdminCredential {
            id: None,
            admin_email: Some(admin.email.clone()),
            admin_password_hash: Some(hash),
            updated_at: Some(Utc::now()),
        })
        .await
        .map_err(|e| e.to_string())?;
    memory
        .add_user(&admin.email, admin.password.expose_secret())
        .await;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = SiteConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "forgepilot_site=info,forgepilot_backend=info,tower_http=debug".into());

    // Use JSON format on Fly.io for structured log parsing, text format locally
    let is_fly = std::env::var("FLY_APP_NAME").is_ok();
    let json_layer = is_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_fly).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let backend = match &config.backend {
        BackendMode::Hosted(backend_config) => {
            let backend = Backend::hosted(backend_config).expect("Failed to create backend client");
            tracing::info!(url = %backend_config.url, "Using hosted backend");
            backend
        }
        BackendMode::Memory => {
            let memory = MemoryBackend::new();
            let backend = Backend::memory(memory.clone());
            match &config.memory_admin {
                Some(admin) => {
                    seed_memory_admin(&memory, &backend, admin, config.bcrypt_cost)
                        .await
                        .expect("Failed to seed memory admin");
                    tracing::info!(email = %admin.email, "Using memory backend with seeded admin");
                }
                None => tracing::warn!(
                    "Using memory backend without an admin; the dashboard will be unreachable"
                ),
            }
            backend
        }
    };

    if config.password_policy == PasswordPolicy::Legacy {
        tracing::warn!("ADMIN_PASSWORD_POLICY=legacy accepts default and plain-text passwords");
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, backend);

    let app = build_router(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("site listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
