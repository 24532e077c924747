//! Subcommand implementations.

pub mod admin;
pub mod seed;

use forgepilot_backend::Backend;
use forgepilot_site::config::backend_from_env;

/// Connect to the hosted backend configured in the environment.
fn connect() -> Result<Backend, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = backend_from_env()?;
    tracing::debug!(url = %config.url, "Connecting to backend");
    Ok(Backend::hosted(&config)?)
}
