//! Seed the hosted backend with the built-in landing content.
//!
//! Only empty tables are touched, so running it twice is harmless and it
//! never overwrites edits made in the dashboard.

use forgepilot_backend::{Backend, BackendError};
use forgepilot_core::{
    Benefit, Faq, PricingPlan, Record, Section, Service, SiteSettings, TeamMember, Testimonial,
};
use forgepilot_site::content::defaults;
use tracing::info;

use super::connect;

/// Rows inserted into one table, or `None` when it already had content.
async fn seed_table<T: Record>(
    backend: &Backend,
    rows: Vec<T>,
) -> Result<Option<usize>, BackendError> {
    let repo = backend.repo::<T>();
    if !repo.list().await?.is_empty() {
        info!("  {}: already has rows, skipped", T::TABLE);
        return Ok(None);
    }
    for row in &rows {
        repo.insert(row).await?;
    }
    info!("  {}: {} rows inserted", T::TABLE, rows.len());
    Ok(Some(rows.len()))
}

/// Insert the default landing sections and their cards into empty tables.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or rejects a row.
/// Tables seeded before the failure keep their rows.
pub async fn landing() -> Result<(), Box<dyn std::error::Error>> {
    let backend = connect()?;
    info!("Seeding landing content");

    let results = [
        seed_table::<Section>(&backend, defaults::sections()).await?,
        seed_table::<Benefit>(&backend, defaults::benefits()).await?,
        seed_table::<Service>(&backend, defaults::services()).await?,
        seed_table::<PricingPlan>(&backend, defaults::pricing_plans()).await?,
        seed_table::<Testimonial>(&backend, defaults::testimonials()).await?,
        seed_table::<TeamMember>(&backend, defaults::team()).await?,
        seed_table::<Faq>(&backend, defaults::faqs()).await?,
        seed_table::<SiteSettings>(&backend, vec![defaults::settings()]).await?,
    ];

    let inserted: usize = results.iter().flatten().sum();
    let skipped = results.iter().filter(|r| r.is_none()).count();
    info!("Seeding complete!");
    info!("  Rows inserted: {inserted}");
    info!("  Tables skipped (already had content): {skipped}");
    Ok(())
}
