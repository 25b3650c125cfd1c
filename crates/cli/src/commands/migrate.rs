//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ch-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string, or
//! - `DB_USER`, `DB_PASS`, `DB_HOST`, `DB_PORT`, `DB_NAME`
//!
//! Migrations live in `crates/server/migrations/`.

use contest_hub_server::config::DatabaseConfig;
use contest_hub_server::store::PgDocumentStore;

/// Apply pending migrations to the document database.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;

    tracing::info!("Connecting to document database...");
    let store = PgDocumentStore::connect(&config).await?;

    tracing::info!("Running migrations...");
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
