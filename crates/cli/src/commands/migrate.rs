//! Database migrations.
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server crate.

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    mise_server::db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
