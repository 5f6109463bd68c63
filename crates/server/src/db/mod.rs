//! Database operations for `PostgreSQL`.
//!
//! # Schema: `ops`
//!
//! ## Tables
//!
//! - `store` - Restaurant locations
//! - `employee` - Staff accounts (password hashes, roles)
//! - `store_settings` - Per-store settings (JSONB)
//! - `shift_checklist_item` - Checklist items; replaced lists are deactivated, not deleted
//! - `shift_checklist_completion` - Submitted checklists with an item snapshot (JSONB)
//! - `waste_entry` - Recorded food waste
//! - `setup_template` / `setup_sheet` - Weekly position layouts (JSONB days)
//! - `evaluation_360` / `evaluation_360_rater` - Multi-rater evaluations
//! - `leadership_reflection` - Leader reflections
//! - `documentation` - Employee documentation (soft deleted)
//!
//! Every repository method that reads or writes store data takes the
//! caller's `StoreId` and filters on it.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p mise-cli -- migrate
//! ```

pub mod checklists;
pub mod documentation;
pub mod employees;
pub mod evaluations;
pub mod reflections;
pub mod settings;
pub mod setup_sheets;
pub mod stores;
pub mod waste;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use checklists::ChecklistRepository;
pub use documentation::DocumentationRepository;
pub use employees::EmployeeRepository;
pub use evaluations::EvaluationRepository;
pub use reflections::ReflectionRepository;
pub use settings::SettingsRepository;
pub use setup_sheets::SetupSheetRepository;
pub use stores::StoreRepository;
pub use waste::WasteRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`] with `message`.
    pub(crate) fn unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
