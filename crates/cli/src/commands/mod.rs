//! CLI command implementations.

pub mod employee;
pub mod migrate;
pub mod seed;
pub mod store;

use sqlx::PgPool;
use thiserror::Error;

use mise_server::config::{self, ConfigError};
use mise_server::db::{self, RepositoryError};
use mise_server::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// Connect using `MISE_DATABASE_URL`.
async fn connect() -> Result<PgPool, CliError> {
    let database_url = config::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
