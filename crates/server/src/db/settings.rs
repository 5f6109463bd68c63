//! Store settings repository.

use sqlx::PgPool;
use sqlx::types::Json;

use mise_core::{EmployeeId, StoreId};

use super::RepositoryError;
use crate::models::StoreSettings;

/// Repository for per-store settings.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A store's settings, or the defaults if none were saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, store: StoreId) -> Result<StoreSettings, RepositoryError> {
        let settings: Option<Json<StoreSettings>> =
            sqlx::query_scalar("SELECT settings FROM ops.store_settings WHERE store_id = $1")
                .bind(store)
                .fetch_optional(self.pool)
                .await?;

        Ok(settings.map(|s| s.0).unwrap_or_default())
    }

    /// Replace a store's settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn put(
        &self,
        store: StoreId,
        settings: &StoreSettings,
        updated_by: EmployeeId,
    ) -> Result<StoreSettings, RepositoryError> {
        let Json(saved): Json<StoreSettings> = sqlx::query_scalar(
            r"
            INSERT INTO ops.store_settings (store_id, settings, updated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (store_id) DO UPDATE
            SET settings = EXCLUDED.settings,
                updated_by = EXCLUDED.updated_by,
                updated_at = now()
            RETURNING settings
            ",
        )
        .bind(store)
        .bind(Json(settings))
        .bind(updated_by)
        .fetch_one(self.pool)
        .await?;

        Ok(saved)
    }
}
