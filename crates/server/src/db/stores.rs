//! Store repository.

use sqlx::PgPool;

use mise_core::StoreId;

use super::RepositoryError;
use crate::models::Store;

/// Repository for store records.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store number is taken.
    pub async fn create(&self, name: &str, number: &str) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            INSERT INTO ops.store (name, number)
            VALUES ($1, $2)
            RETURNING id, name, number, created_at
            ",
        )
        .bind(name.trim())
        .bind(number.trim())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "store number already exists"))
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(sqlx::query_as::<_, Store>(
            "SELECT id, name, number, created_at FROM ops.store WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?)
    }
}
