//! Waste entry repository.

use chrono::NaiveDate;
use sqlx::PgPool;

use mise_core::{EmployeeId, StoreId, WasteEntryId, WasteReason};

use super::RepositoryError;
use crate::models::{WasteEntry, WasteEntryInput};

macro_rules! waste_columns {
    () => {
        "id, store_id, shift_date, item_name, quantity, unit, cost, reason, notes, recorded_by, created_at, updated_at"
    };
}

/// Filters for listing waste entries. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasteFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub reason: Option<WasteReason>,
}

/// Repository for waste entries.
pub struct WasteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WasteRepository<'a> {
    /// Create a new waste repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a waste entry. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store: StoreId,
        recorded_by: EmployeeId,
        shift_date: NaiveDate,
        input: &WasteEntryInput,
    ) -> Result<WasteEntry, RepositoryError> {
        Ok(sqlx::query_as::<_, WasteEntry>(concat!(
            "INSERT INTO ops.waste_entry ",
            "(store_id, shift_date, item_name, quantity, unit, cost, reason, notes, recorded_by) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            waste_columns!()
        ))
        .bind(store)
        .bind(shift_date)
        .bind(&input.item_name)
        .bind(input.quantity)
        .bind(&input.unit)
        .bind(input.cost)
        .bind(input.reason)
        .bind(input.notes.as_deref())
        .bind(recorded_by)
        .fetch_one(self.pool)
        .await?)
    }

    /// Get one entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store: StoreId,
        id: WasteEntryId,
    ) -> Result<Option<WasteEntry>, RepositoryError> {
        Ok(sqlx::query_as::<_, WasteEntry>(concat!(
            "SELECT ",
            waste_columns!(),
            " FROM ops.waste_entry WHERE store_id = $1 AND id = $2"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?)
    }

    /// List entries, newest shift first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store: StoreId,
        filter: WasteFilter,
    ) -> Result<Vec<WasteEntry>, RepositoryError> {
        Ok(sqlx::query_as::<_, WasteEntry>(concat!(
            "SELECT ",
            waste_columns!(),
            " FROM ops.waste_entry WHERE store_id = $1",
            " AND ($2::date IS NULL OR shift_date >= $2)",
            " AND ($3::date IS NULL OR shift_date <= $3)",
            " AND ($4::ops.waste_reason IS NULL OR reason = $4)",
            " ORDER BY shift_date DESC, created_at DESC"
        ))
        .bind(store)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.reason)
        .fetch_all(self.pool)
        .await?)
    }

    /// Entries for one shift date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_date(
        &self,
        store: StoreId,
        shift_date: NaiveDate,
    ) -> Result<Vec<WasteEntry>, RepositoryError> {
        self.list(
            store,
            WasteFilter {
                from: Some(shift_date),
                to: Some(shift_date),
                reason: None,
            },
        )
        .await
    }

    /// Overwrite an entry. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn update(
        &self,
        store: StoreId,
        id: WasteEntryId,
        shift_date: NaiveDate,
        input: &WasteEntryInput,
    ) -> Result<WasteEntry, RepositoryError> {
        sqlx::query_as::<_, WasteEntry>(concat!(
            "UPDATE ops.waste_entry SET shift_date = $3, item_name = $4, quantity = $5, ",
            "unit = $6, cost = $7, reason = $8, notes = $9, updated_at = now() ",
            "WHERE store_id = $1 AND id = $2 RETURNING ",
            waste_columns!()
        ))
        .bind(store)
        .bind(id)
        .bind(shift_date)
        .bind(&input.item_name)
        .bind(input.quantity)
        .bind(&input.unit)
        .bind(input.cost)
        .bind(input.reason)
        .bind(input.notes.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete(&self, store: StoreId, id: WasteEntryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ops.waste_entry WHERE store_id = $1 AND id = $2")
            .bind(store)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
