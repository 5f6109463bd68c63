//! Shift checklist repository.
//!
//! A store has one active list per checklist type. Replacing a list
//! deactivates the old items and inserts the new ones in a single
//! transaction, so readers see either the old list or the new one.
//! Concurrent replacements of the same list are serialized with a
//! transaction-scoped advisory lock.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use mise_core::checklist::{ChecklistItemDraft, CompletedItem};
use mise_core::{ChecklistCompletionId, ChecklistType, EmployeeId, StoreId};

use super::RepositoryError;
use crate::models::{ChecklistCompletion, ChecklistItem};

macro_rules! item_columns {
    () => {
        "id, store_id, checklist_type, label, is_required, sort_order, is_active, created_by, created_at"
    };
}

macro_rules! completion_select {
    ($source:literal) => {
        concat!(
            "SELECT c.id, c.store_id, c.checklist_type, c.shift_date, c.completed_by, ",
            "e.name AS completed_by_name, c.completed_at, c.items, c.notes FROM ",
            $source,
            " c JOIN ops.employee e ON e.id = c.completed_by"
        )
    };
}

#[derive(sqlx::FromRow)]
struct CompletionRow {
    id: ChecklistCompletionId,
    store_id: StoreId,
    checklist_type: ChecklistType,
    shift_date: NaiveDate,
    completed_by: EmployeeId,
    completed_by_name: String,
    completed_at: DateTime<Utc>,
    items: Json<Vec<CompletedItem>>,
    notes: Option<String>,
}

impl From<CompletionRow> for ChecklistCompletion {
    fn from(row: CompletionRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            checklist_type: row.checklist_type,
            shift_date: row.shift_date,
            completed_by: row.completed_by,
            completed_by_name: row.completed_by_name,
            completed_at: row.completed_at,
            items: row.items.0,
            notes: row.notes,
        }
    }
}

/// Repository for checklist items and completions.
pub struct ChecklistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChecklistRepository<'a> {
    /// Create a new checklist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active items of one checklist, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_items(
        &self,
        store: StoreId,
        checklist_type: ChecklistType,
    ) -> Result<Vec<ChecklistItem>, RepositoryError> {
        Ok(sqlx::query_as::<_, ChecklistItem>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM ops.shift_checklist_item",
            " WHERE store_id = $1 AND checklist_type = $2 AND is_active",
            " ORDER BY sort_order, id"
        ))
        .bind(store)
        .bind(checklist_type)
        .fetch_all(self.pool)
        .await?)
    }

    /// Active items of every checklist type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_active_items(
        &self,
        store: StoreId,
    ) -> Result<Vec<ChecklistItem>, RepositoryError> {
        Ok(sqlx::query_as::<_, ChecklistItem>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM ops.shift_checklist_item WHERE store_id = $1 AND is_active",
            " ORDER BY checklist_type, sort_order, id"
        ))
        .bind(store)
        .fetch_all(self.pool)
        .await?)
    }

    /// Replace the active list of one checklist type.
    ///
    /// `drafts` must already be normalized. On any failure the transaction
    /// rolls back and the previous list stays active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if two labels collide.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn replace_items(
        &self,
        store: StoreId,
        checklist_type: ChecklistType,
        drafts: &[ChecklistItemDraft],
        created_by: Option<EmployeeId>,
    ) -> Result<Vec<ChecklistItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(store)
            .bind(checklist_type.as_str())
            .execute(&mut *tx)
            .await?;

        let deactivated = sqlx::query(
            r"
            UPDATE ops.shift_checklist_item
            SET is_active = FALSE, deactivated_at = now()
            WHERE store_id = $1 AND checklist_type = $2 AND is_active
            ",
        )
        .bind(store)
        .bind(checklist_type)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let mut items = Vec::with_capacity(drafts.len());
        for (sort_order, draft) in (0_i32..).zip(drafts) {
            let item = sqlx::query_as::<_, ChecklistItem>(concat!(
                "INSERT INTO ops.shift_checklist_item ",
                "(store_id, checklist_type, label, is_required, sort_order, created_by) ",
                "VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
                item_columns!()
            ))
            .bind(store)
            .bind(checklist_type)
            .bind(&draft.label)
            .bind(draft.is_required)
            .bind(sort_order)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::unique(e, "duplicate checklist item label"))?;
            items.push(item);
        }

        tx.commit().await?;

        tracing::info!(
            store_id = %store,
            checklist_type = %checklist_type,
            deactivated,
            inserted = items.len(),
            "Checklist items replaced"
        );

        Ok(items)
    }

    /// Store a completion record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_completion(
        &self,
        store: StoreId,
        checklist_type: ChecklistType,
        shift_date: NaiveDate,
        completed_by: EmployeeId,
        items: &[CompletedItem],
        notes: Option<&str>,
    ) -> Result<ChecklistCompletion, RepositoryError> {
        let row = sqlx::query_as::<_, CompletionRow>(concat!(
            "WITH inserted AS (",
            "INSERT INTO ops.shift_checklist_completion ",
            "(store_id, checklist_type, shift_date, completed_by, items, notes) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING *) ",
            completion_select!("inserted")
        ))
        .bind(store)
        .bind(checklist_type)
        .bind(shift_date)
        .bind(completed_by)
        .bind(Json(items))
        .bind(notes)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Completions recorded for a shift date, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn completions(
        &self,
        store: StoreId,
        checklist_type: Option<ChecklistType>,
        shift_date: NaiveDate,
    ) -> Result<Vec<ChecklistCompletion>, RepositoryError> {
        let rows = sqlx::query_as::<_, CompletionRow>(concat!(
            completion_select!("ops.shift_checklist_completion"),
            " WHERE c.store_id = $1 AND c.shift_date = $2",
            " AND ($3::ops.checklist_type IS NULL OR c.checklist_type = $3)",
            " ORDER BY c.completed_at DESC"
        ))
        .bind(store)
        .bind(shift_date)
        .bind(checklist_type)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The most recent completion of one checklist for a shift date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_completion(
        &self,
        store: StoreId,
        checklist_type: ChecklistType,
        shift_date: NaiveDate,
    ) -> Result<Option<ChecklistCompletion>, RepositoryError> {
        let row = sqlx::query_as::<_, CompletionRow>(concat!(
            completion_select!("ops.shift_checklist_completion"),
            " WHERE c.store_id = $1 AND c.checklist_type = $2 AND c.shift_date = $3",
            " ORDER BY c.completed_at DESC LIMIT 1"
        ))
        .bind(store)
        .bind(checklist_type)
        .bind(shift_date)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
