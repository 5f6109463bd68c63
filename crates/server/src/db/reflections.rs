//! Leadership reflection repository.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use mise_core::{EmployeeId, ReflectionId, StoreId};

use super::RepositoryError;
use crate::models::{Reflection, ReflectionInput};

macro_rules! reflection_columns {
    () => {
        "id, store_id, employee_id, reflection_date, title, focus_area, answers, action_items, created_at, updated_at"
    };
}

#[derive(sqlx::FromRow)]
struct ReflectionRow {
    id: ReflectionId,
    store_id: StoreId,
    employee_id: EmployeeId,
    reflection_date: NaiveDate,
    title: String,
    focus_area: Option<String>,
    answers: Json<BTreeMap<String, String>>,
    action_items: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReflectionRow> for Reflection {
    fn from(row: ReflectionRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            employee_id: row.employee_id,
            reflection_date: row.reflection_date,
            title: row.title,
            focus_area: row.focus_area,
            answers: row.answers.0,
            action_items: row.action_items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for leadership reflections.
pub struct ReflectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReflectionRepository<'a> {
    /// Create a new reflection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reflections, newest first, optionally for one employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store: StoreId,
        employee: Option<EmployeeId>,
    ) -> Result<Vec<Reflection>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReflectionRow>(concat!(
            "SELECT ",
            reflection_columns!(),
            " FROM ops.leadership_reflection WHERE store_id = $1",
            " AND ($2::int IS NULL OR employee_id = $2)",
            " ORDER BY reflection_date DESC, id DESC"
        ))
        .bind(store)
        .bind(employee)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a reflection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store: StoreId,
        id: ReflectionId,
    ) -> Result<Option<Reflection>, RepositoryError> {
        let row = sqlx::query_as::<_, ReflectionRow>(concat!(
            "SELECT ",
            reflection_columns!(),
            " FROM ops.leadership_reflection WHERE store_id = $1 AND id = $2"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a reflection. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store: StoreId,
        employee: EmployeeId,
        reflection_date: NaiveDate,
        input: &ReflectionInput,
    ) -> Result<Reflection, RepositoryError> {
        let row = sqlx::query_as::<_, ReflectionRow>(concat!(
            "INSERT INTO ops.leadership_reflection ",
            "(store_id, employee_id, reflection_date, title, focus_area, answers, action_items) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            reflection_columns!()
        ))
        .bind(store)
        .bind(employee)
        .bind(reflection_date)
        .bind(&input.title)
        .bind(input.focus_area.as_deref())
        .bind(Json(&input.answers))
        .bind(&input.action_items)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Overwrite a reflection. The author never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reflection does not exist.
    pub async fn update(
        &self,
        store: StoreId,
        id: ReflectionId,
        reflection_date: NaiveDate,
        input: &ReflectionInput,
    ) -> Result<Reflection, RepositoryError> {
        let row = sqlx::query_as::<_, ReflectionRow>(concat!(
            "UPDATE ops.leadership_reflection SET reflection_date = $3, title = $4, ",
            "focus_area = $5, answers = $6, action_items = $7, updated_at = now() ",
            "WHERE store_id = $1 AND id = $2 RETURNING ",
            reflection_columns!()
        ))
        .bind(store)
        .bind(id)
        .bind(reflection_date)
        .bind(&input.title)
        .bind(input.focus_area.as_deref())
        .bind(Json(&input.answers))
        .bind(&input.action_items)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a reflection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reflection does not exist.
    pub async fn delete(&self, store: StoreId, id: ReflectionId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM ops.leadership_reflection WHERE store_id = $1 AND id = $2")
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
