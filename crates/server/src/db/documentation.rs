//! Employee documentation repository.
//!
//! Records are soft deleted: `deleted_at` is set and every read filters on
//! it, so a deleted record behaves as missing.

use chrono::NaiveDate;
use sqlx::PgPool;

use mise_core::{DocumentationId, DocumentationKind, EmployeeId, StoreId};

use super::RepositoryError;
use crate::models::{Documentation, DocumentationInput};

macro_rules! documentation_select {
    ($source:literal) => {
        concat!(
            "SELECT d.id, d.store_id, d.employee_id, e.name AS employee_name, d.kind, d.title, ",
            "d.description, d.incident_date, d.action_plan, d.created_by, d.acknowledged_at, ",
            "d.acknowledgement_comment, d.created_at, d.updated_at FROM ",
            $source,
            " d JOIN ops.employee e ON e.id = d.employee_id"
        )
    };
}

/// Filters for listing documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentationFilter {
    pub employee_id: Option<EmployeeId>,
    pub kind: Option<DocumentationKind>,
}

/// Repository for employee documentation.
pub struct DocumentationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentationRepository<'a> {
    /// Create a new documentation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List records, most recent incident first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store: StoreId,
        filter: DocumentationFilter,
    ) -> Result<Vec<Documentation>, RepositoryError> {
        Ok(sqlx::query_as::<_, Documentation>(concat!(
            documentation_select!("ops.documentation"),
            " WHERE d.store_id = $1 AND d.deleted_at IS NULL",
            " AND ($2::int IS NULL OR d.employee_id = $2)",
            " AND ($3::ops.documentation_kind IS NULL OR d.kind = $3)",
            " ORDER BY d.incident_date DESC, d.id DESC"
        ))
        .bind(store)
        .bind(filter.employee_id)
        .bind(filter.kind)
        .fetch_all(self.pool)
        .await?)
    }

    /// Get a record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store: StoreId,
        id: DocumentationId,
    ) -> Result<Option<Documentation>, RepositoryError> {
        Ok(sqlx::query_as::<_, Documentation>(concat!(
            documentation_select!("ops.documentation"),
            " WHERE d.store_id = $1 AND d.id = $2 AND d.deleted_at IS NULL"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?)
    }

    /// Create a record. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store: StoreId,
        created_by: EmployeeId,
        incident_date: NaiveDate,
        input: &DocumentationInput,
    ) -> Result<Documentation, RepositoryError> {
        Ok(sqlx::query_as::<_, Documentation>(concat!(
            "WITH inserted AS (",
            "INSERT INTO ops.documentation ",
            "(store_id, employee_id, kind, title, description, incident_date, action_plan, created_by) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *) ",
            documentation_select!("inserted")
        ))
        .bind(store)
        .bind(input.employee_id)
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.description)
        .bind(incident_date)
        .bind(input.action_plan.as_deref())
        .bind(created_by)
        .fetch_one(self.pool)
        .await?)
    }

    /// Overwrite a record. Any acknowledgement is cleared, since the
    /// employee has not seen the new text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    pub async fn update(
        &self,
        store: StoreId,
        id: DocumentationId,
        incident_date: NaiveDate,
        input: &DocumentationInput,
    ) -> Result<Documentation, RepositoryError> {
        sqlx::query_as::<_, Documentation>(concat!(
            "WITH updated AS (",
            "UPDATE ops.documentation SET employee_id = $3, kind = $4, title = $5, ",
            "description = $6, incident_date = $7, action_plan = $8, ",
            "acknowledged_at = NULL, acknowledgement_comment = NULL, updated_at = now() ",
            "WHERE store_id = $1 AND id = $2 AND deleted_at IS NULL RETURNING *) ",
            documentation_select!("updated")
        ))
        .bind(store)
        .bind(id)
        .bind(input.employee_id)
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.description)
        .bind(incident_date)
        .bind(input.action_plan.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Record that the documented employee has read the record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `employee` has no such record.
    /// Returns `RepositoryError::Conflict` if it was already acknowledged.
    pub async fn acknowledge(
        &self,
        store: StoreId,
        id: DocumentationId,
        employee: EmployeeId,
        comment: Option<&str>,
    ) -> Result<Documentation, RepositoryError> {
        let acknowledged = sqlx::query_as::<_, Documentation>(concat!(
            "WITH updated AS (",
            "UPDATE ops.documentation SET acknowledged_at = now(), acknowledgement_comment = $4 ",
            "WHERE store_id = $1 AND id = $2 AND employee_id = $3 ",
            "AND deleted_at IS NULL AND acknowledged_at IS NULL RETURNING *) ",
            documentation_select!("updated")
        ))
        .bind(store)
        .bind(id)
        .bind(employee)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?;

        if let Some(doc) = acknowledged {
            return Ok(doc);
        }

        match self.get(store, id).await? {
            Some(doc) if doc.employee_id == employee => Err(RepositoryError::Conflict(
                "documentation already acknowledged".to_owned(),
            )),
            _ => Err(RepositoryError::NotFound),
        }
    }

    /// Soft delete a record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    pub async fn soft_delete(
        &self,
        store: StoreId,
        id: DocumentationId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE ops.documentation SET deleted_at = now()
            WHERE store_id = $1 AND id = $2 AND deleted_at IS NULL
            ",
        )
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
