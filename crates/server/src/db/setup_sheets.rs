//! Setup template and setup sheet repository.
//!
//! Day layouts are stored as JSONB. A store has at most one sheet per week,
//! enforced by a unique index on `(store_id, week_start)`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use mise_core::setup::SetupDay;
use mise_core::{EmployeeId, SetupSheetId, SetupTemplateId, StoreId};

use super::RepositoryError;
use crate::models::setup::ValidSetupSheet;
use crate::models::{SetupSheet, SetupTemplate, SetupTemplateInput};

macro_rules! template_columns {
    () => {
        "id, store_id, name, description, days, created_by, created_at, updated_at"
    };
}

macro_rules! sheet_columns {
    () => {
        "id, store_id, template_id, name, week_start, week_end, days, notes, created_by, created_at, updated_at"
    };
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: SetupTemplateId,
    store_id: StoreId,
    name: String,
    description: Option<String>,
    days: Json<Vec<SetupDay>>,
    created_by: Option<EmployeeId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for SetupTemplate {
    fn from(row: TemplateRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            description: row.description,
            days: row.days.0,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SheetRow {
    id: SetupSheetId,
    store_id: StoreId,
    template_id: Option<SetupTemplateId>,
    name: String,
    week_start: NaiveDate,
    week_end: NaiveDate,
    days: Json<Vec<SetupDay>>,
    notes: Option<String>,
    created_by: Option<EmployeeId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SheetRow> for SetupSheet {
    fn from(row: SheetRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            template_id: row.template_id,
            name: row.name,
            week_start: row.week_start,
            week_end: row.week_end,
            days: row.days.0,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn week_conflict(err: sqlx::Error, sheet: &ValidSetupSheet) -> RepositoryError {
    RepositoryError::unique(
        err,
        &format!(
            "a setup sheet already exists for the week of {}",
            sheet.week.start()
        ),
    )
}

/// Repository for setup templates and sheets.
pub struct SetupSheetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SetupSheetRepository<'a> {
    /// Create a new setup sheet repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// List templates by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_templates(
        &self,
        store: StoreId,
    ) -> Result<Vec<SetupTemplate>, RepositoryError> {
        let rows = sqlx::query_as::<_, TemplateRow>(concat!(
            "SELECT ",
            template_columns!(),
            " FROM ops.setup_template WHERE store_id = $1 ORDER BY name"
        ))
        .bind(store)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a template.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_template(
        &self,
        store: StoreId,
        id: SetupTemplateId,
    ) -> Result<Option<SetupTemplate>, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(concat!(
            "SELECT ",
            template_columns!(),
            " FROM ops.setup_template WHERE store_id = $1 AND id = $2"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a template. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_template(
        &self,
        store: StoreId,
        created_by: EmployeeId,
        input: &SetupTemplateInput,
    ) -> Result<SetupTemplate, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(concat!(
            "INSERT INTO ops.setup_template (store_id, name, description, days, created_by) ",
            "VALUES ($1, $2, $3, $4, $5) RETURNING ",
            template_columns!()
        ))
        .bind(store)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(Json(&input.days))
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "a template with this name already exists"))?;

        Ok(row.into())
    }

    /// Overwrite a template. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the template does not exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update_template(
        &self,
        store: StoreId,
        id: SetupTemplateId,
        input: &SetupTemplateInput,
    ) -> Result<SetupTemplate, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(concat!(
            "UPDATE ops.setup_template SET name = $3, description = $4, days = $5, updated_at = now() ",
            "WHERE store_id = $1 AND id = $2 RETURNING ",
            template_columns!()
        ))
        .bind(store)
        .bind(id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(Json(&input.days))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "a template with this name already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a template. Sheets made from it keep their layout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the template does not exist.
    pub async fn delete_template(
        &self,
        store: StoreId,
        id: SetupTemplateId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ops.setup_template WHERE store_id = $1 AND id = $2")
            .bind(store)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Sheets
    // =========================================================================

    /// List sheets whose week overlaps `[from, to]`, newest week first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_sheets(
        &self,
        store: StoreId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<SetupSheet>, RepositoryError> {
        let rows = sqlx::query_as::<_, SheetRow>(concat!(
            "SELECT ",
            sheet_columns!(),
            " FROM ops.setup_sheet WHERE store_id = $1",
            " AND ($2::date IS NULL OR week_end >= $2)",
            " AND ($3::date IS NULL OR week_start <= $3)",
            " ORDER BY week_start DESC"
        ))
        .bind(store)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a sheet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_sheet(
        &self,
        store: StoreId,
        id: SetupSheetId,
    ) -> Result<Option<SetupSheet>, RepositoryError> {
        let row = sqlx::query_as::<_, SheetRow>(concat!(
            "SELECT ",
            sheet_columns!(),
            " FROM ops.setup_sheet WHERE store_id = $1 AND id = $2"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// The sheet for the week starting on `week_start` (a Sunday).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sheet_for_week(
        &self,
        store: StoreId,
        week_start: NaiveDate,
    ) -> Result<Option<SetupSheet>, RepositoryError> {
        let row = sqlx::query_as::<_, SheetRow>(concat!(
            "SELECT ",
            sheet_columns!(),
            " FROM ops.setup_sheet WHERE store_id = $1 AND week_start = $2"
        ))
        .bind(store)
        .bind(week_start)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a sheet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the week already has a sheet.
    pub async fn create_sheet(
        &self,
        store: StoreId,
        created_by: EmployeeId,
        sheet: &ValidSetupSheet,
    ) -> Result<SetupSheet, RepositoryError> {
        let row = sqlx::query_as::<_, SheetRow>(concat!(
            "INSERT INTO ops.setup_sheet ",
            "(store_id, template_id, name, week_start, week_end, days, notes, created_by) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            sheet_columns!()
        ))
        .bind(store)
        .bind(sheet.template_id)
        .bind(&sheet.name)
        .bind(sheet.week.start())
        .bind(sheet.week.end())
        .bind(Json(&sheet.days))
        .bind(sheet.notes.as_deref())
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| week_conflict(e, sheet))?;

        Ok(row.into())
    }

    /// Overwrite a sheet, possibly moving it to another week.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sheet does not exist.
    /// Returns `RepositoryError::Conflict` if the target week already has a sheet.
    pub async fn update_sheet(
        &self,
        store: StoreId,
        id: SetupSheetId,
        sheet: &ValidSetupSheet,
    ) -> Result<SetupSheet, RepositoryError> {
        let row = sqlx::query_as::<_, SheetRow>(concat!(
            "UPDATE ops.setup_sheet SET template_id = $3, name = $4, week_start = $5, ",
            "week_end = $6, days = $7, notes = $8, updated_at = now() ",
            "WHERE store_id = $1 AND id = $2 RETURNING ",
            sheet_columns!()
        ))
        .bind(store)
        .bind(id)
        .bind(sheet.template_id)
        .bind(&sheet.name)
        .bind(sheet.week.start())
        .bind(sheet.week.end())
        .bind(Json(&sheet.days))
        .bind(sheet.notes.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| week_conflict(e, sheet))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a sheet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sheet does not exist.
    pub async fn delete_sheet(&self, store: StoreId, id: SetupSheetId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ops.setup_sheet WHERE store_id = $1 AND id = $2")
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
