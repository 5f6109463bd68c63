//! Employee repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mise_core::{Department, Email, EmployeeId, EmployeeRole, StoreId};

use super::RepositoryError;
use crate::models::{Employee, EmployeeUpdate, NewEmployee};

macro_rules! employee_columns {
    () => {
        "id, store_id, email, name, role, department, position, is_active, created_at, updated_at"
    };
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: EmployeeId,
    store_id: StoreId,
    email: String,
    name: String,
    role: EmployeeRole,
    department: Department,
    position: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = RepositoryError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            email,
            name: row.name,
            role: row.role,
            department: row.department,
            position: row.position,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    employee: EmployeeRow,
    password_hash: String,
}

/// Repository for employee database operations.
pub struct EmployeeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmployeeRepository<'a> {
    /// Create a new employee repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a store's employees, active ones only unless `include_inactive`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store: StoreId,
        include_inactive: bool,
    ) -> Result<Vec<Employee>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(concat!(
            "SELECT ",
            employee_columns!(),
            " FROM ops.employee WHERE store_id = $1 AND (is_active OR $2) ORDER BY name"
        ))
        .bind(store)
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    /// Get an employee by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get(
        &self,
        store: StoreId,
        id: EmployeeId,
    ) -> Result<Option<Employee>, RepositoryError> {
        sqlx::query_as::<_, EmployeeRow>(concat!(
            "SELECT ",
            employee_columns!(),
            " FROM ops.employee WHERE store_id = $1 AND id = $2"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Employee::try_from)
        .transpose()
    }

    /// Whether `id` is an active employee of `store`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_active_member(
        &self,
        store: StoreId,
        id: EmployeeId,
    ) -> Result<bool, RepositoryError> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM ops.employee WHERE store_id = $1 AND id = $2 AND is_active",
        )
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(found.is_some())
    }

    /// Get an employee and their password hash by email, across all stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Employee, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(concat!(
            "SELECT ",
            employee_columns!(),
            ", password_hash FROM ops.employee WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((Employee::try_from(r.employee)?, r.password_hash)))
            .transpose()
    }

    /// Create an employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        store: StoreId,
        employee: &NewEmployee,
        password_hash: &str,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(concat!(
            "INSERT INTO ops.employee (store_id, email, name, role, department, position, password_hash) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            employee_columns!()
        ))
        .bind(store)
        .bind(employee.email.as_str())
        .bind(&employee.name)
        .bind(employee.role)
        .bind(employee.department)
        .bind(employee.position.as_deref())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "email already exists"))?;

        Employee::try_from(row)
    }

    /// Apply a partial update. A blank `position` clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    pub async fn update(
        &self,
        store: StoreId,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(concat!(
            "UPDATE ops.employee SET ",
            "name = COALESCE($3, name), ",
            "role = COALESCE($4, role), ",
            "department = COALESCE($5, department), ",
            "position = CASE WHEN $6::text IS NULL THEN position ELSE NULLIF($6, '') END, ",
            "is_active = COALESCE($7, is_active), ",
            "updated_at = now() ",
            "WHERE store_id = $1 AND id = $2 RETURNING ",
            employee_columns!()
        ))
        .bind(store)
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.role)
        .bind(update.department)
        .bind(update.position.as_deref())
        .bind(update.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Employee::try_from(row)
    }

    /// Replace an employee's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    pub async fn set_password(
        &self,
        id: EmployeeId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE ops.employee SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark an employee inactive. Their history stays in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    pub async fn deactivate(&self, store: StoreId, id: EmployeeId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE ops.employee SET is_active = FALSE, updated_at = now() WHERE store_id = $1 AND id = $2",
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
