//! Employee account management.
//!
//! The API only lets directors create employees, so the first director of a
//! store is created here.

use mise_core::{Department, EmployeeId, EmployeeRole, StoreId};
use mise_server::db::StoreRepository;
use mise_server::models::NewEmployee;
use mise_server::services::auth::AccountService;

use super::{CliError, connect};

/// Raw employee fields from the command line.
pub struct EmployeeArgs {
    pub email: String,
    pub name: String,
    pub role: EmployeeRole,
    pub department: Department,
    pub position: Option<String>,
}

/// Create an employee.
///
/// # Errors
///
/// Returns an error if the input is invalid, the store does not exist or the
/// email is already registered.
pub async fn create(
    store: StoreId,
    args: EmployeeArgs,
    password: &str,
) -> Result<EmployeeId, CliError> {
    let employee = NewEmployee::parse(
        &args.email,
        &args.name,
        args.role,
        args.department,
        args.position,
    )
    .map_err(CliError::Invalid)?;

    let pool = connect().await?;
    if StoreRepository::new(&pool).get(store).await?.is_none() {
        return Err(CliError::Invalid(format!("store {store} does not exist")));
    }

    let created = AccountService::new(&pool)
        .create_employee(store, &employee, password)
        .await?;

    tracing::info!(
        employee_id = %created.id,
        role = %created.role,
        "Employee created: {}",
        created.email
    );
    Ok(created.id)
}

/// Set a new password.
///
/// # Errors
///
/// Returns an error if the password is too weak or no employee has the email.
pub async fn reset_password(email: &str, password: &str) -> Result<(), CliError> {
    let pool = connect().await?;
    let employee = AccountService::new(&pool)
        .reset_password(email, password)
        .await?;

    tracing::info!(employee_id = %employee.id, "Password updated for {}", employee.email);
    Ok(())
}
