//! Authentication service.
//!
//! Employees sign in with email and password and receive a bearer token.

mod error;
mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, JwtService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use mise_core::{Email, StoreId};

use crate::db::employees::EmployeeRepository;
use crate::models::{Employee, NewEmployee};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// A successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: Employee,
}

/// Authentication service.
pub struct AuthService<'a> {
    employees: EmployeeRepository<'a>,
    jwt: &'a JwtService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt: &'a JwtService) -> Self {
        Self {
            employees: EmployeeRepository::new(pool),
            jwt,
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown, the
    /// password is wrong or the employee is inactive.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let email = Email::parse(email)?;

        let (employee, password_hash) = self
            .employees
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !employee.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let (token, expires_at) = self.jwt.issue(&employee)?;

        tracing::info!(employee_id = %employee.id, store_id = %employee.store_id, "Employee logged in");

        Ok(LoginResponse {
            token,
            expires_at,
            user: employee,
        })
    }
}

/// Account management that needs no token signing: creating employees and
/// resetting passwords. Used by the API and the CLI.
pub struct AccountService<'a> {
    employees: EmployeeRepository<'a>,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            employees: EmployeeRepository::new(pool),
        }
    }

    /// Create an employee with an initial password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::Repository` with `Conflict` if the email is taken.
    pub async fn create_employee(
        &self,
        store: StoreId,
        employee: &NewEmployee,
        password: &str,
    ) -> Result<Employee, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        Ok(self.employees.create(store, employee, &password_hash).await?)
    }

    /// Replace the password of the employee with `email`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::InvalidCredentials` if no employee has that email.
    pub async fn reset_password(&self, email: &str, password: &str) -> Result<Employee, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let (employee, _) = self
            .employees
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = hash_password(password)?;
        self.employees.set_password(employee.id, &password_hash).await?;
        Ok(employee)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
