//! Employee domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mise_core::{Department, Email, EmployeeId, EmployeeRole, StoreId};

use super::{clean_optional, require_text};

/// A store employee.
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub store_id: StoreId,
    pub email: Email,
    pub name: String,
    pub role: EmployeeRole,
    pub department: Department,
    pub position: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub email: Email,
    pub name: String,
    pub role: EmployeeRole,
    pub department: Department,
    pub position: Option<String>,
}

impl NewEmployee {
    /// Validate raw fields.
    ///
    /// # Errors
    ///
    /// Returns a message when the email is malformed or the name is blank.
    pub fn parse(
        email: &str,
        name: &str,
        role: EmployeeRole,
        department: Department,
        position: Option<String>,
    ) -> Result<Self, String> {
        Ok(Self {
            email: Email::parse(email).map_err(|e| e.to_string())?,
            name: require_text(name, "name")?,
            role,
            department,
            position: clean_optional(position),
        })
    }
}

/// Partial update of an employee; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub role: Option<EmployeeRole>,
    pub department: Option<Department>,
    pub position: Option<String>,
    pub is_active: Option<bool>,
}

impl EmployeeUpdate {
    /// Trim text fields.
    ///
    /// # Errors
    ///
    /// Returns a message when a name is supplied but blank.
    pub fn normalize(self) -> Result<Self, String> {
        Ok(Self {
            name: self.name.map(|n| require_text(&n, "name")).transpose()?,
            position: self.position.map(|p| p.trim().to_owned()),
            ..self
        })
    }
}
