//! The authenticated caller.

use serde::{Deserialize, Serialize};

use mise_core::{EmployeeId, EmployeeRole, StoreId};

/// Identity carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: EmployeeId,
    pub store_id: StoreId,
    pub name: String,
    pub role: EmployeeRole,
}

impl CurrentUser {
    /// Leaders and directors.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.role >= EmployeeRole::Leader
    }

    #[must_use]
    pub fn is_director(&self) -> bool {
        self.role == EmployeeRole::Director
    }

    /// Whether the caller may act on a record belonging to `owner`.
    #[must_use]
    pub fn owns_or_leads(&self, owner: EmployeeId) -> bool {
        self.id == owner || self.is_leader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: EmployeeRole) -> CurrentUser {
        CurrentUser {
            id: EmployeeId::new(7),
            store_id: StoreId::new(1),
            name: "Dana".to_owned(),
            role,
        }
    }

    #[test]
    fn test_role_checks() {
        assert!(!user(EmployeeRole::TeamMember).is_leader());
        assert!(user(EmployeeRole::Leader).is_leader());
        assert!(!user(EmployeeRole::Leader).is_director());
        assert!(user(EmployeeRole::Director).is_leader());
        assert!(user(EmployeeRole::Director).is_director());
    }

    #[test]
    fn test_owns_or_leads() {
        let member = user(EmployeeRole::TeamMember);
        assert!(member.owns_or_leads(EmployeeId::new(7)));
        assert!(!member.owns_or_leads(EmployeeId::new(8)));
        assert!(user(EmployeeRole::Leader).owns_or_leads(EmployeeId::new(8)));
    }
}
