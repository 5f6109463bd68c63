//! Employee documentation (coaching notes, recognition, discipline).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use mise_core::{DocumentationId, DocumentationKind, EmployeeId, StoreId};

use super::{clean_optional, require_text};

/// A documented conversation or event about an employee.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Documentation {
    pub id: DocumentationId,
    pub store_id: StoreId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub kind: DocumentationKind,
    pub title: String,
    pub description: String,
    pub incident_date: NaiveDate,
    pub action_plan: Option<String>,
    pub created_by: Option<EmployeeId>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledgement_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationInput {
    pub employee_id: EmployeeId,
    pub kind: DocumentationKind,
    pub title: String,
    pub description: String,
    /// Defaults to today.
    pub incident_date: Option<NaiveDate>,
    pub action_plan: Option<String>,
}

impl DocumentationInput {
    /// Trim text fields.
    ///
    /// # Errors
    ///
    /// Returns a message for a blank title or description.
    pub fn normalize(self) -> Result<Self, String> {
        Ok(Self {
            title: require_text(&self.title, "title")?,
            description: require_text(&self.description, "description")?,
            action_plan: clean_optional(self.action_plan),
            ..self
        })
    }
}

/// Body of an acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub comment: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let input: DocumentationInput = serde_json::from_str(
            r#"{"employeeId": 4, "kind": "coaching", "title": " Late ", "description": "Third late clock-in", "actionPlan": " "}"#,
        )
        .unwrap();
        let doc = input.normalize().unwrap();
        assert_eq!(doc.title, "Late");
        assert_eq!(doc.action_plan, None);
        assert_eq!(doc.kind, DocumentationKind::Coaching);
    }

    #[test]
    fn test_normalize_requires_description() {
        let input: DocumentationInput = serde_json::from_str(
            r#"{"employeeId": 4, "kind": "recognition", "title": "Great shift", "description": ""}"#,
        )
        .unwrap();
        assert!(input.normalize().is_err());
    }
}
