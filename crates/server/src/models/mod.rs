//! Domain models for the API.
//!
//! These are validated domain objects, separate from the row types the
//! repositories decode. All of them serialize with camelCase field names.

pub mod checklist;
pub mod current_user;
pub mod documentation;
pub mod employee;
pub mod evaluation;
pub mod reflection;
pub mod settings;
pub mod setup;
pub mod store;
pub mod waste;

pub use checklist::{ChecklistCompletion, ChecklistItem};
pub use current_user::CurrentUser;
pub use documentation::{Documentation, DocumentationInput};
pub use employee::{Employee, EmployeeUpdate, NewEmployee};
pub use evaluation::{Evaluation, EvaluationDetail, EvaluationRater, NewEvaluation};
pub use reflection::{Reflection, ReflectionInput};
pub use settings::StoreSettings;
pub use setup::{SetupSheet, SetupSheetInput, SetupTemplate, SetupTemplateInput};
pub use store::Store;
pub use waste::{WasteEntry, WasteEntryInput};

/// Trim an optional free-text field, turning blank input into `None`.
#[must_use]
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Trim a required text field.
///
/// # Errors
///
/// Returns the field name when the value is blank.
pub fn require_text(value: &str, field: &'static str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  note ".into())), Some("note".into()));
        assert_eq!(clean_optional(Some("   ".into())), None);
        assert_eq!(clean_optional(None), None);
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text(" Fries ", "itemName").unwrap(), "Fries");
        assert_eq!(require_text(" ", "itemName").unwrap_err(), "itemName is required");
    }
}
