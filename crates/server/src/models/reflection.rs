//! Leadership reflections.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use mise_core::{EmployeeId, ReflectionId, StoreId};

use super::{clean_optional, require_text};

/// Most action items a reflection may list.
const MAX_ACTION_ITEMS: usize = 20;

/// A leader's written reflection on a shift, week or situation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: ReflectionId,
    pub store_id: StoreId,
    pub employee_id: EmployeeId,
    pub reflection_date: NaiveDate,
    pub title: String,
    pub focus_area: Option<String>,
    /// Answers keyed by prompt.
    pub answers: BTreeMap<String, String>,
    pub action_items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionInput {
    /// Defaults to today.
    pub reflection_date: Option<NaiveDate>,
    pub title: String,
    pub focus_area: Option<String>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl ReflectionInput {
    /// Trim text, dropping blank answers and action items.
    ///
    /// # Errors
    ///
    /// Returns a message for a blank title, an empty reflection or too many
    /// action items.
    pub fn normalize(self) -> Result<Self, String> {
        let title = require_text(&self.title, "title")?;
        let answers: BTreeMap<String, String> = self
            .answers
            .into_iter()
            .map(|(prompt, answer)| (prompt.trim().to_owned(), answer.trim().to_owned()))
            .filter(|(prompt, answer)| !prompt.is_empty() && !answer.is_empty())
            .collect();
        let action_items: Vec<String> = self
            .action_items
            .into_iter()
            .map(|item| item.trim().to_owned())
            .filter(|item| !item.is_empty())
            .collect();

        if answers.is_empty() && action_items.is_empty() {
            return Err("a reflection needs at least one answer or action item".to_owned());
        }
        if action_items.len() > MAX_ACTION_ITEMS {
            return Err(format!(
                "a reflection cannot have more than {MAX_ACTION_ITEMS} action items"
            ));
        }

        Ok(Self {
            reflection_date: self.reflection_date,
            title,
            focus_area: clean_optional(self.focus_area),
            answers,
            action_items,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_entries() {
        let input: ReflectionInput = serde_json::from_str(
            r#"{
                "title": " Friday rush ",
                "answers": {"What went well?": " Drive-thru times ", "What would you change?": "  "},
                "actionItems": ["Coach on bagging", " "]
            }"#,
        )
        .unwrap();
        let reflection = input.normalize().unwrap();
        assert_eq!(reflection.title, "Friday rush");
        assert_eq!(reflection.answers.len(), 1);
        assert_eq!(reflection.action_items, vec!["Coach on bagging"]);
    }

    #[test]
    fn test_normalize_rejects_empty_reflection() {
        let input: ReflectionInput =
            serde_json::from_str(r#"{"title": "Nothing", "answers": {"Q": " "}}"#).unwrap();
        assert!(input.normalize().is_err());
    }
}
