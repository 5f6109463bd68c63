//! Shift checklist domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use mise_core::checklist::{CompletedItem, completion_rate};
use mise_core::{ChecklistCompletionId, ChecklistItemId, ChecklistType, EmployeeId, StoreId};

/// An item on a store's checklist.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub store_id: StoreId,
    pub checklist_type: ChecklistType,
    pub label: String,
    pub is_required: bool,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_by: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
}

impl ChecklistItem {
    /// The fields needed to judge a completion submission.
    #[must_use]
    pub fn as_active(&self) -> mise_core::checklist::ActiveItem {
        mise_core::checklist::ActiveItem {
            id: self.id,
            label: self.label.clone(),
            is_required: self.is_required,
        }
    }
}

/// A submitted checklist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistCompletion {
    pub id: ChecklistCompletionId,
    pub store_id: StoreId,
    pub checklist_type: ChecklistType,
    pub shift_date: NaiveDate,
    pub completed_by: EmployeeId,
    pub completed_by_name: String,
    pub completed_at: DateTime<Utc>,
    pub items: Vec<CompletedItem>,
    pub notes: Option<String>,
}

impl ChecklistCompletion {
    /// Share of items ticked on this record.
    #[must_use]
    pub fn completion_rate(&self) -> u8 {
        completion_rate(&self.items)
    }
}
