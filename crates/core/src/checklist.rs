//! Shift checklist rules.
//!
//! A store keeps one active list of items per [`ChecklistType`](crate::ChecklistType).
//! Leaders replace the whole list at once (see [`normalize_drafts`]), and team
//! members submit a completion with one answer per item (see
//! [`evaluate_completion`]).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ChecklistItemId;

/// Longest label accepted for a checklist item.
pub const MAX_LABEL_LENGTH: usize = 200;

/// Most items a single checklist may hold.
pub const MAX_ITEMS: usize = 100;

/// Errors raised while validating checklist input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecklistError {
    #[error("checklist must contain at least one item")]
    EmptyList,

    #[error("checklist cannot contain more than {} items", MAX_ITEMS)]
    TooManyItems,

    #[error("item {position} has an empty label")]
    EmptyLabel { position: usize },

    #[error("item {position} label exceeds {} characters", MAX_LABEL_LENGTH)]
    LabelTooLong { position: usize },

    #[error("duplicate item label: {0}")]
    DuplicateLabel(String),

    #[error("no active checklist items to complete")]
    NoActiveItems,

    #[error("item {0} was answered more than once")]
    DuplicateAnswer(ChecklistItemId),

    #[error("item {0} is not an active item of this checklist")]
    UnknownItem(ChecklistItemId),

    #[error("required items missing from submission: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("required items not completed: {}", .0.join(", "))]
    IncompleteRequired(Vec<String>),
}

/// An item as submitted by a leader when replacing a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemDraft {
    pub label: String,
    #[serde(default)]
    pub is_required: bool,
}

/// Validate and clean a replacement list.
///
/// Labels are trimmed; order is preserved and becomes the item sort order.
///
/// # Errors
///
/// Returns a [`ChecklistError`] for an empty or oversized list, blank or
/// overlong labels, and labels that repeat (ignoring case).
pub fn normalize_drafts(
    drafts: Vec<ChecklistItemDraft>,
) -> Result<Vec<ChecklistItemDraft>, ChecklistError> {
    if drafts.is_empty() {
        return Err(ChecklistError::EmptyList);
    }
    if drafts.len() > MAX_ITEMS {
        return Err(ChecklistError::TooManyItems);
    }

    let mut seen = HashSet::with_capacity(drafts.len());
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let position = index + 1;
            let label = draft.label.trim().to_owned();
            if label.is_empty() {
                return Err(ChecklistError::EmptyLabel { position });
            }
            if label.chars().count() > MAX_LABEL_LENGTH {
                return Err(ChecklistError::LabelTooLong { position });
            }
            if !seen.insert(label.to_lowercase()) {
                return Err(ChecklistError::DuplicateLabel(label));
            }
            Ok(ChecklistItemDraft {
                label,
                is_required: draft.is_required,
            })
        })
        .collect()
}

/// The parts of an active checklist item needed to judge a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveItem {
    pub id: ChecklistItemId,
    pub label: String,
    pub is_required: bool,
}

/// One answer in a completion submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistAnswer {
    pub id: ChecklistItemId,
    pub is_completed: bool,
}

/// An item as stored on a completion record.
///
/// Labels are copied so that history still reads correctly after the list
/// is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedItem {
    pub item_id: ChecklistItemId,
    pub label: String,
    pub is_required: bool,
    pub is_completed: bool,
}

/// Judge a submission against the active items of one checklist.
///
/// Every required item must be answered and completed. Optional items may be
/// left out, in which case they are recorded as not completed. The result
/// follows the order of `items`.
///
/// # Errors
///
/// - [`ChecklistError::NoActiveItems`] when `items` is empty
/// - [`ChecklistError::DuplicateAnswer`] when an item is answered twice
/// - [`ChecklistError::UnknownItem`] when an answer references an item that
///   is not active
/// - [`ChecklistError::MissingRequired`] listing unanswered required items
/// - [`ChecklistError::IncompleteRequired`] listing required items answered
///   as not completed
pub fn evaluate_completion(
    items: &[ActiveItem],
    answers: &[ChecklistAnswer],
) -> Result<Vec<CompletedItem>, ChecklistError> {
    if items.is_empty() {
        return Err(ChecklistError::NoActiveItems);
    }

    let known: HashSet<ChecklistItemId> = items.iter().map(|item| item.id).collect();
    let mut answered: HashMap<ChecklistItemId, bool> = HashMap::with_capacity(answers.len());
    for answer in answers {
        if !known.contains(&answer.id) {
            return Err(ChecklistError::UnknownItem(answer.id));
        }
        if answered.insert(answer.id, answer.is_completed).is_some() {
            return Err(ChecklistError::DuplicateAnswer(answer.id));
        }
    }

    let missing: Vec<String> = items
        .iter()
        .filter(|item| item.is_required && !answered.contains_key(&item.id))
        .map(|item| item.label.clone())
        .collect();
    if !missing.is_empty() {
        return Err(ChecklistError::MissingRequired(missing));
    }

    let incomplete: Vec<String> = items
        .iter()
        .filter(|item| item.is_required && answered.get(&item.id) == Some(&false))
        .map(|item| item.label.clone())
        .collect();
    if !incomplete.is_empty() {
        return Err(ChecklistError::IncompleteRequired(incomplete));
    }

    Ok(items
        .iter()
        .map(|item| CompletedItem {
            item_id: item.id,
            label: item.label.clone(),
            is_required: item.is_required,
            is_completed: answered.get(&item.id).copied().unwrap_or(false),
        })
        .collect())
}

/// Whole-percent share of completed items on a completion record.
#[must_use]
pub fn completion_rate(items: &[CompletedItem]) -> u8 {
    let done = items.iter().filter(|item| item.is_completed).count();
    crate::dashboard::percent(done, items.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn draft(label: &str, is_required: bool) -> ChecklistItemDraft {
        ChecklistItemDraft {
            label: label.to_owned(),
            is_required,
        }
    }

    fn active(id: i32, label: &str, is_required: bool) -> ActiveItem {
        ActiveItem {
            id: ChecklistItemId::new(id),
            label: label.to_owned(),
            is_required,
        }
    }

    fn answer(id: i32, is_completed: bool) -> ChecklistAnswer {
        ChecklistAnswer {
            id: ChecklistItemId::new(id),
            is_completed,
        }
    }

    fn opening_items() -> Vec<ActiveItem> {
        vec![
            active(1, "Check walk-in temperature", true),
            active(2, "Turn on fryers", true),
            active(3, "Wipe menu boards", false),
        ]
    }

    #[test]
    fn test_normalize_trims_and_keeps_order() {
        let drafts = normalize_drafts(vec![
            draft("  Sanitize prep tables ", true),
            draft("Stock sauces", false),
        ])
        .unwrap();
        assert_eq!(drafts[0].label, "Sanitize prep tables");
        assert!(drafts[0].is_required);
        assert_eq!(drafts[1].label, "Stock sauces");
    }

    #[test]
    fn test_normalize_rejects_empty_list() {
        assert_eq!(normalize_drafts(vec![]), Err(ChecklistError::EmptyList));
    }

    #[test]
    fn test_normalize_rejects_blank_label() {
        let err = normalize_drafts(vec![draft("Stock cups", false), draft("   ", true)]).unwrap_err();
        assert_eq!(err, ChecklistError::EmptyLabel { position: 2 });
    }

    #[test]
    fn test_normalize_rejects_case_insensitive_duplicates() {
        let err = normalize_drafts(vec![draft("Stock Cups", false), draft("stock cups", true)])
            .unwrap_err();
        assert_eq!(err, ChecklistError::DuplicateLabel("stock cups".to_owned()));
    }

    #[test]
    fn test_normalize_rejects_long_label_and_big_list() {
        let long = "x".repeat(MAX_LABEL_LENGTH + 1);
        assert_eq!(
            normalize_drafts(vec![draft(&long, false)]),
            Err(ChecklistError::LabelTooLong { position: 1 })
        );

        let many = (0..=MAX_ITEMS).map(|i| draft(&format!("item {i}"), false)).collect();
        assert_eq!(normalize_drafts(many), Err(ChecklistError::TooManyItems));
    }

    #[test]
    fn test_completion_accepts_all_required_done() {
        let record = evaluate_completion(
            &opening_items(),
            &[answer(2, true), answer(1, true), answer(3, false)],
        )
        .unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record[0].label, "Check walk-in temperature");
        assert!(record[0].is_completed);
        assert!(!record[2].is_completed);
        assert_eq!(completion_rate(&record), 67);
    }

    #[test]
    fn test_completion_optional_item_may_be_omitted() {
        let record = evaluate_completion(&opening_items(), &[answer(1, true), answer(2, true)]).unwrap();
        assert!(!record[2].is_completed);
        assert!(!record[2].is_required);
    }

    #[test]
    fn test_completion_rejects_missing_required() {
        let err = evaluate_completion(&opening_items(), &[answer(1, true)]).unwrap_err();
        assert_eq!(
            err,
            ChecklistError::MissingRequired(vec!["Turn on fryers".to_owned()])
        );
    }

    #[test]
    fn test_completion_rejects_incomplete_required() {
        let err = evaluate_completion(&opening_items(), &[answer(1, false), answer(2, true)])
            .unwrap_err();
        assert_eq!(
            err,
            ChecklistError::IncompleteRequired(vec!["Check walk-in temperature".to_owned()])
        );
        assert!(err.to_string().contains("Check walk-in temperature"));
    }

    #[test]
    fn test_completion_rejects_unknown_and_duplicate_answers() {
        assert_eq!(
            evaluate_completion(&opening_items(), &[answer(99, true)]),
            Err(ChecklistError::UnknownItem(ChecklistItemId::new(99)))
        );
        assert_eq!(
            evaluate_completion(
                &opening_items(),
                &[answer(1, true), answer(2, true), answer(1, false)]
            ),
            Err(ChecklistError::DuplicateAnswer(ChecklistItemId::new(1)))
        );
    }

    #[test]
    fn test_completion_requires_active_items() {
        assert_eq!(
            evaluate_completion(&[], &[]),
            Err(ChecklistError::NoActiveItems)
        );
    }

    #[test]
    fn test_answer_wire_format() {
        let parsed: Vec<ChecklistAnswer> =
            serde_json::from_str(r#"[{"id": 4, "isCompleted": true}]"#).unwrap();
        assert_eq!(parsed, vec![answer(4, true)]);

        let draft: ChecklistItemDraft = serde_json::from_str(r#"{"label": "Mop"}"#).unwrap();
        assert!(!draft.is_required);
    }
}
