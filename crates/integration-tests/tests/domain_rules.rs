//! Rules that span the core and server crates.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use mise_core::checklist::{ChecklistAnswer, ChecklistItemDraft, evaluate_completion, normalize_drafts};
use mise_core::dashboard::is_overdue;
use mise_core::{ChecklistItemId, ChecklistType, EmployeeId, StoreId};
use mise_server::models::setup::SetupSheetInput;
use mise_server::models::{ChecklistItem, SetupSheet, StoreSettings};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Checklists
// =============================================================================

/// Items as the repository would return them after a replacement.
fn stored_items(drafts: &[ChecklistItemDraft]) -> Vec<ChecklistItem> {
    (1..)
        .zip(drafts)
        .map(|(id, draft)| ChecklistItem {
            id: ChecklistItemId::new(id),
            store_id: StoreId::new(1),
            checklist_type: ChecklistType::Closing,
            label: draft.label.clone(),
            is_required: draft.is_required,
            sort_order: id - 1,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
        })
        .collect()
}

#[test]
fn test_replaced_list_then_completion() {
    let drafts = normalize_drafts(vec![
        ChecklistItemDraft {
            label: " Filter fryers ".to_owned(),
            is_required: true,
        },
        ChecklistItemDraft {
            label: "Wipe menu boards".to_owned(),
            is_required: false,
        },
    ])
    .unwrap();
    let items = stored_items(&drafts);
    let active: Vec<_> = items.iter().map(ChecklistItem::as_active).collect();

    let completed = evaluate_completion(
        &active,
        &[ChecklistAnswer {
            id: ChecklistItemId::new(1),
            is_completed: true,
        }],
    )
    .unwrap();

    assert_eq!(completed.len(), 2);
    assert_eq!(completed[0].label, "Filter fryers");
    assert!(!completed[1].is_completed);
    assert_eq!(mise_core::checklist::completion_rate(&completed), 50);
}

#[test]
fn test_completion_against_replaced_list_rejects_old_ids() {
    let drafts = normalize_drafts(vec![ChecklistItemDraft {
        label: "Lock doors".to_owned(),
        is_required: true,
    }])
    .unwrap();
    let items = stored_items(&drafts);
    let active: Vec<_> = items.iter().map(ChecklistItem::as_active).collect();

    // An answer for an item from the previous list.
    let result = evaluate_completion(
        &active,
        &[ChecklistAnswer {
            id: ChecklistItemId::new(99),
            is_completed: true,
        }],
    );
    assert!(result.is_err());
}

// =============================================================================
// Setup sheets
// =============================================================================

#[test]
fn test_sheet_input_snaps_to_week_and_finds_day() {
    let input: SetupSheetInput = serde_json::from_value(serde_json::json!({
        "weekStart": "2024-03-13",
        "weekEnd": "2024-03-20",
        "days": [{
            "day": "fri",
            "blocks": [{
                "start": "10:30:00",
                "end": "14:00:00",
                "positions": [{ "position": "Grill", "employeeId": 4 }]
            }]
        }]
    }))
    .unwrap();
    let valid = input.normalize().unwrap();
    assert_eq!(valid.week.start(), date(2024, 3, 10));
    assert_eq!(valid.week.end(), date(2024, 3, 16));
    assert_eq!(valid.name, "Week of Mar 10, 2024");

    let sheet = SetupSheet {
        id: mise_core::SetupSheetId::new(1),
        store_id: StoreId::new(1),
        template_id: None,
        name: valid.name,
        week_start: valid.week.start(),
        week_end: valid.week.end(),
        days: valid.days,
        notes: None,
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let friday = sheet.day_for(date(2024, 3, 15)).unwrap();
    assert_eq!(friday.day, Weekday::Fri);
    assert_eq!(
        friday.blocks[0].positions[0].employee_id,
        Some(EmployeeId::new(4))
    );
    assert!(sheet.day_for(date(2024, 3, 14)).is_none());
    assert!(sheet.day_for(date(2024, 3, 22)).is_none());
}

// =============================================================================
// Store clock
// =============================================================================

#[test]
fn test_store_local_time_drives_overdue() {
    let settings = StoreSettings {
        utc_offset_minutes: -5 * 60,
        ..StoreSettings::default()
    };
    // 03:00 UTC on the 13th is 22:00 on the 12th in the store.
    let now = settings.local_time(Utc.with_ymd_and_hms(2024, 3, 13, 3, 0, 0).unwrap());
    assert_eq!(now.date(), date(2024, 3, 12));

    let deadlines = settings.checklist_deadlines;
    assert!(is_overdue(
        now.date(),
        now,
        deadlines.for_type(ChecklistType::Opening)
    ));
    assert!(!is_overdue(
        now.date(),
        now,
        deadlines.for_type(ChecklistType::Closing)
    ));
}
