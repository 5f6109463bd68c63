//! Kitchen dashboard statistics.
//!
//! The server loads the day's active checklist items, checklist completions
//! and waste entries, then hands them to [`compute`]. Everything here is plain
//! filtering and arithmetic over those collections.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checklist::{CompletedItem, completion_rate};
use crate::{ChecklistType, WasteReason};

/// Whole percent of `part` in `total`, rounded half up. `0` of `0` is `0`.
#[must_use]
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (part.min(total) * 100 + total / 2) / total;
    u8::try_from(rounded).unwrap_or(100)
}

/// Time of day by which each checklist should be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecklistDeadlines {
    pub opening: NaiveTime,
    pub transition: NaiveTime,
    pub closing: NaiveTime,
}

impl Default for ChecklistDeadlines {
    fn default() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(10, 30, 0).unwrap_or(NaiveTime::MIN),
            transition: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            closing: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl ChecklistDeadlines {
    /// Deadline for one checklist type.
    #[must_use]
    pub const fn for_type(&self, checklist_type: ChecklistType) -> NaiveTime {
        match checklist_type {
            ChecklistType::Opening => self.opening,
            ChecklistType::Transition => self.transition,
            ChecklistType::Closing => self.closing,
        }
    }
}

/// An active checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub checklist_type: ChecklistType,
    pub is_required: bool,
}

/// A completion recorded for the dashboard date, in store-local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSnapshot {
    pub checklist_type: ChecklistType,
    pub completed_at: NaiveDateTime,
    pub items: Vec<CompletedItem>,
}

/// A waste entry recorded for the dashboard date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasteSnapshot {
    pub item_name: String,
    pub cost: Decimal,
    pub reason: WasteReason,
}

/// Everything [`compute`] needs.
#[derive(Debug, Clone, Copy)]
pub struct DashboardInput<'a> {
    /// Shift date being reported on.
    pub date: NaiveDate,
    /// Current store-local time.
    pub now: NaiveDateTime,
    pub deadlines: ChecklistDeadlines,
    pub daily_waste_budget: Option<Decimal>,
    pub items: &'a [ItemSnapshot],
    pub completions: &'a [CompletionSnapshot],
    pub waste: &'a [WasteSnapshot],
}

/// State of one checklist type for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStatus {
    pub checklist_type: ChecklistType,
    pub item_count: usize,
    pub required_count: usize,
    pub completed: bool,
    pub completion_count: usize,
    /// Time of the most recent completion.
    pub completed_at: Option<NaiveDateTime>,
    /// Share of items ticked on the most recent completion.
    pub completion_rate: u8,
    pub deadline: NaiveTime,
    pub overdue: bool,
}

/// Waste totals for one reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonTotal {
    pub reason: WasteReason,
    pub entry_count: usize,
    pub cost: Decimal,
}

/// The most expensive item thrown away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopWasteItem {
    pub item_name: String,
    pub entry_count: usize,
    pub cost: Decimal,
}

/// Waste figures for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteSummary {
    pub entry_count: usize,
    pub total_cost: Decimal,
    pub by_reason: Vec<ReasonTotal>,
    pub top_item: Option<TopWasteItem>,
    pub budget: Option<Decimal>,
    pub over_budget: bool,
}

/// The dashboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenDashboardStats {
    pub date: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub checklists: Vec<ChecklistStatus>,
    pub checklists_completed: usize,
    pub checklists_total: usize,
    pub overall_completion_rate: u8,
    pub overdue_count: usize,
    pub waste: WasteSummary,
}

/// Whether a checklist without a completion is late.
///
/// Past dates are late outright; today is late once the deadline has passed;
/// future dates are never late.
#[must_use]
pub fn is_overdue(date: NaiveDate, now: NaiveDateTime, deadline: NaiveTime) -> bool {
    let today = now.date();
    date < today || (date == today && now.time() > deadline)
}

/// Build the dashboard for one store and date.
#[must_use]
pub fn compute(input: &DashboardInput<'_>) -> KitchenDashboardStats {
    let checklists: Vec<ChecklistStatus> = ChecklistType::ALL
        .iter()
        .filter_map(|&checklist_type| checklist_status(input, checklist_type))
        .collect();

    let checklists_total = checklists.len();
    let checklists_completed = checklists.iter().filter(|c| c.completed).count();
    let overdue_count = checklists.iter().filter(|c| c.overdue).count();

    KitchenDashboardStats {
        date: input.date,
        generated_at: input.now,
        overall_completion_rate: percent(checklists_completed, checklists_total),
        checklists_completed,
        checklists_total,
        overdue_count,
        checklists,
        waste: waste_summary(input.waste, input.daily_waste_budget),
    }
}

fn checklist_status(
    input: &DashboardInput<'_>,
    checklist_type: ChecklistType,
) -> Option<ChecklistStatus> {
    let items: Vec<&ItemSnapshot> = input
        .items
        .iter()
        .filter(|item| item.checklist_type == checklist_type)
        .collect();
    if items.is_empty() {
        return None;
    }

    let completions: Vec<&CompletionSnapshot> = input
        .completions
        .iter()
        .filter(|c| c.checklist_type == checklist_type)
        .collect();
    let latest = completions.iter().max_by_key(|c| c.completed_at);
    let deadline = input.deadlines.for_type(checklist_type);
    let completed = latest.is_some();

    Some(ChecklistStatus {
        checklist_type,
        item_count: items.len(),
        required_count: items.iter().filter(|item| item.is_required).count(),
        completed,
        completion_count: completions.len(),
        completed_at: latest.map(|c| c.completed_at),
        completion_rate: latest.map_or(0, |c| completion_rate(&c.items)),
        deadline,
        overdue: !completed && is_overdue(input.date, input.now, deadline),
    })
}

fn waste_summary(entries: &[WasteSnapshot], budget: Option<Decimal>) -> WasteSummary {
    let total_cost: Decimal = entries.iter().map(|entry| entry.cost).sum();

    let mut reasons: BTreeMap<WasteReason, (usize, Decimal)> = BTreeMap::new();
    // Keyed by the normalized name; the first spelling seen is the one shown.
    let mut items: BTreeMap<String, TopWasteItem> = BTreeMap::new();
    for entry in entries {
        let reason = reasons.entry(entry.reason).or_default();
        reason.0 += 1;
        reason.1 += entry.cost;

        let key = entry.item_name.trim().to_lowercase();
        let item = items.entry(key).or_insert_with(|| TopWasteItem {
            item_name: entry.item_name.trim().to_owned(),
            entry_count: 0,
            cost: Decimal::ZERO,
        });
        item.entry_count += 1;
        item.cost += entry.cost;
    }

    let mut by_reason: Vec<ReasonTotal> = reasons
        .into_iter()
        .map(|(reason, (entry_count, cost))| ReasonTotal {
            reason,
            entry_count,
            cost,
        })
        .collect();
    by_reason.sort_by(|a, b| b.cost.cmp(&a.cost).then(a.reason.cmp(&b.reason)));

    let top_item = items
        .into_values()
        .max_by(|a, b| {
            a.cost
                .cmp(&b.cost)
                .then(a.entry_count.cmp(&b.entry_count))
                .then(b.item_name.cmp(&a.item_name))
        });

    WasteSummary {
        entry_count: entries.len(),
        total_cost,
        by_reason,
        top_item,
        budget,
        over_budget: budget.is_some_and(|limit| total_cost > limit),
    }
}
