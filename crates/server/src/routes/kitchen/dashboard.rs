//! Kitchen dashboard route.

use axum::{Json, Router, extract::State, routing::get};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use mise_core::dashboard::{
    CompletionSnapshot, DashboardInput, ItemSnapshot, KitchenDashboardStats, WasteSnapshot,
    compute,
};

use crate::db::{ChecklistRepository, WasteRepository};
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::middleware::RequireAuth;
use crate::routes::store_clock;
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/kitchen/dashboard", get(dashboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Defaults to the store's current date.
    pub date: Option<NaiveDate>,
}

/// Checklist and waste figures for one shift date.
#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn dashboard(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> ApiResult<Json<KitchenDashboardStats>> {
    let (settings, now) = store_clock(&state, user.store_id).await?;
    let date = query.date.unwrap_or_else(|| now.date());

    let checklists = ChecklistRepository::new(state.pool());
    let items: Vec<ItemSnapshot> = checklists
        .all_active_items(user.store_id)
        .await?
        .into_iter()
        .map(|item| ItemSnapshot {
            checklist_type: item.checklist_type,
            is_required: item.is_required,
        })
        .collect();
    let completions: Vec<CompletionSnapshot> = checklists
        .completions(user.store_id, None, date)
        .await?
        .into_iter()
        .map(|completion| CompletionSnapshot {
            checklist_type: completion.checklist_type,
            completed_at: settings.local_time(completion.completed_at),
            items: completion.items,
        })
        .collect();
    let waste: Vec<WasteSnapshot> = WasteRepository::new(state.pool())
        .for_date(user.store_id, date)
        .await?
        .into_iter()
        .map(|entry| WasteSnapshot {
            item_name: entry.item_name,
            cost: entry.cost,
            reason: entry.reason,
        })
        .collect();

    let stats = compute(&DashboardInput {
        date,
        now,
        deadlines: settings.checklist_deadlines,
        daily_waste_budget: settings.daily_waste_budget,
        items: &items,
        completions: &completions,
        waste: &waste,
    });
    Ok(Json(stats))
}
