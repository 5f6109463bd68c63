//! Shift checklist routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mise_core::ChecklistType;
use mise_core::checklist::{
    ChecklistAnswer, ChecklistItemDraft, evaluate_completion, normalize_drafts,
};

use crate::db::ChecklistRepository;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireLeader};
use crate::models::{ChecklistCompletion, ChecklistItem, clean_optional};
use crate::routes::store_clock;
use crate::state::AppState;

/// Build the checklist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/kitchen/checklists/completions",
            get(list_completions),
        )
        .route(
            "/api/kitchen/checklists/{checklist_type}/items",
            get(list_items).put(replace_items),
        )
        .route(
            "/api/kitchen/checklists/{checklist_type}/complete",
            post(complete),
        )
}

/// Replacement list for one checklist type.
#[derive(Debug, Deserialize)]
pub struct ReplaceItemsRequest {
    pub items: Vec<ChecklistItemDraft>,
}

/// A completion submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub items: Vec<ChecklistAnswer>,
    /// Defaults to the store's current date.
    pub shift_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionsQuery {
    #[serde(rename = "type")]
    pub checklist_type: Option<ChecklistType>,
    pub date: Option<NaiveDate>,
}

/// Completion record plus its completion rate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionView {
    #[serde(flatten)]
    pub completion: ChecklistCompletion,
    pub completion_rate: u8,
}

impl From<ChecklistCompletion> for CompletionView {
    fn from(completion: ChecklistCompletion) -> Self {
        Self {
            completion_rate: completion.completion_rate(),
            completion,
        }
    }
}

#[instrument(skip_all, fields(store_id = %user.store_id, checklist_type = %checklist_type))]
async fn list_items(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(checklist_type): ApiPath<ChecklistType>,
) -> ApiResult<Json<Vec<ChecklistItem>>> {
    let items = ChecklistRepository::new(state.pool())
        .active_items(user.store_id, checklist_type)
        .await?;
    Ok(Json(items))
}

/// Replace the active list. The old list stays active if anything fails.
#[instrument(skip_all, fields(store_id = %user.store_id, checklist_type = %checklist_type))]
async fn replace_items(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(checklist_type): ApiPath<ChecklistType>,
    ApiJson(body): ApiJson<ReplaceItemsRequest>,
) -> ApiResult<Json<Vec<ChecklistItem>>> {
    let drafts = normalize_drafts(body.items)?;
    let items = ChecklistRepository::new(state.pool())
        .replace_items(user.store_id, checklist_type, &drafts, Some(user.id))
        .await?;
    Ok(Json(items))
}

#[instrument(skip_all, fields(store_id = %user.store_id, checklist_type = %checklist_type))]
async fn complete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(checklist_type): ApiPath<ChecklistType>,
    ApiJson(body): ApiJson<CompleteRequest>,
) -> ApiResult<(StatusCode, Json<CompletionView>)> {
    let repo = ChecklistRepository::new(state.pool());

    let active: Vec<_> = repo
        .active_items(user.store_id, checklist_type)
        .await?
        .iter()
        .map(ChecklistItem::as_active)
        .collect();
    let items = evaluate_completion(&active, &body.items)?;

    let shift_date = match body.shift_date {
        Some(date) => date,
        None => store_clock(&state, user.store_id).await?.1.date(),
    };
    let notes = clean_optional(body.notes);

    let completion = repo
        .record_completion(
            user.store_id,
            checklist_type,
            shift_date,
            user.id,
            &items,
            notes.as_deref(),
        )
        .await?;

    tracing::info!(
        completion_id = %completion.id,
        shift_date = %shift_date,
        "Checklist completed"
    );
    Ok((StatusCode::CREATED, Json(completion.into())))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list_completions(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CompletionsQuery>,
) -> ApiResult<Json<Vec<CompletionView>>> {
    let date = match query.date {
        Some(date) => date,
        None => store_clock(&state, user.store_id).await?.1.date(),
    };
    let completions = ChecklistRepository::new(state.pool())
        .completions(user.store_id, query.checklist_type, date)
        .await?;
    Ok(Json(completions.into_iter().map(Into::into).collect()))
}
