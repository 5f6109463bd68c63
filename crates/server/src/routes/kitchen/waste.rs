//! Waste tracking routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use mise_core::{StoreId, WasteEntryId, WasteReason};

use crate::db::WasteRepository;
use crate::db::waste::WasteFilter;
use crate::error::{AppError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireLeader};
use crate::models::{WasteEntry, WasteEntryInput};
use crate::routes::store_clock;
use crate::state::AppState;

/// Build the waste router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kitchen/waste", get(list).post(create))
        .route(
            "/api/kitchen/waste/{id}",
            get(show).put(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct WasteQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub reason: Option<WasteReason>,
}

impl WasteQuery {
    fn into_filter(self) -> Result<WasteFilter, AppError> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && to < from
        {
            return Err(AppError::BadRequest(format!(
                "to ({to}) is before from ({from})"
            )));
        }
        Ok(WasteFilter {
            from: self.from,
            to: self.to,
            reason: self.reason,
        })
    }
}

/// Validate the body and resolve its shift date.
async fn prepare(
    state: &AppState,
    store: StoreId,
    body: WasteEntryInput,
) -> ApiResult<(NaiveDate, WasteEntryInput)> {
    let input = body.normalize().map_err(AppError::BadRequest)?;
    let shift_date = match input.shift_date {
        Some(date) => date,
        None => store_clock(state, store).await?.1.date(),
    };
    Ok((shift_date, input))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WasteQuery>,
) -> ApiResult<Json<Vec<WasteEntry>>> {
    let filter = query.into_filter()?;
    let entries = WasteRepository::new(state.pool())
        .list(user.store_id, filter)
        .await?;
    Ok(Json(entries))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<WasteEntryInput>,
) -> ApiResult<(StatusCode, Json<WasteEntry>)> {
    let (shift_date, input) = prepare(&state, user.store_id, body).await?;
    let entry = WasteRepository::new(state.pool())
        .create(user.store_id, user.id, shift_date, &input)
        .await?;

    tracing::info!(
        waste_entry_id = %entry.id,
        reason = %entry.reason,
        cost = %entry.cost,
        "Waste recorded"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip_all, fields(store_id = %user.store_id, waste_entry_id = %id))]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WasteEntryId>,
) -> ApiResult<Json<WasteEntry>> {
    WasteRepository::new(state.pool())
        .get(user.store_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("waste entry {id}")))
}

/// Leaders may edit any entry; others only their own.
#[instrument(skip_all, fields(store_id = %user.store_id, waste_entry_id = %id))]
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WasteEntryId>,
    ApiJson(body): ApiJson<WasteEntryInput>,
) -> ApiResult<Json<WasteEntry>> {
    let (shift_date, input) = prepare(&state, user.store_id, body).await?;

    let repo = WasteRepository::new(state.pool());
    let existing = repo
        .get(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("waste entry {id}")))?;
    if !user.owns_or_leads(existing.recorded_by) {
        return Err(AppError::Forbidden(
            "only leaders can edit entries recorded by someone else".to_owned(),
        ));
    }

    let entry = repo.update(user.store_id, id, shift_date, &input).await?;
    Ok(Json(entry))
}

#[instrument(skip_all, fields(store_id = %user.store_id, waste_entry_id = %id))]
async fn delete(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WasteEntryId>,
) -> ApiResult<StatusCode> {
    WasteRepository::new(state.pool())
        .delete(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
