//! Setup template and weekly setup sheet routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mise_core::setup::{SetupDay, days_from_template, scheduled_employees};
use mise_core::week::WeekRange;
use mise_core::{SetupSheetId, SetupTemplateId, StoreId};

use crate::db::{EmployeeRepository, SetupSheetRepository};
use crate::error::{AppError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireLeader};
use crate::models::setup::{SetupSheetView, ValidSetupSheet};
use crate::models::{SetupSheetInput, SetupTemplate, SetupTemplateInput};
use crate::routes::store_clock;
use crate::state::AppState;

/// Build the setup sheet router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/setup-sheets/templates",
            get(list_templates).post(create_template),
        )
        .route(
            "/api/setup-sheets/templates/{id}",
            get(show_template).put(update_template).delete(delete_template),
        )
        .route("/api/setup-sheets", get(list_sheets).post(create_sheet))
        .route("/api/setup-sheets/week", get(week_sheet))
        .route("/api/setup-sheets/day", get(daily_schedule))
        .route(
            "/api/setup-sheets/{id}",
            get(show_sheet).put(update_sheet).delete(delete_sheet),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    /// Defaults to the store's current date.
    pub date: Option<NaiveDate>,
}

/// One day of a setup sheet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub sheet_id: SetupSheetId,
    pub sheet_name: String,
    /// `None` when the sheet has nothing planned for that weekday.
    pub day: Option<SetupDay>,
}

async fn resolve_date(
    state: &AppState,
    store: StoreId,
    date: Option<NaiveDate>,
) -> ApiResult<NaiveDate> {
    match date {
        Some(date) => Ok(date),
        None => Ok(store_clock(state, store).await?.1.date()),
    }
}

/// Validate a sheet body, fill its days from the template when it has none,
/// and check that every assigned employee works at the store.
async fn prepare_sheet(
    state: &AppState,
    store: StoreId,
    body: SetupSheetInput,
) -> ApiResult<ValidSetupSheet> {
    let mut sheet = body.normalize().map_err(AppError::BadRequest)?;

    if let Some(template_id) = sheet.template_id {
        let template = SetupSheetRepository::new(state.pool())
            .get_template(store, template_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("template {template_id} does not exist"))
            })?;
        if sheet.days.is_empty() {
            sheet.days = days_from_template(&template.days);
        }
    }

    let employees = EmployeeRepository::new(state.pool());
    for employee in scheduled_employees(&sheet.days) {
        if !employees.is_active_member(store, employee).await? {
            return Err(AppError::BadRequest(format!(
                "employee {employee} is not an active member of this store"
            )));
        }
    }

    Ok(sheet)
}

// =============================================================================
// Templates
// =============================================================================

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list_templates(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SetupTemplate>>> {
    let templates = SetupSheetRepository::new(state.pool())
        .list_templates(user.store_id)
        .await?;
    Ok(Json(templates))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn create_template(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetupTemplateInput>,
) -> ApiResult<(StatusCode, Json<SetupTemplate>)> {
    let input = body.normalize().map_err(AppError::BadRequest)?;
    let template = SetupSheetRepository::new(state.pool())
        .create_template(user.store_id, user.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

#[instrument(skip_all, fields(store_id = %user.store_id, template_id = %id))]
async fn show_template(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SetupTemplateId>,
) -> ApiResult<Json<SetupTemplate>> {
    SetupSheetRepository::new(state.pool())
        .get_template(user.store_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("template {id}")))
}

#[instrument(skip_all, fields(store_id = %user.store_id, template_id = %id))]
async fn update_template(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SetupTemplateId>,
    ApiJson(body): ApiJson<SetupTemplateInput>,
) -> ApiResult<Json<SetupTemplate>> {
    let input = body.normalize().map_err(AppError::BadRequest)?;
    let template = SetupSheetRepository::new(state.pool())
        .update_template(user.store_id, id, &input)
        .await?;
    Ok(Json(template))
}

#[instrument(skip_all, fields(store_id = %user.store_id, template_id = %id))]
async fn delete_template(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SetupTemplateId>,
) -> ApiResult<StatusCode> {
    SetupSheetRepository::new(state.pool())
        .delete_template(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Sheets
// =============================================================================

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list_sheets(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<Json<Vec<SetupSheetView>>> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && to < from
    {
        return Err(AppError::BadRequest(format!(
            "to ({to}) is before from ({from})"
        )));
    }
    let sheets = SetupSheetRepository::new(state.pool())
        .list_sheets(user.store_id, query.from, query.to)
        .await?;
    Ok(Json(sheets.into_iter().map(Into::into).collect()))
}

/// Create a sheet. The dates are snapped to the Sunday to Saturday week.
#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn create_sheet(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetupSheetInput>,
) -> ApiResult<(StatusCode, Json<SetupSheetView>)> {
    let sheet = prepare_sheet(&state, user.store_id, body).await?;
    let created = SetupSheetRepository::new(state.pool())
        .create_sheet(user.store_id, user.id, &sheet)
        .await?;

    tracing::info!(
        setup_sheet_id = %created.id,
        week_start = %created.week_start,
        "Setup sheet created"
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// The sheet for the week containing `date`.
#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn week_sheet(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> ApiResult<Json<SetupSheetView>> {
    let date = resolve_date(&state, user.store_id, query.date).await?;
    let week = WeekRange::containing(date)?;
    SetupSheetRepository::new(state.pool())
        .sheet_for_week(user.store_id, week.start())
        .await?
        .map(|sheet| Json(sheet.into()))
        .ok_or_else(|| {
            AppError::not_found(format!("setup sheet for the week of {}", week.start()))
        })
}

/// The schedule for a single date.
#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn daily_schedule(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> ApiResult<Json<DailySchedule>> {
    let date = resolve_date(&state, user.store_id, query.date).await?;
    let week = WeekRange::containing(date)?;
    let sheet = SetupSheetRepository::new(state.pool())
        .sheet_for_week(user.store_id, week.start())
        .await?
        .ok_or_else(|| AppError::not_found(format!("setup sheet covering {date}")))?;

    Ok(Json(DailySchedule {
        date,
        sheet_id: sheet.id,
        day: sheet.day_for(date).cloned(),
        sheet_name: sheet.name,
    }))
}

#[instrument(skip_all, fields(store_id = %user.store_id, setup_sheet_id = %id))]
async fn show_sheet(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SetupSheetId>,
) -> ApiResult<Json<SetupSheetView>> {
    SetupSheetRepository::new(state.pool())
        .get_sheet(user.store_id, id)
        .await?
        .map(|sheet| Json(sheet.into()))
        .ok_or_else(|| AppError::not_found(format!("setup sheet {id}")))
}

#[instrument(skip_all, fields(store_id = %user.store_id, setup_sheet_id = %id))]
async fn update_sheet(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SetupSheetId>,
    ApiJson(body): ApiJson<SetupSheetInput>,
) -> ApiResult<Json<SetupSheetView>> {
    let sheet = prepare_sheet(&state, user.store_id, body).await?;
    let updated = SetupSheetRepository::new(state.pool())
        .update_sheet(user.store_id, id, &sheet)
        .await?;
    Ok(Json(updated.into()))
}

#[instrument(skip_all, fields(store_id = %user.store_id, setup_sheet_id = %id))]
async fn delete_sheet(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SetupSheetId>,
) -> ApiResult<StatusCode> {
    SetupSheetRepository::new(state.pool())
        .delete_sheet(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
