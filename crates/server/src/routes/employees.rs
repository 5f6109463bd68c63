//! Employee management.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use mise_core::{Department, EmployeeId, EmployeeRole};

use crate::db::EmployeeRepository;
use crate::error::{AppError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireDirector};
use crate::models::{Employee, EmployeeUpdate, NewEmployee};
use crate::services::auth::AccountService;
use crate::state::AppState;

/// Build the employees router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list).post(create))
        .route(
            "/api/employees/{id}",
            get(show).put(update).delete(deactivate),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub email: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: EmployeeRole,
    #[serde(default)]
    pub department: Department,
    pub position: Option<String>,
    pub password: String,
}

const fn default_role() -> EmployeeRole {
    EmployeeRole::TeamMember
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let employees = EmployeeRepository::new(state.pool())
        .list(user.store_id, query.include_inactive)
        .await?;
    Ok(Json(employees))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn create(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let employee = NewEmployee::parse(
        &body.email,
        &body.name,
        body.role,
        body.department,
        body.position,
    )
    .map_err(AppError::BadRequest)?;

    let created = AccountService::new(state.pool())
        .create_employee(user.store_id, &employee, &body.password)
        .await?;

    tracing::info!(employee_id = %created.id, role = %created.role, "Employee created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(store_id = %user.store_id, employee_id = %id))]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EmployeeId>,
) -> ApiResult<Json<Employee>> {
    EmployeeRepository::new(state.pool())
        .get(user.store_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("employee {id}")))
}

#[instrument(skip_all, fields(store_id = %user.store_id, employee_id = %id))]
async fn update(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EmployeeId>,
    ApiJson(body): ApiJson<EmployeeUpdate>,
) -> ApiResult<Json<Employee>> {
    let update = body.normalize().map_err(AppError::BadRequest)?;
    if id == user.id && (update.is_active == Some(false) || update.role.is_some_and(|r| r < user.role)) {
        return Err(AppError::BadRequest(
            "you cannot deactivate or demote yourself".to_owned(),
        ));
    }

    let employee = EmployeeRepository::new(state.pool())
        .update(user.store_id, id, &update)
        .await?;
    Ok(Json(employee))
}

#[instrument(skip_all, fields(store_id = %user.store_id, employee_id = %id))]
async fn deactivate(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EmployeeId>,
) -> ApiResult<StatusCode> {
    if id == user.id {
        return Err(AppError::BadRequest(
            "you cannot deactivate yourself".to_owned(),
        ));
    }
    EmployeeRepository::new(state.pool())
        .deactivate(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
