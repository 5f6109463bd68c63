//! Login and session identity.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::EmployeeRepository;
use crate::error::{AppError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, login_rate_limiter};
use crate::models::Employee;
use crate::services::auth::{AuthService, LoginResponse};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    let login = Router::new()
        .route("/api/auth/login", post(login))
        .layer(login_rate_limiter());

    Router::new().merge(login).route("/api/auth/me", get(me))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Exchange email and password for a bearer token.
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_owned(),
        ));
    }

    let response = AuthService::new(state.pool(), state.jwt())
        .login(&body.email, &body.password)
        .await?;
    Ok(Json(response))
}

/// The signed-in employee, read fresh from the database.
#[instrument(skip_all, fields(employee_id = %user.id))]
async fn me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<Employee>> {
    let employee = EmployeeRepository::new(state.pool())
        .get(user.store_id, user.id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| AppError::Unauthorized("account is no longer active".to_owned()))?;
    Ok(Json(employee))
}
