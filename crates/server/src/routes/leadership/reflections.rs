//! Leadership reflection routes.
//!
//! Everyone writes their own reflections. Leaders can read and manage any
//! reflection in the store.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::instrument;

use mise_core::{EmployeeId, ReflectionId};

use crate::db::ReflectionRepository;
use crate::error::{AppError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Reflection, ReflectionInput};
use crate::routes::store_clock;
use crate::state::AppState;

/// Build the reflection router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leadership/reflections", get(list).post(create))
        .route(
            "/api/leadership/reflections/{id}",
            get(show).put(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub employee_id: Option<EmployeeId>,
}

/// Whose reflections a list request may see.
///
/// Leaders may filter by anyone or see all. Everyone else only sees their
/// own.
fn list_scope(user: &CurrentUser, requested: Option<EmployeeId>) -> ApiResult<Option<EmployeeId>> {
    if user.is_leader() {
        return Ok(requested);
    }
    match requested {
        Some(id) if id != user.id => Err(AppError::Forbidden(
            "you can only view your own reflections".to_owned(),
        )),
        _ => Ok(Some(user.id)),
    }
}

async fn load_owned(
    state: &AppState,
    user: &CurrentUser,
    id: ReflectionId,
) -> ApiResult<Reflection> {
    let reflection = ReflectionRepository::new(state.pool())
        .get(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("reflection {id}")))?;
    if !user.owns_or_leads(reflection.employee_id) {
        return Err(AppError::Forbidden(
            "you can only access your own reflections".to_owned(),
        ));
    }
    Ok(reflection)
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Reflection>>> {
    let employee = list_scope(&user, query.employee_id)?;
    let reflections = ReflectionRepository::new(state.pool())
        .list(user.store_id, employee)
        .await?;
    Ok(Json(reflections))
}

#[instrument(skip_all, fields(store_id = %user.store_id, employee_id = %user.id))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReflectionInput>,
) -> ApiResult<(StatusCode, Json<Reflection>)> {
    let input = body.normalize().map_err(AppError::BadRequest)?;
    let date = match input.reflection_date {
        Some(date) => date,
        None => store_clock(&state, user.store_id).await?.1.date(),
    };
    let reflection = ReflectionRepository::new(state.pool())
        .create(user.store_id, user.id, date, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(reflection)))
}

#[instrument(skip_all, fields(store_id = %user.store_id, reflection_id = %id))]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReflectionId>,
) -> ApiResult<Json<Reflection>> {
    Ok(Json(load_owned(&state, &user, id).await?))
}

/// Replace a reflection. An omitted date keeps the existing one.
#[instrument(skip_all, fields(store_id = %user.store_id, reflection_id = %id))]
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReflectionId>,
    ApiJson(body): ApiJson<ReflectionInput>,
) -> ApiResult<Json<Reflection>> {
    let input = body.normalize().map_err(AppError::BadRequest)?;
    let existing = load_owned(&state, &user, id).await?;
    let date = input.reflection_date.unwrap_or(existing.reflection_date);
    let reflection = ReflectionRepository::new(state.pool())
        .update(user.store_id, id, date, &input)
        .await?;
    Ok(Json(reflection))
}

#[instrument(skip_all, fields(store_id = %user.store_id, reflection_id = %id))]
async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReflectionId>,
) -> ApiResult<StatusCode> {
    load_owned(&state, &user, id).await?;
    ReflectionRepository::new(state.pool())
        .delete(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mise_core::{EmployeeRole, StoreId};

    fn user(role: EmployeeRole) -> CurrentUser {
        CurrentUser {
            id: EmployeeId::new(3),
            store_id: StoreId::new(1),
            name: "Sam".to_owned(),
            role,
        }
    }

    #[test]
    fn test_team_member_sees_only_own() {
        let member = user(EmployeeRole::TeamMember);
        assert_eq!(list_scope(&member, None).unwrap(), Some(EmployeeId::new(3)));
        assert_eq!(
            list_scope(&member, Some(EmployeeId::new(3))).unwrap(),
            Some(EmployeeId::new(3))
        );
        assert!(matches!(
            list_scope(&member, Some(EmployeeId::new(4))),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_leader_sees_anyone() {
        let leader = user(EmployeeRole::Leader);
        assert_eq!(list_scope(&leader, None).unwrap(), None);
        assert_eq!(
            list_scope(&leader, Some(EmployeeId::new(9))).unwrap(),
            Some(EmployeeId::new(9))
        );
    }
}
