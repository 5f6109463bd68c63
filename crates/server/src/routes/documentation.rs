//! Employee documentation routes.
//!
//! Leaders document coaching, recognition and discipline. The documented
//! employee can read their records and acknowledge them.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use mise_core::{DocumentationId, DocumentationKind, EmployeeId, StoreId};

use crate::db::documentation::DocumentationFilter;
use crate::db::{DocumentationRepository, EmployeeRepository};
use crate::error::{AppError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireLeader};
use crate::models::documentation::Acknowledgement;
use crate::models::{Documentation, DocumentationInput, clean_optional};
use crate::routes::store_clock;
use crate::state::AppState;

/// Build the documentation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/documentation", get(list).post(create))
        .route(
            "/api/documentation/{id}",
            get(show).put(update).delete(delete),
        )
        .route("/api/documentation/{id}/acknowledge", post(acknowledge))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub employee_id: Option<EmployeeId>,
    pub kind: Option<DocumentationKind>,
}

/// Validate a body and resolve its incident date.
async fn prepare(
    state: &AppState,
    store: StoreId,
    body: DocumentationInput,
) -> ApiResult<(DocumentationInput, NaiveDate)> {
    let input = body.normalize().map_err(AppError::BadRequest)?;
    if !EmployeeRepository::new(state.pool())
        .is_active_member(store, input.employee_id)
        .await?
    {
        return Err(AppError::BadRequest(format!(
            "employee {} is not an active member of this store",
            input.employee_id
        )));
    }
    let incident_date = match input.incident_date {
        Some(date) => date,
        None => store_clock(state, store).await?.1.date(),
    };
    Ok((input, incident_date))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Documentation>>> {
    let records = DocumentationRepository::new(state.pool())
        .list(
            user.store_id,
            DocumentationFilter {
                employee_id: query.employee_id,
                kind: query.kind,
            },
        )
        .await?;
    Ok(Json(records))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn create(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DocumentationInput>,
) -> ApiResult<(StatusCode, Json<Documentation>)> {
    let (input, incident_date) = prepare(&state, user.store_id, body).await?;
    let record = DocumentationRepository::new(state.pool())
        .create(user.store_id, user.id, incident_date, &input)
        .await?;

    tracing::info!(
        documentation_id = %record.id,
        employee_id = %record.employee_id,
        kind = %record.kind,
        "Documentation recorded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Leaders see any record; employees see their own.
#[instrument(skip_all, fields(store_id = %user.store_id, documentation_id = %id))]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DocumentationId>,
) -> ApiResult<Json<Documentation>> {
    let record = DocumentationRepository::new(state.pool())
        .get(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("documentation {id}")))?;
    if !user.owns_or_leads(record.employee_id) {
        return Err(AppError::Forbidden(
            "you can only view documentation about yourself".to_owned(),
        ));
    }
    Ok(Json(record))
}

/// Replace a record. Editing clears any earlier acknowledgement.
#[instrument(skip_all, fields(store_id = %user.store_id, documentation_id = %id))]
async fn update(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DocumentationId>,
    ApiJson(body): ApiJson<DocumentationInput>,
) -> ApiResult<Json<Documentation>> {
    let (input, incident_date) = prepare(&state, user.store_id, body).await?;
    let record = DocumentationRepository::new(state.pool())
        .update(user.store_id, id, incident_date, &input)
        .await?;
    Ok(Json(record))
}

#[instrument(skip_all, fields(store_id = %user.store_id, documentation_id = %id))]
async fn acknowledge(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DocumentationId>,
    ApiJson(body): ApiJson<Acknowledgement>,
) -> ApiResult<Json<Documentation>> {
    let repo = DocumentationRepository::new(state.pool());
    let record = repo
        .get(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("documentation {id}")))?;
    if record.employee_id != user.id {
        return Err(AppError::Forbidden(
            "only the documented employee can acknowledge".to_owned(),
        ));
    }

    let comment = clean_optional(body.comment);
    let record = repo
        .acknowledge(user.store_id, id, user.id, comment.as_deref())
        .await?;
    Ok(Json(record))
}

#[instrument(skip_all, fields(store_id = %user.store_id, documentation_id = %id))]
async fn delete(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DocumentationId>,
) -> ApiResult<StatusCode> {
    DocumentationRepository::new(state.pool())
        .soft_delete(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
