//! 360° evaluation routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mise_core::evaluation::validate_ratings;
use mise_core::{EmployeeId, EvaluationId, EvaluationStatus, RaterRelationship, StoreId};

use crate::db::evaluations::EvaluationFilter;
use crate::db::{EmployeeRepository, EvaluationRepository, RepositoryError};
use crate::error::{AppError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireLeader};
use crate::models::evaluation::{EvaluationRater, RaterAssignment, RaterSubmission};
use crate::models::{CurrentUser, Employee, Evaluation, EvaluationDetail, NewEvaluation};
use crate::state::AppState;

/// Build the evaluation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leadership/360", get(list).post(create))
        .route("/api/leadership/360/assigned", get(assigned))
        .route("/api/leadership/360/{id}", get(show).delete(delete))
        .route("/api/leadership/360/{id}/raters", post(add_rater))
        .route("/api/leadership/360/{id}/responses", post(respond))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<EvaluationStatus>,
    pub subject_id: Option<EmployeeId>,
}

async fn active_employee(state: &AppState, store: StoreId, id: EmployeeId) -> ApiResult<Employee> {
    EmployeeRepository::new(state.pool())
        .get(store, id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| {
            AppError::BadRequest(format!("employee {id} is not an active member of this store"))
        })
}

fn check_relationship(subject: EmployeeId, assignment: RaterAssignment) -> ApiResult<()> {
    if (assignment.relationship == RaterRelationship::SelfAssessment)
        != (assignment.rater_id == subject)
    {
        return Err(AppError::BadRequest(
            "the subject must be rated as \"self\" and only the subject can be".to_owned(),
        ));
    }
    Ok(())
}

/// Leaders see everything; the subject sees the summary and their own
/// response.
fn view_for(user: &CurrentUser, detail: EvaluationDetail) -> ApiResult<EvaluationDetail> {
    if user.is_leader() {
        Ok(detail)
    } else if detail.evaluation.subject_id == user.id {
        Ok(detail.redacted_for(user.id))
    } else {
        Err(AppError::Forbidden(
            "only leaders and the subject can view an evaluation".to_owned(),
        ))
    }
}

/// What a rater gets back after submitting.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmissionView {
    Detail(EvaluationDetail),
    /// Raters who may not view the evaluation see only their own row.
    Own(EvaluationRater),
}

fn submission_view(user: &CurrentUser, detail: EvaluationDetail) -> ApiResult<SubmissionView> {
    if user.is_leader() || detail.evaluation.subject_id == user.id {
        return view_for(user, detail).map(SubmissionView::Detail);
    }
    detail
        .raters
        .into_iter()
        .find(|rater| rater.rater_id == user.id)
        .map(SubmissionView::Own)
        .ok_or_else(|| AppError::Forbidden("you are not a rater on this evaluation".to_owned()))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn list(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Evaluation>>> {
    let evaluations = EvaluationRepository::new(state.pool())
        .list(
            user.store_id,
            EvaluationFilter {
                status: query.status,
                subject_id: query.subject_id,
            },
        )
        .await?;
    Ok(Json(evaluations))
}

/// Evaluations waiting on the caller's response.
#[instrument(skip_all, fields(store_id = %user.store_id, employee_id = %user.id))]
async fn assigned(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Evaluation>>> {
    let evaluations = EvaluationRepository::new(state.pool())
        .assigned_to(user.store_id, user.id)
        .await?;
    Ok(Json(evaluations))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn create(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewEvaluation>,
) -> ApiResult<(StatusCode, Json<EvaluationDetail>)> {
    let evaluation = body.normalize().map_err(AppError::BadRequest)?;

    let subject = active_employee(&state, user.store_id, evaluation.subject_id).await?;
    for assignment in &evaluation.raters {
        if assignment.rater_id != subject.id {
            active_employee(&state, user.store_id, assignment.rater_id).await?;
        }
    }
    let title = evaluation
        .title
        .clone()
        .unwrap_or_else(|| format!("360° Evaluation: {}", subject.name));

    let detail = EvaluationRepository::new(state.pool())
        .create(user.store_id, user.id, &evaluation, &title)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(skip_all, fields(store_id = %user.store_id, evaluation_id = %id))]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EvaluationId>,
) -> ApiResult<Json<EvaluationDetail>> {
    let detail = EvaluationRepository::new(state.pool())
        .detail(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("evaluation {id}")))?;
    Ok(Json(view_for(&user, detail)?))
}

#[instrument(skip_all, fields(store_id = %user.store_id, evaluation_id = %id))]
async fn add_rater(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EvaluationId>,
    ApiJson(assignment): ApiJson<RaterAssignment>,
) -> ApiResult<(StatusCode, Json<EvaluationDetail>)> {
    let repo = EvaluationRepository::new(state.pool());
    let evaluation = repo
        .get(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("evaluation {id}")))?;
    check_relationship(evaluation.subject_id, assignment)?;
    active_employee(&state, user.store_id, assignment.rater_id).await?;

    let detail = repo.add_rater(user.store_id, id, assignment).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Submit the caller's ratings. Each rater responds once.
#[instrument(skip_all, fields(store_id = %user.store_id, evaluation_id = %id))]
async fn respond(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EvaluationId>,
    ApiJson(body): ApiJson<RaterSubmission>,
) -> ApiResult<Json<SubmissionView>> {
    let repo = EvaluationRepository::new(state.pool());
    let evaluation = repo
        .get(user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("evaluation {id}")))?;
    validate_ratings(&evaluation.competencies, &body.ratings)?;

    let comments = crate::models::clean_optional(body.comments);
    let detail = repo
        .submit_response(user.store_id, id, user.id, &body.ratings, comments.as_deref())
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::Forbidden("you are not a rater on this evaluation".to_owned())
            }
            other => other.into(),
        })?;

    submission_view(&user, detail).map(Json)
}

#[instrument(skip_all, fields(store_id = %user.store_id, evaluation_id = %id))]
async fn delete(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EvaluationId>,
) -> ApiResult<StatusCode> {
    EvaluationRepository::new(state.pool())
        .delete(user.store_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use mise_core::{EmployeeRole, EvaluationRaterId};

    fn user(id: i32, role: EmployeeRole) -> CurrentUser {
        CurrentUser {
            id: EmployeeId::new(id),
            store_id: StoreId::new(1),
            name: format!("Employee {id}"),
            role,
        }
    }

    fn rater(id: i32, relationship: RaterRelationship, score: u8) -> EvaluationRater {
        EvaluationRater {
            id: EvaluationRaterId::new(id),
            evaluation_id: EvaluationId::new(1),
            rater_id: EmployeeId::new(id),
            rater_name: format!("Employee {id}"),
            relationship,
            ratings: Some(BTreeMap::from([("Teamwork".to_owned(), score)])),
            comments: None,
            submitted_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    fn detail() -> EvaluationDetail {
        let evaluation = Evaluation {
            id: EvaluationId::new(1),
            store_id: StoreId::new(1),
            subject_id: EmployeeId::new(1),
            subject_name: "Employee 1".to_owned(),
            title: "Spring review".to_owned(),
            competencies: vec!["Teamwork".to_owned()],
            due_date: None,
            status: EvaluationStatus::InProgress,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        };
        EvaluationDetail::new(
            evaluation,
            vec![
                rater(2, RaterRelationship::Manager, 2),
                rater(3, RaterRelationship::Peer, 4),
            ],
        )
    }

    #[test]
    fn test_peer_submission_sees_only_own_row() {
        let view = submission_view(&user(3, EmployeeRole::TeamMember), detail()).unwrap();
        let SubmissionView::Own(row) = view else {
            panic!("peer received the full evaluation");
        };
        assert_eq!(row.rater_id, EmployeeId::new(3));

        let json = serde_json::to_value(
            submission_view(&user(3, EmployeeRole::TeamMember), detail()).unwrap(),
        )
        .unwrap();
        assert!(json.get("summary").is_none());
        assert!(json.get("raters").is_none());
    }

    #[test]
    fn test_subject_and_leader_submission_views() {
        let view = submission_view(&user(1, EmployeeRole::TeamMember), detail()).unwrap();
        let SubmissionView::Detail(detail_view) = view else {
            panic!("subject should see the summary");
        };
        assert!(detail_view.raters.iter().all(|r| r.ratings.is_none()));

        let view = submission_view(&user(2, EmployeeRole::Leader), detail()).unwrap();
        let SubmissionView::Detail(detail_view) = view else {
            panic!("leader should see the full evaluation");
        };
        assert!(detail_view.raters.iter().all(|r| r.ratings.is_some()));
    }

    #[test]
    fn test_submission_view_requires_rater_row() {
        assert!(submission_view(&user(9, EmployeeRole::TeamMember), detail()).is_err());
    }

    fn assignment(rater: i32, relationship: RaterRelationship) -> RaterAssignment {
        RaterAssignment {
            rater_id: EmployeeId::new(rater),
            relationship,
        }
    }

    #[test]
    fn test_check_relationship() {
        let subject = EmployeeId::new(1);
        assert!(check_relationship(subject, assignment(1, RaterRelationship::SelfAssessment)).is_ok());
        assert!(check_relationship(subject, assignment(2, RaterRelationship::Peer)).is_ok());
        assert!(check_relationship(subject, assignment(2, RaterRelationship::SelfAssessment)).is_err());
        assert!(check_relationship(subject, assignment(1, RaterRelationship::Manager)).is_err());
    }
}
