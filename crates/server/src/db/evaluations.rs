//! 360° evaluation repository.
//!
//! An evaluation's status is derived from its raters, so every write that
//! adds a rater or a response recomputes it inside the same transaction.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use mise_core::evaluation::{Ratings, derive_status};
use mise_core::{
    EmployeeId, EvaluationId, EvaluationRaterId, EvaluationStatus, RaterRelationship, StoreId,
};

use super::RepositoryError;
use crate::models::evaluation::{RaterAssignment, ValidEvaluation};
use crate::models::{Evaluation, EvaluationDetail, EvaluationRater};

macro_rules! evaluation_select {
    () => {
        concat!(
            "SELECT v.id, v.store_id, v.subject_id, s.name AS subject_name, v.title, ",
            "v.competencies, v.due_date, v.status, v.created_by, v.created_at, ",
            "v.updated_at, v.completed_at ",
            "FROM ops.evaluation_360 v JOIN ops.employee s ON s.id = v.subject_id"
        )
    };
}

#[derive(sqlx::FromRow)]
struct RaterRow {
    id: EvaluationRaterId,
    evaluation_id: EvaluationId,
    rater_id: EmployeeId,
    rater_name: String,
    relationship: RaterRelationship,
    ratings: Option<Json<Ratings>>,
    comments: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<RaterRow> for EvaluationRater {
    fn from(row: RaterRow) -> Self {
        Self {
            id: row.id,
            evaluation_id: row.evaluation_id,
            rater_id: row.rater_id,
            rater_name: row.rater_name,
            relationship: row.relationship,
            ratings: row.ratings.map(|r| r.0),
            comments: row.comments,
            submitted_at: row.submitted_at,
            created_at: row.created_at,
        }
    }
}

/// Filters for listing evaluations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationFilter {
    pub status: Option<EvaluationStatus>,
    pub subject_id: Option<EmployeeId>,
}

/// Recompute and store an evaluation's status from its raters.
async fn refresh_status(
    conn: &mut PgConnection,
    id: EvaluationId,
) -> Result<EvaluationStatus, RepositoryError> {
    let (raters, submitted): (i64, i64) = sqlx::query_as(
        "SELECT count(*), count(submitted_at) FROM ops.evaluation_360_rater WHERE evaluation_id = $1",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    let status = derive_status(
        usize::try_from(raters).unwrap_or_default(),
        usize::try_from(submitted).unwrap_or_default(),
    );

    sqlx::query(
        r"
        UPDATE ops.evaluation_360
        SET status = $2,
            completed_at = CASE WHEN $2 = 'completed'::ops.evaluation_status
                                THEN COALESCE(completed_at, now()) END,
            updated_at = now()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(status)
    .execute(&mut *conn)
    .await?;

    Ok(status)
}

async fn insert_rater(
    conn: &mut PgConnection,
    id: EvaluationId,
    assignment: RaterAssignment,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO ops.evaluation_360_rater (evaluation_id, rater_id, relationship) VALUES ($1, $2, $3)",
    )
    .bind(id)
    .bind(assignment.rater_id)
    .bind(assignment.relationship)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        RepositoryError::unique(
            e,
            &format!("employee {} is already a rater", assignment.rater_id),
        )
    })?;
    Ok(())
}

/// Repository for 360° evaluations and their raters.
pub struct EvaluationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EvaluationRepository<'a> {
    /// Create a new evaluation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List evaluations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store: StoreId,
        filter: EvaluationFilter,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(sqlx::query_as::<_, Evaluation>(concat!(
            evaluation_select!(),
            " WHERE v.store_id = $1",
            " AND ($2::ops.evaluation_status IS NULL OR v.status = $2)",
            " AND ($3::int IS NULL OR v.subject_id = $3)",
            " ORDER BY v.created_at DESC"
        ))
        .bind(store)
        .bind(filter.status)
        .bind(filter.subject_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// Evaluations where `rater` is assigned and has not yet responded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn assigned_to(
        &self,
        store: StoreId,
        rater: EmployeeId,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(sqlx::query_as::<_, Evaluation>(concat!(
            evaluation_select!(),
            " JOIN ops.evaluation_360_rater r ON r.evaluation_id = v.id",
            " WHERE v.store_id = $1 AND r.rater_id = $2 AND r.submitted_at IS NULL",
            " ORDER BY v.due_date NULLS LAST, v.created_at"
        ))
        .bind(store)
        .bind(rater)
        .fetch_all(self.pool)
        .await?)
    }

    /// Get an evaluation without its raters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store: StoreId,
        id: EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        Ok(sqlx::query_as::<_, Evaluation>(concat!(
            evaluation_select!(),
            " WHERE v.store_id = $1 AND v.id = $2"
        ))
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?)
    }

    /// Raters of an evaluation, grouped by relationship.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn raters(&self, id: EvaluationId) -> Result<Vec<EvaluationRater>, RepositoryError> {
        let rows = sqlx::query_as::<_, RaterRow>(
            r"
            SELECT r.id, r.evaluation_id, r.rater_id, e.name AS rater_name, r.relationship,
                   r.ratings, r.comments, r.submitted_at, r.created_at
            FROM ops.evaluation_360_rater r
            JOIN ops.employee e ON e.id = r.rater_id
            WHERE r.evaluation_id = $1
            ORDER BY r.relationship, e.name
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an evaluation with its raters and summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn detail(
        &self,
        store: StoreId,
        id: EvaluationId,
    ) -> Result<Option<EvaluationDetail>, RepositoryError> {
        let Some(evaluation) = self.get(store, id).await? else {
            return Ok(None);
        };
        let raters = self.raters(id).await?;
        Ok(Some(EvaluationDetail::new(evaluation, raters)))
    }

    /// Create an evaluation and its initial raters in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a rater is listed twice.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        store: StoreId,
        created_by: EmployeeId,
        evaluation: &ValidEvaluation,
        title: &str,
    ) -> Result<EvaluationDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: EvaluationId = sqlx::query_scalar(
            r"
            INSERT INTO ops.evaluation_360
                (store_id, subject_id, title, competencies, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(store)
        .bind(evaluation.subject_id)
        .bind(title)
        .bind(&evaluation.competencies)
        .bind(evaluation.due_date)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for assignment in &evaluation.raters {
            insert_rater(&mut tx, id, *assignment).await?;
        }
        let status = refresh_status(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(
            store_id = %store,
            evaluation_id = %id,
            raters = evaluation.raters.len(),
            status = %status,
            "360 evaluation created"
        );

        self.detail(store, id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Assign another rater.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the evaluation does not exist.
    /// Returns `RepositoryError::Conflict` if the employee is already a rater.
    pub async fn add_rater(
        &self,
        store: StoreId,
        id: EvaluationId,
        assignment: RaterAssignment,
    ) -> Result<EvaluationDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<EvaluationId> = sqlx::query_scalar(
            "SELECT id FROM ops.evaluation_360 WHERE store_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(store)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        insert_rater(&mut tx, id, assignment).await?;
        refresh_status(&mut tx, id).await?;
        tx.commit().await?;

        self.detail(store, id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Record a rater's response. `ratings` must already be validated
    /// against the evaluation's competencies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `rater` is not assigned.
    /// Returns `RepositoryError::Conflict` if they already responded.
    pub async fn submit_response(
        &self,
        store: StoreId,
        id: EvaluationId,
        rater: EmployeeId,
        ratings: &Ratings,
        comments: Option<&str>,
    ) -> Result<EvaluationDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let assignment: Option<(EvaluationRaterId, Option<DateTime<Utc>>)> = sqlx::query_as(
            r"
            SELECT r.id, r.submitted_at
            FROM ops.evaluation_360_rater r
            JOIN ops.evaluation_360 v ON v.id = r.evaluation_id
            WHERE v.store_id = $1 AND r.evaluation_id = $2 AND r.rater_id = $3
            FOR UPDATE OF r
            ",
        )
        .bind(store)
        .bind(id)
        .bind(rater)
        .fetch_optional(&mut *tx)
        .await?;

        let rater_row = match assignment {
            None => return Err(RepositoryError::NotFound),
            Some((_, Some(_))) => {
                return Err(RepositoryError::Conflict(
                    "a response has already been submitted".to_owned(),
                ));
            }
            Some((rater_row, None)) => rater_row,
        };

        sqlx::query(
            r"
            UPDATE ops.evaluation_360_rater
            SET ratings = $2, comments = $3, submitted_at = now()
            WHERE id = $1
            ",
        )
        .bind(rater_row)
        .bind(Json(ratings))
        .bind(comments)
        .execute(&mut *tx)
        .await?;

        let status = refresh_status(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(evaluation_id = %id, status = %status, "360 response submitted");

        self.detail(store, id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an evaluation and its raters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the evaluation does not exist.
    pub async fn delete(&self, store: StoreId, id: EvaluationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ops.evaluation_360 WHERE store_id = $1 AND id = $2")
            .bind(store)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
