//! 360° evaluation domain types.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use mise_core::evaluation::{EvaluationSummary, RaterResponse, Ratings, normalize_competencies};
use mise_core::{
    EmployeeId, EvaluationId, EvaluationRaterId, EvaluationStatus, RaterRelationship, StoreId,
};

use super::clean_optional;

/// A multi-rater evaluation of one employee.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: EvaluationId,
    pub store_id: StoreId,
    pub subject_id: EmployeeId,
    pub subject_name: String,
    pub title: String,
    pub competencies: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub status: EvaluationStatus,
    pub created_by: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// An assigned rater and, once submitted, their response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRater {
    pub id: EvaluationRaterId,
    pub evaluation_id: EvaluationId,
    pub rater_id: EmployeeId,
    pub rater_name: String,
    pub relationship: RaterRelationship,
    pub ratings: Option<Ratings>,
    pub comments: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EvaluationRater {
    /// The submitted response, if any.
    #[must_use]
    pub fn response(&self) -> Option<RaterResponse> {
        self.ratings.as_ref().map(|ratings| RaterResponse {
            relationship: self.relationship,
            ratings: ratings.clone(),
        })
    }
}

/// An evaluation with its raters and the aggregate of submitted responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDetail {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub raters: Vec<EvaluationRater>,
    pub summary: EvaluationSummary,
}

impl EvaluationDetail {
    /// Build the detail view, summarizing submitted responses.
    #[must_use]
    pub fn new(evaluation: Evaluation, raters: Vec<EvaluationRater>) -> Self {
        let responses: Vec<RaterResponse> =
            raters.iter().filter_map(EvaluationRater::response).collect();
        let summary = mise_core::evaluation::summarize(&evaluation.competencies, &responses);
        Self {
            evaluation,
            raters,
            summary,
        }
    }

    /// Hide who said what from the subject.
    ///
    /// The subject still sees the aggregate summary and their own response.
    #[must_use]
    pub fn redacted_for(mut self, viewer: EmployeeId) -> Self {
        for rater in &mut self.raters {
            if rater.rater_id != viewer {
                rater.ratings = None;
                rater.comments = None;
                rater.rater_name = rater.relationship.to_string();
            }
        }
        self
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluation {
    pub subject_id: EmployeeId,
    pub title: Option<String>,
    /// Empty or absent uses the default competency set.
    #[serde(default)]
    pub competencies: Vec<String>,
    pub due_date: Option<NaiveDate>,
    /// Raters assigned up front.
    #[serde(default)]
    pub raters: Vec<RaterAssignment>,
}

impl NewEvaluation {
    /// Clean the title and competencies and check the rater list.
    ///
    /// # Errors
    ///
    /// Returns a message for an invalid competency list or a rater assigned
    /// twice.
    pub fn normalize(self) -> Result<ValidEvaluation, String> {
        let competencies =
            normalize_competencies(self.competencies).map_err(|e| e.to_string())?;

        let mut seen = HashSet::with_capacity(self.raters.len());
        for assignment in &self.raters {
            if !seen.insert(assignment.rater_id) {
                return Err(format!(
                    "employee {} is assigned as a rater more than once",
                    assignment.rater_id
                ));
            }
            if (assignment.relationship == RaterRelationship::SelfAssessment)
                != (assignment.rater_id == self.subject_id)
            {
                return Err(
                    "the subject must be rated as \"self\" and only the subject can be".to_owned(),
                );
            }
        }

        Ok(ValidEvaluation {
            subject_id: self.subject_id,
            title: clean_optional(self.title),
            competencies,
            due_date: self.due_date,
            raters: self.raters,
        })
    }
}

/// A create request after validation.
#[derive(Debug, Clone)]
pub struct ValidEvaluation {
    pub subject_id: EmployeeId,
    /// `None` means use the default title.
    pub title: Option<String>,
    pub competencies: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub raters: Vec<RaterAssignment>,
}

/// Assign one employee as a rater.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterAssignment {
    pub rater_id: EmployeeId,
    pub relationship: RaterRelationship,
}

/// Body of a response submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterSubmission {
    pub ratings: Ratings,
    pub comments: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rater(id: i32, relationship: RaterRelationship, score: Option<u8>) -> EvaluationRater {
        EvaluationRater {
            id: EvaluationRaterId::new(id),
            evaluation_id: EvaluationId::new(1),
            rater_id: EmployeeId::new(id),
            rater_name: format!("Rater {id}"),
            relationship,
            ratings: score.map(|s| BTreeMap::from([("Teamwork".to_owned(), s)])),
            comments: score.map(|_| "solid".to_owned()),
            submitted_at: None,
            created_at: Utc::now(),
        }
    }

    fn evaluation() -> Evaluation {
        Evaluation {
            id: EvaluationId::new(1),
            store_id: StoreId::new(1),
            subject_id: EmployeeId::new(1),
            subject_name: "Sam".to_owned(),
            title: "Spring review".to_owned(),
            competencies: vec!["Teamwork".to_owned()],
            due_date: None,
            status: EvaluationStatus::InProgress,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_new_evaluation_rejects_duplicate_rater() {
        let input: NewEvaluation = serde_json::from_str(
            r#"{"subjectId": 1, "raters": [
                {"raterId": 2, "relationship": "peer"},
                {"raterId": 2, "relationship": "manager"}
            ]}"#,
        )
        .unwrap();
        assert!(input.normalize().is_err());
    }

    #[test]
    fn test_new_evaluation_self_must_be_subject() {
        let input: NewEvaluation = serde_json::from_str(
            r#"{"subjectId": 1, "raters": [{"raterId": 2, "relationship": "self"}]}"#,
        )
        .unwrap();
        assert!(input.normalize().is_err());

        let input: NewEvaluation = serde_json::from_str(
            r#"{"subjectId": 1, "title": " ", "raters": [{"raterId": 1, "relationship": "self"}]}"#,
        )
        .unwrap();
        let valid = input.normalize().unwrap();
        assert_eq!(valid.title, None);
        assert_eq!(valid.competencies.len(), mise_core::evaluation::DEFAULT_COMPETENCIES.len());
    }

    #[test]
    fn test_detail_summarizes_submitted_only() {
        let detail = EvaluationDetail::new(
            evaluation(),
            vec![
                rater(1, RaterRelationship::SelfAssessment, Some(5)),
                rater(2, RaterRelationship::Peer, Some(3)),
                rater(3, RaterRelationship::Manager, None),
            ],
        );
        assert_eq!(detail.summary.response_count, 2);
        assert_eq!(detail.summary.competencies[0].average, Some(4.0));
    }

    #[test]
    fn test_redaction_keeps_own_response() {
        let detail = EvaluationDetail::new(
            evaluation(),
            vec![
                rater(1, RaterRelationship::SelfAssessment, Some(5)),
                rater(2, RaterRelationship::Peer, Some(3)),
            ],
        )
        .redacted_for(EmployeeId::new(1));

        assert!(detail.raters[0].ratings.is_some());
        assert!(detail.raters[1].ratings.is_none());
        assert_eq!(detail.raters[1].rater_name, "peer");
        assert_eq!(detail.summary.response_count, 2);
    }
}
