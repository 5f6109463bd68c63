//! 360° evaluation ratings.
//!
//! An evaluation names a subject and a list of competencies. Each assigned
//! rater (self, peers, direct reports, managers) scores every competency on a
//! 1-5 scale; [`summarize`] folds the submitted responses into averages.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{EvaluationStatus, RaterRelationship};

/// Lowest score on the rating scale.
pub const MIN_RATING: u8 = 1;
/// Highest score on the rating scale.
pub const MAX_RATING: u8 = 5;
/// Most competencies a single evaluation may cover.
pub const MAX_COMPETENCIES: usize = 20;

/// Competencies used when an evaluation is created without its own list.
pub const DEFAULT_COMPETENCIES: &[&str] = &[
    "Communication",
    "Accountability",
    "Developing Others",
    "Operational Excellence",
    "Guest Focus",
    "Teamwork",
];

/// Errors raised while validating evaluation input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("an evaluation needs at least one competency")]
    NoCompetencies,

    #[error("an evaluation cannot have more than {} competencies", MAX_COMPETENCIES)]
    TooManyCompetencies,

    #[error("competency names cannot be blank")]
    BlankCompetency,

    #[error("duplicate competency: {0}")]
    DuplicateCompetency(String),

    #[error("competency not rated: {0}")]
    MissingRating(String),

    #[error("unknown competency: {0}")]
    UnknownCompetency(String),

    #[error("rating for {competency} must be between {} and {}, got {value}", MIN_RATING, MAX_RATING)]
    OutOfRange { competency: String, value: u8 },
}

/// Scores by competency name.
pub type Ratings = BTreeMap<String, u8>;

/// A submitted response, reduced to what the summary needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaterResponse {
    pub relationship: RaterRelationship,
    pub ratings: Ratings,
}

/// Clean a competency list: trimmed, non-blank, unique (ignoring case).
///
/// An empty input falls back to [`DEFAULT_COMPETENCIES`].
///
/// # Errors
///
/// Returns an [`EvaluationError`] for blank, duplicate or too many names.
pub fn normalize_competencies(names: Vec<String>) -> Result<Vec<String>, EvaluationError> {
    if names.is_empty() {
        return Ok(DEFAULT_COMPETENCIES
            .iter()
            .map(|name| (*name).to_owned())
            .collect());
    }
    if names.len() > MAX_COMPETENCIES {
        return Err(EvaluationError::TooManyCompetencies);
    }

    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            let name = name.trim().to_owned();
            if name.is_empty() {
                return Err(EvaluationError::BlankCompetency);
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(EvaluationError::DuplicateCompetency(name));
            }
            Ok(name)
        })
        .collect()
}

/// Check that `ratings` scores every competency exactly once within range.
///
/// # Errors
///
/// Returns the first problem found, checking unknown names before missing
/// ones.
pub fn validate_ratings(competencies: &[String], ratings: &Ratings) -> Result<(), EvaluationError> {
    if competencies.is_empty() {
        return Err(EvaluationError::NoCompetencies);
    }

    for (competency, &value) in ratings {
        if !competencies.contains(competency) {
            return Err(EvaluationError::UnknownCompetency(competency.clone()));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(EvaluationError::OutOfRange {
                competency: competency.clone(),
                value,
            });
        }
    }

    if let Some(missing) = competencies.iter().find(|c| !ratings.contains_key(*c)) {
        return Err(EvaluationError::MissingRating(missing.clone()));
    }

    Ok(())
}

/// Averages for one competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencySummary {
    pub competency: String,
    /// Average across every submitted response.
    pub average: Option<f64>,
    /// The subject's own score, if they have submitted.
    pub self_rating: Option<f64>,
    /// Average of everyone except the subject.
    pub others_average: Option<f64>,
    /// `self_rating - others_average`; positive means the subject rates
    /// themselves higher than others do.
    pub gap: Option<f64>,
    pub by_relationship: BTreeMap<RaterRelationship, f64>,
}

/// Aggregate view of an evaluation's submitted responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub response_count: usize,
    pub responses_by_relationship: BTreeMap<RaterRelationship, usize>,
    pub overall_average: Option<f64>,
    pub competencies: Vec<CompetencySummary>,
}

#[derive(Default)]
struct Tally {
    sum: u32,
    count: u32,
}

impl Tally {
    fn add(&mut self, value: u8) {
        self.sum += u32::from(value);
        self.count += 1;
    }

    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| round2(f64::from(self.sum) / f64::from(self.count)))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold submitted responses into per-competency averages.
///
/// Scores for competencies not in `competencies` are ignored, so a response
/// recorded before the list changed cannot skew the summary.
#[must_use]
pub fn summarize(competencies: &[String], responses: &[RaterResponse]) -> EvaluationSummary {
    let mut responses_by_relationship = BTreeMap::new();
    for response in responses {
        *responses_by_relationship
            .entry(response.relationship)
            .or_insert(0) += 1;
    }

    let mut overall = Tally::default();
    let summaries = competencies
        .iter()
        .map(|competency| {
            let mut all = Tally::default();
            let mut own = Tally::default();
            let mut others = Tally::default();
            let mut by_relationship: BTreeMap<RaterRelationship, Tally> = BTreeMap::new();

            for response in responses {
                let Some(&value) = response.ratings.get(competency) else {
                    continue;
                };
                all.add(value);
                overall.add(value);
                by_relationship
                    .entry(response.relationship)
                    .or_default()
                    .add(value);
                if response.relationship == RaterRelationship::SelfAssessment {
                    own.add(value);
                } else {
                    others.add(value);
                }
            }

            let self_rating = own.average();
            let others_average = others.average();
            CompetencySummary {
                competency: competency.clone(),
                average: all.average(),
                self_rating,
                others_average,
                gap: self_rating
                    .zip(others_average)
                    .map(|(own, others)| round2(own - others)),
                by_relationship: by_relationship
                    .into_iter()
                    .filter_map(|(relationship, tally)| {
                        tally.average().map(|avg| (relationship, avg))
                    })
                    .collect(),
            }
        })
        .collect();

    EvaluationSummary {
        response_count: responses.len(),
        responses_by_relationship,
        overall_average: overall.average(),
        competencies: summaries,
    }
}

/// Status implied by how many raters are assigned and how many submitted.
#[must_use]
pub const fn derive_status(rater_count: usize, submitted_count: usize) -> EvaluationStatus {
    if rater_count == 0 {
        EvaluationStatus::PendingEvaluators
    } else if submitted_count >= rater_count {
        EvaluationStatus::Completed
    } else {
        EvaluationStatus::InProgress
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;

    fn competencies() -> Vec<String> {
        vec!["Communication".to_owned(), "Teamwork".to_owned()]
    }

    fn ratings(communication: u8, teamwork: u8) -> Ratings {
        BTreeMap::from([
            ("Communication".to_owned(), communication),
            ("Teamwork".to_owned(), teamwork),
        ])
    }

    fn response(relationship: RaterRelationship, communication: u8, teamwork: u8) -> RaterResponse {
        RaterResponse {
            relationship,
            ratings: ratings(communication, teamwork),
        }
    }

    #[test]
    fn test_normalize_defaults_when_empty() {
        let names = normalize_competencies(vec![]).unwrap();
        assert_eq!(names.len(), DEFAULT_COMPETENCIES.len());
    }

    #[test]
    fn test_normalize_rejects_duplicates_and_blanks() {
        assert_eq!(
            normalize_competencies(vec!["Grit".into(), " grit ".into()]),
            Err(EvaluationError::DuplicateCompetency("grit".into()))
        );
        assert_eq!(
            normalize_competencies(vec!["Grit".into(), "  ".into()]),
            Err(EvaluationError::BlankCompetency)
        );
    }

    #[test]
    fn test_validate_ratings() {
        assert!(validate_ratings(&competencies(), &ratings(4, 5)).is_ok());

        let mut partial = ratings(4, 5);
        partial.remove("Teamwork");
        assert_eq!(
            validate_ratings(&competencies(), &partial),
            Err(EvaluationError::MissingRating("Teamwork".into()))
        );

        let mut extra = ratings(4, 5);
        extra.insert("Juggling".into(), 3);
        assert_eq!(
            validate_ratings(&competencies(), &extra),
            Err(EvaluationError::UnknownCompetency("Juggling".into()))
        );

        assert!(matches!(
            validate_ratings(&competencies(), &ratings(0, 5)),
            Err(EvaluationError::OutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            validate_ratings(&competencies(), &ratings(4, 6)),
            Err(EvaluationError::OutOfRange { value: 6, .. })
        ));
    }

    #[test]
    fn test_summarize_self_vs_others() {
        let summary = summarize(
            &competencies(),
            &[
                response(RaterRelationship::SelfAssessment, 5, 4),
                response(RaterRelationship::Peer, 3, 4),
                response(RaterRelationship::Peer, 4, 5),
                response(RaterRelationship::Manager, 2, 3),
            ],
        );

        assert_eq!(summary.response_count, 4);
        assert_eq!(
            summary.responses_by_relationship[&RaterRelationship::Peer],
            2
        );

        let communication = &summary.competencies[0];
        assert_eq!(communication.average, Some(3.5));
        assert_eq!(communication.self_rating, Some(5.0));
        assert_eq!(communication.others_average, Some(3.0));
        assert_eq!(communication.gap, Some(2.0));
        assert_eq!(
            communication.by_relationship[&RaterRelationship::Peer],
            3.5
        );

        // (5+3+4+2 + 4+4+5+3) / 8
        assert_eq!(summary.overall_average, Some(3.75));
    }

    #[test]
    fn test_summarize_rounds_to_two_places() {
        let summary = summarize(
            &competencies(),
            &[
                response(RaterRelationship::Peer, 4, 4),
                response(RaterRelationship::Peer, 4, 4),
                response(RaterRelationship::Peer, 5, 4),
            ],
        );
        assert_eq!(summary.competencies[0].average, Some(4.33));
        assert_eq!(summary.competencies[0].gap, None);
    }

    #[test]
    fn test_summarize_without_responses() {
        let summary = summarize(&competencies(), &[]);
        assert_eq!(summary.response_count, 0);
        assert_eq!(summary.overall_average, None);
        assert!(summary.competencies.iter().all(|c| c.average.is_none()));
    }

    #[test]
    fn test_summary_serializes_relationship_keys() {
        let summary = summarize(
            &competencies(),
            &[response(RaterRelationship::SelfAssessment, 3, 3)],
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["responsesByRelationship"]["self"], 1);
        assert_eq!(json["competencies"][0]["selfRating"], 3.0);
    }

    #[test]
    fn test_derive_status() {
        assert_eq!(derive_status(0, 0), EvaluationStatus::PendingEvaluators);
        assert_eq!(derive_status(3, 1), EvaluationStatus::InProgress);
        assert_eq!(derive_status(3, 3), EvaluationStatus::Completed);
    }
}
