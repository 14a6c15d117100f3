use serde::{Deserialize, Serialize};

use super::domain::{CriteriaCategory, Recommendation, ReviewerId, ScoredEvaluation};
use super::weighting::final_weight;

/// Per-reviewer projection of an evaluation and its computed weights. Never persisted.
///
/// `competency_weight` and `final_weight` are optional so scores produced before competency
/// tracking existed still deserialize; readers use [`WeightedReviewerScore::effective_weight`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedReviewerScore {
    pub reviewer_id: ReviewerId,
    pub recommendation: Recommendation,
    pub overall_score: f64,
    pub confidence: i32,
    pub confidence_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competency_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_weight: Option<f64>,
    pub weighted_score: f64,
}

impl WeightedReviewerScore {
    /// `final_weight` when present, otherwise `confidence_weight`.
    pub fn effective_weight(&self) -> f64 {
        self.final_weight.unwrap_or(self.confidence_weight)
    }
}

/// Weight each evaluation on its own; no normalization across reviewers.
///
/// Callers pass only completed, scored evaluations for a single application and stage.
pub fn calculate_weighted_scores(
    evaluations: &[ScoredEvaluation],
    category: Option<CriteriaCategory>,
) -> Vec<WeightedReviewerScore> {
    evaluations
        .iter()
        .map(|evaluation| weigh(evaluation, category))
        .collect()
}

fn weigh(evaluation: &ScoredEvaluation, category: Option<CriteriaCategory>) -> WeightedReviewerScore {
    let weight = final_weight(evaluation.confidence, &evaluation.competencies, category);

    WeightedReviewerScore {
        reviewer_id: evaluation.reviewer_id.clone(),
        recommendation: evaluation.recommendation,
        overall_score: evaluation.overall_score,
        confidence: evaluation.confidence,
        confidence_weight: weight.confidence_weight,
        competency_weight: Some(weight.competency_weight),
        final_weight: Some(weight.final_weight),
        weighted_score: evaluation.overall_score * weight.final_weight,
    }
}
