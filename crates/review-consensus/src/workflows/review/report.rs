use serde::{Deserialize, Serialize};

use super::aggregation::{calculate_weighted_scores, WeightedReviewerScore};
use super::consensus::{
    classify_consensus, recommendation_breakdown, ConsensusIndicator, ConsensusThresholds,
    RecommendationShare,
};
use super::domain::{ApplicationId, CriteriaCategory, ScoredEvaluation};
use super::pipeline::{PipelineStage, StageKey};

/// Staff-facing consensus view for one application at one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConsensusReport {
    pub application_id: ApplicationId,
    pub stage: PipelineStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CriteriaCategory>,
    pub reviewer_count: usize,
    pub scores: Vec<WeightedReviewerScore>,
    pub weighted_average: Option<f64>,
    pub recommendation_breakdown: Vec<RecommendationShare>,
    pub indicator: ConsensusIndicator,
}

impl StageConsensusReport {
    pub fn build(
        key: StageKey,
        evaluations: &[ScoredEvaluation],
        category: Option<CriteriaCategory>,
        thresholds: &ConsensusThresholds,
    ) -> Self {
        let scores = calculate_weighted_scores(evaluations, category);
        Self::from_scores(key, scores, category, thresholds)
    }

    pub fn from_scores(
        key: StageKey,
        scores: Vec<WeightedReviewerScore>,
        category: Option<CriteriaCategory>,
        thresholds: &ConsensusThresholds,
    ) -> Self {
        let indicator = classify_consensus(&scores, thresholds);
        Self {
            application_id: key.application_id,
            stage: key.stage,
            category,
            reviewer_count: scores.len(),
            weighted_average: weighted_average(&scores),
            recommendation_breakdown: recommendation_breakdown(&scores),
            indicator,
            scores,
        }
    }
}

/// `sum(weighted_score) / sum(weight)`; `None` when there is nothing to average.
pub fn weighted_average(scores: &[WeightedReviewerScore]) -> Option<f64> {
    let total_weight: f64 = scores.iter().map(WeightedReviewerScore::effective_weight).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let total_score: f64 = scores.iter().map(|score| score.weighted_score).sum();
    Some(total_score / total_weight)
}
