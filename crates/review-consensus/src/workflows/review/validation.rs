use super::domain::{Evaluation, EvaluationStatus};
use super::weighting::{MAX_LEVEL, MIN_LEVEL};

/// Reasons an evaluation cannot be recorded in its requested state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationRejected {
    #[error("evaluation requires a non-empty application id")]
    MissingApplication,
    #[error("evaluation requires a non-empty reviewer id")]
    MissingReviewer,
    #[error("completed evaluation requires an overall score")]
    MissingScore,
    #[error("overall score must be a finite number (found {0})")]
    NonFiniteScore(f64),
    #[error("confidence must be between 1 and 5 (found {0})")]
    ConfidenceOutOfRange(i32),
    #[error("completed evaluation requires a recommendation")]
    MissingRecommendation,
}

/// Entry validation for recorded evaluations.
///
/// Drafts only need their identifiers. Completion is the boundary that guarantees what the
/// aggregator assumes: a finite score, an in-range confidence and a recommendation.
pub(crate) fn validate_evaluation(evaluation: &Evaluation) -> Result<(), EvaluationRejected> {
    if evaluation.application_id.0.trim().is_empty() {
        return Err(EvaluationRejected::MissingApplication);
    }
    if evaluation.reviewer_id.0.trim().is_empty() {
        return Err(EvaluationRejected::MissingReviewer);
    }

    if evaluation.status == EvaluationStatus::Draft {
        return Ok(());
    }

    let score = evaluation
        .overall_score
        .ok_or(EvaluationRejected::MissingScore)?;
    if !score.is_finite() {
        return Err(EvaluationRejected::NonFiniteScore(score));
    }
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&evaluation.confidence) {
        return Err(EvaluationRejected::ConfidenceOutOfRange(evaluation.confidence));
    }
    if evaluation.recommendation.is_none() {
        return Err(EvaluationRejected::MissingRecommendation);
    }

    Ok(())
}
