use serde::{Deserialize, Serialize};

use super::domain::{CriteriaCategory, ReviewerCompetency, DEFAULT_BASE_WEIGHT};

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 5;

/// Competency multipliers for levels 1 through 5. Level 3 is neutral.
const COMPETENCY_MULTIPLIERS: [f64; 5] = [0.75, 0.90, 1.00, 1.10, 1.25];

const NEUTRAL_WEIGHT: f64 = 1.0;

/// Reviewer influence broken down by factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewerWeight {
    pub confidence_weight: f64,
    pub competency_weight: f64,
    pub final_weight: f64,
}

fn clamp_level(level: i32) -> i32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Linear confidence scale from 0.2 (level 1) to 1.0 (level 5). Out-of-range input is clamped.
pub fn confidence_weight(confidence: i32) -> f64 {
    f64::from(clamp_level(confidence)) / f64::from(MAX_LEVEL)
}

/// Table multiplier for `level` scaled by the reviewer's manual `base_weight`.
///
/// A non-finite or non-positive base weight falls back to 1.0.
pub fn competency_weight(level: i32, base_weight: f64) -> f64 {
    let index = (clamp_level(level) - MIN_LEVEL) as usize;
    sanitize_base_weight(base_weight) * COMPETENCY_MULTIPLIERS[index]
}

fn sanitize_base_weight(base_weight: f64) -> f64 {
    if base_weight.is_finite() && base_weight > 0.0 {
        base_weight
    } else {
        DEFAULT_BASE_WEIGHT
    }
}

fn record_weight(competency: &ReviewerCompetency) -> f64 {
    competency_weight(competency.competency_level, competency.base_weight)
}

/// Weight from the record matching `category`; neutral when there is none.
pub fn category_competency_weight(
    competencies: &[ReviewerCompetency],
    category: CriteriaCategory,
) -> f64 {
    competencies
        .iter()
        .find(|competency| competency.category == category)
        .map(record_weight)
        .unwrap_or(NEUTRAL_WEIGHT)
}

/// Mean weight across every record; neutral when the reviewer has none.
pub fn overall_competency_weight(competencies: &[ReviewerCompetency]) -> f64 {
    if competencies.is_empty() {
        return NEUTRAL_WEIGHT;
    }

    let total: f64 = competencies.iter().map(record_weight).sum();
    total / competencies.len() as f64
}

/// Combine confidence and competency multiplicatively so either factor can discount a reviewer.
pub fn final_weight(
    confidence: i32,
    competencies: &[ReviewerCompetency],
    category: Option<CriteriaCategory>,
) -> ReviewerWeight {
    let confidence_weight = confidence_weight(confidence);
    let competency_weight = match category {
        Some(category) => category_competency_weight(competencies, category),
        None => overall_competency_weight(competencies),
    };

    ReviewerWeight {
        confidence_weight,
        competency_weight,
        final_weight: confidence_weight * competency_weight,
    }
}
