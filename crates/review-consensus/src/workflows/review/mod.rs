//! Multi-reviewer evaluation weighting and consensus classification.
//!
//! Weighting and classification are pure functions over in-memory evaluations;
//! the service and router wrap them with the storage and access seams the platform supplies.
//! Every consensus read recomputes from the current evaluations of one application at one stage.

pub mod access;
pub mod aggregation;
pub mod assignment;
pub mod consensus;
pub mod domain;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
mod validation;
pub mod weighting;

#[cfg(test)]
mod tests;

pub use access::{AccessDenied, Capability, Permissions, StaffRole};
pub use aggregation::{calculate_weighted_scores, WeightedReviewerScore};
pub use assignment::{
    Assignment, AssignmentPriority, AssignmentRejected, NewAssignment, StageProgress,
};
pub use consensus::{
    classify_consensus, get_consensus_indicator, recommendation_breakdown, ConsensusIndicator,
    ConsensusKind, ConsensusThresholds, InvalidThresholds, RecommendationShare,
};
pub use domain::{
    ApplicationId, AssignmentId, CriteriaCategory, Evaluation, EvaluationStatus, Recommendation,
    ReviewerCompetency, ReviewerId, ScoredEvaluation,
};
pub use export::{write_scores_csv, ExportError};
pub use pipeline::{group_by_stage, PipelineStage, StageKey};
pub use report::{weighted_average, StageConsensusReport};
pub use repository::{RepositoryError, ReviewRepository, ReviewerDirectory};
pub use router::review_router;
pub use service::{ConsensusRequest, ReviewService, ReviewServiceError};
pub use validation::EvaluationRejected;
pub use weighting::{
    category_competency_weight, competency_weight, confidence_weight, final_weight,
    overall_competency_weight, ReviewerWeight,
};
