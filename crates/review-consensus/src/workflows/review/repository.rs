use super::assignment::Assignment;
use super::domain::{ApplicationId, Evaluation, ReviewerCompetency, ReviewerId};
use super::pipeline::PipelineStage;

/// Storage abstraction for evaluations and assignments so the service can be exercised in
/// isolation from the platform's database.
pub trait ReviewRepository: Send + Sync {
    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, RepositoryError>;
    fn assignments(&self, application_id: &ApplicationId) -> Result<Vec<Assignment>, RepositoryError>;
    /// Insert or replace the evaluation keyed by application, reviewer and stage.
    fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError>;
    /// Every evaluation recorded for the stage, drafts included.
    fn evaluations(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError>;
    /// Only `COMPLETED` evaluations carrying an overall score.
    fn completed_evaluations(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError>;
}

/// Lookup for reviewer competency records.
pub trait ReviewerDirectory: Send + Sync {
    fn competencies(&self, reviewer_id: &ReviewerId) -> Result<Vec<ReviewerCompetency>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
