use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::access::{AccessDenied, Capability, Permissions};
use super::assignment::{Assignment, AssignmentRejected, NewAssignment, StageProgress};
use super::consensus::ConsensusThresholds;
use super::domain::{
    ApplicationId, AssignmentId, CriteriaCategory, Evaluation, EvaluationStatus, ScoredEvaluation,
};
use super::pipeline::{PipelineStage, StageKey};
use super::report::StageConsensusReport;
use super::repository::{RepositoryError, ReviewRepository, ReviewerDirectory};
use super::validation::{validate_evaluation, EvaluationRejected};

/// Service composing review storage with the reviewer directory.
pub struct ReviewService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    thresholds: ConsensusThresholds,
}

static ASSIGNMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assignment_id() -> AssignmentId {
    let id = ASSIGNMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssignmentId(format!("asg-{id:06}"))
}

/// Ad hoc scoring request for evaluations that are not stored in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRequest {
    pub application_id: ApplicationId,
    pub stage: PipelineStage,
    #[serde(default)]
    pub category: Option<CriteriaCategory>,
    pub evaluations: Vec<ScoredEvaluation>,
}

impl<R, D> ReviewService<R, D>
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>) -> Self {
        Self::with_thresholds(repository, directory, ConsensusThresholds::default())
    }

    pub fn with_thresholds(
        repository: Arc<R>,
        directory: Arc<D>,
        thresholds: ConsensusThresholds,
    ) -> Self {
        Self {
            repository,
            directory,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ConsensusThresholds {
        &self.thresholds
    }

    /// Record a new assignment. Duplicates for the same reviewer and stage are not rejected.
    pub fn create_assignment(
        &self,
        permissions: &Permissions,
        request: NewAssignment,
    ) -> Result<Assignment, ReviewServiceError> {
        permissions.require(Capability::ManageAssignments)?;

        let assignment = request.into_assignment(next_assignment_id(), Utc::now())?;
        let stored = self.repository.insert_assignment(assignment)?;

        info!(
            assignment = %stored.id.0,
            application = %stored.application_id,
            reviewer = %stored.reviewer_id,
            stage = %stored.stage,
            priority = stored.priority.label(),
            "reviewer assigned"
        );
        Ok(stored)
    }

    pub fn assignments(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Assignment>, ReviewServiceError> {
        Ok(self.repository.assignments(application_id)?)
    }

    /// Validate and upsert an evaluation, stamping `completed_at` on completion.
    pub fn record_evaluation(
        &self,
        permissions: &Permissions,
        mut evaluation: Evaluation,
    ) -> Result<Evaluation, ReviewServiceError> {
        permissions.require(Capability::SubmitEvaluation)?;
        validate_evaluation(&evaluation)?;

        let completed = evaluation.status == EvaluationStatus::Completed;
        if completed && evaluation.completed_at.is_none() {
            evaluation.completed_at = Some(Utc::now());
        }
        if !completed {
            evaluation.completed_at = None;
        }

        let assigned = self
            .repository
            .assignments(&evaluation.application_id)?
            .iter()
            .any(|assignment| {
                assignment.reviewer_id == evaluation.reviewer_id
                    && assignment.stage == evaluation.stage
            });
        if !assigned {
            warn!(
                application = %evaluation.application_id,
                reviewer = %evaluation.reviewer_id,
                stage = %evaluation.stage,
                "evaluation recorded without a matching assignment"
            );
        }

        let stored = self.repository.upsert_evaluation(evaluation)?;
        if completed {
            info!(
                application = %stored.application_id,
                reviewer = %stored.reviewer_id,
                stage = %stored.stage,
                "evaluation completed"
            );
        }
        Ok(stored)
    }

    /// Weighted scores and consensus for one application at one stage.
    pub fn stage_consensus(
        &self,
        permissions: &Permissions,
        application_id: &ApplicationId,
        stage: PipelineStage,
        category: Option<CriteriaCategory>,
    ) -> Result<StageConsensusReport, ReviewServiceError> {
        permissions.require(Capability::ViewConsensus)?;

        let key = StageKey::new(application_id.clone(), stage);
        let evaluations = self.repository.completed_evaluations(application_id, stage)?;

        let mut scored = Vec::with_capacity(evaluations.len());
        for evaluation in evaluations.iter().filter(|evaluation| key.contains(evaluation)) {
            let competencies = self.directory.competencies(&evaluation.reviewer_id)?;
            if let Some(entry) = evaluation.scored(competencies) {
                scored.push(entry);
            }
        }

        let report = StageConsensusReport::build(key, &scored, category, &self.thresholds);
        debug!(
            application = %report.application_id,
            stage = %report.stage,
            reviewers = report.reviewer_count,
            consensus = report.indicator.kind.code(),
            "stage consensus computed"
        );
        Ok(report)
    }

    /// Score evaluations supplied by the caller without touching storage.
    pub fn preview_consensus(&self, request: ConsensusRequest) -> StageConsensusReport {
        let key = StageKey::new(request.application_id, request.stage);
        StageConsensusReport::build(key, &request.evaluations, request.category, &self.thresholds)
    }

    pub fn stage_progress(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<StageProgress, ReviewServiceError> {
        let key = StageKey::new(application_id.clone(), stage);
        let assignments = self.repository.assignments(application_id)?;
        let evaluations = self.repository.evaluations(application_id, stage)?;
        Ok(StageProgress::compute(&key, &assignments, &evaluations))
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Access(#[from] AccessDenied),
    #[error(transparent)]
    Assignment(#[from] AssignmentRejected),
    #[error(transparent)]
    Evaluation(#[from] EvaluationRejected),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
