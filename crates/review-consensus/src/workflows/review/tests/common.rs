use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::review::assignment::Assignment;
use crate::workflows::review::domain::{
    ApplicationId, CriteriaCategory, Evaluation, EvaluationStatus, Recommendation,
    ReviewerCompetency, ReviewerId, ScoredEvaluation,
};
use crate::workflows::review::pipeline::PipelineStage;
use crate::workflows::review::repository::{
    RepositoryError, ReviewRepository, ReviewerDirectory,
};
use crate::workflows::review::{review_router, ReviewService};

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn application() -> ApplicationId {
    ApplicationId("app-residency-042".to_string())
}

pub(super) fn reviewer(name: &str) -> ReviewerId {
    ReviewerId(name.to_string())
}

pub(super) fn scored(
    name: &str,
    recommendation: Recommendation,
    confidence: i32,
    overall_score: f64,
) -> ScoredEvaluation {
    ScoredEvaluation {
        reviewer_id: reviewer(name),
        overall_score,
        confidence,
        recommendation,
        competencies: Vec::new(),
    }
}

pub(super) fn technical_expert(name: &str, confidence: i32, overall_score: f64) -> ScoredEvaluation {
    ScoredEvaluation {
        competencies: vec![ReviewerCompetency::new(CriteriaCategory::Technical, 5)],
        ..scored(name, Recommendation::Accept, confidence, overall_score)
    }
}

pub(super) fn completed(
    name: &str,
    stage: PipelineStage,
    recommendation: Recommendation,
    confidence: i32,
    overall_score: f64,
) -> Evaluation {
    Evaluation {
        application_id: application(),
        reviewer_id: reviewer(name),
        stage,
        status: EvaluationStatus::Completed,
        overall_score: Some(overall_score),
        confidence,
        recommendation: Some(recommendation),
        completed_at: None,
    }
}

pub(super) fn draft(name: &str, stage: PipelineStage) -> Evaluation {
    Evaluation {
        application_id: application(),
        reviewer_id: reviewer(name),
        stage,
        status: EvaluationStatus::Draft,
        overall_score: None,
        confidence: 3,
        recommendation: None,
        completed_at: None,
    }
}

type EvaluationKey = (ApplicationId, ReviewerId, PipelineStage);

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) assignments: Arc<Mutex<Vec<Assignment>>>,
    pub(super) evaluations: Arc<Mutex<HashMap<EvaluationKey, Evaluation>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, evaluation: Evaluation) {
        let key = (
            evaluation.application_id.clone(),
            evaluation.reviewer_id.clone(),
            evaluation.stage,
        );
        self.evaluations
            .lock()
            .expect("repository mutex poisoned")
            .insert(key, evaluation);
    }

    fn matching(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
        eligible_only: bool,
    ) -> Vec<Evaluation> {
        let guard = self.evaluations.lock().expect("repository mutex poisoned");
        let mut rows: Vec<Evaluation> = guard
            .values()
            .filter(|evaluation| {
                &evaluation.application_id == application_id && evaluation.stage == stage
            })
            .filter(|evaluation| !eligible_only || evaluation.is_eligible())
            .cloned()
            .collect();
        rows.sort_by(|left, right| left.reviewer_id.cmp(&right.reviewer_id));
        rows
    }
}

impl ReviewRepository for MemoryRepository {
    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, RepositoryError> {
        let mut guard = self.assignments.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == assignment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(assignment.clone());
        Ok(assignment)
    }

    fn assignments(&self, application_id: &ApplicationId) -> Result<Vec<Assignment>, RepositoryError> {
        let guard = self.assignments.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|assignment| &assignment.application_id == application_id)
            .cloned()
            .collect())
    }

    fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        self.seed(evaluation.clone());
        Ok(evaluation)
    }

    fn evaluations(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self.matching(application_id, stage, false))
    }

    fn completed_evaluations(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self.matching(application_id, stage, true))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    competencies: Arc<Mutex<HashMap<ReviewerId, Vec<ReviewerCompetency>>>>,
}

impl MemoryDirectory {
    pub(super) fn with(self, name: &str, competency: ReviewerCompetency) -> Self {
        self.competencies
            .lock()
            .expect("directory mutex poisoned")
            .entry(reviewer(name))
            .or_default()
            .push(competency);
        self
    }
}

impl ReviewerDirectory for MemoryDirectory {
    fn competencies(&self, reviewer_id: &ReviewerId) -> Result<Vec<ReviewerCompetency>, RepositoryError> {
        let guard = self.competencies.lock().expect("directory mutex poisoned");
        Ok(guard.get(reviewer_id).cloned().unwrap_or_default())
    }
}

pub(super) struct UnavailableRepository;

impl ReviewRepository for UnavailableRepository {
    fn insert_assignment(&self, _assignment: Assignment) -> Result<Assignment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn assignments(&self, _application_id: &ApplicationId) -> Result<Vec<Assignment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_evaluation(&self, _evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn evaluations(
        &self,
        _application_id: &ApplicationId,
        _stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn completed_evaluations(
        &self,
        _application_id: &ApplicationId,
        _stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ReviewService<MemoryRepository, MemoryDirectory>,
    Arc<MemoryRepository>,
) {
    build_service_with(MemoryDirectory::default())
}

pub(super) fn build_service_with(
    directory: MemoryDirectory,
) -> (
    ReviewService<MemoryRepository, MemoryDirectory>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ReviewService::new(repository.clone(), Arc::new(directory));
    (service, repository)
}

pub(super) fn router_with_service(
    service: ReviewService<MemoryRepository, MemoryDirectory>,
) -> axum::Router {
    review_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
