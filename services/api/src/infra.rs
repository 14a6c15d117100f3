use metrics_exporter_prometheus::PrometheusHandle;
use review_consensus::workflows::review::{
    ApplicationId, Assignment, CriteriaCategory, Evaluation, PipelineStage, RepositoryError,
    ReviewRepository, ReviewerCompetency, ReviewerDirectory, ReviewerId,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type EvaluationKey = (ApplicationId, ReviewerId, PipelineStage);

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    assignments: Arc<Mutex<Vec<Assignment>>>,
    evaluations: Arc<Mutex<HashMap<EvaluationKey, Evaluation>>>,
}

impl InMemoryReviewRepository {
    fn stage_rows(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
        completed_only: bool,
    ) -> Vec<Evaluation> {
        let guard = self.evaluations.lock().expect("repository mutex poisoned");
        let mut rows: Vec<Evaluation> = guard
            .values()
            .filter(|row| &row.application_id == application_id && row.stage == stage)
            .filter(|row| !completed_only || row.is_eligible())
            .cloned()
            .collect();
        rows.sort_by(|left, right| left.reviewer_id.cmp(&right.reviewer_id));
        rows
    }
}

impl ReviewRepository for InMemoryReviewRepository {
    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, RepositoryError> {
        let mut guard = self.assignments.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == assignment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(assignment.clone());
        Ok(assignment)
    }

    fn assignments(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let guard = self.assignments.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|assignment| &assignment.application_id == application_id)
            .cloned()
            .collect())
    }

    fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        let key = (
            evaluation.application_id.clone(),
            evaluation.reviewer_id.clone(),
            evaluation.stage,
        );
        let mut guard = self.evaluations.lock().expect("repository mutex poisoned");
        guard.insert(key, evaluation.clone());
        Ok(evaluation)
    }

    fn evaluations(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self.stage_rows(application_id, stage, false))
    }

    fn completed_evaluations(
        &self,
        application_id: &ApplicationId,
        stage: PipelineStage,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self.stage_rows(application_id, stage, true))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewerDirectory {
    competencies: Arc<Mutex<HashMap<ReviewerId, Vec<ReviewerCompetency>>>>,
}

impl InMemoryReviewerDirectory {
    /// Replace any existing record for the same category.
    pub(crate) fn register(&self, reviewer_id: ReviewerId, competency: ReviewerCompetency) {
        let mut guard = self.competencies.lock().expect("directory mutex poisoned");
        let records = guard.entry(reviewer_id).or_default();
        records.retain(|existing| existing.category != competency.category);
        records.push(competency);
    }
}

impl ReviewerDirectory for InMemoryReviewerDirectory {
    fn competencies(
        &self,
        reviewer_id: &ReviewerId,
    ) -> Result<Vec<ReviewerCompetency>, RepositoryError> {
        let guard = self.competencies.lock().expect("directory mutex poisoned");
        Ok(guard.get(reviewer_id).cloned().unwrap_or_default())
    }
}

pub(crate) fn parse_category(raw: &str) -> Result<CriteriaCategory, String> {
    raw.parse()
}
