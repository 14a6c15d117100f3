use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::access::{Permissions, StaffRole};
use super::assignment::NewAssignment;
use super::domain::{ApplicationId, CriteriaCategory, Evaluation};
use super::pipeline::PipelineStage;
use super::repository::{RepositoryError, ReviewRepository, ReviewerDirectory};
use super::service::{ConsensusRequest, ReviewService, ReviewServiceError};

/// Header carrying the caller's role, resolved upstream by the platform's auth layer.
pub const ROLE_HEADER: &str = "x-review-role";

/// Router builder exposing the review ledger and consensus endpoints.
pub fn review_router<R, D>(service: Arc<ReviewService<R, D>>) -> Router
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/review/assignments",
            post(create_assignment_handler::<R, D>),
        )
        .route(
            "/api/v1/review/applications/:application_id/assignments",
            get(list_assignments_handler::<R, D>),
        )
        .route(
            "/api/v1/review/evaluations",
            put(record_evaluation_handler::<R, D>),
        )
        .route(
            "/api/v1/review/applications/:application_id/stages/:stage/consensus",
            get(stage_consensus_handler::<R, D>),
        )
        .route(
            "/api/v1/review/applications/:application_id/stages/:stage/progress",
            get(stage_progress_handler::<R, D>),
        )
        .route(
            "/api/v1/review/consensus",
            post(preview_consensus_handler::<R, D>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConsensusQuery {
    #[serde(default)]
    pub(crate) category: Option<String>,
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "error": message })),
    )
        .into_response()
}

fn permissions_from(headers: &HeaderMap) -> Result<Permissions, Response> {
    let Some(raw) = headers.get(ROLE_HEADER) else {
        return Ok(Permissions::default());
    };

    let role = raw
        .to_str()
        .map_err(|_| bad_request(format!("{ROLE_HEADER} must be ascii")))?
        .parse::<StaffRole>()
        .map_err(bad_request)?;
    Ok(Permissions::new(role))
}

fn parse_stage(raw: &str) -> Result<PipelineStage, Response> {
    raw.parse::<PipelineStage>().map_err(bad_request)
}

fn parse_category(raw: Option<&str>) -> Result<Option<CriteriaCategory>, Response> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<CriteriaCategory>()
            .map(Some)
            .map_err(bad_request),
        None => Ok(None),
    }
}

fn error_response(error: ReviewServiceError) -> Response {
    let status = match &error {
        ReviewServiceError::Access(_) => StatusCode::FORBIDDEN,
        ReviewServiceError::Assignment(_) | ReviewServiceError::Evaluation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReviewServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_assignment_handler<R, D>(
    State(service): State<Arc<ReviewService<R, D>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<NewAssignment>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    let permissions = match permissions_from(&headers) {
        Ok(permissions) => permissions,
        Err(response) => return response,
    };

    match service.create_assignment(&permissions, request) {
        Ok(assignment) => (StatusCode::CREATED, axum::Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_assignments_handler<R, D>(
    State(service): State<Arc<ReviewService<R, D>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    match service.assignments(&ApplicationId(application_id)) {
        Ok(assignments) => (StatusCode::OK, axum::Json(assignments)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_evaluation_handler<R, D>(
    State(service): State<Arc<ReviewService<R, D>>>,
    headers: HeaderMap,
    axum::Json(evaluation): axum::Json<Evaluation>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    let permissions = match permissions_from(&headers) {
        Ok(permissions) => permissions,
        Err(response) => return response,
    };

    match service.record_evaluation(&permissions, evaluation) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stage_consensus_handler<R, D>(
    State(service): State<Arc<ReviewService<R, D>>>,
    headers: HeaderMap,
    Path((application_id, stage)): Path<(String, String)>,
    Query(query): Query<ConsensusQuery>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    let parsed = permissions_from(&headers).and_then(|permissions| {
        let stage = parse_stage(&stage)?;
        let category = parse_category(query.category.as_deref())?;
        Ok((permissions, stage, category))
    });
    let (permissions, stage, category) = match parsed {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let application_id = ApplicationId(application_id);
    match service.stage_consensus(&permissions, &application_id, stage, category) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stage_progress_handler<R, D>(
    State(service): State<Arc<ReviewService<R, D>>>,
    Path((application_id, stage)): Path<(String, String)>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    let stage = match parse_stage(&stage) {
        Ok(stage) => stage,
        Err(response) => return response,
    };

    match service.stage_progress(&ApplicationId(application_id), stage) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_consensus_handler<R, D>(
    State(service): State<Arc<ReviewService<R, D>>>,
    axum::Json(request): axum::Json<ConsensusRequest>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: ReviewerDirectory + 'static,
{
    let report = service.preview_consensus(request);
    (StatusCode::OK, axum::Json(report)).into_response()
}
