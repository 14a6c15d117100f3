use chrono::Utc;

use super::common::*;
use crate::workflows::review::assignment::{
    Assignment, AssignmentPriority, AssignmentRejected, NewAssignment, StageProgress,
};
use crate::workflows::review::domain::{ApplicationId, AssignmentId, Recommendation};
use crate::workflows::review::pipeline::{PipelineStage, StageKey};

fn request(name: &str, stage: PipelineStage) -> NewAssignment {
    NewAssignment {
        application_id: application(),
        reviewer_id: reviewer(name),
        stage,
        priority: AssignmentPriority::Normal,
        notes: String::new(),
    }
}

fn assignment(name: &str, stage: PipelineStage) -> Assignment {
    request(name, stage)
        .into_assignment(AssignmentId(format!("asg-{name}")), Utc::now())
        .expect("valid assignment")
}

#[test]
fn priority_serializes_as_integer_level() {
    assert_eq!(
        serde_json::to_value(AssignmentPriority::Urgent).expect("serializes"),
        2
    );
    let parsed: AssignmentPriority = serde_json::from_value(serde_json::json!(1)).expect("parses");
    assert_eq!(parsed, AssignmentPriority::High);
    assert!(serde_json::from_value::<AssignmentPriority>(serde_json::json!(3)).is_err());
    assert_eq!(AssignmentPriority::default(), AssignmentPriority::Normal);
}

#[test]
fn new_assignment_defaults_priority_and_notes() {
    let parsed: NewAssignment = serde_json::from_value(serde_json::json!({
        "application_id": "app-1",
        "reviewer_id": "ada",
        "stage": "SCREENING"
    }))
    .expect("parses");

    assert_eq!(parsed.priority, AssignmentPriority::Normal);
    assert!(parsed.notes.is_empty());
}

#[test]
fn into_assignment_trims_notes_and_rejects_blank_ids() {
    let mut noted = request("ada", PipelineStage::Screening);
    noted.notes = "  focus on the project proposal \n".to_string();
    let stored = noted
        .into_assignment(AssignmentId("asg-1".to_string()), Utc::now())
        .expect("valid");
    assert_eq!(stored.notes, "focus on the project proposal");

    let mut blank_reviewer = request("  ", PipelineStage::Screening);
    blank_reviewer.notes = "n/a".to_string();
    assert_eq!(
        blank_reviewer.into_assignment(AssignmentId("asg-2".to_string()), Utc::now()),
        Err(AssignmentRejected::MissingReviewer)
    );

    let mut blank_application = request("ada", PipelineStage::Screening);
    blank_application.application_id = ApplicationId(String::new());
    assert_eq!(
        blank_application.into_assignment(AssignmentId("asg-3".to_string()), Utc::now()),
        Err(AssignmentRejected::MissingApplication)
    );
}

#[test]
fn progress_infers_completion_from_completed_evaluations() {
    let assignments = vec![
        assignment("ada", PipelineStage::DetailedReview),
        assignment("grace", PipelineStage::DetailedReview),
        assignment("linus", PipelineStage::DetailedReview),
        assignment("ken", PipelineStage::Screening),
    ];
    let evaluations = vec![
        completed("ada", PipelineStage::DetailedReview, Recommendation::Accept, 4, 8.0),
        draft("grace", PipelineStage::DetailedReview),
        completed("barbara", PipelineStage::DetailedReview, Recommendation::Reject, 3, 4.0),
        completed("linus", PipelineStage::Screening, Recommendation::Accept, 5, 9.0),
    ];

    let key = StageKey::new(application(), PipelineStage::DetailedReview);
    let progress = StageProgress::compute(&key, &assignments, &evaluations);

    assert_eq!(progress.assigned.len(), 3);
    assert!(progress.completed.contains(&reviewer("ada")));
    assert!(progress.outstanding.contains(&reviewer("grace")));
    assert!(progress.outstanding.contains(&reviewer("linus")));
    assert!(progress.unassigned_completed.contains(&reviewer("barbara")));
    assert!(!progress.is_complete());
}

#[test]
fn duplicate_assignments_collapse_into_one_reviewer_slot() {
    let assignments = vec![
        assignment("ada", PipelineStage::VideoReview),
        assignment("ada", PipelineStage::VideoReview),
    ];
    let evaluations = vec![completed(
        "ada",
        PipelineStage::VideoReview,
        Recommendation::Waitlist,
        3,
        6.0,
    )];

    let key = StageKey::new(application(), PipelineStage::VideoReview);
    let progress = StageProgress::compute(&key, &assignments, &evaluations);

    assert_eq!(progress.assigned.len(), 1);
    assert!(progress.is_complete());
}

#[test]
fn stage_without_assignments_is_never_complete() {
    let key = StageKey::new(application(), PipelineStage::FinalDecision);
    let progress = StageProgress::compute(&key, &[], &[]);
    assert!(!progress.is_complete());
    assert!(progress.outstanding.is_empty());
}
