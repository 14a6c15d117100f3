use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, AssignmentId, Evaluation, ReviewerId};
use super::pipeline::{PipelineStage, StageKey};

/// Advisory triage hint. Has no effect on weighting or classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AssignmentPriority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl AssignmentPriority {
    pub const fn level(self) -> u8 {
        match self {
            AssignmentPriority::Normal => 0,
            AssignmentPriority::High => 1,
            AssignmentPriority::Urgent => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AssignmentPriority::Normal => "normal",
            AssignmentPriority::High => "high",
            AssignmentPriority::Urgent => "urgent",
        }
    }
}

impl From<AssignmentPriority> for u8 {
    fn from(value: AssignmentPriority) -> Self {
        value.level()
    }
}

impl TryFrom<u8> for AssignmentPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AssignmentPriority::Normal),
            1 => Ok(AssignmentPriority::High),
            2 => Ok(AssignmentPriority::Urgent),
            other => Err(format!("priority must be 0, 1 or 2 (found {other})")),
        }
    }
}

/// Admin request to make a reviewer responsible for an application at a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub application_id: ApplicationId,
    pub reviewer_id: ReviewerId,
    pub stage: PipelineStage,
    #[serde(default)]
    pub priority: AssignmentPriority,
    #[serde(default)]
    pub notes: String,
}

/// Stored assignment. Completion is never tracked here; see [`StageProgress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub application_id: ApplicationId,
    pub reviewer_id: ReviewerId,
    pub stage: PipelineStage,
    pub priority: AssignmentPriority,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentRejected {
    #[error("assignment requires a non-empty application id")]
    MissingApplication,
    #[error("assignment requires a non-empty reviewer id")]
    MissingReviewer,
}

impl NewAssignment {
    /// Validate ids and trim notes. Duplicate `(application, reviewer, stage)` rows are allowed.
    pub fn into_assignment(
        self,
        id: AssignmentId,
        created_at: DateTime<Utc>,
    ) -> Result<Assignment, AssignmentRejected> {
        if self.application_id.0.trim().is_empty() {
            return Err(AssignmentRejected::MissingApplication);
        }
        if self.reviewer_id.0.trim().is_empty() {
            return Err(AssignmentRejected::MissingReviewer);
        }

        Ok(Assignment {
            id,
            application_id: self.application_id,
            reviewer_id: self.reviewer_id,
            stage: self.stage,
            priority: self.priority,
            notes: self.notes.trim().to_string(),
            created_at,
        })
    }
}

/// Reviewer completion for one application and stage, inferred from completed evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub application_id: ApplicationId,
    pub stage: PipelineStage,
    pub assigned: BTreeSet<ReviewerId>,
    pub completed: BTreeSet<ReviewerId>,
    pub outstanding: BTreeSet<ReviewerId>,
    pub unassigned_completed: BTreeSet<ReviewerId>,
}

impl StageProgress {
    pub fn compute(key: &StageKey, assignments: &[Assignment], evaluations: &[Evaluation]) -> Self {
        let assigned: BTreeSet<ReviewerId> = assignments
            .iter()
            .filter(|assignment| {
                assignment.application_id == key.application_id && assignment.stage == key.stage
            })
            .map(|assignment| assignment.reviewer_id.clone())
            .collect();

        let finished: BTreeSet<ReviewerId> = evaluations
            .iter()
            .filter(|evaluation| key.contains(evaluation) && evaluation.is_eligible())
            .map(|evaluation| evaluation.reviewer_id.clone())
            .collect();

        let completed = assigned.intersection(&finished).cloned().collect();
        let outstanding = assigned.difference(&finished).cloned().collect();
        let unassigned_completed = finished.difference(&assigned).cloned().collect();

        Self {
            application_id: key.application_id.clone(),
            stage: key.stage,
            assigned,
            completed,
            outstanding,
            unassigned_completed,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.assigned.is_empty() && self.outstanding.is_empty()
    }
}
