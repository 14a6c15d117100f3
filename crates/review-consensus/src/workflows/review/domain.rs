use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pipeline::PipelineStage;

/// Identifier wrapper for applications under review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for reviewers (staff or volunteer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewerId(pub String);

/// Identifier assigned by the ledger when an assignment is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReviewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Criteria category a reviewer competency is assessed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriteriaCategory {
    Technical,
    Project,
    CommunityFit,
    Video,
    Overall,
}

impl CriteriaCategory {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Technical,
            Self::Project,
            Self::CommunityFit,
            Self::Video,
            Self::Overall,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::Project => "PROJECT",
            Self::CommunityFit => "COMMUNITY_FIT",
            Self::Video => "VIDEO",
            Self::Overall => "OVERALL",
        }
    }
}

impl fmt::Display for CriteriaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CriteriaCategory {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|category| category.code() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown criteria category '{raw}' (expected one of TECHNICAL, PROJECT, COMMUNITY_FIT, VIDEO, OVERALL)"
                )
            })
    }
}

/// Reviewer's recommendation for the application at a given stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Accept,
    Reject,
    Waitlist,
    NeedsMoreInfo,
}

impl Recommendation {
    pub const fn ordered() -> [Self; 4] {
        [Self::Accept, Self::Reject, Self::Waitlist, Self::NeedsMoreInfo]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Waitlist => "waitlist",
            Self::NeedsMoreInfo => "needs_more_info",
        }
    }
}

/// Lifecycle of a reviewer's evaluation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationStatus {
    #[default]
    Draft,
    Completed,
}

pub(crate) const DEFAULT_BASE_WEIGHT: f64 = 1.0;

fn default_base_weight() -> f64 {
    DEFAULT_BASE_WEIGHT
}

/// Assessed skill of a reviewer within one criteria category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerCompetency {
    pub category: CriteriaCategory,
    pub competency_level: i32,
    #[serde(default = "default_base_weight")]
    pub base_weight: f64,
}

impl ReviewerCompetency {
    pub fn new(category: CriteriaCategory, competency_level: i32) -> Self {
        Self {
            category,
            competency_level,
            base_weight: DEFAULT_BASE_WEIGHT,
        }
    }

    pub fn with_base_weight(mut self, base_weight: f64) -> Self {
        self.base_weight = base_weight;
        self
    }
}

/// One reviewer's judgment of one application at one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub application_id: ApplicationId,
    pub reviewer_id: ReviewerId,
    pub stage: PipelineStage,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default)]
    pub overall_score: Option<f64>,
    pub confidence: i32,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Evaluation {
    /// Completed, scored and carrying a recommendation.
    pub fn is_eligible(&self) -> bool {
        self.status == EvaluationStatus::Completed
            && self.overall_score.is_some()
            && self.recommendation.is_some()
    }

    /// Project into aggregator input; `None` for drafts and unscored rows.
    pub fn scored(&self, competencies: Vec<ReviewerCompetency>) -> Option<ScoredEvaluation> {
        if self.status != EvaluationStatus::Completed {
            return None;
        }

        Some(ScoredEvaluation {
            reviewer_id: self.reviewer_id.clone(),
            overall_score: self.overall_score?,
            confidence: self.confidence,
            recommendation: self.recommendation?,
            competencies,
        })
    }
}

/// Aggregator input: a completed evaluation annotated with the reviewer's competencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvaluation {
    pub reviewer_id: ReviewerId,
    pub overall_score: f64,
    pub confidence: i32,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub competencies: Vec<ReviewerCompetency>,
}
