use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, Evaluation};

/// Phase of the review workflow an evaluation or assignment belongs to.
///
/// Stages are tags rather than an enforced automaton: an application may hold evaluations at
/// several stages at once, and nothing here requires earlier stages to finish first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Screening,
    DetailedReview,
    VideoReview,
    Consensus,
    FinalDecision,
}

impl PipelineStage {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Screening,
            Self::DetailedReview,
            Self::VideoReview,
            Self::Consensus,
            Self::FinalDecision,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Screening => "SCREENING",
            Self::DetailedReview => "DETAILED_REVIEW",
            Self::VideoReview => "VIDEO_REVIEW",
            Self::Consensus => "CONSENSUS",
            Self::FinalDecision => "FINAL_DECISION",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Screening => "Screening",
            Self::DetailedReview => "Detailed Review",
            Self::VideoReview => "Video Review",
            Self::Consensus => "Consensus",
            Self::FinalDecision => "Final Decision",
        }
    }

    /// Zero-based position in the canonical sequence.
    pub const fn position(self) -> usize {
        match self {
            Self::Screening => 0,
            Self::DetailedReview => 1,
            Self::VideoReview => 2,
            Self::Consensus => 3,
            Self::FinalDecision => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::ordered().get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.position()
            .checked_sub(1)
            .and_then(|index| Self::ordered().get(index).copied())
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for PipelineStage {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|stage| stage.code() == normalized)
            .ok_or_else(|| format!("unknown pipeline stage '{raw}'"))
    }
}

/// The only scope aggregation and classification ever run over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageKey {
    pub application_id: ApplicationId,
    pub stage: PipelineStage,
}

impl StageKey {
    pub fn new(application_id: ApplicationId, stage: PipelineStage) -> Self {
        Self {
            application_id,
            stage,
        }
    }

    pub fn of(evaluation: &Evaluation) -> Self {
        Self::new(evaluation.application_id.clone(), evaluation.stage)
    }

    pub fn contains(&self, evaluation: &Evaluation) -> bool {
        evaluation.application_id == self.application_id && evaluation.stage == self.stage
    }
}

/// Partition evaluations so no group mixes applications or stages.
pub fn group_by_stage<I>(evaluations: I) -> BTreeMap<StageKey, Vec<Evaluation>>
where
    I: IntoIterator<Item = Evaluation>,
{
    let mut groups: BTreeMap<StageKey, Vec<Evaluation>> = BTreeMap::new();
    for evaluation in evaluations {
        groups
            .entry(StageKey::of(&evaluation))
            .or_default()
            .push(evaluation);
    }
    groups
}
