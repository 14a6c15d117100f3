use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::aggregation::WeightedReviewerScore;
use super::domain::Recommendation;

pub const DEFAULT_STRONG_THRESHOLD: f64 = 0.8;
pub const DEFAULT_LEAN_THRESHOLD: f64 = 0.6;

/// Weighted-share breakpoints separating near-unanimous agreement from a majority lean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusThresholds {
    strong: f64,
    lean: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("consensus thresholds must satisfy 0 < lean <= strong <= 1 (strong {strong}, lean {lean})")]
pub struct InvalidThresholds {
    pub strong: f64,
    pub lean: f64,
}

impl ConsensusThresholds {
    pub fn new(strong: f64, lean: f64) -> Result<Self, InvalidThresholds> {
        let valid = strong.is_finite()
            && lean.is_finite()
            && lean > 0.0
            && lean <= strong
            && strong <= 1.0;
        if valid {
            Ok(Self { strong, lean })
        } else {
            Err(InvalidThresholds { strong, lean })
        }
    }

    pub fn strong(&self) -> f64 {
        self.strong
    }

    pub fn lean(&self) -> f64 {
        self.lean
    }
}

impl Default for ConsensusThresholds {
    fn default() -> Self {
        Self {
            strong: DEFAULT_STRONG_THRESHOLD,
            lean: DEFAULT_LEAN_THRESHOLD,
        }
    }
}

/// Consensus classification surfaced to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusKind {
    StrongAccept,
    LeanAccept,
    Mixed,
    LeanReject,
    StrongReject,
    Uncertain,
}

impl ConsensusKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::StrongAccept => "strong_accept",
            Self::LeanAccept => "lean_accept",
            Self::Mixed => "mixed",
            Self::LeanReject => "lean_reject",
            Self::StrongReject => "strong_reject",
            Self::Uncertain => "uncertain",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongAccept => "Strong Accept",
            Self::LeanAccept => "Lean Accept",
            Self::Mixed => "Mixed",
            Self::LeanReject => "Lean Reject",
            Self::StrongReject => "Strong Reject",
            Self::Uncertain => "No Reviews",
        }
    }
}

/// Classification plus a human-readable description. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusIndicator {
    #[serde(rename = "type")]
    pub kind: ConsensusKind,
    pub label: String,
    pub description: String,
}

impl ConsensusIndicator {
    fn new(kind: ConsensusKind, description: String) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            description,
        }
    }

    fn no_reviews() -> Self {
        Self::new(
            ConsensusKind::Uncertain,
            "No completed evaluations to weigh".to_string(),
        )
    }
}

/// Reviewer count and weighted share behind one recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationShare {
    pub recommendation: Recommendation,
    pub reviewers: usize,
    pub weight: f64,
    pub share: f64,
}

struct WeightTally {
    groups: BTreeMap<Recommendation, (usize, f64)>,
    total: f64,
}

impl WeightTally {
    fn from_scores(scores: &[WeightedReviewerScore]) -> Self {
        let mut groups: BTreeMap<Recommendation, (usize, f64)> = BTreeMap::new();
        let mut total = 0.0;
        for score in scores {
            let weight = score.effective_weight();
            let entry = groups.entry(score.recommendation).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += weight;
            total += weight;
        }
        Self { groups, total }
    }

    fn weight(&self, recommendation: Recommendation) -> f64 {
        self.groups
            .get(&recommendation)
            .map(|(_, weight)| *weight)
            .unwrap_or(0.0)
    }

    fn share(&self, recommendation: Recommendation) -> f64 {
        if self.total > 0.0 {
            self.weight(recommendation) / self.total
        } else {
            0.0
        }
    }
}

fn percent(share: f64) -> i64 {
    (share * 100.0).round() as i64
}

/// Classify with the default 0.8 / 0.6 thresholds.
pub fn get_consensus_indicator(scores: &[WeightedReviewerScore]) -> ConsensusIndicator {
    classify_consensus(scores, &ConsensusThresholds::default())
}

/// Reduce weighted scores to one indicator. Checks run accept-first and the first match wins.
///
/// WAITLIST and NEEDS_MORE_INFO weight counts toward the total without driving a branch, so it
/// dilutes both shares toward `mixed`.
pub fn classify_consensus(
    scores: &[WeightedReviewerScore],
    thresholds: &ConsensusThresholds,
) -> ConsensusIndicator {
    if scores.is_empty() {
        return ConsensusIndicator::no_reviews();
    }

    let tally = WeightTally::from_scores(scores);
    let accept = tally.share(Recommendation::Accept);
    let reject = tally.share(Recommendation::Reject);

    let acceptance = || format!("{}% weighted acceptance", percent(accept));
    let rejection = || format!("{}% weighted rejection", percent(reject));

    if accept >= thresholds.strong() {
        ConsensusIndicator::new(ConsensusKind::StrongAccept, acceptance())
    } else if accept >= thresholds.lean() {
        ConsensusIndicator::new(ConsensusKind::LeanAccept, acceptance())
    } else if reject >= thresholds.strong() {
        ConsensusIndicator::new(ConsensusKind::StrongReject, rejection())
    } else if reject >= thresholds.lean() {
        ConsensusIndicator::new(ConsensusKind::LeanReject, rejection())
    } else {
        ConsensusIndicator::new(
            ConsensusKind::Mixed,
            format!(
                "No clear majority ({}% weighted acceptance, {}% weighted rejection)",
                percent(accept),
                percent(reject)
            ),
        )
    }
}

/// Weighted share of every recommendation, in canonical order.
pub fn recommendation_breakdown(scores: &[WeightedReviewerScore]) -> Vec<RecommendationShare> {
    let tally = WeightTally::from_scores(scores);
    Recommendation::ordered()
        .into_iter()
        .map(|recommendation| RecommendationShare {
            recommendation,
            reviewers: tally
                .groups
                .get(&recommendation)
                .map(|(count, _)| *count)
                .unwrap_or(0),
            weight: tally.weight(recommendation),
            share: tally.share(recommendation),
        })
        .collect()
}
