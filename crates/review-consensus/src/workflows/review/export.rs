use std::io::Write;

use serde::Serialize;

use super::aggregation::WeightedReviewerScore;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ScoreRow<'a> {
    reviewer_id: &'a str,
    recommendation: &'static str,
    overall_score: f64,
    confidence: i32,
    confidence_weight: f64,
    competency_weight: Option<f64>,
    final_weight: f64,
    weighted_score: f64,
}

/// Write one CSV row per weighted score, header first.
pub fn write_scores_csv<W: Write>(
    writer: W,
    scores: &[WeightedReviewerScore],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for score in scores {
        csv_writer.serialize(ScoreRow {
            reviewer_id: &score.reviewer_id.0,
            recommendation: score.recommendation.label(),
            overall_score: score.overall_score,
            confidence: score.confidence,
            confidence_weight: score.confidence_weight,
            competency_weight: score.competency_weight,
            final_weight: score.effective_weight(),
            weighted_score: score.weighted_score,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
