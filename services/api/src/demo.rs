use crate::infra::{parse_category, InMemoryReviewRepository, InMemoryReviewerDirectory};
use clap::{Args, ValueEnum};
use review_consensus::config::AppConfig;
use review_consensus::error::AppError;
use review_consensus::workflows::review::{
    calculate_weighted_scores, classify_consensus, recommendation_breakdown, weighted_average,
    write_scores_csv, ApplicationId, AssignmentPriority, ConsensusIndicator, CriteriaCategory,
    Evaluation, EvaluationStatus, NewAssignment, Permissions, PipelineStage, Recommendation,
    RecommendationShare, ReviewService, ReviewerCompetency, ReviewerId, ScoredEvaluation,
    StageConsensusReport, WeightedReviewerScore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct ConsensusArgs {
    /// JSON file holding an array of completed evaluations
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Criteria category used to pick each reviewer's competency record
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Option<CriteriaCategory>,
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub(crate) format: ReportFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Criteria category lens applied to every stage report
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Option<CriteriaCategory>,
    /// Print each stage report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct ConsensusSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<CriteriaCategory>,
    scores: Vec<WeightedReviewerScore>,
    weighted_average: Option<f64>,
    recommendation_breakdown: Vec<RecommendationShare>,
    indicator: ConsensusIndicator,
}

pub(crate) fn run_consensus_file(args: ConsensusArgs) -> Result<(), AppError> {
    let ConsensusArgs {
        input,
        category,
        format,
    } = args;

    let thresholds = AppConfig::load()?.consensus;
    let raw = std::fs::read_to_string(&input)?;
    let evaluations: Vec<ScoredEvaluation> = serde_json::from_str(&raw)?;

    let scores = calculate_weighted_scores(&evaluations, category);
    let summary = ConsensusSummary {
        category,
        weighted_average: weighted_average(&scores),
        recommendation_breakdown: recommendation_breakdown(&scores),
        indicator: classify_consensus(&scores, &thresholds),
        scores,
    };

    match format {
        ReportFormat::Table => {
            println!(
                "Consensus for {} evaluations from {}",
                evaluations.len(),
                input.display()
            );
            render_scores(
                &summary.scores,
                summary.weighted_average,
                &summary.recommendation_breakdown,
                &summary.indicator,
            );
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ReportFormat::Csv => write_scores_csv(std::io::stdout().lock(), &summary.scores)?,
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { category, json } = args;
    let thresholds = AppConfig::load()?.consensus;

    let repository = Arc::new(InMemoryReviewRepository::default());
    let directory = Arc::new(InMemoryReviewerDirectory::default());
    seed_directory(&directory);
    let service = ReviewService::with_thresholds(repository, directory, thresholds);

    let application = ApplicationId("app-demo-001".to_string());
    let admin = Permissions::admin();

    println!("Review consensus demo for {}", application.0);
    for (reviewer, stage, priority) in demo_assignments() {
        let request = NewAssignment {
            application_id: application.clone(),
            reviewer_id: ReviewerId(reviewer.to_string()),
            stage,
            priority,
            notes: String::new(),
        };
        if let Err(err) = service.create_assignment(&admin, request) {
            println!("  Assignment rejected: {}", err);
            return Ok(());
        }
    }

    for evaluation in demo_evaluations(&application) {
        if let Err(err) = service.record_evaluation(&admin, evaluation) {
            println!("  Evaluation rejected: {}", err);
            return Ok(());
        }
    }

    for stage in PipelineStage::ordered() {
        let report = match service.stage_consensus(&admin, &application, stage, category) {
            Ok(report) => report,
            Err(err) => {
                println!("  Consensus unavailable for {}: {}", stage.label(), err);
                continue;
            }
        };
        let progress = match service.stage_progress(&application, stage) {
            Ok(progress) => progress,
            Err(err) => {
                println!("  Progress unavailable for {}: {}", stage.label(), err);
                continue;
            }
        };

        println!(
            "\n{} ({} of {} assigned reviewers complete)",
            stage.label(),
            progress.completed.len(),
            progress.assigned.len()
        );
        if !progress.outstanding.is_empty() {
            let outstanding: Vec<&str> = progress
                .outstanding
                .iter()
                .map(|reviewer| reviewer.0.as_str())
                .collect();
            println!("  Outstanding: {}", outstanding.join(", "));
        }

        if json {
            match serde_json::to_string_pretty(&report) {
                Ok(payload) => println!("{}", payload),
                Err(err) => println!("  Report payload unavailable: {}", err),
            }
        } else {
            render_report(&report);
        }
    }

    Ok(())
}

fn render_report(report: &StageConsensusReport) {
    if let Some(category) = report.category {
        println!("  Category lens: {}", category);
    }
    render_scores(
        &report.scores,
        report.weighted_average,
        &report.recommendation_breakdown,
        &report.indicator,
    );
}

fn render_scores(
    scores: &[WeightedReviewerScore],
    average: Option<f64>,
    breakdown: &[RecommendationShare],
    indicator: &ConsensusIndicator,
) {
    if scores.is_empty() {
        println!("  {}: {}", indicator.label, indicator.description);
        return;
    }

    println!(
        "  {:<12} {:<16} {:>6} {:>5} {:>7} {:>9}",
        "reviewer", "recommendation", "score", "conf", "weight", "weighted"
    );
    for score in scores {
        println!(
            "  {:<12} {:<16} {:>6.1} {:>5} {:>7.3} {:>9.2}",
            score.reviewer_id.0,
            score.recommendation.label(),
            score.overall_score,
            score.confidence,
            score.effective_weight(),
            score.weighted_score
        );
    }

    if let Some(average) = average {
        println!("  Weighted average: {:.2}", average);
    }
    let shares: Vec<String> = breakdown
        .iter()
        .filter(|share| share.reviewers > 0)
        .map(|share| {
            format!(
                "{} {:.0}%",
                share.recommendation.label(),
                share.share * 100.0
            )
        })
        .collect();
    println!("  Weight split: {}", shares.join(" | "));
    println!("  Consensus: {} ({})", indicator.label, indicator.description);
}

fn seed_directory(directory: &InMemoryReviewerDirectory) {
    let records = [
        ("amara", CriteriaCategory::Technical, 5),
        ("amara", CriteriaCategory::Video, 2),
        ("bruno", CriteriaCategory::Project, 4),
        ("bruno", CriteriaCategory::CommunityFit, 3),
        ("chen", CriteriaCategory::Technical, 2),
        ("chen", CriteriaCategory::Video, 5),
        ("dara", CriteriaCategory::CommunityFit, 5),
    ];
    for (reviewer, category, level) in records {
        directory.register(
            ReviewerId(reviewer.to_string()),
            ReviewerCompetency::new(category, level),
        );
    }
}

fn demo_assignments() -> Vec<(&'static str, PipelineStage, AssignmentPriority)> {
    vec![
        ("amara", PipelineStage::Screening, AssignmentPriority::Normal),
        ("bruno", PipelineStage::Screening, AssignmentPriority::Normal),
        ("chen", PipelineStage::Screening, AssignmentPriority::Normal),
        ("amara", PipelineStage::DetailedReview, AssignmentPriority::High),
        ("bruno", PipelineStage::DetailedReview, AssignmentPriority::High),
        ("dara", PipelineStage::DetailedReview, AssignmentPriority::High),
        ("chen", PipelineStage::VideoReview, AssignmentPriority::Urgent),
        ("dara", PipelineStage::VideoReview, AssignmentPriority::Urgent),
    ]
}

fn demo_evaluations(application: &ApplicationId) -> Vec<Evaluation> {
    let completed = |reviewer: &str,
                     stage: PipelineStage,
                     recommendation: Recommendation,
                     confidence: i32,
                     score: f64| Evaluation {
        application_id: application.clone(),
        reviewer_id: ReviewerId(reviewer.to_string()),
        stage,
        status: EvaluationStatus::Completed,
        overall_score: Some(score),
        confidence,
        recommendation: Some(recommendation),
        completed_at: None,
    };

    vec![
        completed("amara", PipelineStage::Screening, Recommendation::Accept, 5, 8.5),
        completed("bruno", PipelineStage::Screening, Recommendation::Accept, 4, 7.5),
        completed("chen", PipelineStage::Screening, Recommendation::Waitlist, 3, 6.0),
        completed("amara", PipelineStage::DetailedReview, Recommendation::Accept, 4, 8.0),
        completed("bruno", PipelineStage::DetailedReview, Recommendation::Reject, 3, 4.5),
        completed("dara", PipelineStage::DetailedReview, Recommendation::NeedsMoreInfo, 2, 6.0),
        completed("chen", PipelineStage::VideoReview, Recommendation::Accept, 5, 9.0),
        Evaluation {
            application_id: application.clone(),
            reviewer_id: ReviewerId("dara".to_string()),
            stage: PipelineStage::VideoReview,
            status: EvaluationStatus::Draft,
            overall_score: None,
            confidence: 3,
            recommendation: None,
            completed_at: None,
        },
    ]
}
