use super::common::*;
use crate::workflows::review::domain::{CriteriaCategory, ReviewerCompetency};
use crate::workflows::review::weighting::{
    category_competency_weight, competency_weight, confidence_weight, final_weight,
    overall_competency_weight,
};

#[test]
fn confidence_weight_is_linear_within_range() {
    for confidence in 1..=5 {
        assert_close(confidence_weight(confidence), f64::from(confidence) / 5.0);
    }
}

#[test]
fn confidence_weight_clamps_out_of_range_values() {
    assert_close(confidence_weight(0), 0.2);
    assert_close(confidence_weight(-3), 0.2);
    assert_close(confidence_weight(6), 1.0);
    assert_close(confidence_weight(i32::MAX), 1.0);
}

#[test]
fn competency_weight_follows_the_five_point_table() {
    let expected = [0.75, 0.90, 1.00, 1.10, 1.25];
    for (level, multiplier) in (1..=5).zip(expected) {
        assert_close(competency_weight(level, 1.0), multiplier);
    }
}

#[test]
fn competency_weight_clamps_levels_and_scales_by_base_weight() {
    assert_close(competency_weight(0, 1.0), 0.75);
    assert_close(competency_weight(9, 1.0), 1.25);
    assert_close(competency_weight(4, 2.0), 2.2);
    assert_close(competency_weight(3, 0.5), 0.5);
}

#[test]
fn competency_weight_treats_unusable_base_weight_as_neutral() {
    assert_close(competency_weight(5, 0.0), 1.25);
    assert_close(competency_weight(5, -1.0), 1.25);
    assert_close(competency_weight(5, f64::NAN), 1.25);
}

#[test]
fn missing_competency_data_is_neutral() {
    assert_close(overall_competency_weight(&[]), 1.0);
    assert_close(category_competency_weight(&[], CriteriaCategory::Technical), 1.0);

    let video_only = [ReviewerCompetency::new(CriteriaCategory::Video, 1)];
    assert_close(
        category_competency_weight(&video_only, CriteriaCategory::Technical),
        1.0,
    );
}

#[test]
fn overall_competency_weight_averages_every_record() {
    let competencies = [
        ReviewerCompetency::new(CriteriaCategory::Technical, 5),
        ReviewerCompetency::new(CriteriaCategory::Project, 1),
        ReviewerCompetency::new(CriteriaCategory::CommunityFit, 3),
    ];
    assert_close(overall_competency_weight(&competencies), (1.25 + 0.75 + 1.0) / 3.0);
}

#[test]
fn final_weight_uses_category_match_when_category_given() {
    let competencies = [
        ReviewerCompetency::new(CriteriaCategory::Technical, 5),
        ReviewerCompetency::new(CriteriaCategory::Video, 1),
    ];

    let technical = final_weight(4, &competencies, Some(CriteriaCategory::Technical));
    assert_close(technical.confidence_weight, 0.8);
    assert_close(technical.competency_weight, 1.25);
    assert_close(technical.final_weight, 1.0);

    let overall = final_weight(4, &competencies, None);
    assert_close(overall.competency_weight, 1.0);
    assert_close(overall.final_weight, 0.8);
}

#[test]
fn low_confidence_discounts_even_expert_reviewers() {
    let competencies = [ReviewerCompetency::new(CriteriaCategory::Technical, 5)];
    let weight = final_weight(1, &competencies, Some(CriteriaCategory::Technical));
    assert_close(weight.final_weight, 0.2 * 1.25);
}
