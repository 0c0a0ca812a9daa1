use super::common::*;
use crate::safety::records::ViolationCategory;
use crate::safety::score::{
    calculate_score, score_breakdown, score_category, score_color, PenaltyFactor, SafetyScore,
    ScoreCategory, ScoreColor,
};

#[test]
fn empty_batch_keeps_base_score() {
    assert_eq!(calculate_score(&[]), 100.0);
    assert!(score_breakdown(&[]).penalties.is_empty());
}

#[test]
fn uniform_speeding_hits_the_speeding_cap() {
    let batch: Vec<_> = (0..10).map(|_| record(150.0)).collect();

    let score = calculate_score(&batch);

    assert_eq!(score, 70.0);
    assert_eq!(score_category(score), ScoreCategory::Good);
    let speeding = score_breakdown(&batch)
        .penalties
        .into_iter()
        .find(|component| component.factor == PenaltyFactor::Speeding)
        .expect("speeding component present");
    assert_eq!(speeding.penalty, 30.0);
}

#[test]
fn worst_case_batch_floors_at_zero() {
    let batch: Vec<_> = (0..5)
        .map(|_| {
            let mut trip = record(260.0);
            trip.harsh_braking = true;
            trip.phone_usage = true;
            trip.violation = ViolationCategory::RedLight;
            trip
        })
        .collect();

    let score = calculate_score(&batch);

    assert_eq!(score, 0.0);
    assert_eq!(score_category(score), ScoreCategory::Poor);
    assert_eq!(score_color(score), ScoreColor::Red);
}

#[test]
fn penalties_are_capped_individually() {
    let mut batch = clean_batch(4);
    for trip in &mut batch {
        trip.harsh_braking = true;
    }

    // 1.0 * 50 capped at 20
    assert_eq!(calculate_score(&batch), 80.0);
}

#[test]
fn score_is_rounded_to_one_decimal() {
    let mut batch = clean_batch(3);
    batch[0].harsh_braking = true;

    // 100 - (1/3 * 50)
    assert_eq!(calculate_score(&batch), 83.3);
}

#[test]
fn speeding_penalty_uses_only_speeding_records() {
    let mut batch = clean_batch(4);
    batch[0].speed_kmh = 140.0;

    // 0.25 * 40 + 20 * 0.2 = 14
    assert_eq!(calculate_score(&batch), 86.0);
}

#[test]
fn category_and_color_boundaries_are_exact() {
    let cases = [
        (100.0, ScoreCategory::Excellent, ScoreColor::Green),
        (85.0, ScoreCategory::Excellent, ScoreColor::Green),
        (84.9, ScoreCategory::Good, ScoreColor::Amber),
        (70.0, ScoreCategory::Good, ScoreColor::Amber),
        (69.9, ScoreCategory::Average, ScoreColor::Orange),
        (50.0, ScoreCategory::Average, ScoreColor::Orange),
        (49.9, ScoreCategory::Poor, ScoreColor::Red),
        (0.0, ScoreCategory::Poor, ScoreColor::Red),
    ];

    for (score, category, color) in cases {
        assert_eq!(score_category(score), category, "category for {score}");
        assert_eq!(score_color(score), color, "color for {score}");
    }
    assert_eq!(ScoreColor::Amber.hex(), "#ffbb33");
}

#[test]
fn worse_behaviour_never_raises_the_score() {
    let mut batch = clean_batch(12);
    batch[1].speed_kmh = 131.0;
    batch[4].speed_kmh = 127.0;
    batch[7].violation = ViolationCategory::FailureToYield;
    let baseline = calculate_score(&batch);

    for index in 0..batch.len() {
        let mut braking = batch.clone();
        braking[index].harsh_braking = true;
        assert!(calculate_score(&braking) <= baseline);

        let mut phone = batch.clone();
        phone[index].phone_usage = true;
        assert!(calculate_score(&phone) <= baseline);

        if batch[index].is_speeding() {
            let mut faster = batch.clone();
            faster[index].speed_kmh += 15.0;
            assert!(calculate_score(&faster) <= baseline);
        }
    }
}

#[test]
fn breakdown_agrees_with_score() {
    let mut batch = clean_batch(10);
    batch[2].speed_kmh = 150.0;
    batch[3].phone_usage = true;
    batch[5].violation = ViolationCategory::Seatbelt;

    let breakdown = score_breakdown(&batch);

    assert_eq!(breakdown.score, calculate_score(&batch));
    assert_eq!(breakdown.penalties.len(), 4);
    let harsh = breakdown
        .penalties
        .iter()
        .find(|component| component.factor == PenaltyFactor::HarshBraking)
        .expect("harsh braking component");
    assert_eq!(harsh.penalty, 0.0);
    assert_eq!(harsh.cap, 20.0);
}

#[test]
fn safety_score_bundles_presentation_tokens() {
    let summary = SafetyScore::from_records(&clean_batch(5));
    assert_eq!(summary.score, 100.0);
    assert_eq!(summary.category, ScoreCategory::Excellent);
    assert_eq!(summary.color.hex(), "#00C851");
}
