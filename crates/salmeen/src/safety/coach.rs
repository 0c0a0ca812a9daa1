use super::features::FeatureVector;
use super::records::{DrivingRecord, ViolationCategory};
use std::collections::BTreeMap;

const HARSH_BRAKING_THRESHOLD: f64 = 0.15;
const PHONE_USAGE_THRESHOLD: f64 = 0.05;
const EXCELLENT_SCORE: f64 = 85.0;

pub const NO_DATA_MESSAGE: &str = "Not enough driving data yet to offer personalised advice.";
pub const KEEP_IT_UP_MESSAGE: &str =
    "Your driving is generally good. Keep following traffic rules and driving safely.";

/// Builds the ordered advisory list for a batch. Checks run in a fixed order
/// and each contributes at most one message.
pub fn generate_recommendations(records: &[DrivingRecord], score: f64) -> Vec<String> {
    let Some(features) = FeatureVector::from_batch(records) else {
        return vec![NO_DATA_MESSAGE.to_string()];
    };

    let mut recommendations = Vec::new();

    if let Some(location) = most_common_speeding_location(records) {
        recommendations.push(format!(
            "We noticed repeated speeding around {location}. Please keep to the posted limit to stay safe."
        ));
    }

    if features.harsh_braking_rate > HARSH_BRAKING_THRESHOLD {
        recommendations.push(
            "Your harsh braking rate is high. Keep a safe following distance and anticipate traffic ahead."
                .to_string(),
        );
    }

    if features.phone_usage_rate > PHONE_USAGE_THRESHOLD {
        recommendations.push(
            "Phone use while driving was detected. Use a hands-free system or pull over somewhere safe to take calls."
                .to_string(),
        );
    }

    if let Some(category) = most_common_violation(records) {
        recommendations.push(format!(
            "Violation recorded: {}. Follow traffic rules to avoid fines and protect yourself and others.",
            category.label()
        ));
    }

    if score >= EXCELLENT_SCORE {
        recommendations.push(
            "Excellent performance! Keep driving safely and following traffic rules.".to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations.push(KEEP_IT_UP_MESSAGE.to_string());
    }

    recommendations
}

/// Mode of the location name among speeding records; ties go to the
/// alphabetically first name.
fn most_common_speeding_location(records: &[DrivingRecord]) -> Option<&str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records.iter().filter(|record| record.is_speeding()) {
        *counts.entry(record.location.name.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.map(|(_, top)| count > top).unwrap_or(true) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name)
}

/// Most frequent non-sentinel category; ties go to the first one encountered.
fn most_common_violation(records: &[DrivingRecord]) -> Option<ViolationCategory> {
    let mut tally: Vec<(ViolationCategory, usize)> = Vec::new();
    for record in records.iter().filter(|record| record.has_violation()) {
        match tally
            .iter_mut()
            .find(|(category, _)| *category == record.violation)
        {
            Some((_, count)) => *count += 1,
            None => tally.push((record.violation, 1)),
        }
    }

    let mut best: Option<(ViolationCategory, usize)> = None;
    for (category, count) in tally {
        if best.map(|(_, top)| count > top).unwrap_or(true) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}
