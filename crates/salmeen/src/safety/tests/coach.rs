use super::common::*;
use crate::safety::coach::{generate_recommendations, KEEP_IT_UP_MESSAGE, NO_DATA_MESSAGE};
use crate::safety::records::ViolationCategory;

#[test]
fn empty_batch_gets_no_data_message() {
    assert_eq!(generate_recommendations(&[], 100.0), vec![NO_DATA_MESSAGE]);
}

#[test]
fn clean_excellent_batch_only_gets_congratulated() {
    let recommendations = generate_recommendations(&clean_batch(10), 100.0);

    assert_eq!(recommendations.len(), 1);
    assert!(recommendations[0].starts_with("Excellent performance!"));
}

#[test]
fn clean_batch_below_excellent_gets_fallback() {
    let recommendations = generate_recommendations(&clean_batch(10), 80.0);

    assert_eq!(recommendations, vec![KEEP_IT_UP_MESSAGE]);
}

#[test]
fn every_check_fires_in_order() {
    let mut batch = clean_batch(10);
    batch[0] = record_at(140.0, "Olaya Street");
    batch[1] = record_at(135.0, "Olaya Street");
    batch[2] = record_at(130.0, "Takhassusi Street");
    batch[3].harsh_braking = true;
    batch[4].harsh_braking = true;
    batch[5].phone_usage = true;
    batch[6].violation = ViolationCategory::Seatbelt;

    let recommendations = generate_recommendations(&batch, 90.0);

    assert_eq!(recommendations.len(), 5);
    assert!(recommendations[0].contains("Olaya Street"));
    assert!(recommendations[1].starts_with("Your harsh braking rate is high"));
    assert!(recommendations[2].starts_with("Phone use while driving"));
    assert!(recommendations[3].contains("Seatbelt Not Fastened"));
    assert!(recommendations[4].starts_with("Excellent performance!"));
}

#[test]
fn thresholds_are_strict() {
    let mut batch = clean_batch(20);
    for trip in batch.iter_mut().take(3) {
        trip.harsh_braking = true;
    }
    batch[10].phone_usage = true;

    // 3/20 braking and 1/20 phone sit exactly on the thresholds
    let recommendations = generate_recommendations(&batch, 75.0);

    assert_eq!(recommendations, vec![KEEP_IT_UP_MESSAGE]);
}

#[test]
fn speeding_location_ties_resolve_alphabetically() {
    let mut batch = clean_batch(6);
    batch[0] = record_at(140.0, "Tahlia Street");
    batch[1] = record_at(140.0, "Al Olaya");

    let recommendations = generate_recommendations(&batch, 80.0);

    assert!(recommendations[0].contains("Al Olaya"));
    assert!(!recommendations[0].contains("Tahlia Street"));
}

#[test]
fn violation_ties_resolve_to_first_seen() {
    let mut batch = clean_batch(6);
    batch[1].violation = ViolationCategory::FailureToYield;
    batch[3].violation = ViolationCategory::RedLight;

    let recommendations = generate_recommendations(&batch, 80.0);

    assert_eq!(recommendations.len(), 1);
    assert!(recommendations[0].contains("Failure to Yield"));
}

#[test]
fn most_frequent_violation_wins() {
    let mut batch = clean_batch(6);
    batch[0].violation = ViolationCategory::Seatbelt;
    batch[2].violation = ViolationCategory::PhoneWhileDriving;
    batch[4].violation = ViolationCategory::PhoneWhileDriving;

    let recommendations = generate_recommendations(&batch, 60.0);

    assert!(recommendations[0].contains("Phone Use While Driving"));
}
