use chrono::NaiveDate;
use salmeen::safety::{
    load_records_from_reader, DriverProfile, DriverReport, DrivingRecord, RiskLevel,
    RiskPredictor, TrainingConfig,
};
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid report date")
}

fn dataset() -> Vec<DrivingRecord> {
    let data = include_bytes!("../Riyadh_Trips.csv");
    load_records_from_reader(&data[..]).expect("fixture imports")
}

fn profile(records: &[DrivingRecord], wanted: DriverProfile) -> Vec<DrivingRecord> {
    records
        .iter()
        .filter(|record| record.driver_profile == Some(wanted))
        .cloned()
        .collect()
}

#[test]
fn risky_driver_report_flags_high_risk() {
    let records = dataset();
    let predictor = RiskPredictor::train(&records, &TrainingConfig::default());

    let report = DriverReport::build(
        &profile(&records, DriverProfile::Risky),
        today(),
        30,
        &predictor,
    );

    assert!(report.records >= 10);
    assert_eq!(report.risk.risk_level(), RiskLevel::High);
    assert!(report.score < 85.0);
    assert!(report
        .recommendations
        .iter()
        .any(|message| message.contains("speeding around")));
    assert!(report.history.iter().all(|day| day.date <= today()));
}

#[test]
fn safe_driver_report_is_not_flagged() {
    let records = dataset();
    let predictor = RiskPredictor::train(&records, &TrainingConfig::default());

    let report = DriverReport::build(
        &profile(&records, DriverProfile::Safe),
        today(),
        30,
        &predictor,
    );

    assert_eq!(report.risk.risk_level(), RiskLevel::Safe);
    assert!(report.score > 50.0);
    assert!(!report.recommendations.is_empty());
}

#[test]
fn report_serializes_with_flat_risk_block() {
    let records = dataset();
    let report = DriverReport::build(&records, today(), 30, &RiskPredictor::untrained());

    let value = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(value["window_end"], json!("2025-03-01"));
    assert_eq!(value["risk"]["risk_level"], json!("unknown"));
    assert_eq!(
        value["risk"]["reason"],
        json!("risk model has not been trained")
    );
    assert_eq!(value["records"], json!(151));
    assert!(value["breakdown"]["penalties"].is_array());
    assert!(value["color"].as_str().expect("color token").starts_with('#'));
}
