use crate::synthetic::generate_records;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use salmeen::config::DatasetConfig;
use salmeen::error::AppError;
use salmeen::safety::{load_records_from_path, DrivingRecord, RiskPredictor, TrainingConfig};
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-only state shared by the safety handlers. The predictor is trained
/// once at start-up and never mutated afterwards.
#[derive(Clone)]
pub(crate) struct SafetyState {
    pub(crate) predictor: Arc<RiskPredictor>,
    pub(crate) dataset: Arc<Vec<DrivingRecord>>,
    pub(crate) window_days: u32,
}

impl SafetyState {
    pub(crate) fn new(
        dataset: Vec<DrivingRecord>,
        predictor: RiskPredictor,
        window_days: u32,
    ) -> Self {
        Self {
            predictor: Arc::new(predictor),
            dataset: Arc::new(dataset),
            window_days,
        }
    }
}

/// Loads the configured CSV export, falling back to the synthetic supplier.
pub(crate) fn load_dataset(
    config: &DatasetConfig,
    today: NaiveDate,
) -> Result<Vec<DrivingRecord>, AppError> {
    match &config.csv_path {
        Some(path) => load_csv(path),
        None => {
            let records = generate_records(config.synthetic_records, config.synthetic_seed, today);
            info!(
                records = records.len(),
                seed = config.synthetic_seed,
                "using synthetic driving records"
            );
            Ok(records)
        }
    }
}

pub(crate) fn load_csv(path: &Path) -> Result<Vec<DrivingRecord>, AppError> {
    let records = load_records_from_path(path)?;
    info!(records = records.len(), path = %path.display(), "driving records imported");
    Ok(records)
}

/// Trains on `records` when they carry profile labels, otherwise on a
/// synthetic table generated from the configured seed.
pub(crate) fn train_predictor(
    records: &[DrivingRecord],
    config: &DatasetConfig,
    today: NaiveDate,
) -> RiskPredictor {
    let training = TrainingConfig::default();
    if records.iter().any(|record| record.driver_profile.is_some()) {
        return RiskPredictor::train(records, &training);
    }

    let synthetic = generate_records(config.synthetic_records, config.synthetic_seed, today);
    RiskPredictor::train(&synthetic, &training)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_config() -> DatasetConfig {
        DatasetConfig {
            csv_path: None,
            synthetic_records: 300,
            synthetic_seed: 42,
            window_days: 30,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(parse_date(" 2025-06-01 "), Ok(today()));
        let err = parse_date("06/01/2025").expect_err("wrong format");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn missing_csv_falls_back_to_synthetic_records() {
        let records = load_dataset(&dataset_config(), today()).expect("synthetic dataset");
        assert_eq!(records.len(), 300);
    }

    #[test]
    fn unlabelled_records_train_on_synthetic_data() {
        let unlabelled: Vec<DrivingRecord> = generate_records(40, 1, today())
            .into_iter()
            .map(|record| DrivingRecord {
                driver_profile: None,
                ..record
            })
            .collect();

        let predictor = train_predictor(&unlabelled, &dataset_config(), today());

        assert!(predictor.is_trained());
    }
}
