//! Driving safety domain: record schema, rule-based scoring, the risk
//! classifier, coaching messages, and dashboard aggregates.

pub mod coach;
pub mod dashboard;
pub mod dataset;
pub mod features;
pub mod predictor;
pub mod records;
pub mod score;

#[cfg(test)]
mod tests;

pub use coach::generate_recommendations;
pub use dashboard::{score_history, window_start, DailyScore, DriverReport, MinistryOverview};
pub use dataset::{load_records_from_path, load_records_from_reader, write_records, DatasetError};
pub use features::FeatureVector;
pub use predictor::{
    RiskLevel, RiskModel, RiskPredictor, RiskVerdict, RiskVerdictView, TrainingConfig,
    TrainingOutcome, UnknownReason,
};
pub use records::{
    validate_batch, validate_record, BatchError, DriverProfile, DrivingRecord, Location,
    ViolationCategory,
};
pub use score::{
    calculate_score, score_breakdown, score_category, score_color, SafetyScore, ScoreBreakdown,
    ScoreCategory, ScoreColor,
};
