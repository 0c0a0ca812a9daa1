use super::records::DrivingRecord;
use serde::Serialize;

pub const FEATURE_COUNT: usize = 7;

/// Aggregate behaviour statistics for one batch of records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub avg_speed: f64,
    pub max_speed: f64,
    pub speeding_rate: f64,
    pub harsh_braking_rate: f64,
    pub phone_usage_rate: f64,
    pub violation_rate: f64,
    /// Mean excess over the limit among speeding records only; 0 when nobody sped.
    pub avg_over_limit: f64,
}

impl FeatureVector {
    /// Returns `None` for an empty batch.
    pub fn from_batch(records: &[DrivingRecord]) -> Option<Self> {
        Self::from_records(records)
    }

    pub fn from_records<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DrivingRecord>,
    {
        let mut count = 0usize;
        let mut speed_sum = 0.0;
        let mut max_speed = f64::MIN;
        let mut speeding = 0usize;
        let mut excess_sum = 0.0;
        let mut harsh_braking = 0usize;
        let mut phone_usage = 0usize;
        let mut violations = 0usize;

        for record in records {
            count += 1;
            speed_sum += record.speed_kmh;
            max_speed = max_speed.max(record.speed_kmh);
            if record.is_speeding() {
                speeding += 1;
                excess_sum += record.excess_speed();
            }
            if record.harsh_braking {
                harsh_braking += 1;
            }
            if record.phone_usage {
                phone_usage += 1;
            }
            if record.has_violation() {
                violations += 1;
            }
        }

        if count == 0 {
            return None;
        }

        let total = count as f64;
        let avg_over_limit = if speeding > 0 {
            excess_sum / speeding as f64
        } else {
            0.0
        };

        Some(Self {
            avg_speed: speed_sum / total,
            max_speed,
            speeding_rate: speeding as f64 / total,
            harsh_braking_rate: harsh_braking as f64 / total,
            phone_usage_rate: phone_usage as f64 / total,
            violation_rate: violations as f64 / total,
            avg_over_limit,
        })
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.avg_speed,
            self.max_speed,
            self.speeding_rate,
            self.harsh_braking_rate,
            self.phone_usage_rate,
            self.violation_rate,
            self.avg_over_limit,
        ]
    }
}
