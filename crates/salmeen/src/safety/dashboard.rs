use super::coach::generate_recommendations;
use super::predictor::{RiskPredictor, RiskVerdict};
use super::records::{DriverProfile, DrivingRecord, ViolationCategory};
use super::score::{calculate_score, score_breakdown, ScoreBreakdown, ScoreCategory};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

const RECENT_TRIPS: usize = 10;

/// First day of a `days`-long window ending at `today`. Saturates at the
/// earliest representable date.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Records dated within `[today - days, today]`.
pub fn records_in_window(
    records: &[DrivingRecord],
    today: NaiveDate,
    days: u32,
) -> Vec<DrivingRecord> {
    let start = window_start(today, days);
    records
        .iter()
        .filter(|record| record.date >= start && record.date <= today)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyScore {
    pub date: NaiveDate,
    pub score: f64,
    pub records: usize,
}

/// One score per calendar day that has data inside the window, oldest first.
pub fn score_history(records: &[DrivingRecord], today: NaiveDate, days: u32) -> Vec<DailyScore> {
    let mut by_day: BTreeMap<NaiveDate, Vec<DrivingRecord>> = BTreeMap::new();
    for record in records_in_window(records, today, days) {
        by_day.entry(record.date).or_default().push(record);
    }

    by_day
        .into_iter()
        .map(|(date, day_records)| DailyScore {
            date,
            score: calculate_score(&day_records),
            records: day_records.len(),
        })
        .collect()
}

/// Citizen-facing summary of the most recent driving window.
#[derive(Debug, Clone, Serialize)]
pub struct DriverReport {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub records: usize,
    pub score: f64,
    pub category: ScoreCategory,
    pub category_label: &'static str,
    pub color: &'static str,
    pub breakdown: ScoreBreakdown,
    pub violations: usize,
    pub risk: RiskVerdict,
    pub recommendations: Vec<String>,
    pub history: Vec<DailyScore>,
    /// Latest trips in the window, oldest first.
    pub recent_trips: Vec<DrivingRecord>,
}

impl DriverReport {
    pub fn build(
        records: &[DrivingRecord],
        today: NaiveDate,
        window_days: u32,
        predictor: &RiskPredictor,
    ) -> Self {
        let recent = records_in_window(records, today, window_days);
        let breakdown = score_breakdown(&recent);
        let score = breakdown.score;
        let category = ScoreCategory::from_score(score);

        let mut recent_trips = recent.clone();
        recent_trips.sort_by_key(|record| record.date);
        let skip = recent_trips.len().saturating_sub(RECENT_TRIPS);
        recent_trips.drain(..skip);

        Self {
            window_start: window_start(today, window_days),
            window_end: today,
            records: recent.len(),
            score,
            category,
            category_label: category.label(),
            color: category.color().hex(),
            violations: recent.iter().filter(|record| record.has_violation()).count(),
            risk: predictor.predict(&recent),
            recommendations: generate_recommendations(&recent, score),
            history: score_history(&recent, today, window_days),
            breakdown,
            recent_trips,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskHotspot {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub risk_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationShare {
    pub category: ViolationCategory,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyViolations {
    pub date: NaiveDate,
    pub count: usize,
}

/// Fleet-wide indicators for the ministry dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct MinistryOverview {
    pub total_records: usize,
    pub total_violations: usize,
    pub fleet_score: f64,
    pub fleet_category: ScoreCategory,
    pub high_risk_share_pct: f64,
    pub phone_usage_events: usize,
    pub model_trained: bool,
    pub risk_hotspots: Vec<RiskHotspot>,
    pub violation_distribution: Vec<ViolationShare>,
    pub daily_violations: Vec<DailyViolations>,
}

impl MinistryOverview {
    pub fn build(records: &[DrivingRecord], predictor: &RiskPredictor) -> Self {
        let total_records = records.len();
        let fleet_score = calculate_score(records);
        let risky = records
            .iter()
            .filter(|record| record.driver_profile == Some(DriverProfile::Risky))
            .count();
        let high_risk_share_pct = if total_records > 0 {
            ((risky as f64 / total_records as f64) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Self {
            total_records,
            total_violations: records.iter().filter(|record| record.has_violation()).count(),
            fleet_score,
            fleet_category: ScoreCategory::from_score(fleet_score),
            high_risk_share_pct,
            phone_usage_events: records.iter().filter(|record| record.phone_usage).count(),
            model_trained: predictor.is_trained(),
            risk_hotspots: risk_hotspots(records),
            violation_distribution: violation_distribution(records),
            daily_violations: daily_violations(records),
        }
    }
}

/// Risk events grouped by location, busiest first, ties by name.
pub fn risk_hotspots(records: &[DrivingRecord]) -> Vec<RiskHotspot> {
    struct Accumulator {
        latitude: f64,
        longitude: f64,
        count: usize,
    }

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in records.iter().filter(|record| record.is_risk_event()) {
        let entry = groups
            .entry(record.location.name.as_str())
            .or_insert(Accumulator {
                latitude: 0.0,
                longitude: 0.0,
                count: 0,
            });
        entry.latitude += record.location.latitude;
        entry.longitude += record.location.longitude;
        entry.count += 1;
    }

    let mut hotspots: Vec<RiskHotspot> = groups
        .into_iter()
        .map(|(name, acc)| RiskHotspot {
            location: name.to_string(),
            latitude: acc.latitude / acc.count as f64,
            longitude: acc.longitude / acc.count as f64,
            risk_events: acc.count,
        })
        .collect();
    // stable: equal counts keep the alphabetical order from the map
    hotspots.sort_by(|a, b| b.risk_events.cmp(&a.risk_events));
    hotspots
}

pub fn violation_distribution(records: &[DrivingRecord]) -> Vec<ViolationShare> {
    let mut counts: BTreeMap<ViolationCategory, usize> = BTreeMap::new();
    for record in records.iter().filter(|record| record.has_violation()) {
        *counts.entry(record.violation).or_default() += 1;
    }

    let mut shares: Vec<ViolationShare> = counts
        .into_iter()
        .map(|(category, count)| ViolationShare {
            category,
            label: category.label(),
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

pub fn daily_violations(records: &[DrivingRecord]) -> Vec<DailyViolations> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records.iter().filter(|record| record.has_violation()) {
        *counts.entry(record.date).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, count)| DailyViolations { date, count })
        .collect()
}
