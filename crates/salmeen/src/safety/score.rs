use super::features::FeatureVector;
use super::records::DrivingRecord;
use serde::{Deserialize, Serialize};

pub const BASE_SCORE: f64 = 100.0;

const SPEEDING_CAP: f64 = 30.0;
const SPEEDING_RATE_WEIGHT: f64 = 40.0;
const EXCESS_SPEED_WEIGHT: f64 = 0.2;
const HARSH_BRAKING_CAP: f64 = 20.0;
const HARSH_BRAKING_WEIGHT: f64 = 50.0;
const PHONE_USAGE_CAP: f64 = 25.0;
const PHONE_USAGE_WEIGHT: f64 = 60.0;
const VIOLATION_CAP: f64 = 25.0;
const VIOLATION_WEIGHT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ScoreCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Poor => "Poor",
        }
    }

    pub const fn color(self) -> ScoreColor {
        match self {
            Self::Excellent => ScoreColor::Green,
            Self::Good => ScoreColor::Amber,
            Self::Average => ScoreColor::Orange,
            Self::Poor => ScoreColor::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreColor {
    Green,
    Amber,
    Orange,
    Red,
}

impl ScoreColor {
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Green => "#00C851",
            Self::Amber => "#ffbb33",
            Self::Orange => "#ff8800",
            Self::Red => "#ff4444",
        }
    }
}

pub fn score_category(score: f64) -> ScoreCategory {
    ScoreCategory::from_score(score)
}

pub fn score_color(score: f64) -> ScoreColor {
    ScoreCategory::from_score(score).color()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyFactor {
    Speeding,
    HarshBraking,
    PhoneUsage,
    Violations,
}

impl PenaltyFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Speeding => "Speeding",
            Self::HarshBraking => "Harsh braking",
            Self::PhoneUsage => "Phone use",
            Self::Violations => "Violations",
        }
    }
}

/// One capped deduction from the base score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PenaltyComponent {
    pub factor: PenaltyFactor,
    pub rate: f64,
    pub penalty: f64,
    pub cap: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub penalties: Vec<PenaltyComponent>,
}

/// Score with its derived presentation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafetyScore {
    pub score: f64,
    pub category: ScoreCategory,
    pub color: ScoreColor,
}

impl SafetyScore {
    pub fn from_score(score: f64) -> Self {
        let category = ScoreCategory::from_score(score);
        Self {
            score,
            category,
            color: category.color(),
        }
    }

    pub fn from_records(records: &[DrivingRecord]) -> Self {
        Self::from_score(calculate_score(records))
    }
}

/// Rule-based safety score in [0, 100], rounded to one decimal.
pub fn calculate_score(records: &[DrivingRecord]) -> f64 {
    score_breakdown(records).score
}

pub fn score_breakdown(records: &[DrivingRecord]) -> ScoreBreakdown {
    let Some(features) = FeatureVector::from_batch(records) else {
        return ScoreBreakdown {
            score: BASE_SCORE,
            penalties: Vec::new(),
        };
    };

    let mut penalties = Vec::with_capacity(4);

    if features.speeding_rate > 0.0 {
        let penalty = (features.speeding_rate * SPEEDING_RATE_WEIGHT
            + features.avg_over_limit * EXCESS_SPEED_WEIGHT)
            .min(SPEEDING_CAP);
        penalties.push(PenaltyComponent {
            factor: PenaltyFactor::Speeding,
            rate: features.speeding_rate,
            penalty,
            cap: SPEEDING_CAP,
            notes: format!(
                "{:.0}% of trips over the limit by {:.1} km/h on average",
                features.speeding_rate * 100.0,
                features.avg_over_limit
            ),
        });
    } else {
        penalties.push(PenaltyComponent {
            factor: PenaltyFactor::Speeding,
            rate: 0.0,
            penalty: 0.0,
            cap: SPEEDING_CAP,
            notes: "no trips over the speed limit".to_string(),
        });
    }

    penalties.push(rate_penalty(
        PenaltyFactor::HarshBraking,
        features.harsh_braking_rate,
        HARSH_BRAKING_WEIGHT,
        HARSH_BRAKING_CAP,
        "harsh braking",
    ));
    penalties.push(rate_penalty(
        PenaltyFactor::PhoneUsage,
        features.phone_usage_rate,
        PHONE_USAGE_WEIGHT,
        PHONE_USAGE_CAP,
        "phone usage",
    ));
    penalties.push(rate_penalty(
        PenaltyFactor::Violations,
        features.violation_rate,
        VIOLATION_WEIGHT,
        VIOLATION_CAP,
        "recorded violations",
    ));

    let total: f64 = penalties.iter().map(|component| component.penalty).sum();
    let score = round_one_decimal((BASE_SCORE - total).clamp(0.0, BASE_SCORE));

    ScoreBreakdown { score, penalties }
}

fn rate_penalty(
    factor: PenaltyFactor,
    rate: f64,
    weight: f64,
    cap: f64,
    description: &str,
) -> PenaltyComponent {
    PenaltyComponent {
        factor,
        rate,
        penalty: (rate * weight).min(cap),
        cap,
        notes: format!("{description} on {:.0}% of trips", rate * 100.0),
    }
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
