use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Traffic violation recorded against a trip. `None` is the "no violation"
/// sentinel carried by clean records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    None,
    Speeding,
    RedLight,
    Seatbelt,
    PhoneWhileDriving,
    ImproperOvertaking,
    FailureToYield,
}

impl ViolationCategory {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::None,
            Self::Speeding,
            Self::RedLight,
            Self::Seatbelt,
            Self::PhoneWhileDriving,
            Self::ImproperOvertaking,
            Self::FailureToYield,
        ]
    }

    pub const fn token(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Speeding => "speeding",
            Self::RedLight => "red_light",
            Self::Seatbelt => "seatbelt",
            Self::PhoneWhileDriving => "phone_while_driving",
            Self::ImproperOvertaking => "improper_overtaking",
            Self::FailureToYield => "failure_to_yield",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "No Violation",
            Self::Speeding => "Speeding",
            Self::RedLight => "Running a Red Light",
            Self::Seatbelt => "Seatbelt Not Fastened",
            Self::PhoneWhileDriving => "Phone Use While Driving",
            Self::ImproperOvertaking => "Improper Overtaking",
            Self::FailureToYield => "Failure to Yield",
        }
    }

    /// Accepts either the snake_case token or the human label, ignoring case.
    /// Blank input maps to the `None` sentinel.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(Self::None);
        }

        Self::ordered().into_iter().find(|category| {
            category.token().eq_ignore_ascii_case(trimmed)
                || category.label().eq_ignore_ascii_case(trimmed)
        })
    }

    pub const fn is_violation(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Synthetic labelling tag. Real deployment data never carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverProfile {
    Safe,
    Risky,
}

impl DriverProfile {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Risky => "risky",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "safe" => Some(Self::Safe),
            "risky" => Some(Self::Risky),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One observed trip or road segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingRecord {
    pub date: NaiveDate,
    pub speed_kmh: f64,
    pub speed_limit: u32,
    #[serde(default)]
    pub harsh_braking: bool,
    #[serde(default)]
    pub phone_usage: bool,
    pub location: Location,
    #[serde(default = "no_violation")]
    pub violation: ViolationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_profile: Option<DriverProfile>,
}

fn no_violation() -> ViolationCategory {
    ViolationCategory::None
}

impl DrivingRecord {
    pub fn is_speeding(&self) -> bool {
        self.speed_kmh > f64::from(self.speed_limit)
    }

    pub fn excess_speed(&self) -> f64 {
        self.speed_kmh - f64::from(self.speed_limit)
    }

    pub fn has_violation(&self) -> bool {
        self.violation.is_violation()
    }

    /// Any behaviour that marks the record as a hotspot contributor.
    pub fn is_risk_event(&self) -> bool {
        self.is_speeding() || self.has_violation() || self.harsh_braking
    }
}

/// Schema contract breaches detected before a batch is scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    #[error("record {index} has a zero speed limit")]
    SpeedLimit { index: usize },
    #[error("record {index} has an invalid speed {speed}")]
    Speed { index: usize, speed: f64 },
    #[error("record {index} has coordinates out of range ({latitude}, {longitude})")]
    Coordinates {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    #[error("record {index} is missing a location name")]
    LocationName { index: usize },
}

/// Rejects the first record that breaks the record invariants.
pub fn validate_batch(records: &[DrivingRecord]) -> Result<(), BatchError> {
    records
        .iter()
        .enumerate()
        .try_for_each(|(index, record)| validate_record(index, record))
}

/// Checks a single record; `index` is only used to label the error.
pub fn validate_record(index: usize, record: &DrivingRecord) -> Result<(), BatchError> {
    if record.speed_limit == 0 {
        return Err(BatchError::SpeedLimit { index });
    }
    if !record.speed_kmh.is_finite() || record.speed_kmh < 0.0 {
        return Err(BatchError::Speed {
            index,
            speed: record.speed_kmh,
        });
    }
    let Location {
        name,
        latitude,
        longitude,
    } = &record.location;
    if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
        return Err(BatchError::Coordinates {
            index,
            latitude: *latitude,
            longitude: *longitude,
        });
    }
    if name.trim().is_empty() {
        return Err(BatchError::LocationName { index });
    }

    Ok(())
}
