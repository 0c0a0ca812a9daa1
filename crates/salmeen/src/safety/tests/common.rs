use chrono::{Duration, NaiveDate};

use crate::safety::records::{DriverProfile, DrivingRecord, Location, ViolationCategory};

pub(super) fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

pub(super) fn location(name: &str) -> Location {
    Location {
        name: name.to_string(),
        latitude: 24.7136,
        longitude: 46.6753,
    }
}

pub(super) fn record(speed_kmh: f64) -> DrivingRecord {
    DrivingRecord {
        date: base_date(),
        speed_kmh,
        speed_limit: 120,
        harsh_braking: false,
        phone_usage: false,
        location: location("King Fahd Road"),
        violation: ViolationCategory::None,
        driver_profile: None,
    }
}

pub(super) fn record_at(speed_kmh: f64, place: &str) -> DrivingRecord {
    DrivingRecord {
        location: location(place),
        ..record(speed_kmh)
    }
}

pub(super) fn clean_batch(count: usize) -> Vec<DrivingRecord> {
    (0..count)
        .map(|index| DrivingRecord {
            date: base_date() + Duration::days(index as i64 % 7),
            ..record(95.0 + (index % 5) as f64)
        })
        .collect()
}

/// Deterministic stand-in for a safe driver's trip.
pub(super) fn safe_trip(index: usize) -> DrivingRecord {
    DrivingRecord {
        date: base_date() + Duration::days((index % 60) as i64),
        speed_kmh: 90.0 + (index % 17) as f64,
        harsh_braking: index % 25 == 0,
        phone_usage: false,
        violation: if index % 30 == 0 {
            ViolationCategory::Seatbelt
        } else {
            ViolationCategory::None
        },
        driver_profile: Some(DriverProfile::Safe),
        ..record(0.0)
    }
}

/// Deterministic stand-in for a risky driver's trip.
pub(super) fn risky_trip(index: usize) -> DrivingRecord {
    DrivingRecord {
        date: base_date() + Duration::days((index % 60) as i64),
        speed_kmh: 135.0 + (index % 23) as f64,
        harsh_braking: index % 4 == 0,
        phone_usage: index % 5 == 0,
        violation: if index % 3 == 0 {
            ViolationCategory::RedLight
        } else {
            ViolationCategory::None
        },
        driver_profile: Some(DriverProfile::Risky),
        location: location("Eastern Ring Road"),
        ..record(0.0)
    }
}

/// Interleaved safe and risky trips.
pub(super) fn labelled_dataset(safe: usize, risky: usize) -> Vec<DrivingRecord> {
    let mut dataset = Vec::with_capacity(safe + risky);
    let longest = safe.max(risky);
    for index in 0..longest {
        if index < safe {
            dataset.push(safe_trip(index));
        }
        if index < risky {
            dataset.push(risky_trip(index));
        }
    }
    dataset
}

pub(super) fn strip_profiles(records: &[DrivingRecord]) -> Vec<DrivingRecord> {
    records
        .iter()
        .cloned()
        .map(|record| DrivingRecord {
            driver_profile: None,
            ..record
        })
        .collect()
}
