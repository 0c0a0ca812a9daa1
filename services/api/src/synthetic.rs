use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use salmeen::safety::{DriverProfile, DrivingRecord, Location, ViolationCategory};

const SPEED_LIMIT: u32 = 120;
const LOOKBACK_DAYS: i64 = 90;
const COORDINATE_JITTER: f64 = 0.02;

const RIYADH_LOCATIONS: [(&str, f64, f64); 10] = [
    ("King Fahd Road", 24.7136, 46.6753),
    ("King Abdullah Road", 24.7500, 46.7200),
    ("King Khalid Road", 24.6900, 46.6900),
    ("Olaya Street", 24.7100, 46.6800),
    ("Eastern Ring Road", 24.7400, 46.7500),
    ("Al Nakheel District", 24.7700, 46.7300),
    ("Al Malqa District", 24.7800, 46.6400),
    ("Al Yasmin District", 24.8100, 46.6600),
    ("Khurais Road", 24.6500, 46.7100),
    ("Al Rabwah District", 24.7300, 46.6500),
];

struct Behaviour {
    speed_mean: f64,
    speed_sd: f64,
    speed_range: (f64, f64),
    harsh_braking: f64,
    phone_usage: f64,
    violation: f64,
}

impl Behaviour {
    fn for_profile(profile: DriverProfile) -> Self {
        match profile {
            DriverProfile::Safe => Self {
                speed_mean: 100.0,
                speed_sd: 15.0,
                speed_range: (60.0, 140.0),
                harsh_braking: 0.05,
                phone_usage: 0.03,
                violation: 0.10,
            },
            DriverProfile::Risky => Self {
                speed_mean: 130.0,
                speed_sd: 20.0,
                speed_range: (100.0, 180.0),
                harsh_braking: 0.25,
                phone_usage: 0.20,
                violation: 0.40,
            },
        }
    }
}

/// Profile-labelled Riyadh trip log covering the 90 days before `today`,
/// sorted by date. The same seed always yields the same table.
pub(crate) fn generate_records(count: usize, seed: u64, today: NaiveDate) -> Vec<DrivingRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = today - Duration::days(LOOKBACK_DAYS);

    // 70% safe, rounded up
    let safe_count = (count * 7).div_ceil(10);
    let mut profiles: Vec<DriverProfile> = (0..count)
        .map(|index| {
            if index < safe_count {
                DriverProfile::Safe
            } else {
                DriverProfile::Risky
            }
        })
        .collect();
    profiles.shuffle(&mut rng);

    let violations = &ViolationCategory::ordered()[1..];
    let mut records: Vec<DrivingRecord> = profiles
        .into_iter()
        .map(|profile| {
            let behaviour = Behaviour::for_profile(profile);
            let date = start + Duration::days(rng.gen_range(0..=LOOKBACK_DAYS));
            let spot = rng.gen_range(0..RIYADH_LOCATIONS.len());
            let (name, latitude, longitude) = RIYADH_LOCATIONS[spot];
            let latitude = round_to(latitude + normal(&mut rng) * COORDINATE_JITTER, 6);
            let longitude = round_to(longitude + normal(&mut rng) * COORDINATE_JITTER, 6);

            let (low, high) = behaviour.speed_range;
            let speed = behaviour.speed_mean + normal(&mut rng) * behaviour.speed_sd;
            let speed_kmh = round_to(speed.clamp(low, high), 1);

            let harsh_braking = rng.gen_bool(behaviour.harsh_braking);
            let phone_usage = rng.gen_bool(behaviour.phone_usage);
            let violation = if rng.gen_bool(behaviour.violation) {
                violations
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(ViolationCategory::None)
            } else {
                ViolationCategory::None
            };

            DrivingRecord {
                date,
                speed_kmh,
                speed_limit: SPEED_LIMIT,
                harsh_braking,
                phone_usage,
                location: Location {
                    name: name.to_string(),
                    latitude,
                    longitude,
                },
                violation,
                driver_profile: Some(profile),
            }
        })
        .collect();

    records.sort_by_key(|record| record.date);
    records
}

/// Standard normal draw (Box-Muller).
fn normal<R: Rng>(rng: &mut R) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
