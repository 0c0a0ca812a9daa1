use super::records::{
    validate_record, BatchError, DriverProfile, DrivingRecord, Location, ViolationCategory,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read driving records: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid driving record CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {line}: {message}")]
    Row { line: u64, message: String },
    #[error("row {line}: {source}")]
    Invalid {
        line: u64,
        #[source]
        source: BatchError,
    },
}

pub fn load_records_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<DrivingRecord>, DatasetError> {
    let file = std::fs::File::open(path)?;
    load_records_from_reader(file)
}

/// Parses and validates the driving log export, then sorts it by date.
/// Errors name the 1-based CSV line, header included.
pub fn load_records_from_reader<R: Read>(reader: R) -> Result<Vec<DrivingRecord>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (offset, row) in csv_reader.deserialize::<RecordRow>().enumerate() {
        let line = offset as u64 + 2;
        let record = row?
            .into_record()
            .map_err(|message| DatasetError::Row { line, message })?;
        validate_record(offset, &record)
            .map_err(|source| DatasetError::Invalid { line, source })?;
        records.push(record);
    }

    records.sort_by_key(|record| record.date);
    debug!(records = records.len(), "driving records loaded");

    Ok(records)
}

/// Writes records using the same column layout the loader reads.
pub fn write_records<W: std::io::Write>(
    writer: W,
    records: &[DrivingRecord],
) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "date",
        "speed_kmh",
        "speed_limit",
        "harsh_braking",
        "phone_usage",
        "location_lat",
        "location_lon",
        "location_name",
        "violation_type",
        "driver_profile",
    ])?;

    for record in records {
        csv_writer.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            format!("{:.1}", record.speed_kmh),
            record.speed_limit.to_string(),
            u8::from(record.harsh_braking).to_string(),
            u8::from(record.phone_usage).to_string(),
            format!("{:.6}", record.location.latitude),
            format!("{:.6}", record.location.longitude),
            record.location.name.clone(),
            record.violation.token().to_string(),
            record
                .driver_profile
                .map(|profile| profile.label().to_string())
                .unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(deserialize_with = "deserialize_date")]
    date: NaiveDate,
    speed_kmh: f64,
    speed_limit: u32,
    #[serde(deserialize_with = "deserialize_flag")]
    harsh_braking: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    phone_usage: bool,
    location_lat: f64,
    location_lon: f64,
    location_name: String,
    #[serde(default)]
    violation_type: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    driver_profile: Option<String>,
}

impl RecordRow {
    fn into_record(self) -> Result<DrivingRecord, String> {
        let violation = ViolationCategory::parse(&self.violation_type)
            .ok_or_else(|| format!("unknown violation type '{}'", self.violation_type))?;

        let driver_profile = match self.driver_profile {
            Some(raw) => Some(
                DriverProfile::parse(&raw)
                    .ok_or_else(|| format!("unknown driver profile '{raw}'"))?,
            ),
            None => None,
        };

        Ok(DrivingRecord {
            date: self.date,
            speed_kmh: self.speed_kmh,
            speed_limit: self.speed_limit,
            harsh_braking: self.harsh_braking,
            phone_usage: self.phone_usage,
            location: Location {
                name: self.location_name,
                latitude: self.location_lat,
                longitude: self.location_lon,
            },
            violation,
            driver_profile,
        })
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| serde::de::Error::custom(format!("invalid date '{raw}' ({err})")))
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag '{other}'"))),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,speed_kmh,speed_limit,harsh_braking,phone_usage,location_lat,location_lon,location_name,violation_type,driver_profile\n";

    #[test]
    fn loads_and_sorts_rows_by_date() {
        let csv = format!(
            "{HEADER}\
2025-03-02,131.5,120,1,0,24.7136,46.6753,King Fahd Road,speeding,risky\n\
2025-03-01,98.0,120,0,true,24.7100,46.6800,Olaya Street,,safe\n"
        );

        let records = load_records_from_reader(csv.as_bytes()).expect("csv loads");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location.name, "Olaya Street");
        assert!(records[0].phone_usage);
        assert_eq!(records[0].violation, ViolationCategory::None);
        assert_eq!(records[1].violation, ViolationCategory::Speeding);
        assert!(records[1].harsh_braking);
        assert_eq!(records[1].driver_profile, Some(DriverProfile::Risky));
    }

    #[test]
    fn profile_column_is_optional() {
        let csv = "date,speed_kmh,speed_limit,harsh_braking,phone_usage,location_lat,location_lon,location_name,violation_type\n\
2025-03-01,98.0,120,0,0,24.71,46.68,Olaya Street,none\n";

        let records = load_records_from_reader(csv.as_bytes()).expect("csv loads");
        assert_eq!(records.len(), 1);
        assert!(records[0].driver_profile.is_none());
    }

    #[test]
    fn rejects_zero_speed_limit() {
        let csv = format!("{HEADER}2025-03-01,98.0,0,0,0,24.71,46.68,Olaya Street,none,safe\n");

        let err = load_records_from_reader(csv.as_bytes()).expect_err("zero limit rejected");
        assert!(matches!(
            err,
            DatasetError::Invalid {
                line: 2,
                source: BatchError::SpeedLimit { index: 0 }
            }
        ));
    }

    #[test]
    fn invalid_row_is_reported_by_file_position_not_date_order() {
        let csv = format!(
            "{HEADER}\
2025-03-05,98.0,120,0,0,24.71,46.68,Olaya Street,none,safe\n\
2025-03-04,101.0,120,0,0,24.71,46.68,Olaya Street,none,safe\n\
2025-03-01,99.0,0,0,0,24.71,46.68,King Fahd Road,none,safe\n"
        );

        let err = load_records_from_reader(csv.as_bytes()).expect_err("zero limit rejected");
        match err {
            DatasetError::Invalid { line, source } => {
                assert_eq!(line, 4);
                assert_eq!(source, BatchError::SpeedLimit { index: 2 });
            }
            other => panic!("expected invalid row error, got {other:?}"),
        }
        assert!(load_records_from_reader(csv.as_bytes())
            .expect_err("zero limit rejected")
            .to_string()
            .starts_with("row 4:"));
    }

    #[test]
    fn rejects_unknown_violation() {
        let csv =
            format!("{HEADER}2025-03-01,98.0,120,0,0,24.71,46.68,Olaya Street,jaywalking,safe\n");

        let err = load_records_from_reader(csv.as_bytes()).expect_err("unknown violation");
        match err {
            DatasetError::Row { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("jaywalking"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn written_records_load_back() {
        let csv = format!(
            "{HEADER}2025-03-01,98.0,120,0,1,24.71,46.68,Olaya Street,red_light,safe\n"
        );
        let records = load_records_from_reader(csv.as_bytes()).expect("csv loads");

        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).expect("csv writes");
        let reloaded = load_records_from_reader(buffer.as_slice()).expect("csv reloads");
        assert_eq!(reloaded, records);
    }
}
