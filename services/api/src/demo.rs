use crate::infra::{load_csv, train_predictor};
use crate::synthetic::generate_records;
use chrono::{Local, NaiveDate};
use clap::Args;
use salmeen::config::DatasetConfig;
use salmeen::error::AppError;
use salmeen::safety::{write_records, DriverReport, DrivingRecord, MinistryOverview};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

const DEFAULT_RECORDS: usize = 500;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Trip log export (CSV) for one driver
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Report date (YYYY-MM-DD). Defaults to the latest trip in the log.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Number of days before the report date to include
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub(crate) window_days: u32,
    /// Seed for the synthetic training table used when the log has no profile labels
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
}

#[derive(Args, Debug)]
pub(crate) struct MinistryArgs {
    /// Fleet trip log (CSV). Synthetic records are used when omitted.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Synthetic record count when no CSV is given
    #[arg(long, default_value_t = DEFAULT_RECORDS)]
    pub(crate) records: usize,
    /// Synthetic seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Number of trips to generate
    #[arg(long, default_value_t = DEFAULT_RECORDS)]
    pub(crate) records: usize,
    /// Seed for the random generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
    /// Last day of the generated 90-day window (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Destination CSV path
    #[arg(long)]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Synthetic record count
    #[arg(long, default_value_t = DEFAULT_RECORDS)]
    pub(crate) records: usize,
    /// Synthetic seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Size of the driver window in days
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub(crate) window_days: u32,
}

fn synthetic_config(records: usize, seed: u64, window_days: u32) -> DatasetConfig {
    DatasetConfig {
        csv_path: None,
        synthetic_records: records.max(1),
        synthetic_seed: seed,
        window_days,
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        csv,
        today,
        window_days,
        seed,
    } = args;

    let records = load_csv(&csv)?;
    let today = today
        .or_else(|| records.last().map(|record| record.date))
        .unwrap_or_else(|| Local::now().date_naive());
    let config = synthetic_config(DEFAULT_RECORDS, seed, window_days);
    let predictor = train_predictor(&records, &config, today);

    let report = DriverReport::build(&records, today, window_days, &predictor);
    render_driver_report(&report);
    Ok(())
}

pub(crate) fn run_ministry(args: MinistryArgs) -> Result<(), AppError> {
    let MinistryArgs { csv, records, seed } = args;

    let today = Local::now().date_naive();
    let config = synthetic_config(records, seed, DEFAULT_WINDOW_DAYS);
    let dataset = match csv {
        Some(path) => load_csv(&path)?,
        None => generate_records(config.synthetic_records, seed, today),
    };
    let predictor = train_predictor(&dataset, &config, today);

    render_ministry_overview(&MinistryOverview::build(&dataset, &predictor));
    Ok(())
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let GenerateArgs {
        records,
        seed,
        today,
        output,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let dataset = generate_records(records, seed, today);
    let writer = BufWriter::new(File::create(&output)?);
    write_records(writer, &dataset)?;

    println!(
        "Wrote {} synthetic trips ({} -> {}) to {}",
        dataset.len(),
        dataset.first().map(|record| record.date).unwrap_or(today),
        today,
        output.display()
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        records,
        seed,
        today,
        window_days,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let config = synthetic_config(records, seed, window_days);
    let dataset = generate_records(config.synthetic_records, seed, today);
    let predictor = train_predictor(&dataset, &config, today);

    println!("Salmeen driving safety demo");
    println!(
        "Synthetic fleet: {} trips (seed {}), model {}",
        dataset.len(),
        seed,
        if predictor.is_trained() {
            "trained"
        } else {
            "not trained"
        }
    );

    let citizen = sample_driver(&dataset);
    println!("\nCitizen profile ({} trips on file)", citizen.len());
    render_driver_report(&DriverReport::build(
        &citizen,
        today,
        window_days,
        &predictor,
    ));

    println!();
    render_ministry_overview(&MinistryOverview::build(&dataset, &predictor));
    Ok(())
}

/// Every third trip stands in for a single citizen's history.
fn sample_driver(dataset: &[DrivingRecord]) -> Vec<DrivingRecord> {
    dataset.iter().step_by(3).cloned().collect()
}

pub(crate) fn render_driver_report(report: &DriverReport) {
    println!(
        "Window: {} -> {} ({} trips)",
        report.window_start, report.window_end, report.records
    );
    println!(
        "Safety score: {:.1} / 100 ({}, {})",
        report.score, report.category_label, report.color
    );

    println!("\nPenalties");
    if report.breakdown.penalties.is_empty() {
        println!("- none (no trips in window)");
    }
    for component in &report.breakdown.penalties {
        println!(
            "- {}: rate {:.1}% -> -{:.1} (cap {:.0})",
            component.factor.label(),
            component.rate * 100.0,
            component.penalty,
            component.cap
        );
    }
    println!("Violations recorded: {}", report.violations);

    let risk = report.risk.view();
    match risk.reason {
        Some(reason) => println!("\nRisk level: {} ({})", risk.risk_level_label, reason),
        None => println!(
            "\nRisk level: {} ({:.1}% confidence)",
            risk.risk_level_label, risk.confidence
        ),
    }

    println!("\nRecommendations");
    for message in &report.recommendations {
        println!("- {message}");
    }

    if !report.history.is_empty() {
        println!("\nDaily scores");
        for day in &report.history {
            println!("- {}: {:.1} ({} trips)", day.date, day.score, day.records);
        }
    }

    if !report.recent_trips.is_empty() {
        println!("\nRecent trips");
        for trip in &report.recent_trips {
            println!(
                "- {}: {:.0} km/h in a {} zone on {}",
                trip.date, trip.speed_kmh, trip.speed_limit, trip.location.name
            );
        }
    }
}

pub(crate) fn render_ministry_overview(overview: &MinistryOverview) {
    println!("Ministry overview");
    println!(
        "- {} trips | {} violations | {} phone-use events",
        overview.total_records, overview.total_violations, overview.phone_usage_events
    );
    println!(
        "- Fleet score {:.1} ({}) | {:.1}% trips from high-risk profiles | model {}",
        overview.fleet_score,
        overview.fleet_category.label(),
        overview.high_risk_share_pct,
        if overview.model_trained {
            "loaded"
        } else {
            "unavailable"
        }
    );

    if overview.risk_hotspots.is_empty() {
        println!("\nRisk hotspots: none");
    } else {
        println!("\nRisk hotspots");
        for spot in overview.risk_hotspots.iter().take(5) {
            println!(
                "- {}: {} events near ({:.4}, {:.4})",
                spot.location, spot.risk_events, spot.latitude, spot.longitude
            );
        }
    }

    if overview.violation_distribution.is_empty() {
        println!("\nViolation distribution: none");
    } else {
        println!("\nViolation distribution");
        for share in &overview.violation_distribution {
            println!("- {}: {}", share.label, share.count);
        }
    }

    if let (Some(first), Some(last)) = (
        overview.daily_violations.first(),
        overview.daily_violations.last(),
    ) {
        let peak = overview
            .daily_violations
            .iter()
            .max_by_key(|day| day.count)
            .map(|day| (day.date, day.count));
        println!(
            "\nDaily violations tracked {} -> {} ({} days)",
            first.date,
            last.date,
            overview.daily_violations.len()
        );
        if let Some((date, count)) = peak {
            println!("Peak day: {date} with {count} violations");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_driver_keeps_every_third_trip() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let dataset = generate_records(30, 3, today);

        let citizen = sample_driver(&dataset);

        assert_eq!(citizen.len(), 10);
        assert_eq!(citizen[1], dataset[3]);
    }

    #[test]
    fn generate_writes_loadable_csv() {
        let output = std::env::temp_dir().join("salmeen-generate-test.csv");
        run_generate(GenerateArgs {
            records: 40,
            seed: 11,
            today: NaiveDate::from_ymd_opt(2025, 6, 1),
            output: output.clone(),
        })
        .expect("csv written");

        let records = load_csv(&output).expect("csv loads");
        assert_eq!(records.len(), 40);
        let _ = std::fs::remove_file(output);
    }
}
