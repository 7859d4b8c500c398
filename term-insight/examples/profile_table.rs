//! Profiles a small in-memory table and prints the report as JSON.
//!
//! Run with `RUST_LOG=term_insight=debug` to see the analyzer events.

use std::error::Error;

use term_insight::logging::setup::{init_logging, LoggingConfig};
use term_insight::prelude::*;

fn main() -> Result<(), Box<dyn Error>> {
    init_logging(LoggingConfig::development())?;

    let timestamps: Vec<String> = (0..48)
        .map(|i| format!("2024-05-{:02} {:02}:30:00", 6 + i / 24, i % 24))
        .collect();
    let temperature: Vec<Option<f64>> = (0..48)
        .map(|i| {
            let hour = (i % 24) as f64;
            if i == 30 {
                Some(95.0)
            } else {
                Some(12.0 + 8.0 * ((hour - 6.0) / 24.0 * std::f64::consts::TAU).sin())
            }
        })
        .collect();
    let demand: Vec<Option<f64>> = temperature
        .iter()
        .enumerate()
        .map(|(i, t)| if i % 11 == 0 { None } else { t.map(|t| 300.0 + 4.2 * t) })
        .collect();
    let site: Vec<Option<&str>> = (0..48)
        .map(|i| Some(if i % 3 == 0 { "coastal" } else { "inland" }))
        .collect();

    let dataset = Dataset::builder()
        .text_column("reading_time", timestamps.iter().map(|s| Some(s.as_str())))
        .text_column("site", site)
        .numeric_column("temperature", temperature)
        .numeric_column("demand", demand)
        .build()?;

    let engine = AnalysisEngine::new(AnalysisConfig::default())?.with_log_config(LogConfig::verbose());
    let report = engine.analyze(&dataset)?;

    println!("{}", report.to_json_pretty()?);
    for insight in report.time_series() {
        println!(
            "{}: trend {:?}, peak hour {:?}, {} anomalies",
            insight.column,
            insight.trend_direction,
            insight.peak_hour,
            insight.anomalies.len()
        );
    }
    Ok(())
}
