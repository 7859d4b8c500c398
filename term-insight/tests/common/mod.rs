//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use term_insight::dataset::Dataset;

/// `count` timestamps one hour apart, starting Monday 2024-01-01 00:00.
pub fn hourly_timestamps(count: usize) -> Vec<String> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start timestamp");
    (0..count)
        .map(|i| {
            (start + TimeDelta::hours(i as i64))
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .collect()
}

/// A reproducible sales table with a temporal column, two categorical
/// columns, and correlated numeric columns with some missing values.
pub fn sales_dataset(rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let regions = ["north", "south", "east", "west"];
    let channels = ["web", "store"];

    let mut region = Vec::with_capacity(rows);
    let mut channel = Vec::with_capacity(rows);
    let mut units = Vec::with_capacity(rows);
    let mut revenue = Vec::with_capacity(rows);
    let mut discount = Vec::with_capacity(rows);

    for i in 0..rows {
        let r = rng.random_range(0..regions.len());
        region.push(Some(regions[r]));
        channel.push(if rng.random_bool(0.05) {
            None
        } else {
            Some(channels[i % 2])
        });

        let u = rng.random_range(1.0..50.0) + r as f64 * 10.0;
        units.push(Some(u));
        revenue.push(if rng.random_bool(0.02) {
            None
        } else {
            Some(u * 19.5 + rng.random_range(-20.0..20.0))
        });
        discount.push(Some(rng.random_range(0.0..0.3)));
    }

    let stamps = hourly_timestamps(rows);
    Dataset::builder()
        .text_column("order_time", stamps.iter().map(|s| Some(s.as_str())))
        .text_column("region", region)
        .text_column("channel", channel)
        .numeric_column("units", units)
        .numeric_column("revenue", revenue)
        .numeric_column("discount", discount)
        .build()
        .expect("fixture dataset is well-formed")
}
