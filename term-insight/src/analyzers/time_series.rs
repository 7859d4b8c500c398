//! Trend, seasonality and anomaly detection over a temporal column.
//!
//! A [`TemporalIndex`] is built once per run from the temporal column: rows
//! whose timestamp is missing or unparseable are dropped, and the remaining
//! rows are ordered chronologically with a stable sort, so rows sharing a
//! timestamp keep their dataset order. Every numeric column is then analyzed
//! against that index independently.
//!
//! The trend slope is fitted against chronological position: `x` is the
//! 0-based rank of an observation in the sorted index, not its dataset row
//! number. Rows dropped for a missing value do not leave gaps in `x`.
//!
//! A numeric column whose statistics turn non-finite (for example because
//! values near `f64::MAX` overflow) yields a degraded insight: the affected fields are left
//! empty and the cause is recorded in [`TimeSeriesInsight::issues`]. Other
//! columns are unaffected.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::analyzers::context::ClassifiedDataset;
use crate::analyzers::inference::ColumnClassifier;
use crate::analyzers::stats;
use crate::dataset::Column;

/// Direction of the fitted linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl TrendDirection {
    /// Direction of a slope. Only an exact zero is Flat.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Increasing
        } else if slope < 0.0 {
            Self::Decreasing
        } else {
            Self::Flat
        }
    }
}

/// A single flagged observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub z_score: f64,
    /// Row of the observation in the original dataset
    pub row_index: usize,
}

/// Time-series findings for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesInsight {
    pub column: String,
    /// Observations with both a timestamp and a value
    pub observations: usize,
    pub trend_slope: Option<f64>,
    pub trend_direction: Option<TrendDirection>,
    pub peak_hour: Option<u32>,
    pub trough_hour: Option<u32>,
    /// Monday = 0 .. Sunday = 6
    pub peak_day_of_week: Option<u32>,
    pub trough_day_of_week: Option<u32>,
    pub hourly_means: BTreeMap<u32, f64>,
    pub weekday_means: BTreeMap<u32, f64>,
    /// Observations in chronological order
    pub anomalies: Vec<Anomaly>,
    pub issues: Vec<String>,
}

impl TimeSeriesInsight {
    fn empty(column: &str, observations: usize) -> Self {
        Self {
            column: column.to_string(),
            observations,
            trend_slope: None,
            trend_direction: None,
            peak_hour: None,
            trough_hour: None,
            peak_day_of_week: None,
            trough_day_of_week: None,
            hourly_means: BTreeMap::new(),
            weekday_means: BTreeMap::new(),
            anomalies: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Whether any part of the insight was degraded.
    pub fn is_degraded(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Rows of a temporal column with a parsed timestamp, in chronological order.
#[derive(Debug, Clone)]
pub struct TemporalIndex {
    column: String,
    entries: Vec<(usize, NaiveDateTime)>,
}

impl TemporalIndex {
    /// Parses and orders the timestamps of `column`.
    pub fn build(column: &Column, classifier: &ColumnClassifier) -> Self {
        let mut entries: Vec<(usize, NaiveDateTime)> = column
            .values()
            .iter()
            .enumerate()
            .filter_map(|(row, cell)| Some((row, classifier.parse_timestamp(cell)?.value)))
            .collect();
        entries.sort_by_key(|(_, ts)| *ts);

        let dropped = column.len() - entries.len();
        if dropped > 0 {
            debug!(
                column = column.name(),
                dropped, "Excluded rows without a usable timestamp"
            );
        }

        Self {
            column: column.name().to_string(),
            entries,
        }
    }

    /// Name of the temporal column.
    pub fn column_name(&self) -> &str {
        &self.column
    }

    /// `(row_index, timestamp)` pairs in chronological order.
    pub fn entries(&self) -> &[(usize, NaiveDateTime)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes trend, daily and weekly patterns, and anomalies per numeric column.
#[derive(Debug, Clone)]
pub struct TimeSeriesAnalyzer {
    classifier: ColumnClassifier,
    anomaly_z_threshold: f64,
}

impl TimeSeriesAnalyzer {
    /// Creates an analyzer parsing timestamps with `classifier` and flagging
    /// points with `|z| > 3.0`.
    pub fn new(classifier: ColumnClassifier) -> Self {
        Self {
            classifier,
            anomaly_z_threshold: 3.0,
        }
    }

    /// Sets the anomaly z-score threshold.
    pub fn with_anomaly_z_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_z_threshold = threshold;
        self
    }

    /// Builds the chronological index of a temporal column.
    pub fn build_index(&self, temporal: &Column) -> TemporalIndex {
        TemporalIndex::build(temporal, &self.classifier)
    }

    /// Analyzes every numeric column against the temporal column at
    /// `temporal`. Columns with fewer than two observations are skipped.
    #[instrument(skip(self, dataset), fields(numeric_columns = numeric_columns.len()))]
    pub fn analyze_time_series(
        &self,
        dataset: &ClassifiedDataset<'_>,
        temporal: usize,
        numeric_columns: &[usize],
    ) -> Vec<TimeSeriesInsight> {
        let index = self.build_index(dataset.column(temporal).column());
        numeric_columns
            .iter()
            .filter_map(|&idx| self.analyze_column(&index, dataset.column(idx).column()))
            .collect()
    }

    /// Analyzes one numeric column against a prebuilt index.
    pub fn analyze_column(&self, index: &TemporalIndex, numeric: &Column) -> Option<TimeSeriesInsight> {
        let series: Vec<(usize, NaiveDateTime, f64)> = index
            .entries()
            .iter()
            .filter_map(|&(row, ts)| Some((row, ts, numeric.values().get(row)?.as_f64()?)))
            .collect();

        if series.len() < 2 {
            debug!(
                column = numeric.name(),
                observations = series.len(),
                "Too few observations for time-series analysis"
            );
            return None;
        }

        let mut insight = TimeSeriesInsight::empty(numeric.name(), series.len());
        let values: Vec<f64> = series.iter().map(|(_, _, v)| *v).collect();

        // x is chronological position, not dataset row
        match stats::index_slope(&values).filter(|s| s.is_finite()) {
            Some(slope) => {
                insight.trend_slope = Some(slope);
                insight.trend_direction = Some(TrendDirection::from_slope(slope));
            }
            None => insight.issues.push("trend slope is not finite".to_string()),
        }

        let hourly = bucket_means(series.iter().map(|(_, ts, v)| (ts.hour(), *v)));
        match extremes(&hourly) {
            Some((peak, trough)) => {
                insight.peak_hour = Some(peak);
                insight.trough_hour = Some(trough);
                insight.hourly_means = hourly;
            }
            None => insight.issues.push("hourly means are not finite".to_string()),
        }

        let weekly = bucket_means(
            series
                .iter()
                .map(|(_, ts, v)| (ts.weekday().num_days_from_monday(), *v)),
        );
        match extremes(&weekly) {
            Some((peak, trough)) => {
                insight.peak_day_of_week = Some(peak);
                insight.trough_day_of_week = Some(trough);
                insight.weekday_means = weekly;
            }
            None => insight.issues.push("weekday means are not finite".to_string()),
        }

        match (stats::mean(&values), stats::sample_std_dev(&values)) {
            (Some(mean), Some(std)) if mean.is_finite() && std.is_finite() => {
                if std > 0.0 {
                    insight.anomalies = series
                        .iter()
                        .filter_map(|&(row_index, timestamp, value)| {
                            let z_score = (value - mean) / std;
                            (z_score.abs() > self.anomaly_z_threshold).then_some(Anomaly {
                                timestamp,
                                value,
                                z_score,
                                row_index,
                            })
                        })
                        .collect();
                }
            }
            _ => insight
                .issues
                .push("mean or standard deviation is not finite".to_string()),
        }

        if insight.is_degraded() {
            warn!(
                column = numeric.name(),
                issues = ?insight.issues,
                "Time-series insight degraded"
            );
        }

        Some(insight)
    }
}

impl Default for TimeSeriesAnalyzer {
    fn default() -> Self {
        Self::new(ColumnClassifier::new())
    }
}

/// Mean value per bucket key.
fn bucket_means(items: impl Iterator<Item = (u32, f64)>) -> BTreeMap<u32, f64> {
    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (key, value) in items {
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Keys of the largest and smallest means, ties going to the smallest key.
/// `None` if there are no buckets or any mean is not finite.
fn extremes(means: &BTreeMap<u32, f64>) -> Option<(u32, u32)> {
    if means.values().any(|m| !m.is_finite()) {
        return None;
    }
    let mut iter = means.iter();
    let (&first_key, &first_mean) = iter.next()?;
    let (mut peak, mut peak_mean) = (first_key, first_mean);
    let (mut trough, mut trough_mean) = (first_key, first_mean);

    for (&key, &mean) in iter {
        if mean > peak_mean {
            peak = key;
            peak_mean = mean;
        }
        if mean < trough_mean {
            trough = key;
            trough_mean = mean;
        }
    }
    Some((peak, trough))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CellValue;

    fn timestamps(values: &[Option<&str>]) -> Column {
        Column::new("ts", values.iter().map(|v| CellValue::from(*v)).collect())
    }

    fn numbers(name: &str, values: &[Option<f64>]) -> Column {
        Column::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    fn hourly_stamps(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("2024-01-{:02} {:02}:00:00", 1 + i / 24, i % 24))
            .collect()
    }

    #[test]
    fn test_index_orders_chronologically_and_drops_invalid() {
        let ts = timestamps(&[
            Some("2024-01-03 00:00:00"),
            None,
            Some("2024-01-01 00:00:00"),
            Some("not a date"),
            Some("2024-01-01 00:00:00"),
        ]);
        let index = TemporalIndex::build(&ts, &ColumnClassifier::new());
        let rows: Vec<usize> = index.entries().iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![2, 4, 0]);
        assert_eq!(index.column_name(), "ts");
    }

    #[test]
    fn test_trend_follows_chronological_order() {
        let ts = timestamps(&[
            Some("2024-01-03 00:00:00"),
            Some("2024-01-01 00:00:00"),
            Some("2024-01-02 00:00:00"),
        ]);
        let values = numbers("v", &[Some(30.0), Some(10.0), Some(20.0)]);
        let analyzer = TimeSeriesAnalyzer::default();
        let index = analyzer.build_index(&ts);

        let insight = analyzer.analyze_column(&index, &values).unwrap();
        assert!((insight.trend_slope.unwrap() - 10.0).abs() < 1e-12);
        assert_eq!(insight.trend_direction, Some(TrendDirection::Increasing));
        assert!(insight.issues.is_empty());
    }

    #[test]
    fn test_trend_axis_has_no_gaps_for_missing_values() {
        let ts = timestamps(&[
            Some("2024-01-01 00:00:00"),
            Some("2024-01-02 00:00:00"),
            Some("2024-01-03 00:00:00"),
            Some("2024-01-04 00:00:00"),
        ]);
        let values = numbers("v", &[Some(10.0), None, Some(20.0), Some(30.0)]);
        let analyzer = TimeSeriesAnalyzer::default();

        let insight = analyzer
            .analyze_column(&analyzer.build_index(&ts), &values)
            .unwrap();
        assert_eq!(insight.observations, 3);
        assert!((insight.trend_slope.unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_flat_without_anomalies() {
        let stamps = hourly_stamps(30);
        let ts = Column::new(
            "ts",
            stamps.iter().map(|s| CellValue::text(s.as_str())).collect(),
        );
        let constant = numbers("c", &vec![Some(0.7); 30]);
        let analyzer = TimeSeriesAnalyzer::default();
        let insight = analyzer
            .analyze_column(&analyzer.build_index(&ts), &constant)
            .unwrap();

        assert_eq!(insight.trend_slope, Some(0.0));
        assert_eq!(insight.trend_direction, Some(TrendDirection::Flat));
        assert!(insight.anomalies.is_empty());
        // All hours tie, so peak and trough are the smallest hour
        assert_eq!(insight.peak_hour, Some(0));
        assert_eq!(insight.trough_hour, Some(0));
    }

    #[test]
    fn test_hourly_and_weekday_patterns() {
        // 2024-01-01 is a Monday
        let ts = timestamps(&[
            Some("2024-01-01 08:00:00"),
            Some("2024-01-01 20:00:00"),
            Some("2024-01-02 08:00:00"),
            Some("2024-01-02 20:00:00"),
        ]);
        let values = numbers("v", &[Some(1.0), Some(9.0), Some(3.0), Some(11.0)]);
        let analyzer = TimeSeriesAnalyzer::default();
        let insight = analyzer
            .analyze_column(&analyzer.build_index(&ts), &values)
            .unwrap();

        assert_eq!(insight.hourly_means.get(&8), Some(&2.0));
        assert_eq!(insight.hourly_means.get(&20), Some(&10.0));
        assert_eq!(insight.peak_hour, Some(20));
        assert_eq!(insight.trough_hour, Some(8));
        assert_eq!(insight.weekday_means.get(&0), Some(&5.0));
        assert_eq!(insight.weekday_means.get(&1), Some(&7.0));
        assert_eq!(insight.peak_day_of_week, Some(1));
        assert_eq!(insight.trough_day_of_week, Some(0));
    }

    #[test]
    fn test_single_injected_anomaly() {
        let stamps = hourly_stamps(101);
        let ts = Column::new(
            "ts",
            stamps.iter().map(|s| CellValue::text(s.as_str())).collect(),
        );
        let base: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        let spike = stats::mean(&base).unwrap() + 10.0 * stats::sample_std_dev(&base).unwrap();
        let mut values: Vec<Option<f64>> = base.into_iter().map(Some).collect();
        values.insert(57, Some(spike));

        let analyzer = TimeSeriesAnalyzer::default();
        let insight = analyzer
            .analyze_column(&analyzer.build_index(&ts), &numbers("v", &values))
            .unwrap();

        assert_eq!(insight.anomalies.len(), 1);
        assert_eq!(insight.anomalies[0].row_index, 57);
        assert_eq!(insight.anomalies[0].value, spike);
        assert!(insight.anomalies[0].z_score > 3.0);
    }

    #[test]
    fn test_too_few_observations_skipped() {
        let ts = timestamps(&[Some("2024-01-01 00:00:00"), Some("garbage")]);
        let values = numbers("v", &[Some(1.0), Some(2.0)]);
        let analyzer = TimeSeriesAnalyzer::default();
        assert!(analyzer
            .analyze_column(&analyzer.build_index(&ts), &values)
            .is_none());
    }

    #[test]
    fn test_non_finite_values_degrade_only_that_column() {
        let ts = timestamps(&[
            Some("2024-01-01 00:00:00"),
            Some("2024-01-01 01:00:00"),
            Some("2024-01-01 02:00:00"),
        ]);
        let broken = Column::new(
            "broken",
            vec![
                CellValue::Number(-f64::MAX),
                CellValue::Number(f64::MAX),
                CellValue::Number(-f64::MAX),
            ],
        );
        let healthy = numbers("healthy", &[Some(1.0), Some(2.0), Some(3.0)]);
        let analyzer = TimeSeriesAnalyzer::default();
        let index = analyzer.build_index(&ts);

        let degraded = analyzer.analyze_column(&index, &broken).unwrap();
        assert!(degraded.is_degraded());
        assert!(degraded.trend_slope.is_none());
        assert!(degraded.anomalies.is_empty());

        let fine = analyzer.analyze_column(&index, &healthy).unwrap();
        assert!(!fine.is_degraded());
        assert_eq!(fine.trend_direction, Some(TrendDirection::Increasing));
    }
}
