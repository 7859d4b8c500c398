//! Descriptive statistics for classified columns.
//!
//! The [`DescriptiveStatsComputer`] produces one [`ColumnStats`] per column.
//! Missing-value counts are always computed against the full row count; the
//! remaining fields depend on the column kind:
//!
//! - **Numeric**: count, min/max, mean, median, sample standard deviation,
//!   quartiles (linear interpolation), skewness, kurtosis and IQR outliers
//! - **Categorical**: unique count, most common value and a top-N distribution
//! - **Temporal**: earliest and latest timestamp
//!
//! # Example
//!
//! ```rust
//! use term_insight::analyzers::{ClassifiedColumn, ColumnKind, DescriptiveStatsComputer, StatsSummary};
//! use term_insight::dataset::{CellValue, Column};
//!
//! let column = Column::new(
//!     "latency_ms",
//!     vec![CellValue::Number(10.0), CellValue::Missing, CellValue::Number(30.0)],
//! );
//! let stats = DescriptiveStatsComputer::new()
//!     .compute_stats(ClassifiedColumn::new(&column, ColumnKind::Numeric));
//!
//! assert_eq!(stats.missing_count, 1);
//! if let StatsSummary::Numeric(summary) = &stats.summary {
//!     assert_eq!(summary.mean, 20.0);
//! }
//! ```

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::analyzers::context::{ClassifiedColumn, ClassifiedDataset};
use crate::analyzers::inference::{ColumnClassifier, ColumnKind};
use crate::analyzers::stats;

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub q25: f64,
    pub q75: f64,
    pub iqr: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// Values outside `[q25 - 1.5 * iqr, q75 + 1.5 * iqr]`
    pub outlier_count: usize,
}

impl NumericSummary {
    /// Whether every required statistic is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.sum,
            self.min,
            self.max,
            self.mean,
            self.median,
            self.std_dev,
            self.variance,
            self.q25,
            self.q75,
            self.iqr,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// One entry of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub value: String,
    pub count: usize,
    /// Share of non-missing values, in percent
    pub percentage: f64,
}

/// Summary statistics for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    pub most_common: Option<ValueCount>,
    /// Top-N values ordered by count, then by first appearance
    pub distribution: Vec<CategoryShare>,
}

/// Summary statistics for a temporal column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSummary {
    pub count: usize,
    pub unique_count: usize,
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
    pub span_seconds: i64,
}

/// Kind-specific part of [`ColumnStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StatsSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
    Temporal(TemporalSummary),
    /// No usable values; only the missing-value fields are meaningful
    Empty,
}

/// Descriptive statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column_name: String,
    pub kind: ColumnKind,
    pub row_count: usize,
    pub missing_count: usize,
    /// Missing values as a percentage of all rows
    pub missing_percentage: f64,
    pub summary: StatsSummary,
}

impl ColumnStats {
    /// Number of non-missing values.
    pub fn non_missing_count(&self) -> usize {
        self.row_count - self.missing_count
    }
}

/// Computes per-column descriptive statistics.
#[derive(Debug, Clone)]
pub struct DescriptiveStatsComputer {
    top_distribution_size: usize,
    classifier: ColumnClassifier,
}

impl DescriptiveStatsComputer {
    /// Create a computer with the default distribution size (10).
    pub fn new() -> Self {
        Self {
            top_distribution_size: 10,
            classifier: ColumnClassifier::new(),
        }
    }

    /// Set the number of entries kept in categorical distributions.
    pub fn with_top_distribution_size(mut self, size: usize) -> Self {
        self.top_distribution_size = size;
        self
    }

    /// Use a specific classifier for parsing temporal values.
    pub fn with_classifier(mut self, classifier: ColumnClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Compute statistics for every column of a classified dataset.
    #[instrument(skip(self, dataset), fields(columns = dataset.kinds().len()))]
    pub fn compute_all(&self, dataset: &ClassifiedDataset<'_>) -> Vec<ColumnStats> {
        dataset.columns().map(|c| self.compute_stats(c)).collect()
    }

    /// Compute statistics for one column.
    pub fn compute_stats(&self, column: ClassifiedColumn<'_>) -> ColumnStats {
        let row_count = column.column().len();
        let missing_count = column.column().missing_count();
        let missing_percentage = if row_count > 0 {
            missing_count as f64 / row_count as f64 * 100.0
        } else {
            0.0
        };

        let summary = match column.kind() {
            ColumnKind::Numeric => self.numeric_summary(column),
            ColumnKind::Categorical => self.categorical_summary(column),
            ColumnKind::Temporal => self.temporal_summary(column),
        };

        debug!(
            column = column.name(),
            kind = column.kind().type_name(),
            missing = missing_count,
            "Computed column statistics"
        );

        ColumnStats {
            column_name: column.name().to_string(),
            kind: column.kind(),
            row_count,
            missing_count,
            missing_percentage,
            summary,
        }
    }

    fn numeric_summary(&self, column: ClassifiedColumn<'_>) -> StatsSummary {
        let values: Vec<f64> = column.column().numeric_values().map(|(_, v)| v).collect();
        if values.is_empty() {
            return StatsSummary::Empty;
        }

        let sorted = stats::sorted(&values);
        let (Some(mean), Some(variance)) = (stats::mean(&values), stats::sample_variance(&values))
        else {
            return StatsSummary::Empty;
        };
        let percentile = |p: f64| stats::percentile_sorted(&sorted, p).unwrap_or(mean);
        let q25 = percentile(0.25);
        let q75 = percentile(0.75);
        let iqr = q75 - q25;
        let lower_fence = q25 - 1.5 * iqr;
        let upper_fence = q75 + 1.5 * iqr;

        let summary = NumericSummary {
            count: values.len(),
            sum: values.iter().sum(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median: percentile(0.5),
            std_dev: variance.sqrt(),
            variance,
            q25,
            q75,
            iqr,
            skewness: stats::skewness(&values).filter(|v| v.is_finite()),
            kurtosis: stats::excess_kurtosis(&values).filter(|v| v.is_finite()),
            outlier_count: values
                .iter()
                .filter(|v| **v < lower_fence || **v > upper_fence)
                .count(),
        };

        if !summary.is_finite() {
            warn!(
                column = column.name(),
                "Numeric statistics overflowed, reporting an empty summary"
            );
            return StatsSummary::Empty;
        }
        StatsSummary::Numeric(summary)
    }

    fn categorical_summary(&self, column: ClassifiedColumn<'_>) -> StatsSummary {
        // (first-seen position, count) per value
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut total = 0usize;
        for key in column.column().values().iter().filter_map(|v| v.category_key()) {
            let next_position = counts.len();
            counts.entry(key).or_insert((next_position, 0)).1 += 1;
            total += 1;
        }

        let mut ordered: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(value, (first_seen, count))| (value, first_seen, count))
            .collect();
        ordered.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));

        let most_common = ordered.first().map(|(value, _, count)| ValueCount {
            value: value.clone(),
            count: *count,
        });
        let distribution = ordered
            .iter()
            .take(self.top_distribution_size)
            .map(|(value, _, count)| CategoryShare {
                value: value.clone(),
                count: *count,
                percentage: *count as f64 / total as f64 * 100.0,
            })
            .collect();

        StatsSummary::Categorical(CategoricalSummary {
            unique_count: ordered.len(),
            most_common,
            distribution,
        })
    }

    fn temporal_summary(&self, column: ClassifiedColumn<'_>) -> StatsSummary {
        let timestamps: Vec<NaiveDateTime> = column
            .column()
            .values()
            .iter()
            .filter_map(|v| self.classifier.parse_timestamp(v))
            .map(|parsed| parsed.value)
            .collect();

        let (Some(min), Some(max)) = (
            timestamps.iter().min().copied(),
            timestamps.iter().max().copied(),
        ) else {
            return StatsSummary::Empty;
        };

        StatsSummary::Temporal(TemporalSummary {
            count: timestamps.len(),
            unique_count: timestamps.iter().collect::<HashSet<_>>().len(),
            min,
            max,
            span_seconds: (max - min).num_seconds(),
        })
    }
}

impl Default for DescriptiveStatsComputer {
    fn default() -> Self {
        Self::new()
    }
}
