//! Pairwise correlation between numeric columns.
//!
//! Pearson and Spearman coefficients are computed for every unordered pair of
//! numeric columns using pairwise-complete observations: rows where either
//! column is missing are excluded from that pair only.
//!
//! Only pairs with `|pearson|` above the reporting threshold are returned,
//! sorted by descending `|pearson|`. Pairs involving a constant column have an
//! undefined correlation, which is reported as `0.0` / [`CorrelationStrength::Weak`]
//! and therefore never returned by [`CorrelationAnalyzer::compute_correlations`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::context::ClassifiedDataset;
use crate::analyzers::stats;
use crate::dataset::Column;

/// Bucketed magnitude of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

/// Correlation between two numeric columns. `(a, b)` and `(b, a)` are the
/// same pair; only one direction is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub column_a: String,
    pub column_b: String,
    pub pearson: f64,
    pub spearman: f64,
    pub strength: CorrelationStrength,
    /// Number of rows where both columns are present
    pub observations: usize,
}

/// Computes Pearson and Spearman correlations between numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationAnalyzer {
    threshold: f64,
    strong_cutoff: f64,
}

impl CorrelationAnalyzer {
    /// Creates an analyzer reporting pairs with `|pearson| > threshold` and
    /// labelling pairs with `|pearson| > strong_cutoff` as Strong.
    pub fn new(threshold: f64, strong_cutoff: f64) -> Self {
        Self {
            threshold,
            strong_cutoff,
        }
    }

    /// Classifies a coefficient against the configured thresholds.
    pub fn strength(&self, pearson: f64) -> CorrelationStrength {
        let magnitude = pearson.abs();
        if magnitude > self.strong_cutoff {
            CorrelationStrength::Strong
        } else if magnitude > self.threshold {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    /// Correlates every unordered pair of the given numeric columns and
    /// returns the reportable pairs, strongest first.
    ///
    /// Fewer than two columns yields an empty result.
    #[instrument(skip(self, dataset), fields(numeric_columns = numeric_columns.len()))]
    pub fn compute_correlations(
        &self,
        dataset: &ClassifiedDataset<'_>,
        numeric_columns: &[usize],
    ) -> Vec<CorrelationPair> {
        if numeric_columns.len() < 2 {
            debug!("Fewer than two numeric columns, skipping correlation analysis");
            return Vec::new();
        }

        let mut pairs = Vec::new();
        for (i, &a) in numeric_columns.iter().enumerate() {
            for &b in &numeric_columns[i + 1..] {
                let pair = self.correlate(
                    dataset.column(a).column(),
                    dataset.column(b).column(),
                );
                if self.is_reportable(&pair) {
                    pairs.push(pair);
                }
            }
        }

        sort_pairs(&mut pairs);
        pairs
    }

    /// Correlates two columns over their pairwise-complete rows.
    ///
    /// Degenerate pairs (constant column or fewer than two complete rows)
    /// resolve to `0.0` with [`CorrelationStrength::Weak`].
    pub fn correlate(&self, a: &Column, b: &Column) -> CorrelationPair {
        let (xs, ys): (Vec<f64>, Vec<f64>) = a
            .values()
            .iter()
            .zip(b.values())
            .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
            .unzip();

        let (pearson, spearman, strength) = match stats::pearson(&xs, &ys) {
            Some(pearson) => (
                pearson,
                stats::spearman(&xs, &ys).unwrap_or(0.0),
                self.strength(pearson),
            ),
            None => {
                debug!(
                    column_a = a.name(),
                    column_b = b.name(),
                    observations = xs.len(),
                    "Correlation undefined, reporting 0.0"
                );
                (0.0, 0.0, CorrelationStrength::Weak)
            }
        };

        CorrelationPair {
            column_a: a.name().to_string(),
            column_b: b.name().to_string(),
            pearson,
            spearman,
            strength,
            observations: xs.len(),
        }
    }

    /// Whether a pair belongs in the report.
    pub fn is_reportable(&self, pair: &CorrelationPair) -> bool {
        pair.strength != CorrelationStrength::Weak
    }
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new(0.5, 0.7)
    }
}

/// Sorts pairs by descending `|pearson|`, then by column names.
pub fn sort_pairs(pairs: &mut [CorrelationPair]) {
    pairs.sort_by(|x, y| {
        y.pearson
            .abs()
            .partial_cmp(&x.pearson.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| x.column_a.cmp(&y.column_a))
            .then_with(|| x.column_b.cmp(&y.column_b))
    });
}
