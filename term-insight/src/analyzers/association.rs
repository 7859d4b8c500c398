//! Categorical-versus-numeric association using one-way ANOVA.
//!
//! For each grouping column (categorical, or low-cardinality numeric when
//! enabled) and each numeric column, the numeric values are partitioned by the
//! grouping value and tested with a one-way ANOVA:
//!
//! ```text
//! F = (SS_between / (k - 1)) / (SS_within / (N - k))
//! ```
//!
//! The p-value is the upper tail of the F distribution with `(k - 1, N - k)`
//! degrees of freedom. Grouping columns with too many distinct values are
//! skipped entirely. A pair is tested only when it has at least two groups and
//! every group holds two or more observations; otherwise it is skipped
//! silently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::config::AssociationRetention;
use crate::analyzers::context::ClassifiedDataset;
use crate::analyzers::inference::distinct_count;
use crate::analyzers::stats;
use crate::dataset::Column;

/// Minimum observations every group of a pair needs for the pair to be tested.
const MIN_GROUP_SIZE: usize = 2;

/// ANOVA result for one (categorical, numeric) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationResult {
    pub categorical_column: String,
    pub numeric_column: String,
    /// Always `>= 0`; `f64::MAX` when groups differ but have no internal spread
    pub f_statistic: f64,
    /// Always in `[0, 1]`
    pub p_value: f64,
    pub significant: bool,
    pub group_count: usize,
    pub observations: usize,
    pub df_between: usize,
    pub df_within: usize,
    /// Share of total variance explained by the grouping
    pub eta_squared: f64,
}

/// Output of a one-way ANOVA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaOutcome {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ss_between: f64,
    pub ss_within: f64,
}

/// One-way ANOVA over pre-grouped values.
///
/// Returns `None` unless there are at least two groups and more observations
/// than groups. Zero within-group variance resolves to `F = f64::MAX, p = 0`
/// when the group means differ, and to `F = 0, p = 1` when they do not.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<AnovaOutcome> {
    let k = groups.len();
    let n: usize = groups.iter().map(Vec::len).sum();
    if k < 2 || n <= k || groups.iter().any(Vec::is_empty) {
        return None;
    }

    let all: Vec<f64> = groups.iter().flatten().copied().collect();
    let grand_mean = stats::mean(&all)?;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let group_mean = stats::mean(group)?;
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = k - 1;
    let df_within = n - k;

    let (f_statistic, p_value) = if ss_within == 0.0 {
        if ss_between > 0.0 {
            (f64::MAX, 0.0)
        } else {
            (0.0, 1.0)
        }
    } else {
        let f = (ss_between / df_between as f64) / (ss_within / df_within as f64);
        if !f.is_finite() {
            return None;
        }
        let f = f.max(0.0);
        (
            f,
            stats::f_distribution_sf(f, df_between as f64, df_within as f64).clamp(0.0, 1.0),
        )
    };

    Some(AnovaOutcome {
        f_statistic,
        p_value,
        df_between,
        df_within,
        ss_between,
        ss_within,
    })
}

/// Computes ANOVA associations between grouping and numeric columns.
#[derive(Debug, Clone)]
pub struct AssociationAnalyzer {
    max_category_cardinality: usize,
    significance_level: f64,
    retention: AssociationRetention,
}

impl AssociationAnalyzer {
    /// Creates an analyzer with the given cardinality limit, a 0.05
    /// significance level, and [`AssociationRetention::All`].
    pub fn new(max_category_cardinality: usize) -> Self {
        Self {
            max_category_cardinality,
            significance_level: 0.05,
            retention: AssociationRetention::All,
        }
    }

    /// Sets the significance level.
    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    /// Sets the retention policy.
    pub fn with_retention(mut self, retention: AssociationRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Whether a grouping column has few enough distinct values to be used.
    pub fn accepts_grouping_column(&self, column: &Column) -> bool {
        distinct_count(column) <= self.max_category_cardinality
    }

    /// Tests every (grouping, numeric) pair and returns the retained results
    /// in grouping-column, then numeric-column order.
    #[instrument(
        skip(self, dataset),
        fields(
            grouping_columns = categorical_columns.len(),
            numeric_columns = numeric_columns.len()
        )
    )]
    pub fn compute_associations(
        &self,
        dataset: &ClassifiedDataset<'_>,
        categorical_columns: &[usize],
        numeric_columns: &[usize],
    ) -> Vec<AssociationResult> {
        let mut results = Vec::new();

        for &cat_idx in categorical_columns {
            let categorical = dataset.column(cat_idx).column();
            if !self.accepts_grouping_column(categorical) {
                debug!(
                    column = categorical.name(),
                    max = self.max_category_cardinality,
                    "Skipping high-cardinality grouping column"
                );
                continue;
            }

            for &num_idx in numeric_columns {
                if num_idx == cat_idx {
                    continue;
                }
                let numeric = dataset.column(num_idx).column();
                if let Some(result) = self.associate(categorical, numeric) {
                    if self.is_retained(&result) {
                        results.push(result);
                    }
                }
            }
        }

        results
    }

    /// Runs the ANOVA for one pair, or `None` if the pair is ineligible.
    ///
    /// The cardinality limit is not checked here; see
    /// [`accepts_grouping_column`](Self::accepts_grouping_column).
    pub fn associate(&self, categorical: &Column, numeric: &Column) -> Option<AssociationResult> {
        let groups = group_values(categorical, numeric);
        let undersized = groups.iter().filter(|g| g.len() < MIN_GROUP_SIZE).count();

        if groups.len() < 2 || undersized > 0 {
            debug!(
                categorical = categorical.name(),
                numeric = numeric.name(),
                groups = groups.len(),
                undersized,
                "Pair is not eligible for ANOVA"
            );
            return None;
        }

        let outcome = one_way_anova(&groups)?;
        let ss_total = outcome.ss_between + outcome.ss_within;
        let eta_squared = if ss_total > 0.0 {
            outcome.ss_between / ss_total
        } else {
            0.0
        };

        Some(AssociationResult {
            categorical_column: categorical.name().to_string(),
            numeric_column: numeric.name().to_string(),
            f_statistic: outcome.f_statistic,
            p_value: outcome.p_value,
            significant: outcome.p_value < self.significance_level,
            group_count: groups.len(),
            observations: groups.iter().map(Vec::len).sum(),
            df_between: outcome.df_between,
            df_within: outcome.df_within,
            eta_squared,
        })
    }

    /// Whether a result is kept under the retention policy.
    pub fn is_retained(&self, result: &AssociationResult) -> bool {
        match self.retention {
            AssociationRetention::All => true,
            AssociationRetention::SignificantOnly => result.significant,
        }
    }
}

impl Default for AssociationAnalyzer {
    fn default() -> Self {
        Self::new(30)
    }
}

/// Partitions the numeric values by grouping value, in first-seen order,
/// over rows where both cells are present.
fn group_values(categorical: &Column, numeric: &Column) -> Vec<Vec<f64>> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<f64>> = Vec::new();

    for (key, value) in categorical.values().iter().zip(numeric.values()) {
        let (Some(key), Some(value)) = (key.category_key(), value.as_f64()) else {
            continue;
        };
        let idx = *positions.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(value);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::inference::ColumnKind;
    use crate::dataset::{CellValue, Dataset};

    fn labels(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    fn numbers(name: &str, values: &[Option<f64>]) -> Column {
        Column::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    #[test]
    fn test_separated_groups_are_significant() {
        let group = labels("group", &[Some("A"), Some("A"), Some("B"), Some("B")]);
        let value = numbers("v", &[Some(1.0), Some(1.0), Some(100.0), Some(100.0)]);

        let result = AssociationAnalyzer::default().associate(&group, &value).unwrap();
        assert!(result.f_statistic > 1e6);
        assert!(result.p_value < 1e-6);
        assert!(result.significant);
        assert_eq!(result.group_count, 2);
        assert_eq!(result.df_between, 1);
        assert_eq!(result.df_within, 2);
        assert_eq!(result.eta_squared, 1.0);
    }

    #[test]
    fn test_anova_reference_values() {
        let groups = vec![
            vec![6.0, 8.0, 4.0, 5.0, 3.0, 4.0],
            vec![8.0, 12.0, 9.0, 11.0, 6.0, 8.0],
            vec![13.0, 9.0, 11.0, 8.0, 7.0, 12.0],
        ];
        let outcome = one_way_anova(&groups).unwrap();
        assert!((outcome.f_statistic - 9.264_705_882).abs() < 1e-6);
        assert!((outcome.p_value - 0.0024).abs() < 1e-4);
        assert_eq!(outcome.df_between, 2);
        assert_eq!(outcome.df_within, 15);
    }

    #[test]
    fn test_identical_values_not_significant() {
        let outcome = one_way_anova(&[vec![5.0, 5.0], vec![5.0, 5.0]]).unwrap();
        assert_eq!(outcome.f_statistic, 0.0);
        assert_eq!(outcome.p_value, 1.0);
    }

    #[test]
    fn test_single_group_ineligible() {
        let group = labels("group", &[Some("A"), Some("A"), Some("A")]);
        let value = numbers("v", &[Some(1.0), Some(2.0), Some(3.0)]);
        assert!(AssociationAnalyzer::default().associate(&group, &value).is_none());
    }

    #[test]
    fn test_pair_with_undersized_group_is_skipped() {
        let group = labels(
            "group",
            &[Some("A"), Some("A"), Some("B"), Some("B"), Some("C"), None],
        );
        let value = numbers(
            "v",
            &[Some(1.0), Some(2.0), Some(10.0), Some(11.0), Some(50.0), Some(3.0)],
        );
        assert!(AssociationAnalyzer::default().associate(&group, &value).is_none());

        let sparse = labels("sparse", &[Some("A"), Some("B"), Some("C"), Some("D"), None, None]);
        assert!(AssociationAnalyzer::default().associate(&sparse, &value).is_none());
    }

    #[test]
    fn test_missing_numeric_cells_do_not_form_groups() {
        let group = labels(
            "group",
            &[Some("A"), Some("A"), Some("B"), Some("B"), Some("C")],
        );
        let value = numbers("v", &[Some(1.0), Some(2.0), Some(10.0), Some(11.0), None]);

        let result = AssociationAnalyzer::default().associate(&group, &value).unwrap();
        assert_eq!(result.group_count, 2);
        assert_eq!(result.observations, 4);
        assert_eq!(result.df_within, 2);
    }

    #[test]
    fn test_high_cardinality_columns_skipped() {
        let ids: Vec<String> = (0..50).map(|i| format!("id{}", i % 50)).collect();
        let values: Vec<Option<f64>> = (0..50).map(|i| Some(i as f64)).collect();
        let dataset = Dataset::builder()
            .column("id", ids.iter().map(|s| s.as_str()))
            .numeric_column("v", values)
            .build()
            .unwrap();
        let classified =
            ClassifiedDataset::new(&dataset, vec![ColumnKind::Categorical, ColumnKind::Numeric]);

        let results = AssociationAnalyzer::default().compute_associations(&classified, &[0], &[1]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_retention_policy() {
        let dataset = Dataset::builder()
            .text_column("g", ["a", "a", "a", "b", "b", "b"].map(Some))
            .numeric_column("signal", [1.0, 1.1, 0.9, 9.0, 9.1, 8.9].map(Some))
            .numeric_column("noise", [1.0, 5.0, 3.0, 2.0, 4.0, 3.0].map(Some))
            .build()
            .unwrap();
        let classified = ClassifiedDataset::new(
            &dataset,
            vec![ColumnKind::Categorical, ColumnKind::Numeric, ColumnKind::Numeric],
        );

        let all = AssociationAnalyzer::default().compute_associations(&classified, &[0], &[1, 2]);
        assert_eq!(all.len(), 2);
        assert!(all[0].significant);
        assert!(!all[1].significant);

        let significant = AssociationAnalyzer::default()
            .with_retention(AssociationRetention::SignificantOnly)
            .compute_associations(&classified, &[0], &[1, 2]);
        assert_eq!(significant.len(), 1);
        assert_eq!(significant[0].numeric_column, "signal");
    }
}
