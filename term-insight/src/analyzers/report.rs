//! The merged result of an analysis run.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::analyzers::association::AssociationResult;
use crate::analyzers::correlation::CorrelationPair;
use crate::analyzers::errors::AnalyzerResult;
use crate::analyzers::inference::ColumnKind;
use crate::analyzers::profiler::ColumnStats;
use crate::analyzers::time_series::TimeSeriesInsight;

/// Everything an [`AnalysisEngine`](crate::analyzers::AnalysisEngine) run
/// produced.
///
/// The report is immutable once built. It always carries one [`ColumnStats`]
/// entry per column, in dataset order, unless the run was cut short, in which
/// case [`is_partial`](Self::is_partial) is true and only completed work is
/// present.
///
/// Serializes with `column_stats` and `column_kinds` as JSON objects keyed by
/// column name, preserving dataset order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub(crate) row_count: usize,
    #[serde(serialize_with = "serialize_kinds")]
    pub(crate) column_kinds: Vec<(String, ColumnKind)>,
    pub(crate) temporal_column: Option<String>,
    #[serde(serialize_with = "serialize_stats")]
    pub(crate) column_stats: Vec<ColumnStats>,
    pub(crate) correlations: Vec<CorrelationPair>,
    pub(crate) associations: Vec<AssociationResult>,
    pub(crate) time_series: Vec<TimeSeriesInsight>,
    pub(crate) partial: bool,
}

impl AnalysisReport {
    /// Number of rows in the analyzed dataset.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Kind of a column by name.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column_kinds
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, kind)| *kind)
    }

    /// `(name, kind)` for every column in dataset order.
    pub fn column_kinds(&self) -> &[(String, ColumnKind)] {
        &self.column_kinds
    }

    /// The temporal column used for time-series analysis, if any.
    pub fn temporal_column(&self) -> Option<&str> {
        self.temporal_column.as_deref()
    }

    /// Statistics of a column by name.
    pub fn column_stats(&self, name: &str) -> Option<&ColumnStats> {
        self.column_stats.iter().find(|s| s.column_name == name)
    }

    /// Statistics of every column in dataset order.
    pub fn all_column_stats(&self) -> &[ColumnStats] {
        &self.column_stats
    }

    /// Reported correlation pairs, strongest first.
    pub fn correlations(&self) -> &[CorrelationPair] {
        &self.correlations
    }

    /// The correlation between two columns, in either order.
    pub fn correlation(&self, a: &str, b: &str) -> Option<&CorrelationPair> {
        self.correlations.iter().find(|p| {
            (p.column_a == a && p.column_b == b) || (p.column_a == b && p.column_b == a)
        })
    }

    /// Retained ANOVA associations.
    pub fn associations(&self) -> &[AssociationResult] {
        &self.associations
    }

    /// The association between a grouping column and a numeric column.
    pub fn association(&self, categorical: &str, numeric: &str) -> Option<&AssociationResult> {
        self.associations
            .iter()
            .find(|r| r.categorical_column == categorical && r.numeric_column == numeric)
    }

    /// Time-series insights, one per analyzed numeric column.
    pub fn time_series(&self) -> &[TimeSeriesInsight] {
        &self.time_series
    }

    /// Time-series insight for a numeric column.
    pub fn time_series_for(&self, column: &str) -> Option<&TimeSeriesInsight> {
        self.time_series.iter().find(|t| t.column == column)
    }

    /// True when a cancelled or timed-out run returned only completed work.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Serializes the report to compact JSON.
    pub fn to_json(&self) -> AnalyzerResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the report to indented JSON.
    pub fn to_json_pretty(&self) -> AnalyzerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn serialize_stats<S>(stats: &[ColumnStats], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(stats.len()))?;
    for entry in stats {
        map.serialize_entry(&entry.column_name, entry)?;
    }
    map.end()
}

fn serialize_kinds<S>(kinds: &[(String, ColumnKind)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(kinds.len()))?;
    for (name, kind) in kinds {
        map.serialize_entry(name, kind)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::correlation::CorrelationStrength;
    use crate::analyzers::profiler::StatsSummary;

    fn sample_report() -> AnalysisReport {
        let stats = |name: &str| ColumnStats {
            column_name: name.to_string(),
            kind: ColumnKind::Numeric,
            row_count: 2,
            missing_count: 2,
            missing_percentage: 100.0,
            summary: StatsSummary::Empty,
        };
        AnalysisReport {
            row_count: 2,
            column_kinds: vec![
                ("zeta".to_string(), ColumnKind::Numeric),
                ("alpha".to_string(), ColumnKind::Numeric),
            ],
            temporal_column: None,
            column_stats: vec![stats("zeta"), stats("alpha")],
            correlations: vec![CorrelationPair {
                column_a: "zeta".to_string(),
                column_b: "alpha".to_string(),
                pearson: 0.9,
                spearman: 0.8,
                strength: CorrelationStrength::Strong,
                observations: 2,
            }],
            associations: Vec::new(),
            time_series: Vec::new(),
            partial: false,
        }
    }

    #[test]
    fn test_lookups() {
        let report = sample_report();
        assert_eq!(report.column_kind("alpha"), Some(ColumnKind::Numeric));
        assert!(report.column_kind("missing").is_none());
        assert!(report.column_stats("zeta").is_some());
        assert!(report.correlation("alpha", "zeta").is_some());
        assert!(report.correlation("zeta", "alpha").is_some());
        assert!(report.association("a", "b").is_none());
        assert!(!report.is_partial());
    }

    #[test]
    fn test_json_preserves_column_order() {
        let json = sample_report().to_json().unwrap();
        let zeta = json.find("\"zeta\":{").unwrap();
        let alpha = json.find("\"alpha\":{").unwrap();
        assert!(zeta < alpha);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["row_count"], 2);
        assert_eq!(value["column_kinds"]["alpha"], "Numeric");
        assert_eq!(value["column_stats"]["alpha"]["missing_count"], 2);
        assert_eq!(value["partial"], false);
    }
}
