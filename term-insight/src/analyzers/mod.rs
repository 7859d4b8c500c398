//! Statistical analyzers for tabular data.
//!
//! A run starts by classifying every column once, then hands the classified
//! view to independent analyzers whose results are merged into an
//! [`AnalysisReport`]:
//!
//! - **Column classifier** (`inference`): assigns each column a [`ColumnKind`]
//!   (numeric, categorical or temporal) from its values and name.
//! - **Descriptive statistics** (`profiler`): missing-value counts plus a
//!   kind-specific summary per column.
//! - **Correlation** (`correlation`): Pearson and Spearman coefficients for
//!   every pair of numeric columns, filtered and bucketed by strength.
//! - **Association** (`association`): one-way ANOVA between grouping columns
//!   and numeric columns.
//! - **Time series** (`time_series`): trend, hourly/weekday patterns and
//!   z-score anomalies against a temporal column.
//! - **Engine** (`runner`): validation, orchestration and the concurrent
//!   execution path.
//!
//! Only structural input problems surface as [`AnalyzerError`]s. Insufficient
//! data and numeric degeneracies are absorbed by the analyzers: the affected
//! item is omitted or resolves to a documented sentinel value.
//!
//! ## Example Usage
//!
//! ```rust
//! use term_insight::analyzers::{AnalysisConfig, AnalysisEngine, CorrelationStrength};
//! use term_insight::dataset::Dataset;
//!
//! let dataset = Dataset::builder()
//!     .text_column("group", ["A", "A", "B", "B"].map(Some))
//!     .numeric_column("v", [1.0, 1.0, 100.0, 100.0].map(Some))
//!     .numeric_column("w", [2.0, 2.5, 200.0, 201.0].map(Some))
//!     .build()
//!     .unwrap();
//!
//! let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
//! let report = engine.analyze(&dataset).unwrap();
//!
//! assert_eq!(report.correlations()[0].strength, CorrelationStrength::Strong);
//! assert!(report.association("group", "v").unwrap().significant);
//! ```

pub mod association;
pub mod config;
pub mod context;
pub mod correlation;
pub mod errors;
pub mod inference;
pub mod profiler;
pub mod report;
pub mod runner;
pub mod stats;
pub mod time_series;

pub use association::{one_way_anova, AnovaOutcome, AssociationAnalyzer, AssociationResult};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, AssociationRetention};
pub use context::{ClassifiedColumn, ClassifiedDataset};
pub use correlation::{CorrelationAnalyzer, CorrelationPair, CorrelationStrength};
pub use errors::{AnalyzerError, AnalyzerResult};
pub use inference::{
    ClassifierConfig, ColumnClassifier, ColumnClassifierBuilder, ColumnKind, ParsedTimestamp,
    TemporalFormat, TemporalPrecision,
};
pub use profiler::{
    CategoricalSummary, CategoryShare, ColumnStats, DescriptiveStatsComputer, NumericSummary,
    StatsSummary, TemporalSummary, ValueCount,
};
pub use report::AnalysisReport;
pub use runner::{AnalysisEngine, CancellationToken, ProgressCallback};
pub use time_series::{
    Anomaly, TemporalIndex, TimeSeriesAnalyzer, TimeSeriesInsight, TrendDirection,
};
