//! # Term Insight - Statistical profiling for tabular data
//!
//! Term Insight takes an in-memory table and produces a structured
//! [`AnalysisReport`](analyzers::AnalysisReport) describing it: the semantic
//! kind of every column, descriptive statistics, pairwise correlations between
//! numeric columns, ANOVA associations between categorical and numeric
//! columns, and trend, seasonality and anomaly insights against a temporal
//! column.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_insight::prelude::*;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::builder()
//!     .text_column("order_date", ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"].map(Some))
//!     .text_column("channel", ["web", "web", "store", "store"].map(Some))
//!     .numeric_column("revenue", [120.0, 125.0, 310.0, 305.0].map(Some))
//!     .numeric_column("items", [2.0, 2.0, 5.0, 5.0].map(Some))
//!     .build()?;
//!
//! let config = AnalysisConfig::builder()
//!     .strong_correlation_threshold(0.6)
//!     .build()?;
//! let report = AnalysisEngine::new(config)?.analyze(&dataset)?;
//!
//! assert_eq!(report.temporal_column(), Some("order_date"));
//! for pair in report.correlations() {
//!     println!("{} ~ {}: r = {:.3} ({:?})", pair.column_a, pair.column_b, pair.pearson, pair.strength);
//! }
//! println!("{}", report.to_json_pretty()?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Concurrent runs
//!
//! Large tables can be analyzed on tokio's blocking pool with a deadline and
//! cooperative cancellation. An interrupted run still returns a report, marked
//! partial:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use term_insight::prelude::*;
//!
//! # async fn example(dataset: Dataset) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalysisConfig::builder()
//!     .max_parallelism(4)
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//! let engine = AnalysisEngine::new(config)?;
//!
//! let report = engine
//!     .analyze_concurrent(Arc::new(dataset), CancellationToken::new())
//!     .await?;
//! if report.is_partial() {
//!     eprintln!("analysis did not finish in time");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`dataset`**: the tri-state cell, column and dataset model
//! - **`analyzers`**: classifier, statistics, correlation, association,
//!   time-series analyzers and the engine that orchestrates them
//! - **`sources`**: Arrow `RecordBatch` ingestion
//! - **`logging`**: logging presets and subscriber setup

pub mod analyzers;
pub mod dataset;
pub mod logging;
pub mod prelude;
pub mod sources;
