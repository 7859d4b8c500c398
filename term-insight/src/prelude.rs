//! Prelude for commonly used types in term-insight.

pub use crate::analyzers::{
    AnalysisConfig, AnalysisEngine, AnalysisReport, AnalyzerError, AnalyzerResult,
    AssociationRetention, CancellationToken, ColumnKind, CorrelationStrength, StatsSummary,
    TrendDirection,
};
pub use crate::dataset::{CellValue, Column, Dataset};
pub use crate::logging::LogConfig;
