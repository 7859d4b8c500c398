//! Column classification for tabular data.
//!
//! The [`ColumnClassifier`] assigns every column exactly one [`ColumnKind`]:
//!
//! - **Temporal**: every non-missing value is text that parses as a date or
//!   date-time, and either the column name carries a temporal hint (such as
//!   `date` or `time`) or every value parsed under an unambiguous format.
//! - **Numeric**: every non-missing value is a number or numeric text.
//! - **Categorical**: everything else, including columns with no values.
//!
//! # Example
//!
//! ```rust
//! use term_insight::analyzers::inference::{ColumnClassifier, ColumnKind};
//! use term_insight::dataset::Dataset;
//!
//! let dataset = Dataset::builder()
//!     .text_column("created_at", [Some("2024-01-05 10:00:00"), Some("2024-01-06 11:30:00")])
//!     .text_column("amount", [Some("12.5"), Some("7")])
//!     .text_column("status", [Some("open"), Some("closed")])
//!     .build()
//!     .unwrap();
//!
//! let classifier = ColumnClassifier::new();
//! let kinds = classifier.classify_all(&dataset);
//! assert_eq!(kinds, vec![ColumnKind::Temporal, ColumnKind::Numeric, ColumnKind::Categorical]);
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dataset::{CellValue, Column, Dataset};

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());
static FLOAT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Semantic type of a column, assigned once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Temporal,
}

impl ColumnKind {
    /// Returns the kind name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "Numeric",
            ColumnKind::Categorical => "Categorical",
            ColumnKind::Temporal => "Temporal",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Whether a format yields a date (midnight) or a full date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalPrecision {
    Date,
    DateTime,
}

/// A chrono parse pattern accepted for temporal detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalFormat {
    /// chrono `strftime`-style pattern
    pub pattern: String,
    /// Date-only or date-time pattern
    pub precision: TemporalPrecision,
    /// Whether a match is enough to call a column temporal without a name hint
    pub unambiguous: bool,
}

impl TemporalFormat {
    /// A year-first pattern that cannot be confused with other layouts.
    pub fn unambiguous(pattern: impl Into<String>, precision: TemporalPrecision) -> Self {
        Self {
            pattern: pattern.into(),
            precision,
            unambiguous: true,
        }
    }

    /// A pattern whose day/month order is a convention, not a certainty.
    pub fn ambiguous(pattern: impl Into<String>, precision: TemporalPrecision) -> Self {
        Self {
            pattern: pattern.into(),
            precision,
            unambiguous: false,
        }
    }

    fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        match self.precision {
            TemporalPrecision::DateTime => NaiveDateTime::parse_from_str(value, &self.pattern).ok(),
            TemporalPrecision::Date => NaiveDate::parse_from_str(value, &self.pattern)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }
}

/// Configuration for the column classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Accepted date/date-time formats, tried in order after RFC 3339
    pub temporal_formats: Vec<TemporalFormat>,
    /// Lowercase substrings of column names that mark a temporal column
    pub temporal_name_hints: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        use TemporalPrecision::{Date, DateTime};

        Self {
            temporal_formats: vec![
                TemporalFormat::unambiguous("%Y-%m-%d %H:%M:%S%.f", DateTime),
                TemporalFormat::unambiguous("%Y-%m-%dT%H:%M:%S%.f", DateTime),
                TemporalFormat::unambiguous("%Y-%m-%d %H:%M", DateTime),
                TemporalFormat::unambiguous("%Y-%m-%dT%H:%M", DateTime),
                TemporalFormat::unambiguous("%Y/%m/%d %H:%M:%S", DateTime),
                TemporalFormat::unambiguous("%Y-%m-%d", Date),
                TemporalFormat::unambiguous("%Y/%m/%d", Date),
                TemporalFormat::ambiguous("%m/%d/%Y %H:%M:%S", DateTime),
                TemporalFormat::ambiguous("%m/%d/%Y %H:%M", DateTime),
                TemporalFormat::ambiguous("%m/%d/%Y", Date),
                TemporalFormat::ambiguous("%d.%m.%Y %H:%M:%S", DateTime),
                TemporalFormat::ambiguous("%d.%m.%Y", Date),
            ],
            temporal_name_hints: vec!["date".to_string(), "time".to_string()],
        }
    }
}

/// A successfully parsed timestamp and whether its format was unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub value: NaiveDateTime,
    pub unambiguous: bool,
}

/// Builder for ColumnClassifier
pub struct ColumnClassifierBuilder {
    config: ClassifierConfig,
}

impl ColumnClassifierBuilder {
    /// Replace the accepted temporal formats
    pub fn temporal_formats(mut self, formats: Vec<TemporalFormat>) -> Self {
        self.config.temporal_formats = formats;
        self
    }

    /// Add an accepted temporal format
    pub fn add_temporal_format(mut self, format: TemporalFormat) -> Self {
        self.config.temporal_formats.push(format);
        self
    }

    /// Replace the temporal column name hints
    pub fn temporal_name_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.temporal_name_hints = hints
            .into_iter()
            .map(|h| h.into().to_lowercase())
            .collect();
        self
    }

    /// Build the ColumnClassifier
    pub fn build(self) -> ColumnClassifier {
        ColumnClassifier {
            config: self.config,
        }
    }
}

/// Assigns a [`ColumnKind`] to each column from its values.
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    config: ClassifierConfig,
}

impl ColumnClassifier {
    /// Create a new builder for ColumnClassifier
    pub fn builder() -> ColumnClassifierBuilder {
        ColumnClassifierBuilder {
            config: ClassifierConfig::default(),
        }
    }

    /// Create a ColumnClassifier with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a ColumnClassifier from an existing configuration
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Returns the classifier configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify every column of a dataset, in column order.
    #[instrument(skip(self, dataset), fields(columns = dataset.column_count()))]
    pub fn classify_all(&self, dataset: &Dataset) -> Vec<ColumnKind> {
        dataset
            .columns()
            .iter()
            .map(|column| self.classify(column))
            .collect()
    }

    /// Classify a single column. Never fails; an empty column is categorical.
    pub fn classify(&self, column: &Column) -> ColumnKind {
        let present: Vec<&CellValue> = column.values().iter().filter(|v| !v.is_missing()).collect();

        let kind = if present.is_empty() {
            ColumnKind::Categorical
        } else if self.is_temporal(column.name(), &present) {
            ColumnKind::Temporal
        } else if present.iter().all(|v| is_numeric_cell(v)) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };

        debug!(
            column = column.name(),
            kind = kind.type_name(),
            non_missing = present.len(),
            "Classified column"
        );
        kind
    }

    /// Parse a cell as a timestamp using RFC 3339 and the configured formats.
    pub fn parse_timestamp(&self, value: &CellValue) -> Option<ParsedTimestamp> {
        let text = value.as_text()?.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(ParsedTimestamp {
                value: dt.naive_local(),
                unambiguous: true,
            });
        }

        self.config.temporal_formats.iter().find_map(|format| {
            format.parse(text).map(|value| ParsedTimestamp {
                value,
                unambiguous: format.unambiguous,
            })
        })
    }

    fn has_temporal_hint(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.config
            .temporal_name_hints
            .iter()
            .any(|hint| name.contains(hint.as_str()))
    }

    fn is_temporal(&self, name: &str, present: &[&CellValue]) -> bool {
        let mut all_unambiguous = true;
        for value in present {
            match self.parse_timestamp(value) {
                Some(parsed) => all_unambiguous &= parsed.unambiguous,
                None => return false,
            }
        }
        all_unambiguous || self.has_temporal_hint(name)
    }
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn is_numeric_cell(value: &CellValue) -> bool {
    match value {
        CellValue::Number(v) => v.is_finite(),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            (INTEGER_PATTERN.is_match(trimmed) || FLOAT_PATTERN.is_match(trimmed))
                && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
        }
        CellValue::Missing => false,
    }
}

/// Count distinct non-missing values of a column.
pub fn distinct_count(column: &Column) -> usize {
    column
        .values()
        .iter()
        .filter_map(CellValue::category_key)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn text_column(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    #[test]
    fn test_numeric_classification() {
        let classifier = ColumnClassifier::new();
        let column = text_column("amount", &[Some("1"), Some("-2.5"), None, Some("3e2")]);
        assert_eq!(classifier.classify(&column), ColumnKind::Numeric);

        let native = Column::new("x", vec![CellValue::Number(1.0), CellValue::Missing]);
        assert_eq!(classifier.classify(&native), ColumnKind::Numeric);
    }

    #[test]
    fn test_overflowing_text_is_not_numeric() {
        let classifier = ColumnClassifier::new();
        let column = text_column("amount", &[Some("1"), Some("2"), Some("1e400"), Some("3")]);
        assert_eq!(classifier.classify(&column), ColumnKind::Categorical);
    }

    #[test]
    fn test_categorical_classification() {
        let classifier = ColumnClassifier::new();
        let column = text_column("status", &[Some("open"), Some("12"), Some("closed")]);
        assert_eq!(classifier.classify(&column), ColumnKind::Categorical);
    }

    #[test]
    fn test_empty_column_is_categorical() {
        let classifier = ColumnClassifier::new();
        let column = text_column("nothing", &[None, Some("  "), None]);
        assert_eq!(classifier.classify(&column), ColumnKind::Categorical);
        assert_eq!(
            classifier.classify(&Column::new("empty", vec![])),
            ColumnKind::Categorical
        );
    }

    #[test]
    fn test_unambiguous_temporal_without_hint() {
        let classifier = ColumnClassifier::new();
        let column = text_column(
            "recorded",
            &[Some("2024-03-01 08:15:00"), Some("2024-03-02"), Some("2024-03-03T09:00:00Z")],
        );
        assert_eq!(classifier.classify(&column), ColumnKind::Temporal);
    }

    #[test]
    fn test_ambiguous_temporal_requires_hint() {
        let classifier = ColumnClassifier::new();
        let values = [Some("03/04/2024"), Some("05/06/2024")];

        let without_hint = text_column("recorded", &values);
        assert_eq!(classifier.classify(&without_hint), ColumnKind::Categorical);

        let with_hint = text_column("Order_Date", &values);
        assert_eq!(classifier.classify(&with_hint), ColumnKind::Temporal);
    }

    #[test]
    fn test_partially_parseable_dates_are_categorical() {
        let classifier = ColumnClassifier::new();
        let column = text_column("event_time", &[Some("2024-01-01"), Some("yesterday")]);
        assert_eq!(classifier.classify(&column), ColumnKind::Categorical);
    }

    #[test]
    fn test_numbers_are_never_temporal() {
        let classifier = ColumnClassifier::new();
        let column = Column::new("timestamp", vec![CellValue::Number(1_700_000_000.0)]);
        assert_eq!(classifier.classify(&column), ColumnKind::Numeric);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let classifier = ColumnClassifier::new();

        let parsed = classifier
            .parse_timestamp(&CellValue::text("2024-01-05 13:45:10.250"))
            .unwrap();
        assert_eq!(parsed.value.hour(), 13);
        assert!(parsed.unambiguous);

        let date_only = classifier
            .parse_timestamp(&CellValue::text("2024-01-05"))
            .unwrap();
        assert_eq!(date_only.value.hour(), 0);

        let rfc = classifier
            .parse_timestamp(&CellValue::text("2024-01-05T22:00:00+02:00"))
            .unwrap();
        assert_eq!(rfc.value.hour(), 22);

        let us = classifier
            .parse_timestamp(&CellValue::text("12/25/2023"))
            .unwrap();
        assert!(!us.unambiguous);

        assert!(classifier.parse_timestamp(&CellValue::Number(5.0)).is_none());
        assert!(classifier.parse_timestamp(&CellValue::Missing).is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let classifier = ColumnClassifier::builder()
            .temporal_formats(vec![TemporalFormat::ambiguous(
                "%d/%m/%Y",
                TemporalPrecision::Date,
            )])
            .temporal_name_hints(["Stamp"])
            .build();

        assert_eq!(classifier.config().temporal_name_hints, vec!["stamp"]);

        let column = text_column("stamp", &[Some("25/12/2023")]);
        assert_eq!(classifier.classify(&column), ColumnKind::Temporal);

        let iso = text_column("stamp", &[Some("2023-12-25")]);
        assert_eq!(classifier.classify(&iso), ColumnKind::Categorical);
    }

    #[test]
    fn test_distinct_count() {
        let column = Column::new(
            "c",
            vec![
                CellValue::text("a"),
                CellValue::text("b"),
                CellValue::text("a"),
                CellValue::Missing,
            ],
        );
        assert_eq!(distinct_count(&column), 2);
    }

    #[test]
    fn test_numeric_patterns() {
        assert!(is_numeric_cell(&CellValue::text("0")));
        assert!(is_numeric_cell(&CellValue::text("+7")));
        assert!(is_numeric_cell(&CellValue::text(".5")));
        assert!(is_numeric_cell(&CellValue::text("1E-10")));
        assert!(!is_numeric_cell(&CellValue::text("1,000")));
        assert!(!is_numeric_cell(&CellValue::text("inf")));
        assert!(!is_numeric_cell(&CellValue::text("1e400")));
        assert!(!is_numeric_cell(&CellValue::Number(f64::INFINITY)));
        assert!(!is_numeric_cell(&CellValue::text("abc")));
    }
}
