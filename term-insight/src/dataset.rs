//! In-memory tabular data model consumed by the analyzers.
//!
//! A [`Dataset`] is an ordered list of named [`Column`]s of equal length. Every
//! cell is tri-state: a number, a piece of text, or missing. The dataset is
//! validated once at construction and is never mutated by the analyzers.
//!
//! # Example
//!
//! ```rust
//! use term_insight::dataset::{CellValue, Dataset};
//!
//! let dataset = Dataset::builder()
//!     .numeric_column("price", [Some(9.5), None, Some(12.0)])
//!     .text_column("region", [Some("north"), Some("south"), Some("")])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(dataset.row_count(), 3);
//! assert_eq!(dataset.column("region").unwrap().values()[2], CellValue::Missing);
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};

/// A single tri-state cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// A present numeric value.
    Number(f64),
    /// A present text value.
    Text(String),
    /// A missing value.
    Missing,
}

impl CellValue {
    /// Creates a numeric cell, normalizing NaN and infinities to
    /// [`CellValue::Missing`].
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Missing
        }
    }

    /// Creates a text cell, normalizing blank text to [`CellValue::Missing`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(value)
        }
    }

    /// Checks if the cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns the numeric interpretation of the cell, parsing text if needed.
    ///
    /// Only finite values count: text such as `"1e400"` or `"inf"` has no
    /// numeric interpretation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Missing => None,
        }
        .filter(|v| v.is_finite())
    }

    /// Returns the text of a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the grouping key used for categorical analysis.
    pub fn category_key(&self) -> Option<String> {
        match self {
            Self::Number(v) => Some(v.to_string()),
            Self::Text(s) => Some(s.trim().to_string()),
            Self::Missing => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Missing => write!(f, "<missing>"),
        }
    }
}

/// A named column of cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<CellValue>,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cell values in row order.
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Iterates over the numeric values with their row indices, skipping
    /// missing and non-numeric cells.
    pub fn numeric_values(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.as_f64().map(|n| (idx, n)))
    }
}

/// An immutable, validated table of equal-length columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Creates a dataset from columns, enforcing unique names and equal lengths.
    ///
    /// A dataset without columns is valid here; the analysis engine rejects it
    /// when a run starts.
    pub fn new(columns: Vec<Column>) -> AnalyzerResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());

        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(AnalyzerError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != row_count {
                return Err(AnalyzerError::ColumnLengthMismatch {
                    column: column.name().to_string(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Creates a new builder for Dataset.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Returns the number of rows shared by every column.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Builder for Dataset.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Column>,
}

impl DatasetBuilder {
    /// Adds a column of arbitrary cells.
    pub fn column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.columns.push(Column::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Adds a numeric column; `None` becomes a missing cell.
    pub fn numeric_column<I>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        self.column(name, values)
    }

    /// Adds a text column; `None` and blank strings become missing cells.
    pub fn text_column<'a, I>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        self.column(name, values)
    }

    /// Builds and validates the dataset.
    pub fn build(self) -> AnalyzerResult<Dataset> {
        Dataset::new(self.columns)
    }
}
