//! Read-only classified view over a dataset.

use crate::analyzers::inference::ColumnKind;
use crate::dataset::{Column, Dataset};

/// A dataset paired with the kind of every column.
///
/// The kinds are assigned once by the
/// [`ColumnClassifier`](crate::analyzers::inference::ColumnClassifier) and are
/// never changed afterwards; every analyzer dispatches on them instead of
/// probing cell values.
///
/// # Example
///
/// ```rust
/// use term_insight::analyzers::{ClassifiedDataset, ColumnClassifier, ColumnKind};
/// use term_insight::dataset::Dataset;
///
/// let dataset = Dataset::builder()
///     .numeric_column("x", [Some(1.0), Some(2.0)])
///     .text_column("label", [Some("a"), Some("b")])
///     .build()
///     .unwrap();
///
/// let kinds = ColumnClassifier::new().classify_all(&dataset);
/// let classified = ClassifiedDataset::new(&dataset, kinds);
///
/// assert_eq!(classified.columns_of_kind(ColumnKind::Numeric), vec![0]);
/// assert_eq!(classified.column(1).kind(), ColumnKind::Categorical);
/// ```
#[derive(Debug, Clone)]
pub struct ClassifiedDataset<'a> {
    dataset: &'a Dataset,
    kinds: Vec<ColumnKind>,
}

impl<'a> ClassifiedDataset<'a> {
    /// Pairs a dataset with its column kinds.
    ///
    /// # Panics
    ///
    /// Panics if the number of kinds differs from the number of columns.
    pub fn new(dataset: &'a Dataset, kinds: Vec<ColumnKind>) -> Self {
        assert_eq!(
            dataset.column_count(),
            kinds.len(),
            "one kind per column is required"
        );
        Self { dataset, kinds }
    }

    /// Returns the underlying dataset.
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Returns the kinds in column order.
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.dataset.row_count()
    }

    /// Returns the classified column at `index`.
    pub fn column(&self, index: usize) -> ClassifiedColumn<'a> {
        ClassifiedColumn {
            column: &self.dataset.columns()[index],
            kind: self.kinds[index],
        }
    }

    /// Iterates over all classified columns in order.
    pub fn columns(&self) -> impl Iterator<Item = ClassifiedColumn<'a>> + '_ {
        (0..self.kinds.len()).map(move |idx| self.column(idx))
    }

    /// Returns the indices of columns of the given kind.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<usize> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == kind)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Looks up a column index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dataset.column_index(name)
    }
}

/// A column together with its assigned kind.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedColumn<'a> {
    column: &'a Column,
    kind: ColumnKind,
}

impl<'a> ClassifiedColumn<'a> {
    /// Pairs a column with a kind directly.
    pub fn new(column: &'a Column, kind: ColumnKind) -> Self {
        Self { column, kind }
    }

    /// Returns the column name.
    pub fn name(&self) -> &'a str {
        self.column.name()
    }

    /// Returns the assigned kind.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Returns the underlying column.
    pub fn column(&self) -> &'a Column {
        self.column
    }
}
