//! Arrow ingestion for the analysis engine.
//!
//! Converts [`RecordBatch`]es into a [`Dataset`]:
//!
//! - integer, float and decimal columns become numeric cells,
//! - date and timestamp columns become ISO-8601 text, which the column
//!   classifier recognizes as temporal,
//! - everything else is cast to text,
//! - nulls (and NaN) become missing cells.
//!
//! Timestamps with a time zone are rendered in UTC.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow::array::{Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use term_insight::dataset::Dataset;
//!
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("amount", DataType::Float64, true),
//!     Field::new("region", DataType::Utf8, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Float64Array::from(vec![Some(1.5), None])),
//!         Arc::new(StringArray::from(vec![Some("north"), Some("south")])),
//!     ],
//! )
//! .unwrap();
//!
//! let dataset = Dataset::try_from(&batch).unwrap();
//! assert_eq!(dataset.row_count(), 2);
//! assert!(dataset.column("amount").unwrap().values()[1].is_missing());
//! ```

use arrow::array::{
    Array, ArrayRef, Date32Array, Float64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use tracing::{debug, instrument};

use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
use crate::dataset::{CellValue, Column, Dataset};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts one record batch into a dataset.
#[instrument(skip(batch), fields(columns = batch.num_columns(), rows = batch.num_rows()))]
pub fn record_batch_to_dataset(batch: &RecordBatch) -> AnalyzerResult<Dataset> {
    let schema = batch.schema();
    let columns = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| {
            let values = convert_array(array)?;
            debug!(
                column = field.name().as_str(),
                data_type = %field.data_type(),
                "Converted Arrow column"
            );
            Ok(Column::new(field.name().clone(), values))
        })
        .collect::<AnalyzerResult<Vec<_>>>()?;

    Dataset::new(columns)
}

/// Concatenates record batches sharing one schema and converts the result.
pub fn record_batches_to_dataset(batches: &[RecordBatch]) -> AnalyzerResult<Dataset> {
    let first = batches
        .first()
        .ok_or_else(|| AnalyzerError::invalid_config("at least one record batch is required"))?;
    let combined = concat_batches(&first.schema(), batches)?;
    record_batch_to_dataset(&combined)
}

impl TryFrom<&RecordBatch> for Dataset {
    type Error = AnalyzerError;

    fn try_from(batch: &RecordBatch) -> AnalyzerResult<Self> {
        record_batch_to_dataset(batch)
    }
}

fn convert_array(array: &ArrayRef) -> AnalyzerResult<Vec<CellValue>> {
    match array.data_type() {
        DataType::Null => Ok(vec![CellValue::Missing; array.len()]),
        data_type if data_type.is_numeric() => {
            let floats = cast(array, &DataType::Float64)?;
            let floats = downcast::<Float64Array>(&floats, "Float64")?;
            Ok(collect_cells(floats, |i| CellValue::number(floats.value(i))))
        }
        DataType::Date32 | DataType::Date64 => {
            let dates = cast(array, &DataType::Date32)?;
            let dates = downcast::<Date32Array>(&dates, "Date32")?;
            Ok(collect_cells(dates, |i| {
                dates.value_as_date(i).map_or(CellValue::Missing, |d| {
                    CellValue::text(d.format(DATE_FORMAT).to_string())
                })
            }))
        }
        DataType::Timestamp(_, tz) => {
            let micros = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, tz.clone()))?;
            let micros = downcast::<TimestampMicrosecondArray>(&micros, "Timestamp(Microsecond)")?;
            Ok(collect_cells(micros, |i| {
                DateTime::from_timestamp_micros(micros.value(i)).map_or(CellValue::Missing, |dt| {
                    CellValue::text(dt.naive_utc().format(TIMESTAMP_FORMAT).to_string())
                })
            }))
        }
        _ => {
            let text = cast(array, &DataType::Utf8)?;
            let text = downcast::<StringArray>(&text, "Utf8")?;
            Ok(collect_cells(text, |i| CellValue::text(text.value(i))))
        }
    }
}

fn collect_cells<A: Array>(array: &A, cell: impl Fn(usize) -> CellValue) -> Vec<CellValue> {
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                CellValue::Missing
            } else {
                cell(i)
            }
        })
        .collect()
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, expected: &str) -> AnalyzerResult<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        AnalyzerError::execution(format!(
            "expected {expected} array after cast, found {}",
            array.data_type()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Date32Array, Int64Array, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema};

    fn batch(fields: Vec<Field>, arrays: Vec<ArrayRef>) -> RecordBatch {
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    #[test]
    fn test_numeric_columns_become_numbers() {
        let batch = batch(
            vec![
                Field::new("count", DataType::Int64, true),
                Field::new("ratio", DataType::Float64, true),
            ],
            vec![
                Arc::new(Int64Array::from(vec![Some(3), None, Some(-1)])),
                Arc::new(Float64Array::from(vec![Some(0.5), Some(f64::NAN), None])),
            ],
        );

        let dataset = record_batch_to_dataset(&batch).unwrap();
        assert_eq!(
            dataset.column("count").unwrap().values(),
            &[CellValue::Number(3.0), CellValue::Missing, CellValue::Number(-1.0)]
        );
        assert_eq!(
            dataset.column("ratio").unwrap().values(),
            &[CellValue::Number(0.5), CellValue::Missing, CellValue::Missing]
        );
    }

    #[test]
    fn test_temporal_columns_become_iso_text() {
        let batch = batch(
            vec![
                Field::new("day", DataType::Date32, true),
                Field::new("at", DataType::Timestamp(TimeUnit::Second, None), true),
            ],
            vec![
                // 19723 days after the epoch is 2024-01-01
                Arc::new(Date32Array::from(vec![Some(19_723), None])),
                Arc::new(TimestampSecondArray::from(vec![Some(1_704_103_200), None])),
            ],
        );

        let dataset = record_batch_to_dataset(&batch).unwrap();
        assert_eq!(
            dataset.column("day").unwrap().values()[0],
            CellValue::text("2024-01-01")
        );
        assert_eq!(
            dataset.column("at").unwrap().values()[0],
            CellValue::text("2024-01-01 10:00:00")
        );
        assert!(dataset.column("at").unwrap().values()[1].is_missing());
    }

    #[test]
    fn test_other_columns_become_text() {
        let batch = batch(
            vec![Field::new("flag", DataType::Boolean, true)],
            vec![Arc::new(BooleanArray::from(vec![Some(true), None]))],
        );

        let dataset = record_batch_to_dataset(&batch).unwrap();
        assert_eq!(
            dataset.column("flag").unwrap().values(),
            &[CellValue::text("true"), CellValue::Missing]
        );
    }

    #[test]
    fn test_multiple_batches_are_concatenated() {
        let make = |values: Vec<i64>| {
            batch(
                vec![Field::new("n", DataType::Int64, false)],
                vec![Arc::new(Int64Array::from(values))],
            )
        };

        let dataset = record_batches_to_dataset(&[make(vec![1, 2]), make(vec![3])]).unwrap();
        assert_eq!(dataset.row_count(), 3);

        assert!(matches!(
            record_batches_to_dataset(&[]),
            Err(AnalyzerError::InvalidConfiguration(_))
        ));
    }
}
