//! Parquet reader.
//!
//! Column kinds come from the Arrow schema, so a Parquet file never needs
//! type inference: integer kinds are Integer, floating and decimal kinds are
//! Float, strings and dictionaries of strings are String.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::dataset::{Dataset, Value};
use crate::error::{DashboardError, Result};
use crate::schema::{ColumnSchema, ColumnType, TableSchema};

/// Map an Arrow type onto a dashboard column type.
pub fn column_type_for(data_type: &DataType) -> ColumnType {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Integer,
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => ColumnType::Float,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnType::String,
        DataType::Dictionary(_, value) => match value.as_ref() {
            DataType::Utf8 | DataType::LargeUtf8 => ColumnType::String,
            other => column_type_for(other),
        },
        DataType::Boolean => ColumnType::Boolean,
        DataType::Date32 | DataType::Date64 => ColumnType::Date,
        DataType::Timestamp(_, _) => ColumnType::DateTime,
        _ => ColumnType::Unknown,
    }
}

/// Read a Parquet buffer into a dataset.
pub fn read_parquet(contents: &[u8]) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(contents))?;
    let arrow_schema = builder.schema().clone();

    let columns: Vec<ColumnSchema> = arrow_schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            ColumnSchema::new(f.name().clone(), i, column_type_for(f.data_type()))
                .with_nullable(f.is_nullable())
        })
        .collect();

    if columns.is_empty() {
        return Err(DashboardError::Schema("No columns found".to_string()));
    }

    let reader = builder.build()?;
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for batch in reader {
        let batch = batch.map_err(|e| DashboardError::Unreadable(e.to_string()))?;
        let converted: Vec<Vec<Value>> = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(array, col)| column_values(array, col))
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            rows.push(converted.iter().map(|c| c[row].clone()).collect());
        }
    }

    if rows.is_empty() {
        return Err(DashboardError::Schema("No data rows found".to_string()));
    }

    Dataset::new(TableSchema::with_columns(columns), rows)
}

/// Convert one Arrow column into typed cells by casting to a canonical type.
///
/// Columns with no cast to text are rendered with Arrow's display formatter.
fn column_values(array: &ArrayRef, col: &ColumnSchema) -> Result<Vec<Value>> {
    let cast_err = |e: arrow::error::ArrowError| {
        DashboardError::Unreadable(format!("column '{}': {e}", col.name))
    };

    let values = match col.column_type {
        ColumnType::Integer => {
            let casted = cast(array, &DataType::Int64).map_err(cast_err)?;
            let ints = casted.as_primitive::<Int64Type>();
            (0..ints.len())
                .map(|i| {
                    if ints.is_null(i) {
                        Value::Null
                    } else {
                        Value::Integer(ints.value(i))
                    }
                })
                .collect()
        }
        ColumnType::Float => {
            let casted = cast(array, &DataType::Float64).map_err(cast_err)?;
            let floats = casted.as_primitive::<Float64Type>();
            (0..floats.len())
                .map(|i| {
                    if floats.is_null(i) {
                        Value::Null
                    } else {
                        Value::float(floats.value(i))
                    }
                })
                .collect()
        }
        ColumnType::Boolean => {
            let bools = array.as_boolean();
            (0..bools.len())
                .map(|i| {
                    if bools.is_null(i) {
                        Value::Null
                    } else {
                        Value::Boolean(bools.value(i))
                    }
                })
                .collect()
        }
        ColumnType::String | ColumnType::Date | ColumnType::DateTime | ColumnType::Unknown
            if !can_cast_types(array.data_type(), &DataType::Utf8) =>
        {
            // Nested kinds (struct, list, map) have no string cast
            let formatter =
                ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default()).map_err(cast_err)?;
            (0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
        ColumnType::String | ColumnType::Date | ColumnType::DateTime | ColumnType::Unknown => {
            let casted: Arc<dyn Array> = cast(array, &DataType::Utf8).map_err(cast_err)?;
            let strings = casted.as_string::<i32>();
            (0..strings.len())
                .map(|i| {
                    if strings.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(strings.value(i).to_string())
                    }
                })
                .collect()
        }
    };

    Ok(values)
}
