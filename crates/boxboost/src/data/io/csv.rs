//! CSV feature table loader built on Arrow's CSV reader.
//!
//! The column types are inferred from the file. Every column must be numeric
//! (integer or float); values are widened to `f64` and empty cells become NaN.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float64Array};
use arrow::compute::cast;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;

use super::error::DatasetLoadError;
use crate::data::FeatureTable;

/// CSV parsing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter. Default: `b','`.
    pub delimiter: u8,
    /// Drop the first column, typically an index written alongside the data.
    /// Default: `false`.
    pub drop_first_column: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            drop_first_column: false,
        }
    }
}

/// Load a CSV file with a header row into a [`FeatureTable`].
pub fn load_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<FeatureTable, DatasetLoadError> {
    let file = File::open(path)?;
    read_csv(BufReader::new(file), options)
}

/// Read CSV data with a header row into a [`FeatureTable`].
pub fn read_csv<R: Read + Seek>(mut reader: R, options: &CsvOptions) -> Result<FeatureTable, DatasetLoadError> {
    let format = Format::default()
        .with_header(true)
        .with_delimiter(options.delimiter);
    let (schema, _) = format.infer_schema(&mut reader, None)?;
    reader.seek(SeekFrom::Start(0))?;

    let schema = Arc::new(schema);
    let csv_reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_delimiter(options.delimiter)
        .build(reader)?;

    let batches = csv_reader.collect::<Result<Vec<RecordBatch>, _>>()?;
    batches_to_table(&schema, &batches, options)
}

fn batches_to_table(
    schema: &Schema,
    batches: &[RecordBatch],
    options: &CsvOptions,
) -> Result<FeatureTable, DatasetLoadError> {
    let skip = usize::from(options.drop_first_column);
    let mut table = FeatureTable::default();

    for (idx, field) in schema.fields().iter().enumerate().skip(skip) {
        let values = extract_f64_column(batches, idx, field.name(), field.data_type())?;
        table.push_column(field.name().clone(), values)?;
    }
    Ok(table)
}

fn extract_f64_column(
    batches: &[RecordBatch],
    idx: usize,
    name: &str,
    data_type: &DataType,
) -> Result<Vec<f64>, DatasetLoadError> {
    if !(data_type.is_numeric() || matches!(data_type, DataType::Null)) {
        return Err(DatasetLoadError::UnsupportedType {
            column: name.to_string(),
            got: format!("{data_type:?}"),
        });
    }

    let mut values = Vec::new();
    for batch in batches {
        let widened = cast(batch.column(idx), &DataType::Float64)?;
        let arr = widened
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| DatasetLoadError::UnsupportedType {
                column: name.to_string(),
                got: format!("{:?}", widened.data_type()),
            })?;
        values.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_int_and_float_columns() {
        let data = "frame,xmin,conf\n1,0,0.5\n1,5,0.25\n2,3,\n";
        let table = read_csv(Cursor::new(data), &CsvOptions::default()).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column("frame").unwrap(), &[1.0, 1.0, 2.0]);
        assert_eq!(table.column("xmin").unwrap(), &[0.0, 5.0, 3.0]);
        let conf = table.column("conf").unwrap();
        assert_eq!(conf[1], 0.25);
        assert!(conf[2].is_nan());
    }

    #[test]
    fn drops_leading_index_column() {
        let data = ",frame,cls\n0,1,0\n1,1,1\n";
        let options = CsvOptions {
            drop_first_column: true,
            ..Default::default()
        };
        let table = read_csv(Cursor::new(data), &options).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["frame", "cls"]);
    }

    #[test]
    fn rejects_text_columns() {
        let data = "frame,label\n1,car\n";
        let err = read_csv(Cursor::new(data), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetLoadError::UnsupportedType { ref column, .. } if column == "label"));
    }
}
