//! Dataset loader (CSV / Parquet to Arrow)
//!
//! Delimited text is read with every column as nullable `Utf8`: no schema
//! inference, no coercion. Empty fields become nulls. Numbers and dates are
//! parsed later, by the summarizer, which is what lets datasets with
//! different date formats share one pipeline.
//!
//! Parquet files keep their stored column types.

use crate::collection::Collection;
use crate::config::LoadOptions;
use crate::{Error, Result};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// Reads dataset files into collections
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    /// Create a loader with the given options
    #[must_use]
    pub const fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a dataset; `.parquet` files are read as Parquet, anything else
    /// as delimited text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if the file is missing, unreadable or not a
    /// table, and [`Error::MissingColumn`] if an expected column is absent
    pub fn load<P: AsRef<Path>>(&self, name: &str, path: P) -> Result<Collection> {
        let path = path.as_ref();
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        let collection = if is_parquet {
            load_parquet(name, path)?
        } else {
            load_csv(name, path, &self.options)?
        };

        for column in &self.options.expected_columns {
            collection.column_index(column)?;
        }

        tracing::info!(
            collection = name,
            path = %path.display(),
            rows = collection.num_rows(),
            columns = collection.column_names().len(),
            "loaded collection"
        );
        Ok(collection)
    }
}

/// Load delimited text with a header row; all columns as nullable text
///
/// # Errors
///
/// Returns [`Error::Load`] if the file cannot be opened or parsed
pub fn load_csv<P: AsRef<Path>>(name: &str, path: P, options: &LoadOptions) -> Result<Collection> {
    let path = path.as_ref();
    let delimiter = options.delimiter_byte()?;

    let mut file = File::open(path)
        .map_err(|e| Error::load(path, format!("Failed to open file: {e}")))?;

    // Header only: zero records are sampled, column types are discarded
    let format = Format::default().with_header(true).with_delimiter(delimiter);
    let (header, _) = format
        .infer_schema(&mut file, Some(0))
        .map_err(|e| Error::load(path, format!("Failed to read header: {e}")))?;
    if header.fields().is_empty() {
        return Err(Error::load(path, "No header row"));
    }

    let fields: Vec<Field> = header
        .fields()
        .iter()
        .map(|field| Field::new(field.name(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    file.seek(SeekFrom::Start(0))
        .map_err(|e| Error::load(path, format!("Failed to rewind file: {e}")))?;

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(options.batch_size.max(1))
        .build(file)
        .map_err(|e| Error::load(path, format!("Failed to create CSV reader: {e}")))?;

    let mut collection = Collection::new(name, schema);
    for batch in reader {
        let batch = batch.map_err(|e| Error::load(path, format!("Failed to parse CSV: {e}")))?;
        collection.append_batch(batch)?;
    }
    Ok(collection)
}

/// Load a Parquet file, keeping stored column types
///
/// # Errors
///
/// Returns [`Error::Load`] if the file cannot be opened or parsed
pub fn load_parquet<P: AsRef<Path>>(name: &str, path: P) -> Result<Collection> {
    use arrow::record_batch::RecordBatchReader;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::load(path, format!("Failed to open Parquet file: {e}")))?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::load(path, format!("Failed to parse Parquet file: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| Error::load(path, format!("Failed to create Parquet reader: {e}")))?;
    // Batch schema, without the file-level metadata the builder carries
    let schema = reader.schema();

    let mut collection = Collection::new(name, schema);
    for batch in reader {
        let batch =
            batch.map_err(|e| Error::load(path, format!("Failed to read record batch: {e}")))?;
        collection.append_batch(batch)?;
    }
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Cell;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv_keeps_header_names() {
        let file = write_csv("Artist Display Name,Object Begin Date\nMonet,1870\n,\n");
        let collection = Loader::default().load("Met", file.path()).unwrap();

        assert_eq!(collection.name(), "Met");
        assert_eq!(
            collection.column_names(),
            vec!["Artist Display Name", "Object Begin Date"]
        );
        assert_eq!(collection.num_rows(), 2);

        let cells: Vec<_> = collection.cells("Object Begin Date").unwrap().collect();
        assert_eq!(cells, vec![Cell::Text("1870"), Cell::Absent]);
    }

    #[test]
    fn test_numbers_stay_text() {
        let file = write_csv("ConstituentID\n1\n2\n");
        let collection = Loader::default().load("MoMA", file.path()).unwrap();
        assert_eq!(collection.schema().field(0).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_custom_delimiter_and_batches() {
        let file = write_csv("a;b\n1;x\n2;y\n3;z\n");
        let options = LoadOptions {
            delimiter: ';',
            batch_size: 2,
            ..LoadOptions::default()
        };
        let collection = Loader::new(options).load("semi", file.path()).unwrap();
        assert_eq!(collection.num_rows(), 3);
        assert_eq!(collection.batches().len(), 2);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = Loader::default().load("ghost", "/nonexistent/ghost.csv");
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_expected_column_missing() {
        let file = write_csv("department\nPrints\n");
        let options = LoadOptions {
            expected_columns: vec!["Department".to_string()],
            ..LoadOptions::default()
        };
        let result = Loader::new(options).load("Cleveland", file.path());
        assert!(matches!(result, Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn test_ragged_rows_are_load_error() {
        let file = write_csv("a,b\n1,2\n3\n");
        let result = Loader::default().load("ragged", file.path());
        assert!(matches!(result, Err(Error::Load { .. })));
    }
}
