//! In-memory collections (Arrow record batches)
//!
//! A [`Collection`] is one museum dataset: a name plus append-only Arrow
//! record batches that share one schema. Column names are kept exactly as
//! the source spells them; semantic alignment between datasets happens in
//! [`crate::config::ColumnRoles`], never here.
//!
//! Collections are read-only once loaded. The only write operation is
//! [`Collection::append_batch`], used while loading.

mod cell;
mod record;

pub use cell::Cell;
pub use record::{Record, Scalar};

pub(crate) use cell::ColumnReader;

use crate::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;

/// A named dataset held as Arrow record batches
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Collection {
    /// Create an empty collection with the given schema
    #[must_use]
    pub fn new(name: impl Into<String>, schema: SchemaRef) -> Self {
        Self {
            name: name.into(),
            schema,
            batches: Vec::new(),
        }
    }

    /// Create an empty collection whose columns are all nullable text
    #[must_use]
    pub fn with_text_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        let fields: Vec<Field> = columns
            .iter()
            .map(|column| Field::new(*column, DataType::Utf8, true))
            .collect();
        Self::new(name, Arc::new(Schema::new(fields)))
    }

    /// Create a collection from existing batches
    ///
    /// # Errors
    ///
    /// Returns error if `batches` is empty or the batches disagree on schema
    pub fn from_batches(name: impl Into<String>, batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = batches
            .first()
            .map(RecordBatch::schema)
            .ok_or_else(|| Error::InvalidInput("At least one record batch required".to_string()))?;

        let mut collection = Self::new(name, schema);
        for batch in batches {
            collection.append_batch(batch)?;
        }
        Ok(collection)
    }

    /// Build a collection from row records
    ///
    /// Columns appear in first-seen order. A column whose present values are
    /// all numbers becomes `Float64`; any other column becomes text, with
    /// numbers rendered as text. Fields a record does not carry are absent.
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the assembled batch
    pub fn from_records(name: impl Into<String>, records: &[Record]) -> Result<Self> {
        let mut columns: Vec<&str> = Vec::new();
        for record in records {
            for (column, _) in record.iter() {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }

        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
        for column in columns {
            let values: Vec<&Scalar> = records.iter().map(|record| record.get(column)).collect();
            let numeric = values
                .iter()
                .all(|value| matches!(value, Scalar::Number(_) | Scalar::Absent));

            if numeric {
                let array: Float64Array = values
                    .iter()
                    .map(|value| match value {
                        Scalar::Number(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                fields.push(Field::new(column, DataType::Float64, true));
                arrays.push(Arc::new(array));
            } else {
                let array: StringArray = values
                    .iter()
                    .map(|value| match value {
                        Scalar::Number(v) => Some(v.to_string()),
                        Scalar::Text(s) => Some(s.clone()),
                        Scalar::Absent => None,
                    })
                    .collect();
                fields.push(Field::new(column, DataType::Utf8, true));
                arrays.push(Arc::new(array));
            }
        }

        let schema = Arc::new(Schema::new(fields));
        let options = RecordBatchOptions::new().with_row_count(Some(records.len()));
        let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)?;

        let mut collection = Self::new(name, schema);
        collection.append_batch(batch)?;
        Ok(collection)
    }

    /// Append a batch (the only write operation)
    ///
    /// # Errors
    ///
    /// Returns error if the batch schema does not match the collection schema
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if batch.schema() != self.schema {
            return Err(Error::InvalidInput(format!(
                "Schema mismatch in collection '{}': expected {:?}, got {:?}",
                self.name,
                self.schema,
                batch.schema()
            )));
        }

        if batch.num_rows() > 0 {
            self.batches.push(batch);
        }
        Ok(())
    }

    /// Collection name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared schema of all batches
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// All record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across all batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Whether the collection holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Column names in schema order
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .collect()
    }

    /// Whether the schema has a column called `column`
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.schema.index_of(column).is_ok()
    }

    /// Index of `column` in the schema
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if the column does not exist
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.schema
            .index_of(column)
            .map_err(|_| Error::missing_column(&self.name, column))
    }

    /// Iterate over every cell of `column`, in row order
    ///
    /// # Errors
    ///
    /// Returns error if the column does not exist or has an unsupported type
    pub fn cells(&self, column: &str) -> Result<impl Iterator<Item = Cell<'_>> + '_> {
        let index = self.column_index(column)?;
        let readers = self
            .batches
            .iter()
            .map(|batch| ColumnReader::new(batch.column(index)))
            .collect::<Result<Vec<_>>>()?;

        Ok(readers
            .into_iter()
            .flat_map(|reader| (0..reader.len()).map(move |row| reader.cell(row))))
    }

    /// Reconstruct the record at `row`, or `None` if out of range
    ///
    /// # Errors
    ///
    /// Returns error if a column has an unsupported type
    pub fn record(&self, row: usize) -> Result<Option<Record>> {
        let mut offset = row;
        for batch in &self.batches {
            if offset >= batch.num_rows() {
                offset -= batch.num_rows();
                continue;
            }

            let mut record = Record::new();
            for (field, column) in self.schema.fields().iter().zip(batch.columns()) {
                let value = match ColumnReader::new(column)?.cell(offset) {
                    Cell::Text(s) => Scalar::Text(s.to_string()),
                    #[allow(clippy::cast_precision_loss)]
                    Cell::Int(v) => Scalar::Number(v as f64),
                    Cell::Float(v) => Scalar::Number(v),
                    Cell::Date(d) => Scalar::Text(d.to_string()),
                    Cell::Absent => Scalar::Absent,
                };
                record.set(field.name().as_str(), value);
            }
            return Ok(Some(record));
        }
        Ok(None)
    }
}
