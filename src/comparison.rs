//! Cross-collection comparison table
//!
//! Rows keep the order the caller supplied them in; ordering and log scales
//! are the presentation layer's job.
//!
//! Counts are per collection. There is no cross-museum deduplication: an
//! artist held by two museums is counted once in each, so `distinct_count`
//! values must not be summed into a global artist count.

use crate::summary::SummaryRow;
use crate::{Error, Result};
use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::sync::Arc;

/// One summary row per collection, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonTable {
    rows: Vec<SummaryRow>,
}

impl ComparisonTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, keeping their order
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCollection`] if two rows share a name
    pub fn from_rows(rows: impl IntoIterator<Item = SummaryRow>) -> Result<Self> {
        let mut table = Self::new();
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    /// Append a row
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCollection`] if the name is already present
    pub fn push(&mut self, row: SummaryRow) -> Result<()> {
        if self.get(&row.collection).is_some() {
            return Err(Error::DuplicateCollection(row.collection));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Rows in insertion order
    #[must_use]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Number of collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for `collection`
    #[must_use]
    pub fn get(&self, collection: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.collection == collection)
    }

    /// `(collection, total_count)` pairs (artworks, or artists for an
    /// artist dataset)
    #[must_use]
    pub fn artwork_counts(&self) -> Vec<(&str, usize)> {
        self.rows
            .iter()
            .map(|row| (row.collection.as_str(), row.total_count))
            .collect()
    }

    /// `(collection, distinct_count)` pairs
    #[must_use]
    pub fn artist_counts(&self) -> Vec<(&str, usize)> {
        self.rows
            .iter()
            .map(|row| (row.collection.as_str(), row.distinct_count))
            .collect()
    }

    /// Export as a batch with columns `collection`, `total_count`,
    /// `distinct_count`, `earliest`, `latest`
    ///
    /// Dates are rendered as text (`1500`, `1996-04-09`); undefined dates
    /// are null.
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("collection", DataType::Utf8, false),
            Field::new("total_count", DataType::UInt64, false),
            Field::new("distinct_count", DataType::UInt64, false),
            Field::new("earliest", DataType::Utf8, true),
            Field::new("latest", DataType::Utf8, true),
        ]));

        let collections: ArrayRef = Arc::new(StringArray::from_iter_values(
            self.rows.iter().map(|row| row.collection.as_str()),
        ));
        let totals: ArrayRef = Arc::new(UInt64Array::from_iter_values(
            self.rows.iter().map(|row| row.total_count as u64),
        ));
        let distincts: ArrayRef = Arc::new(UInt64Array::from_iter_values(
            self.rows.iter().map(|row| row.distinct_count as u64),
        ));
        let earliest: ArrayRef = Arc::new(StringArray::from_iter(
            self.rows.iter().map(|row| row.earliest.map(|v| v.to_string())),
        ));
        let latest: ArrayRef = Arc::new(StringArray::from_iter(
            self.rows.iter().map(|row| row.latest.map(|v| v.to_string())),
        ));

        Ok(RecordBatch::try_new(
            schema,
            vec![collections, totals, distincts, earliest, latest],
        )?)
    }
}

impl<'a> IntoIterator for &'a ComparisonTable {
    type Item = &'a SummaryRow;
    type IntoIter = std::slice::Iter<'a, SummaryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
