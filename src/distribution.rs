//! Category and bin distributions
//!
//! A [`Distribution`] is a `(label, count)` sequence ordered by count
//! descending, ties kept in first-encountered order. Absent values never
//! reach a distribution: callers only feed present labels to the
//! [`GroupCounter`].
//!
//! Labels are `String` for categorical columns and `i64` bin keys for
//! temporal histograms.

use crate::topk::select_top_k;
use crate::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Reverse;
use std::hash::Hash;
use std::sync::Arc;

/// One `(label, count)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry<L> {
    /// Category label or bin key
    pub label: L,
    /// Number of rows with this label
    pub count: usize,
}

/// Counts per label, count descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Distribution<L = String> {
    entries: Vec<DistributionEntry<L>>,
}

impl<L> Default for Distribution<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<L> Distribution<L> {
    /// Distribution with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries in order
    #[must_use]
    pub fn entries(&self) -> &[DistributionEntry<L>] {
        &self.entries
    }

    /// Iterate over entries
    pub fn iter(&self) -> std::slice::Iter<'_, DistributionEntry<L>> {
        self.entries.iter()
    }

    /// Number of distinct labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts (the non-null row count of the grouped column)
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    /// Keep only the first `n` entries; never reorders
    #[must_use]
    pub fn top_n(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Express counts as fractions of the total
    #[must_use]
    pub fn normalized(&self) -> NormalizedDistribution<L>
    where
        L: Clone,
    {
        let total = self.total();
        #[allow(clippy::cast_precision_loss)]
        let entries = self
            .entries
            .iter()
            .map(|entry| NormalizedEntry {
                label: entry.label.clone(),
                count: entry.count,
                fraction: entry.count as f64 / total as f64,
            })
            .collect();
        NormalizedDistribution { entries, total }
    }
}

impl<L: PartialEq> Distribution<L> {
    /// Count for `label`, if present
    #[must_use]
    pub fn count_of(&self, label: &L) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.label == *label)
            .map(|entry| entry.count)
    }
}

impl Distribution<String> {
    /// Count for a string label, if present
    #[must_use]
    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.count)
    }
}

impl<L: Ord> Distribution<L> {
    /// Re-order entries by label ascending (histogram axis order)
    #[must_use]
    pub fn into_label_order(mut self) -> Self {
        self.entries.sort_by(|a, b| a.label.cmp(&b.label));
        self
    }
}

impl<'a, L> IntoIterator for &'a Distribution<L> {
    type Item = &'a DistributionEntry<L>;
    type IntoIter = std::slice::Iter<'a, DistributionEntry<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One `(label, count, fraction)` triple
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEntry<L> {
    /// Category label
    pub label: L,
    /// Number of rows with this label
    pub count: usize,
    /// `count / total`, in `[0, 1]`
    pub fraction: f64,
}

/// Counts with their share of the non-null total
///
/// Fractions always use the total over all categories, so a truncated
/// distribution sums to less than 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDistribution<L = String> {
    entries: Vec<NormalizedEntry<L>>,
    total: usize,
}

impl<L> NormalizedDistribution<L> {
    /// Entries in order (count descending)
    #[must_use]
    pub fn entries(&self) -> &[NormalizedEntry<L>] {
        &self.entries
    }

    /// Non-null rows the fractions are relative to
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the fractions of all retained entries
    #[must_use]
    pub fn fraction_sum(&self) -> f64 {
        self.entries.iter().map(|entry| entry.fraction).sum()
    }

    /// Keep only the first `n` entries; fractions are unchanged
    #[must_use]
    pub fn top_n(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }
}

/// Counts occurrences per label, remembering first-encountered order
#[derive(Debug)]
pub struct GroupCounter<L> {
    positions: FxHashMap<L, usize>,
    groups: Vec<DistributionEntry<L>>,
}

impl<L> Default for GroupCounter<L> {
    fn default() -> Self {
        Self {
            positions: FxHashMap::default(),
            groups: Vec::new(),
        }
    }
}

impl<L: Eq + Hash + Clone> GroupCounter<L> {
    /// Create an empty counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `label`
    pub fn observe(&mut self, label: L) {
        if let Some(&position) = self.positions.get(&label) {
            if let Some(group) = self.groups.get_mut(position) {
                group.count += 1;
            }
            return;
        }
        self.positions.insert(label.clone(), self.groups.len());
        self.groups.push(DistributionEntry { label, count: 1 });
    }

    /// Number of distinct labels seen so far
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.groups.len()
    }

    /// Produce the sorted distribution, optionally limited to `top_n`
    ///
    /// # Errors
    ///
    /// Returns error if `top_n` is `Some(0)`
    pub fn finish(self, top_n: Option<usize>) -> Result<Distribution<L>> {
        let k = match top_n {
            Some(0) => {
                return Err(Error::InvalidInput(
                    "top_n must be greater than 0".to_string(),
                ))
            }
            Some(k) => k,
            None => self.groups.len().max(1),
        };

        let ranked: Vec<(usize, DistributionEntry<L>)> =
            self.groups.into_iter().enumerate().collect();
        let entries = select_top_k(ranked, k, |(seen, entry)| (entry.count, Reverse(*seen)))?
            .into_iter()
            .map(|(_, entry)| entry)
            .collect();

        Ok(Distribution { entries })
    }
}

/// Label types that can be exported as an Arrow column
pub trait DistributionLabel {
    /// Arrow type of the `label` column
    fn data_type() -> DataType;

    /// Build the `label` column
    fn to_array(labels: &[&Self]) -> ArrayRef;
}

impl DistributionLabel for String {
    fn data_type() -> DataType {
        DataType::Utf8
    }

    fn to_array(labels: &[&Self]) -> ArrayRef {
        Arc::new(StringArray::from_iter_values(labels.iter().map(|s| s.as_str())))
    }
}

impl DistributionLabel for i64 {
    fn data_type() -> DataType {
        DataType::Int64
    }

    fn to_array(labels: &[&Self]) -> ArrayRef {
        Arc::new(Int64Array::from_iter_values(labels.iter().map(|v| **v)))
    }
}

fn count_array(counts: impl Iterator<Item = usize>) -> ArrayRef {
    Arc::new(UInt64Array::from_iter_values(counts.map(|c| c as u64)))
}

impl<L: DistributionLabel> Distribution<L> {
    /// Export as a batch with columns `label`, `count`
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let labels: Vec<&L> = self.entries.iter().map(|entry| &entry.label).collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("label", L::data_type(), false),
            Field::new("count", DataType::UInt64, false),
        ]));
        Ok(RecordBatch::try_new(
            schema,
            vec![
                L::to_array(&labels),
                count_array(self.entries.iter().map(|entry| entry.count)),
            ],
        )?)
    }
}

impl<L: DistributionLabel> NormalizedDistribution<L> {
    /// Export as a batch with columns `label`, `count`, `fraction`
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let labels: Vec<&L> = self.entries.iter().map(|entry| &entry.label).collect();
        let fractions = Float64Array::from_iter_values(self.entries.iter().map(|e| e.fraction));
        let schema = Arc::new(Schema::new(vec![
            Field::new("label", L::data_type(), false),
            Field::new("count", DataType::UInt64, false),
            Field::new("fraction", DataType::Float64, false),
        ]));
        Ok(RecordBatch::try_new(
            schema,
            vec![
                L::to_array(&labels),
                count_array(self.entries.iter().map(|entry| entry.count)),
                Arc::new(fractions),
            ],
        )?)
    }
}
