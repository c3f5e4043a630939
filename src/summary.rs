//! Per-collection summarizer
//!
//! One generic [`Summarizer`] serves all four datasets; what differs between
//! them is only the [`ColumnRoles`] mapping and the requested distributions.
//!
//! Absent values are filtered before every aggregate. An aggregate over an
//! all-absent column is reported as `None` plus an [`EmptyAggregateWarning`],
//! never as zero: a date range of `[0, 0]` would be indistinguishable from
//! real data.

use crate::collection::Collection;
use crate::config::{BinOrder, ColumnRoles, DistributionKind, DistributionRequest};
use crate::distribution::{Distribution, GroupCounter, NormalizedDistribution};
use crate::temporal::{bin_year, check_bin_width, TemporalValue};
use crate::Result;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

/// Scalar aggregates for one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    /// Collection name
    pub collection: String,
    /// All rows, whatever their null fields
    pub total_count: usize,
    /// Distinct non-null identity values
    pub distinct_count: usize,
    /// Earliest parsed date, if any
    pub earliest: Option<TemporalValue>,
    /// Latest parsed date, if any
    pub latest: Option<TemporalValue>,
}

impl SummaryRow {
    /// Row with counts only and no date range
    #[must_use]
    pub fn new(collection: impl Into<String>, total_count: usize, distinct_count: usize) -> Self {
        Self {
            collection: collection.into(),
            total_count,
            distinct_count,
            earliest: None,
            latest: None,
        }
    }

    /// Years between earliest and latest; `None` unless both are defined
    /// and the difference fits in `i64`
    #[must_use]
    pub fn span_years(&self) -> Option<i64> {
        self.latest?.year().checked_sub(self.earliest?.year())
    }
}

/// An aggregate came out undefined because its column had no usable values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyAggregateWarning {
    /// Collection name
    pub collection: String,
    /// Column with no usable values
    pub column: String,
}

impl fmt::Display for EmptyAggregateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}' in collection '{}' has no usable values; aggregate is undefined",
            self.column, self.collection
        )
    }
}

/// A computed distribution, tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum DistributionTable {
    /// Counts per category
    Categorical(Distribution),
    /// Counts per year bin, in the requested [`BinOrder`]
    Binned(Distribution<i64>),
    /// Counts and fractions per category
    Normalized(NormalizedDistribution),
}

impl DistributionTable {
    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Categorical(d) => d.len(),
            Self::Binned(d) => d.len(),
            Self::Normalized(d) => d.len(),
        }
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export as an Arrow batch (`label`, `count`[, `fraction`])
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the batch
    pub fn to_record_batch(&self) -> Result<arrow::record_batch::RecordBatch> {
        match self {
            Self::Categorical(d) => d.to_record_batch(),
            Self::Binned(d) => d.to_record_batch(),
            Self::Normalized(d) => d.to_record_batch(),
        }
    }
}

/// A distribution with the name it was requested under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedDistribution {
    /// Request name
    pub name: String,
    /// Source column
    pub column: String,
    /// Computed table
    pub table: DistributionTable,
}

/// Everything computed for one collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionReport {
    /// Scalar aggregates
    pub summary: SummaryRow,
    /// Requested distributions, in request order
    pub distributions: Vec<NamedDistribution>,
    /// Aggregates that came out undefined
    pub warnings: Vec<EmptyAggregateWarning>,
}

impl CollectionReport {
    /// Distribution by request name
    #[must_use]
    pub fn distribution(&self, name: &str) -> Option<&DistributionTable> {
        self.distributions
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.table)
    }
}

/// Computes aggregates over one collection
#[derive(Debug, Clone, Copy)]
pub struct Summarizer<'a> {
    collection: &'a Collection,
}

impl<'a> Summarizer<'a> {
    /// Create a summarizer for `collection`
    #[must_use]
    pub const fn new(collection: &'a Collection) -> Self {
        Self { collection }
    }

    /// All rows, including those with absent fields
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.collection.num_rows()
    }

    /// Distinct non-null values of `column`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] if the column does not exist
    pub fn distinct_count(&self, column: &str) -> Result<usize> {
        let mut seen = FxHashSet::default();
        for cell in self.collection.cells(column)? {
            if let Some(label) = cell.label() {
                seen.insert(label);
            }
        }
        Ok(seen.len())
    }

    /// Minimum and maximum parsed date of `column`
    ///
    /// Absent and unparsable cells are skipped; `None` if nothing remains.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] if the column does not exist
    pub fn date_bounds(&self, column: &str) -> Result<Option<(TemporalValue, TemporalValue)>> {
        let mut bounds: Option<(TemporalValue, TemporalValue)> = None;
        let mut unparsed = 0usize;

        for cell in self.collection.cells(column)? {
            if cell.is_absent() {
                continue;
            }
            let Some(value) = cell.temporal() else {
                unparsed += 1;
                continue;
            };
            bounds = Some(match bounds {
                None => (value, value),
                Some((min, max)) => (min.min(value), max.max(value)),
            });
        }

        if unparsed > 0 {
            tracing::debug!(
                collection = self.collection.name(),
                column,
                unparsed,
                "skipped values that are neither numbers nor dates"
            );
        }
        Ok(bounds)
    }

    /// Earliest parsed date of `column`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] if the column does not exist
    pub fn earliest(&self, column: &str) -> Result<Option<TemporalValue>> {
        Ok(self.date_bounds(column)?.map(|(min, _)| min))
    }

    /// Latest parsed date of `column`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] if the column does not exist
    pub fn latest(&self, column: &str) -> Result<Option<TemporalValue>> {
        Ok(self.date_bounds(column)?.map(|(_, max)| max))
    }

    /// Counts per non-null value of `column`, count descending
    ///
    /// # Errors
    ///
    /// Returns error if the column does not exist or `top_n` is `Some(0)`
    pub fn categorical(&self, column: &str, top_n: Option<usize>) -> Result<Distribution> {
        let mut counter = GroupCounter::new();
        for cell in self.collection.cells(column)? {
            if let Some(label) = cell.label() {
                counter.observe(label.into_owned());
            }
        }
        counter.finish(top_n)
    }

    /// Counts per `width`-year bin of `column`, count descending
    ///
    /// Rows whose value is absent or unparsable are left out entirely. Use
    /// [`Distribution::into_label_order`] for histogram axis order.
    ///
    /// # Errors
    ///
    /// Returns error if the column does not exist or `width` is not positive
    pub fn binned(&self, column: &str, width: i64) -> Result<Distribution<i64>> {
        check_bin_width(width)?;

        let mut counter = GroupCounter::new();
        for cell in self.collection.cells(column)? {
            if let Some(value) = cell.temporal() {
                counter.observe(bin_year(value.year(), width)?);
            }
        }
        counter.finish(None)
    }

    /// Categorical counts with fractions of the non-null total
    ///
    /// Fractions are computed before truncation to `top_n`.
    ///
    /// # Errors
    ///
    /// Returns error if the column does not exist or `top_n` is `Some(0)`
    pub fn normalized(
        &self,
        column: &str,
        top_n: Option<usize>,
    ) -> Result<NormalizedDistribution> {
        let normalized = self.categorical(column, None)?.normalized();
        Ok(match top_n {
            Some(0) => {
                return Err(crate::Error::InvalidInput(
                    "top_n must be greater than 0".to_string(),
                ))
            }
            Some(n) => normalized.top_n(n),
            None => normalized,
        })
    }

    /// Scalar aggregates according to `roles`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] if a role column does not exist
    pub fn summary_row(
        &self,
        roles: &ColumnRoles,
    ) -> Result<(SummaryRow, Vec<EmptyAggregateWarning>)> {
        let mut row = SummaryRow::new(
            self.collection.name(),
            self.total_count(),
            self.distinct_count(&roles.identity)?,
        );
        let mut warnings = Vec::new();

        let earliest_column = roles.earliest_column();
        let latest_column = roles.latest_column();
        let mut date_columns: Vec<&str> = earliest_column.into_iter().collect();
        if let Some(latest) = latest_column {
            if !date_columns.contains(&latest) {
                date_columns.push(latest);
            }
        }

        for column in date_columns {
            let bounds = self.date_bounds(column)?;
            if bounds.is_none() {
                let warning = EmptyAggregateWarning {
                    collection: self.collection.name().to_string(),
                    column: column.to_string(),
                };
                tracing::warn!(%warning, "empty aggregate");
                warnings.push(warning);
            }
            if earliest_column == Some(column) {
                row.earliest = bounds.map(|(min, _)| min);
            }
            if latest_column == Some(column) {
                row.latest = bounds.map(|(_, max)| max);
            }
        }

        Ok((row, warnings))
    }

    /// Compute one requested distribution
    ///
    /// # Errors
    ///
    /// Returns error if the column does not exist or parameters are invalid
    pub fn distribution(&self, request: &DistributionRequest) -> Result<NamedDistribution> {
        let table = match &request.kind {
            DistributionKind::Categorical { column, top_n } => {
                DistributionTable::Categorical(self.categorical(column, *top_n)?)
            }
            DistributionKind::Binned {
                column,
                width,
                order,
            } => {
                let dist = self.binned(column, *width)?;
                DistributionTable::Binned(match order {
                    BinOrder::Count => dist,
                    BinOrder::Label => dist.into_label_order(),
                })
            }
            DistributionKind::Normalized { column, top_n } => {
                DistributionTable::Normalized(self.normalized(column, *top_n)?)
            }
        };
        Ok(NamedDistribution {
            name: request.name.clone(),
            column: request.kind.column().to_string(),
            table,
        })
    }

    /// Summary row plus every requested distribution
    ///
    /// # Errors
    ///
    /// Returns the first error; a missing column is never silently skipped
    pub fn report(
        &self,
        roles: &ColumnRoles,
        requests: &[DistributionRequest],
    ) -> Result<CollectionReport> {
        let (summary, warnings) = self.summary_row(roles)?;
        let distributions = requests
            .iter()
            .map(|request| self.distribution(request))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            collection = self.collection.name(),
            total = summary.total_count,
            distinct = summary.distinct_count,
            distributions = distributions.len(),
            "summarized collection"
        );

        Ok(CollectionReport {
            summary,
            distributions,
            warnings,
        })
    }
}
