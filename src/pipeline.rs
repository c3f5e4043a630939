//! Report pipeline: load, summarize, compare
//!
//! Failure isolation:
//! - A collection that fails to load or summarize is recorded as
//!   [`CollectionOutcome::Failed`]; the remaining collections still run.
//! - The comparison step runs only after every collection has finished, over
//!   the successful ones. If it fails, the per-collection reports survive.
//!
//! Collections share no mutable state, so with the `rayon` feature they can
//! be processed in parallel ([`Pipeline::run_parallel`]); `collect()` is the
//! barrier before the comparison.

use crate::collection::Collection;
use crate::comparison::ComparisonTable;
use crate::config::{CollectionConfig, ReportConfig};
use crate::loader::Loader;
use crate::summary::{CollectionReport, Summarizer};
use crate::{Error, Result};
use serde_json::{json, Value};

/// Result of processing one collection
#[derive(Debug)]
pub enum CollectionOutcome {
    /// Loaded and summarized
    Summarized(CollectionReport),
    /// Failed to load or summarize
    Failed {
        /// Collection name
        collection: String,
        /// What went wrong
        error: Error,
    },
}

impl CollectionOutcome {
    /// Collection name
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::Summarized(report) => &report.summary.collection,
            Self::Failed { collection, .. } => collection,
        }
    }

    /// The report, if the collection succeeded
    #[must_use]
    pub const fn report(&self) -> Option<&CollectionReport> {
        match self {
            Self::Summarized(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }

    /// The error, if the collection failed
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Summarized(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    fn to_json(&self) -> Result<Value> {
        Ok(match self {
            Self::Summarized(report) => {
                let mut value = serde_json::to_value(report)?;
                if let Value::Object(map) = &mut value {
                    map.insert("status".to_string(), json!("summarized"));
                }
                value
            }
            Self::Failed { collection, error } => json!({
                "status": "failed",
                "collection": collection,
                "error": error.to_string(),
            }),
        })
    }
}

/// Output of a full run
#[derive(Debug)]
pub struct Report {
    /// One outcome per configured collection, in configuration order
    pub collections: Vec<CollectionOutcome>,
    /// Comparison over successful collections
    pub comparison: Result<ComparisonTable>,
}

impl Report {
    /// Outcome for `collection`
    #[must_use]
    pub fn outcome(&self, collection: &str) -> Option<&CollectionOutcome> {
        self.collections
            .iter()
            .find(|outcome| outcome.collection() == collection)
    }

    /// Successful collection reports
    pub fn reports(&self) -> impl Iterator<Item = &CollectionReport> {
        self.collections.iter().filter_map(CollectionOutcome::report)
    }

    /// Failed collections with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.collections.iter().filter_map(|outcome| match outcome {
            CollectionOutcome::Failed { collection, error } => Some((collection.as_str(), error)),
            CollectionOutcome::Summarized(_) => None,
        })
    }

    /// Serialize the whole report for the presentation layer
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        let collections = self
            .collections
            .iter()
            .map(CollectionOutcome::to_json)
            .collect::<Result<Vec<_>>>()?;

        let comparison = match &self.comparison {
            Ok(table) => json!({ "rows": table }),
            Err(error) => json!({ "error": error.to_string() }),
        };

        Ok(serde_json::to_string_pretty(&json!({
            "collections": collections,
            "comparison": comparison,
        }))?)
    }
}

/// Drives loading, summarizing and comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pipeline;

impl Pipeline {
    /// Create a pipeline
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Load and summarize one collection
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid, loading fails, or a role
    /// column is missing
    pub fn process(&self, config: &CollectionConfig) -> Result<CollectionReport> {
        let span = tracing::info_span!("collection", name = %config.name);
        let _guard = span.enter();

        config.validate()?;
        let collection = Loader::new(config.load.clone()).load(&config.name, &config.path)?;
        Self::summarize(&collection, config)
    }

    /// Summarize an already loaded collection
    ///
    /// # Errors
    ///
    /// Returns error if a role column is missing or parameters are invalid
    pub fn summarize(collection: &Collection, config: &CollectionConfig) -> Result<CollectionReport> {
        Summarizer::new(collection).report(&config.roles, &config.distributions)
    }

    fn outcome(config: &CollectionConfig, result: Result<CollectionReport>) -> CollectionOutcome {
        match result {
            Ok(report) => CollectionOutcome::Summarized(report),
            Err(error) => {
                tracing::error!(collection = %config.name, %error, "collection failed");
                CollectionOutcome::Failed {
                    collection: config.name.clone(),
                    error,
                }
            }
        }
    }

    /// Run every collection in order, then build the comparison
    #[must_use]
    pub fn run(&self, configs: &[CollectionConfig]) -> Report {
        let collections = configs
            .iter()
            .map(|config| Self::outcome(config, self.process(config)))
            .collect();
        Self::finish(collections)
    }

    /// Run every collection on the rayon pool, then build the comparison
    ///
    /// Output is identical to [`Pipeline::run`].
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn run_parallel(&self, configs: &[CollectionConfig]) -> Report {
        use rayon::prelude::*;

        let collections = configs
            .par_iter()
            .map(|config| Self::outcome(config, self.process(config)))
            .collect();
        Self::finish(collections)
    }

    /// Run a full report config
    #[must_use]
    pub fn run_report(&self, config: &ReportConfig) -> Report {
        self.run(&config.collections)
    }

    /// Build the comparison over summarized collections
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCollection`] if two collections share a name
    pub fn compare<'a>(
        reports: impl IntoIterator<Item = &'a CollectionReport>,
    ) -> Result<ComparisonTable> {
        ComparisonTable::from_rows(reports.into_iter().map(|report| report.summary.clone()))
    }

    fn finish(collections: Vec<CollectionOutcome>) -> Report {
        let comparison = Self::compare(collections.iter().filter_map(CollectionOutcome::report));
        match &comparison {
            Ok(table) => tracing::info!(rows = table.len(), "built comparison table"),
            Err(error) => tracing::error!(%error, "comparison failed"),
        }
        Report {
            collections,
            comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Record;
    use crate::summary::DistributionTable;
    use crate::temporal::TemporalValue;

    fn acquisitions() -> Collection {
        let dates = ["1931-06-30", "-1e19", "1996-04-09", "1997-01-15", "1998-02-02"];
        let records: Vec<Record> = dates
            .iter()
            .map(|date| Record::new().with("ConstituentID", "7605").with("DateAcquired", *date))
            .collect();
        Collection::from_records("MoMA Artworks", &records).unwrap()
    }

    fn bins(report: &CollectionReport, name: &str) -> Vec<(i64, usize)> {
        let Some(DistributionTable::Binned(dist)) = report.distribution(name) else {
            panic!("{name} should be binned");
        };
        dist.iter().map(|e| (e.label, e.count)).collect()
    }

    #[test]
    fn test_unit_pipeline() {
        assert_eq!(Pipeline::new(), Pipeline::default());
    }

    #[test]
    fn test_summarize_honours_bin_order() {
        let config = CollectionConfig::builder("MoMA Artworks", "unused.csv", "ConstituentID")
            .date_column("DateAcquired")
            .binned("by_count", "DateAcquired", 5)
            .histogram("by_year", "DateAcquired", 5)
            .build();
        let report = Pipeline::summarize(&acquisitions(), &config).unwrap();

        assert_eq!(bins(&report, "by_count"), vec![(1995, 3), (1930, 1)]);
        assert_eq!(bins(&report, "by_year"), vec![(1930, 1), (1995, 3)]);
    }

    #[test]
    fn test_extreme_year_does_not_abort_summary() {
        let config = CollectionConfig::builder("MoMA Artworks", "unused.csv", "ConstituentID")
            .date_column("DateAcquired")
            .histogram("acquisitions", "DateAcquired", 5)
            .build();
        let report = Pipeline::summarize(&acquisitions(), &config).unwrap();

        assert_eq!(report.summary.total_count, 5);
        assert_eq!(report.summary.earliest.map(TemporalValue::year), Some(1931));
        assert_eq!(report.summary.span_years(), Some(67));
        assert_eq!(bins(&report, "acquisitions").iter().map(|b| b.1).sum::<usize>(), 4);
    }
}
