//! # museum-eda: Summary Tables for Museum Collection Datasets
//!
//! Loads heterogeneous museum datasets (Cleveland, the Met, `MoMA` artists
//! and artworks) into Arrow-backed collections and turns them into a small
//! set of comparable summary tables: scalar aggregates, category counts,
//! year histograms, normalized attribute shares, and a cross-collection
//! comparison. Rendering those tables is left to the caller.
//!
//! ## Design Principles
//!
//! - **Absent is not zero**: nulls are filtered before every aggregate, and
//!   an aggregate over nothing is `None`, never `0`
//! - **Configuration over hardcoding**: one generic summarizer, driven by a
//!   per-collection role mapping ([`config::ColumnRoles`])
//! - **Deterministic output**: count ties keep first-encountered order
//! - **Failure isolation**: one broken dataset never hides the others
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use museum_eda::config::museum_presets;
//! use museum_eda::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let configs = museum_presets(Path::new("data"));
//! let report = Pipeline::new().run(&configs);
//!
//! for (collection, error) in report.failures() {
//!     eprintln!("{collection}: {error}");
//! }
//! if let Ok(table) = &report.comparison {
//!     for row in table.rows() {
//!         println!("{}: {} artworks", row.collection, row.total_count);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod collection;
pub mod comparison;
pub mod config;
pub mod distribution;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod summary;
pub mod telemetry;
pub mod temporal;
pub mod topk;

pub use collection::{Collection, Record, Scalar};
pub use comparison::ComparisonTable;
pub use config::{BinOrder, CollectionConfig, ColumnRoles, ReportConfig};
pub use distribution::{Distribution, NormalizedDistribution};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Report};
pub use summary::{CollectionReport, EmptyAggregateWarning, SummaryRow, Summarizer};
pub use temporal::TemporalValue;
