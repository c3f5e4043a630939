//! Per-collection configuration
//!
//! The four museum datasets name the same concepts differently (`department`
//! vs `Department`, `artists_tags` vs `Artist Display Name`). A
//! [`CollectionConfig`] maps semantic roles to one dataset's real column
//! names, and lists the distributions to build for it. The summarizer never
//! hardcodes a column name.
//!
//! Configs are plain serde structs, loadable from JSON:
//!
//! ```json
//! {
//!   "collections": [{
//!     "name": "MoMA Artworks",
//!     "path": "data/moma_artworks.csv",
//!     "roles": { "identity": "ConstituentID", "date_earliest": "DateAcquired" },
//!     "distributions": [
//!       { "name": "mediums", "kind": "categorical", "column": "Medium", "top_n": 10 },
//!       { "name": "acquisitions", "kind": "binned", "column": "DateAcquired", "width": 5, "order": "label" }
//!     ]
//!   }]
//! }
//! ```

use crate::temporal::CENTURY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of rows per loaded record batch
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Mapping from semantic roles to actual column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Column identifying the artist/entity for distinct counting
    pub identity: String,
    /// Column the earliest date is taken from
    #[serde(default)]
    pub date_earliest: Option<String>,
    /// Column the latest date is taken from (defaults to `date_earliest`)
    #[serde(default)]
    pub date_latest: Option<String>,
}

impl ColumnRoles {
    /// Roles with only an identity column
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            date_earliest: None,
            date_latest: None,
        }
    }

    /// Column used for the earliest date, if any
    #[must_use]
    pub fn earliest_column(&self) -> Option<&str> {
        self.date_earliest.as_deref().or(self.date_latest.as_deref())
    }

    /// Column used for the latest date, if any
    #[must_use]
    pub fn latest_column(&self) -> Option<&str> {
        self.date_latest.as_deref().or(self.date_earliest.as_deref())
    }
}

/// Entry order of a binned distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOrder {
    /// Count descending, ties in first-encountered order
    #[default]
    Count,
    /// Bin key ascending (histogram axis order)
    Label,
}

/// What kind of distribution to build, and over which column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionKind {
    /// Counts per category, optionally limited to the top N
    Categorical {
        /// Grouping column
        column: String,
        /// Keep only the N most frequent categories
        #[serde(default)]
        top_n: Option<usize>,
    },
    /// Counts per fixed-width year bin
    Binned {
        /// Year or date column
        column: String,
        /// Bin width in years
        width: i64,
        /// Entry order of the result
        #[serde(default)]
        order: BinOrder,
    },
    /// Counts plus fractions of the non-null total
    Normalized {
        /// Grouping column
        column: String,
        /// Keep only the N most frequent categories
        #[serde(default)]
        top_n: Option<usize>,
    },
}

impl DistributionKind {
    /// Column the distribution reads
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Categorical { column, .. }
            | Self::Binned { column, .. }
            | Self::Normalized { column, .. } => column,
        }
    }
}

/// A named distribution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRequest {
    /// Stable key the presentation layer looks the table up by
    pub name: String,
    /// Distribution kind and parameters
    #[serde(flatten)]
    pub kind: DistributionKind,
}

/// How a dataset file is read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Field delimiter for delimited text (must be ASCII)
    pub delimiter: char,
    /// Rows per record batch
    pub batch_size: usize,
    /// Columns the file must provide
    pub expected_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            batch_size: DEFAULT_BATCH_SIZE,
            expected_columns: Vec::new(),
        }
    }
}

impl LoadOptions {
    /// Delimiter as a byte
    ///
    /// # Errors
    ///
    /// Returns error if the delimiter is not a single ASCII character
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::Config(format!("Delimiter must be ASCII, got {:?}", self.delimiter))
            })
    }
}

/// Everything needed to load and summarize one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name (unique within a report)
    pub name: String,
    /// Dataset file
    pub path: PathBuf,
    /// Role to column mapping
    pub roles: ColumnRoles,
    /// Distributions to build
    #[serde(default)]
    pub distributions: Vec<DistributionRequest>,
    /// File reading options
    #[serde(default)]
    pub load: LoadOptions,
}

impl CollectionConfig {
    /// Create a builder with the required fields
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        identity: impl Into<String>,
    ) -> CollectionConfigBuilder {
        CollectionConfigBuilder::new(name, path, identity)
    }

    /// Check parameters that serde cannot
    ///
    /// # Errors
    ///
    /// Returns error on an empty name, a zero `top_n`, a non-positive bin
    /// width, zero batch size, or a non-ASCII delimiter
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("Collection name must not be empty".to_string()));
        }
        if self.load.batch_size == 0 {
            return Err(Error::Config(format!(
                "{}: batch_size must be greater than 0",
                self.name
            )));
        }
        self.load.delimiter_byte()?;

        for request in &self.distributions {
            match &request.kind {
                DistributionKind::Categorical { top_n: Some(0), .. }
                | DistributionKind::Normalized { top_n: Some(0), .. } => {
                    return Err(Error::Config(format!(
                        "{}/{}: top_n must be greater than 0",
                        self.name, request.name
                    )));
                }
                DistributionKind::Binned { width, .. } if *width <= 0 => {
                    return Err(Error::Config(format!(
                        "{}/{}: bin width must be positive, got {width}",
                        self.name, request.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Builder for [`CollectionConfig`]
#[derive(Debug)]
pub struct CollectionConfigBuilder {
    config: CollectionConfig,
}

impl CollectionConfigBuilder {
    /// Create a new builder with required fields
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            config: CollectionConfig {
                name: name.into(),
                path: path.into(),
                roles: ColumnRoles::new(identity),
                distributions: Vec::new(),
                load: LoadOptions::default(),
            },
        }
    }

    /// Use one column for both earliest and latest dates
    #[must_use]
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.config.roles.date_earliest = Some(column.into());
        self.config.roles.date_latest = None;
        self
    }

    /// Take earliest and latest dates from separate columns
    #[must_use]
    pub fn date_range(mut self, earliest: impl Into<String>, latest: impl Into<String>) -> Self {
        self.config.roles.date_earliest = Some(earliest.into());
        self.config.roles.date_latest = Some(latest.into());
        self
    }

    /// Request a categorical distribution
    #[must_use]
    pub fn categorical(
        self,
        name: impl Into<String>,
        column: impl Into<String>,
        top_n: Option<usize>,
    ) -> Self {
        self.distribution(
            name,
            DistributionKind::Categorical {
                column: column.into(),
                top_n,
            },
        )
    }

    /// Request binned year counts, count descending
    #[must_use]
    pub fn binned(self, name: impl Into<String>, column: impl Into<String>, width: i64) -> Self {
        self.distribution(
            name,
            DistributionKind::Binned {
                column: column.into(),
                width,
                order: BinOrder::Count,
            },
        )
    }

    /// Request binned year counts in bin order, ready for a histogram axis
    #[must_use]
    pub fn histogram(self, name: impl Into<String>, column: impl Into<String>, width: i64) -> Self {
        self.distribution(
            name,
            DistributionKind::Binned {
                column: column.into(),
                width,
                order: BinOrder::Label,
            },
        )
    }

    /// Request a normalized distribution
    #[must_use]
    pub fn normalized(
        self,
        name: impl Into<String>,
        column: impl Into<String>,
        top_n: Option<usize>,
    ) -> Self {
        self.distribution(
            name,
            DistributionKind::Normalized {
                column: column.into(),
                top_n,
            },
        )
    }

    /// Request any distribution
    #[must_use]
    pub fn distribution(mut self, name: impl Into<String>, kind: DistributionKind) -> Self {
        self.config.distributions.push(DistributionRequest {
            name: name.into(),
            kind,
        });
        self
    }

    /// Override file reading options
    #[must_use]
    pub fn load_options(mut self, options: LoadOptions) -> Self {
        self.config.load = options;
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> CollectionConfig {
        self.config
    }
}

/// A full report run: the collections to load, in comparison order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Collections, in the order they appear in the comparison table
    pub collections: Vec<CollectionConfig>,
}

impl ReportConfig {
    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or a collection is invalid
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    ///
    /// Relative dataset paths are resolved against the config file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, and a config or
    /// JSON error if its contents are invalid
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&json)?;

        if let Some(base) = path.parent() {
            for collection in &mut config.collections {
                if collection.path.is_relative() {
                    collection.path = base.join(&collection.path);
                }
            }
        }
        Ok(config)
    }

    /// Validate every collection and reject duplicate names
    ///
    /// # Errors
    ///
    /// Returns error on the first invalid collection
    pub fn validate(&self) -> Result<()> {
        for (index, collection) in self.collections.iter().enumerate() {
            collection.validate()?;
            if self.collections[..index]
                .iter()
                .any(|other| other.name == collection.name)
            {
                return Err(Error::Config(format!(
                    "Duplicate collection name: {}",
                    collection.name
                )));
            }
        }
        Ok(())
    }
}

/// Default file names for [`museum_presets`]
pub mod files {
    /// Cleveland Museum of Art open-access export
    pub const CLEVELAND: &str = "cleveland.csv";
    /// Metropolitan Museum of Art open-access objects
    pub const MET: &str = "met_objects.csv";
    /// `MoMA` artists
    pub const MOMA_ARTISTS: &str = "moma_artists.csv";
    /// `MoMA` artworks
    pub const MOMA_ARTWORKS: &str = "moma_artworks.csv";
}

const TOP_CATEGORIES: Option<usize> = Some(10);
const ACQUISITION_BIN_YEARS: i64 = 5;

/// The four museum collections with their role mappings
///
/// Order: Cleveland, Met, `MoMA` Artists, `MoMA` Artworks. File names come
/// from [`files`], resolved against `data_dir`.
#[must_use]
pub fn museum_presets(data_dir: &Path) -> Vec<CollectionConfig> {
    vec![
        CollectionConfig::builder("Cleveland", data_dir.join(files::CLEVELAND), "artists_tags")
            .date_range("creation_date_earliest", "creation_date_latest")
            .categorical("departments", "department", TOP_CATEGORIES)
            .histogram("centuries", "creation_date_earliest", CENTURY)
            .build(),
        CollectionConfig::builder("Met", data_dir.join(files::MET), "Artist Display Name")
            .date_range("Object Begin Date", "Object End Date")
            .categorical("departments", "Department", TOP_CATEGORIES)
            .categorical("nationalities", "Artist Nationality", TOP_CATEGORIES)
            .histogram("centuries", "Object Begin Date", CENTURY)
            .build(),
        CollectionConfig::builder("MoMA Artists", data_dir.join(files::MOMA_ARTISTS), "ConstituentID")
            .normalized("genders", "Gender", None)
            .categorical("nationalities", "Nationality", TOP_CATEGORIES)
            .build(),
        CollectionConfig::builder("MoMA Artworks", data_dir.join(files::MOMA_ARTWORKS), "ConstituentID")
            .date_column("DateAcquired")
            .categorical("mediums", "Medium", TOP_CATEGORIES)
            .histogram("acquisitions", "DateAcquired", ACQUISITION_BIN_YEARS)
            .build(),
    ]
}
