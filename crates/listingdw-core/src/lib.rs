//! listingdw core
//!
//! Shared domain model: configuration, input records, star-schema records
//! and the data quality report. Check names and report keys are part of the
//! public output and must stay stable.

pub mod config;
pub mod records;
pub mod report;
pub mod star;

pub use config::{Config, ConfigError, DataPaths, OutputConfig, TableNames, ValidationConfig, WarehouseConfig, WarehouseKind};
pub use records::{coerce_numeric, RawListing, RawReview, RawTable, ValidListing, ValidReview, LISTING_COLUMNS, REVIEW_COLUMNS};
pub use report::{CheckPayload, CheckResult, CheckStatus, QualityReport};
pub use star::{DimDate, DimHost, DimListing, DimNeighborhood, FactReview, PriceTier, StarSchema, SurrogateKey, TableCounts};
