//! listingdw engine - validation, transform and orchestration
//!
//! This crate implements the stages between extraction and load:
//! - Data quality checks and referential pruning
//! - Dimension and fact builders for the star schema
//! - The pipeline that sequences extract, validate, transform and load

pub mod dimensions;
pub mod facts;
pub mod metrics;
pub mod pipeline;
pub mod prune;
pub mod quality;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{Pipeline, PipelineError, RunSummary};
pub use quality::{check_names, QualityChecker, Validated};
pub use transform::{TransformError, Transformer};
