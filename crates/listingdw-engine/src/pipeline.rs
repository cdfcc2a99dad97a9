//! Pipeline orchestration: extract, validate, transform, load
//!
//! Stages run strictly in sequence and any stage error aborts the run.
//! There are no retries.

use crate::quality::{QualityChecker, Validated};
use crate::transform::{TransformError, Transformer};
use chrono::NaiveDate;
use listingdw_core::{Config, QualityReport, TableCounts};
use listingdw_extract::{ExtractError, Extractor, RawExtract};
use listingdw_warehouse::{LoadError, LoadSummary, WarehouseLoader};
use serde::Serialize;

/// Outcome of a complete run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub report: QualityReport,
    pub tables: TableCounts,

    /// Star schema fingerprint; equal across runs over unchanged input
    pub fingerprint: String,

    pub load: LoadSummary,
}

/// Runs the ETL against one warehouse
pub struct Pipeline {
    config: Config,
    loader: Box<dyn WarehouseLoader>,
}

impl Pipeline {
    pub fn new(config: Config, loader: Box<dyn WarehouseLoader>) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn loader(&self) -> &dyn WarehouseLoader {
        self.loader.as_ref()
    }

    /// Extract from the configured paths, then run every stage
    pub async fn run(&self, run_date: NaiveDate) -> Result<RunSummary, PipelineError> {
        tracing::info!("=== pipeline START ===");
        let raw = Extractor::from_config(&self.config).run()?;
        let summary = self.run_with(raw, run_date).await?;
        tracing::info!("=== pipeline END ===");
        Ok(summary)
    }

    /// Run every stage after extraction on an already extracted input
    pub async fn run_with(&self, raw: RawExtract, run_date: NaiveDate) -> Result<RunSummary, PipelineError> {
        let validated = self.validate(raw)?;

        let schema = Transformer::new(run_date).run(&validated.listings, &validated.reviews)?;
        let tables = schema.row_counts();
        let fingerprint = schema.fingerprint();
        tracing::info!("Star schema fingerprint: {}", fingerprint);

        tracing::info!("Loading {} rows into {}", tables.total(), self.loader.name());
        let load = self.loader.load(&schema, &self.config.tables).await?;

        Ok(RunSummary {
            run_date,
            report: validated.report,
            tables,
            fingerprint,
            load,
        })
    }

    /// Extract and validate only; the report is persisted as in a full run
    pub fn validate_only(&self) -> Result<QualityReport, PipelineError> {
        let raw = Extractor::from_config(&self.config).run()?;
        Ok(self.validate(raw)?.report)
    }

    /// Quality checks, report persistence and the strict column gate
    fn validate(&self, raw: RawExtract) -> Result<Validated, PipelineError> {
        let validated = QualityChecker::new(self.config.validation.clone()).run(raw.listings, raw.reviews);

        let report_path = self.config.report_path();
        validated
            .report
            .save_to_file(&report_path)
            .map_err(|e| PipelineError::ReportError(report_path.display().to_string(), e.to_string()))?;
        tracing::info!("Data quality report written to {}", report_path.display());

        let missing = validated.report.missing_columns();
        if !missing.is_empty() {
            if self.config.validation.strict_columns {
                tracing::error!("Required columns missing: {}", missing.join(", "));
                return Err(PipelineError::MissingColumns(missing));
            }
            tracing::warn!("Required columns missing, treated as empty: {}", missing.join(", "));
        }

        Ok(validated)
    }
}

/// Fatal pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to write data quality report {0}: {1}")]
    ReportError(String, String),

    #[error("Required columns missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}
