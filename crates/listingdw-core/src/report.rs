//! Data quality report (data_quality_report.json)
//!
//! The serialized shape is consumed by downstream tooling:
//! `{listings_row_count_after_validation, reviews_row_count_after_validation,
//! checks: [{name, status, <payload>}]}`. Payload keys must not be renamed.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Check-specific payload, flattened next to `name` and `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckPayload {
    MissingColumns { missing_columns: Vec<String> },
    NullCount { null_count: usize },
    DuplicateCount { duplicate_count: usize },
    InvalidCount { invalid_count: usize },
    OrphanReviews { orphan_reviews: usize },
}

impl CheckPayload {
    /// Number of offending columns or rows
    pub fn count(&self) -> usize {
        match self {
            Self::MissingColumns { missing_columns } => missing_columns.len(),
            Self::NullCount { null_count } => *null_count,
            Self::DuplicateCount { duplicate_count } => *duplicate_count,
            Self::InvalidCount { invalid_count } => *invalid_count,
            Self::OrphanReviews { orphan_reviews } => *orphan_reviews,
        }
    }
}

/// One entry of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Stable check name (e.g. `latitude_in_range`)
    pub name: String,

    pub status: CheckStatus,

    #[serde(flatten)]
    pub payload: CheckPayload,
}

impl CheckResult {
    fn new(name: impl Into<String>, payload: CheckPayload) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::from_count(payload.count()),
            payload,
        }
    }

    pub fn missing_columns(name: impl Into<String>, missing_columns: Vec<String>) -> Self {
        Self::new(name, CheckPayload::MissingColumns { missing_columns })
    }

    pub fn null_count(name: impl Into<String>, null_count: usize) -> Self {
        Self::new(name, CheckPayload::NullCount { null_count })
    }

    pub fn duplicate_count(name: impl Into<String>, duplicate_count: usize) -> Self {
        Self::new(name, CheckPayload::DuplicateCount { duplicate_count })
    }

    pub fn invalid_count(name: impl Into<String>, invalid_count: usize) -> Self {
        Self::new(name, CheckPayload::InvalidCount { invalid_count })
    }

    pub fn orphan_reviews(name: impl Into<String>, orphan_reviews: usize) -> Self {
        Self::new(name, CheckPayload::OrphanReviews { orphan_reviews })
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    pub fn count(&self) -> usize {
        self.payload.count()
    }
}

/// Quality report for one run
///
/// Built once by the quality checker and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub listings_row_count_after_validation: usize,
    pub reviews_row_count_after_validation: usize,

    /// Check results in execution order
    pub checks: Vec<CheckResult>,
}

impl QualityReport {
    pub fn new(listings: usize, reviews: usize, checks: Vec<CheckResult>) -> Self {
        Self {
            listings_row_count_after_validation: listings,
            reviews_row_count_after_validation: reviews,
            checks,
        }
    }

    /// Find a check by name
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed())
    }

    pub fn has_failures(&self) -> bool {
        self.failed_checks().next().is_some()
    }

    /// All required columns reported missing, across both extracts
    pub fn missing_columns(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter_map(|c| match &c.payload {
                CheckPayload::MissingColumns { missing_columns } => Some(missing_columns.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)
    }

    /// Load a previously saved report
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
