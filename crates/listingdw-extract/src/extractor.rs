//! CSV extraction
//!
//! Extra source columns are ignored. Absent columns are not an error here:
//! their fields deserialize as missing and the quality checker reports them.

use csv::{ReaderBuilder, Trim};
use listingdw_core::{Config, RawListing, RawReview, RawTable};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Both raw extracts of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtract {
    pub listings: RawTable<RawListing>,
    pub reviews: RawTable<RawReview>,
}

/// Reads the two configured extracts
#[derive(Debug, Clone)]
pub struct Extractor {
    listings_path: PathBuf,
    reviews_path: PathBuf,
}

impl Extractor {
    pub fn new(listings_path: impl Into<PathBuf>, reviews_path: impl Into<PathBuf>) -> Self {
        Self {
            listings_path: listings_path.into(),
            reviews_path: reviews_path.into(),
        }
    }

    /// Use the `[data_paths]` section, resolved against the project root
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.listings_path(), config.reviews_path())
    }

    pub fn listings_path(&self) -> &Path {
        &self.listings_path
    }

    pub fn reviews_path(&self) -> &Path {
        &self.reviews_path
    }

    /// Read both extracts
    pub fn run(&self) -> Result<RawExtract, ExtractError> {
        tracing::info!("Extracting listings from {}", self.listings_path.display());
        tracing::info!("Extracting reviews from {}", self.reviews_path.display());

        let listings = read_path(&self.listings_path)?;
        let reviews = read_path(&self.reviews_path)?;

        tracing::info!("Listings rows: {}, Reviews rows: {}", listings.len(), reviews.len());

        Ok(RawExtract { listings, reviews })
    }
}

fn read_path<T: DeserializeOwned>(path: &Path) -> Result<RawTable<T>, ExtractError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ExtractError::IoError(path.display().to_string(), e.to_string()))?;
    read_table(file, &path.display().to_string())
}

/// Read a CSV table from any reader
///
/// `source` is only used in error messages.
pub fn read_table<T, R>(reader: R, source: &str) -> Result<RawTable<T>, ExtractError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| ExtractError::ParseError(source.to_string(), e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.deserialize::<T>() {
        let row = record.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or_default();
            ExtractError::RowError {
                file: source.to_string(),
                line,
                message: e.to_string(),
            }
        })?;
        rows.push(row);
    }

    Ok(RawTable::new(columns, rows))
}

/// Extraction errors (always fatal)
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read extract {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse CSV header in {0}: {1}")]
    ParseError(String, String),

    #[error("Malformed row in {file} at line {line}: {message}")]
    RowError {
        file: String,
        line: u64,
        message: String,
    },
}
