//! Configuration schema (listingdw.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of the two raw extracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Listings CSV
    pub listings: PathBuf,

    /// Reviews CSV
    pub reviews: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            listings: PathBuf::from("data/raw/listings.csv"),
            reviews: PathBuf::from("data/raw/reviews.csv"),
        }
    }
}

/// Where run artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Data quality report (JSON)
    pub data_quality_report: PathBuf,

    /// Pipeline execution log
    pub log_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_quality_report: PathBuf::from("reports/data_quality_report.json"),
            log_file: PathBuf::from("logs/pipeline_execution.log"),
        }
    }
}

/// Thresholds used by the quality checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accepted for compatibility with existing config files.
    /// Raw prices are only null-checked, never range-checked.
    pub min_price: f64,

    /// Upper bound for `availability_365` (lower bound is always 0)
    pub max_availability: f64,

    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,

    /// Abort the run when a required input column is absent
    pub strict_columns: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_price: 1.0,
            max_availability: 365.0,
            min_latitude: -90.0,
            max_latitude: 90.0,
            min_longitude: -180.0,
            max_longitude: 180.0,
            strict_columns: true,
        }
    }
}

/// Target table names in the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub dim_date: String,
    pub dim_neighborhood: String,
    pub dim_host: String,
    pub dim_listing: String,
    pub fact_reviews: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            dim_date: "dim_date".to_string(),
            dim_neighborhood: "dim_neighborhood".to_string(),
            dim_host: "dim_host".to_string(),
            dim_listing: "dim_listing".to_string(),
            fact_reviews: "fact_reviews".to_string(),
        }
    }
}

impl TableNames {
    /// Dimension tables first, then the fact table (referential load order)
    pub fn load_order(&self) -> [&str; 5] {
        [
            &self.dim_date,
            &self.dim_neighborhood,
            &self.dim_host,
            &self.dim_listing,
            &self.fact_reviews,
        ]
    }
}

/// Warehouse backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseKind {
    /// PostgreSQL (requires the `postgres` feature of listingdw-warehouse)
    Postgres,

    /// In-process warehouse, nothing is persisted
    Memory,
}

impl Default for WarehouseKind {
    fn default() -> Self {
        Self::Postgres
    }
}

/// Warehouse connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Warehouse type (postgres, memory)
    #[serde(rename = "type")]
    pub kind: WarehouseKind,

    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,

    /// Use a TLS connection
    pub tls: bool,

    /// Only ever read from the environment (`DB_PASSWORD`)
    #[serde(skip)]
    pub password: Option<String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            kind: WarehouseKind::default(),
            host: "localhost".to_string(),
            port: 5432,
            database: "airbnb_dw".to_string(),
            user: "postgres".to_string(),
            tls: false,
            password: None,
        }
    }
}

impl WarehouseConfig {
    /// Apply `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER` and `DB_PASSWORD`
    /// overrides. `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_PORT".to_string(), port.clone()))?;
        }
        if let Some(database) = lookup("DB_NAME") {
            self.database = database;
        }
        if let Some(user) = lookup("DB_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.password = Some(password);
        }
        Ok(self)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_paths: DataPaths,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub tables: TableNames,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_paths: DataPaths::default(),
            output: OutputConfig::default(),
            validation: ValidationConfig::default(),
            tables: TableNames::default(),
            warehouse: WarehouseConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn listings_path(&self) -> PathBuf {
        self.resolve(&self.data_paths.listings)
    }

    pub fn reviews_path(&self) -> PathBuf {
        self.resolve(&self.data_paths.reviews)
    }

    pub fn report_path(&self) -> PathBuf {
        self.resolve(&self.output.data_quality_report)
    }

    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.output.log_file)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}
