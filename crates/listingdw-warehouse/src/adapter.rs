//! Warehouse loader trait for full-refresh star schema loads

use listingdw_core::{StarSchema, TableNames};
use serde::{Deserialize, Serialize};

/// Rows written to one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLoad {
    pub table: String,
    pub rows: usize,
}

/// Result of a committed load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Loader name (e.g., "PostgreSQL")
    pub backend: String,

    /// Tables in load order
    pub tables: Vec<TableLoad>,
}

impl LoadSummary {
    /// Summary of loading `schema` into `tables`
    pub fn for_schema(backend: impl Into<String>, schema: &StarSchema, tables: &TableNames) -> Self {
        let counts = schema.row_counts();
        let rows = [
            counts.dim_date,
            counts.dim_neighborhood,
            counts.dim_host,
            counts.dim_listing,
            counts.fact_reviews,
        ];

        Self {
            backend: backend.into(),
            tables: tables
                .load_order()
                .into_iter()
                .zip(rows)
                .map(|(table, rows)| TableLoad { table: table.to_string(), rows })
                .collect(),
        }
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Errors that can occur while loading
///
/// Any error means the load was rolled back and the warehouse still holds
/// the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Load into {table} failed: {message}")]
    QueryError { table: String, message: String },

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for warehouses that accept a star schema
#[async_trait::async_trait]
pub trait WarehouseLoader: Send + Sync {
    /// Get the loader name (e.g., "PostgreSQL", "Memory")
    fn name(&self) -> &'static str;

    /// Test the connection to the warehouse
    async fn test_connection(&self) -> Result<(), LoadError>;

    /// Replace the contents of all five tables with `schema`
    ///
    /// Truncation and every insert happen in one transaction, dimensions
    /// before the fact table.
    async fn load(&self, schema: &StarSchema, tables: &TableNames) -> Result<LoadSummary, LoadError>;
}
