//! In-memory warehouse
//!
//! Holds the last committed star schema in process memory. It is used for
//! dry runs and for testing the pipeline without a database.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use listingdw_warehouse::{MemoryWarehouse, WarehouseLoader};
//!
//! let warehouse = MemoryWarehouse::new();
//! warehouse.load(&schema, &TableNames::default()).await?;
//! assert_eq!(warehouse.row_count("fact_reviews").await, Some(4));
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Fail connection tests and loads
//! let warehouse = MemoryWarehouse::new().with_connection_failure();
//!
//! // Fail while inserting into one table; the previous snapshot is kept
//! let warehouse = MemoryWarehouse::new().with_failure_on("fact_reviews");
//! ```

use crate::adapter::{LoadError, LoadSummary, WarehouseLoader};
use listingdw_core::{StarSchema, TableNames};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A committed load
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    tables: TableNames,
    schema: StarSchema,
}

/// In-memory warehouse
///
/// Clones share state, so a test can keep a handle while the pipeline owns
/// the boxed loader.
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    /// Last committed snapshot
    committed: Arc<RwLock<Option<Snapshot>>>,

    /// Number of committed loads
    loads: Arc<RwLock<usize>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Fail while inserting into this table
    fail_on_table: Option<String>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure to fail all connection tests and loads
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure a failure while inserting into `table`
    pub fn with_failure_on(mut self, table: impl Into<String>) -> Self {
        self.fail_on_table = Some(table.into());
        self
    }

    /// The committed star schema, if any load succeeded
    pub async fn snapshot(&self) -> Option<StarSchema> {
        self.committed.read().await.as_ref().map(|s| s.schema.clone())
    }

    /// Rows in a committed table, by warehouse table name
    pub async fn row_count(&self, table: &str) -> Option<usize> {
        let committed = self.committed.read().await;
        let snapshot = committed.as_ref()?;
        let counts = snapshot.schema.row_counts();
        let names = &snapshot.tables;

        if table == names.dim_date {
            Some(counts.dim_date)
        } else if table == names.dim_neighborhood {
            Some(counts.dim_neighborhood)
        } else if table == names.dim_host {
            Some(counts.dim_host)
        } else if table == names.dim_listing {
            Some(counts.dim_listing)
        } else if table == names.fact_reviews {
            Some(counts.fact_reviews)
        } else {
            None
        }
    }

    pub async fn load_count(&self) -> usize {
        *self.loads.read().await
    }

    fn check_connection(&self) -> Result<(), LoadError> {
        if self.fail_connection {
            Err(LoadError::ConnectionError("Simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl WarehouseLoader for MemoryWarehouse {
    fn name(&self) -> &'static str {
        "Memory"
    }

    async fn test_connection(&self) -> Result<(), LoadError> {
        self.check_connection()
    }

    async fn load(&self, schema: &StarSchema, tables: &TableNames) -> Result<LoadSummary, LoadError> {
        self.check_connection()?;

        // Stage every table before touching the committed snapshot
        for table in tables.load_order() {
            if self.fail_on_table.as_deref() == Some(table) {
                tracing::error!("Simulated insert failure on {}, rolling back", table);
                return Err(LoadError::QueryError {
                    table: table.to_string(),
                    message: "Simulated insert failure".to_string(),
                });
            }
        }

        let staged = Snapshot {
            tables: tables.clone(),
            schema: schema.clone(),
        };
        *self.committed.write().await = Some(staged);
        *self.loads.write().await += 1;

        let summary = LoadSummary::for_schema(self.name(), schema, tables);
        tracing::info!("Committed {} rows to the in-memory warehouse", summary.total_rows());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listingdw_core::{DimDate, FactReview};

    fn schema(facts: usize) -> StarSchema {
        let mut schema = StarSchema::default();
        schema.dim_date.push(DimDate {
            date_sk: 1,
            full_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            year: 2024,
            month: 1,
            day: 1,
            month_name: "January".to_string(),
            day_of_week: 1,
            day_name: "Monday".to_string(),
        });
        for _ in 0..facts {
            schema.fact_reviews.push(FactReview { listing_sk: 1, host_sk: 1, date_sk: 1, review_count: 1 });
        }
        schema
    }

    #[tokio::test]
    async fn load_replaces_snapshot() {
        let warehouse = MemoryWarehouse::new();
        let tables = TableNames::default();
        assert_eq!(warehouse.snapshot().await, None);

        warehouse.load(&schema(3), &tables).await.unwrap();
        let summary = warehouse.load(&schema(2), &tables).await.unwrap();

        assert_eq!(summary.backend, "Memory");
        assert_eq!(summary.total_rows(), 3);
        assert_eq!(warehouse.row_count("fact_reviews").await, Some(2));
        assert_eq!(warehouse.row_count("dim_date").await, Some(1));
        assert_eq!(warehouse.row_count("unknown").await, None);
        assert_eq!(warehouse.load_count().await, 2);
    }

    #[tokio::test]
    async fn custom_table_names() {
        let warehouse = MemoryWarehouse::new();
        let tables = TableNames { fact_reviews: "fct_review".to_string(), ..TableNames::default() };

        warehouse.load(&schema(1), &tables).await.unwrap();
        assert_eq!(warehouse.row_count("fct_review").await, Some(1));
        assert_eq!(warehouse.row_count("fact_reviews").await, None);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_snapshot() {
        let healthy = MemoryWarehouse::new();
        let tables = TableNames::default();
        healthy.load(&schema(3), &tables).await.unwrap();

        let failing = MemoryWarehouse { fail_on_table: Some("fact_reviews".to_string()), ..healthy.clone() };
        let err = failing.load(&schema(1), &tables).await.unwrap_err();

        assert!(matches!(err, LoadError::QueryError { ref table, .. } if table == "fact_reviews"));
        assert_eq!(healthy.snapshot().await, Some(schema(3)));
        assert_eq!(healthy.load_count().await, 1);
    }

    #[tokio::test]
    async fn connection_failure() {
        let warehouse = MemoryWarehouse::new().with_connection_failure();

        assert!(matches!(warehouse.test_connection().await, Err(LoadError::ConnectionError(_))));
        assert!(warehouse.load(&schema(1), &TableNames::default()).await.is_err());
        assert_eq!(warehouse.snapshot().await, None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let warehouse = MemoryWarehouse::new();
        let handle = warehouse.clone();

        warehouse.load(&schema(1), &TableNames::default()).await.unwrap();
        assert_eq!(handle.load_count().await, 1);
    }
}
