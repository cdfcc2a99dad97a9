//! PostgreSQL warehouse loader
//!
//! Performs a full-refresh load: one transaction truncates the five star
//! schema tables (`RESTART IDENTITY CASCADE`) and inserts every row,
//! dimensions first and the fact table last. Any failure rolls the
//! transaction back, leaving the previous load in place.
//!
//! The target tables must already exist (see `sql/schema.sql`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = WarehouseConfig::default().with_env_overrides(|k| std::env::var(k).ok())?;
//! let loader = PostgresLoader::connect(&config).await?;
//! loader.load(&schema, &TableNames::default()).await?;
//! ```

use crate::adapter::{LoadError, LoadSummary, WarehouseLoader};
use listingdw_core::{StarSchema, TableNames, WarehouseConfig};

#[cfg(feature = "postgres")]
use tokio_postgres::{types::ToSql, Client, Config as PgConfig, NoTls, Transaction};

#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;

#[cfg(feature = "postgres")]
use native_tls::TlsConnector;

#[cfg(feature = "postgres")]
use tokio::sync::Mutex;

#[cfg(not(feature = "postgres"))]
const NOT_COMPILED: &str = "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres";

/// PostgreSQL warehouse loader
pub struct PostgresLoader {
    /// PostgreSQL client (only available with postgres feature).
    /// Transactions need exclusive access.
    #[cfg(feature = "postgres")]
    client: Mutex<Client>,

    host: String,
    port: u16,
    database: String,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "postgres"))]
    _phantom: std::marker::PhantomData<()>,
}

impl PostgresLoader {
    /// Connect using the `[warehouse]` section
    ///
    /// The password comes from `DB_PASSWORD` (already applied to `config`
    /// by [`WarehouseConfig::with_env_overrides`]).
    #[cfg(feature = "postgres")]
    pub async fn connect(config: &WarehouseConfig) -> Result<Self, LoadError> {
        let mut pg = PgConfig::new();
        pg.host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user);
        if let Some(password) = &config.password {
            pg.password(password);
        }

        let host = config.host.clone();
        let port = config.port;

        let client = if config.tls {
            let connector = TlsConnector::builder()
                .build()
                .map_err(|e| LoadError::ConfigError(format!("Failed to create TLS connector: {}", e)))?;

            let (client, connection) = pg
                .connect(MakeTlsConnector::new(connector))
                .await
                .map_err(|e| LoadError::ConnectionError(format!(
                    "Failed to connect to PostgreSQL at {}:{} with TLS: {}",
                    host, port, e
                )))?;

            // Spawn connection handler in background
            let (h, p) = (host.clone(), port);
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!("PostgreSQL TLS connection error ({}:{}): {}", h, p, e);
                }
            });
            client
        } else {
            let (client, connection) = pg
                .connect(NoTls)
                .await
                .map_err(|e| LoadError::ConnectionError(format!(
                    "Failed to connect to PostgreSQL at {}:{}: {}",
                    host, port, e
                )))?;

            let (h, p) = (host.clone(), port);
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!("PostgreSQL connection error ({}:{}): {}", h, p, e);
                }
            });
            client
        };

        tracing::info!("Connected to PostgreSQL at {}:{}/{}", host, port, config.database);

        Ok(Self {
            client: Mutex::new(client),
            host,
            port,
            database: config.database.clone(),
        })
    }

    /// Create loader without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(_config: &WarehouseConfig) -> Result<Self, LoadError> {
        Err(LoadError::ConfigError(NOT_COMPILED.to_string()))
    }

    /// Get the connection host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the connection port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Quote a table name, keeping an optional schema prefix (`schema.table`)
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// `INSERT INTO "table" ("a", "b") VALUES ($1, $2)`
pub fn insert_statement(table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let params: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        params.join(", ")
    )
}

/// `TRUNCATE TABLE ... RESTART IDENTITY CASCADE` over all five tables
pub fn truncate_statement(tables: &TableNames) -> String {
    let names: Vec<String> = tables.load_order().iter().map(|t| quote_ident(t)).collect();
    format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", names.join(", "))
}

#[cfg(feature = "postgres")]
type Params = Vec<Box<dyn ToSql + Sync + Send>>;

#[cfg(feature = "postgres")]
fn param<T: ToSql + Sync + Send + 'static>(value: T) -> Box<dyn ToSql + Sync + Send> {
    Box::new(value)
}

#[cfg(feature = "postgres")]
fn query_error(table: &str, e: tokio_postgres::Error) -> LoadError {
    LoadError::QueryError {
        table: table.to_string(),
        message: e.to_string(),
    }
}

/// Insert every row of one table with a single prepared statement
#[cfg(feature = "postgres")]
async fn insert_all<R, F>(
    tx: &Transaction<'_>,
    table: &str,
    columns: &[&str],
    rows: &[R],
    params: F,
) -> Result<(), LoadError>
where
    R: Sync,
    F: Fn(&R) -> Params + Send + Sync,
{
    let stmt = tx
        .prepare(&insert_statement(table, columns))
        .await
        .map_err(|e| query_error(table, e))?;

    for row in rows {
        let values = params(row);
        let refs: Vec<&(dyn ToSql + Sync)> = values
            .iter()
            .map(|v| &**v as &(dyn ToSql + Sync))
            .collect();
        tx.execute(&stmt, &refs).await.map_err(|e| query_error(table, e))?;
    }

    tracing::info!("Loaded {} rows into {}", rows.len(), table);
    Ok(())
}

#[async_trait::async_trait]
impl WarehouseLoader for PostgresLoader {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    #[cfg(feature = "postgres")]
    async fn test_connection(&self) -> Result<(), LoadError> {
        self.client
            .lock()
            .await
            .query("SELECT 1", &[])
            .await
            .map_err(|e| LoadError::ConnectionError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "postgres"))]
    async fn test_connection(&self) -> Result<(), LoadError> {
        Err(LoadError::ConfigError(NOT_COMPILED.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn load(&self, schema: &StarSchema, tables: &TableNames) -> Result<LoadSummary, LoadError> {
        use listingdw_core::{DimDate, DimHost, DimListing, DimNeighborhood, FactReview};

        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| LoadError::TransactionError(e.to_string()))?;

        tracing::info!("Truncating target tables");
        tx.batch_execute(&truncate_statement(tables))
            .await
            .map_err(|e| LoadError::TransactionError(format!("Truncate failed: {}", e)))?;

        insert_all(&tx, &tables.dim_date, &DimDate::COLUMNS, &schema.dim_date, |d| {
            vec![
                param(d.date_sk),
                param(d.full_date),
                param(d.year),
                param(d.month as i32),
                param(d.day as i32),
                param(d.month_name.clone()),
                param(d.day_of_week as i32),
                param(d.day_name.clone()),
            ]
        })
        .await?;

        insert_all(&tx, &tables.dim_neighborhood, &DimNeighborhood::COLUMNS, &schema.dim_neighborhood, |n| {
            vec![
                param(n.neighborhood_sk),
                param(n.neighbourhood_group.clone()),
                param(n.neighbourhood.clone()),
            ]
        })
        .await?;

        insert_all(&tx, &tables.dim_host, &DimHost::COLUMNS, &schema.dim_host, |h| {
            vec![
                param(h.host_sk),
                param(h.host_id.clone()),
                param(h.host_name.clone()),
                param(h.calculated_host_listings_count),
                param(h.valid_from),
                param(h.valid_to),
                param(h.is_current),
            ]
        })
        .await?;

        insert_all(&tx, &tables.dim_listing, &DimListing::COLUMNS, &schema.dim_listing, |l| {
            vec![
                param(l.listing_sk),
                param(l.listing_id.clone()),
                param(l.name.clone()),
                param(l.host_id.clone()),
                param(l.neighborhood_sk),
                param(l.room_type.clone()),
                param(l.price),
                param(l.minimum_nights),
                param(l.availability_365),
                param(l.number_of_reviews),
                param(l.reviews_per_month),
                param(l.number_of_reviews_ltm),
                param(l.license.clone()),
                param(l.latitude),
                param(l.longitude),
                param(l.estimated_occupancy_rate),
                param(l.estimated_monthly_revenue),
                param(l.price_tier.map(|t| t.as_str())),
            ]
        })
        .await?;

        insert_all(&tx, &tables.fact_reviews, &FactReview::COLUMNS, &schema.fact_reviews, |f| {
            vec![
                param(f.listing_sk),
                param(f.host_sk),
                param(f.date_sk),
                param(f.review_count),
            ]
        })
        .await?;

        tx.commit()
            .await
            .map_err(|e| LoadError::TransactionError(format!("Commit failed: {}", e)))?;

        let summary = LoadSummary::for_schema(self.name(), schema, tables);
        tracing::info!("Committed {} rows to {}", summary.total_rows(), self.database);
        Ok(summary)
    }

    #[cfg(not(feature = "postgres"))]
    async fn load(&self, _schema: &StarSchema, _tables: &TableNames) -> Result<LoadSummary, LoadError> {
        Err(LoadError::ConfigError(NOT_COMPILED.to_string()))
    }
}
