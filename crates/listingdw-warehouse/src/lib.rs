//! Warehouse loaders for the listing star schema
//!
//! This module provides loaders that replace the contents of the five
//! warehouse tables with a freshly transformed star schema.
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `postgres` - PostgreSQL support
//!
//! The in-memory warehouse is always available.
//!
//! ## Example
//!
//! ```rust,ignore
//! use listingdw_warehouse::{PostgresLoader, WarehouseLoader};
//!
//! let loader = PostgresLoader::connect(&config.warehouse).await?;
//! let summary = loader.load(&schema, &config.tables).await?;
//! ```

pub mod adapter;
pub mod memory;
pub mod postgres;

pub use adapter::{LoadError, LoadSummary, TableLoad, WarehouseLoader};
pub use memory::MemoryWarehouse;
pub use postgres::PostgresLoader;
