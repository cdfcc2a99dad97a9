//! Star schema transform

use crate::dimensions::{build_dim_date, build_dim_host, build_dim_listing, build_dim_neighborhood};
use crate::facts::build_fact_reviews;
use chrono::NaiveDate;
use listingdw_core::{StarSchema, ValidListing, ValidReview};

/// Builds the four dimensions and the fact table from validated data
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    run_date: NaiveDate,
}

impl Transformer {
    /// `run_date` becomes `valid_from` of every host version
    pub fn new(run_date: NaiveDate) -> Self {
        Self { run_date }
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn run(&self, listings: &[ValidListing], reviews: &[ValidReview]) -> Result<StarSchema, TransformError> {
        let dim_date = build_dim_date(reviews);
        let dim_neighborhood = build_dim_neighborhood(listings);
        let dim_host = build_dim_host(listings, self.run_date);
        let dim_listing = build_dim_listing(listings, &dim_neighborhood)?;
        let fact_reviews = build_fact_reviews(reviews, &dim_listing, &dim_host, &dim_date);

        let schema = StarSchema {
            dim_date,
            dim_neighborhood,
            dim_host,
            dim_listing,
            fact_reviews,
        };

        let counts = schema.row_counts();
        tracing::info!(
            "Transform complete. dim_date={}, dim_neighborhood={}, dim_host={}, dim_listing={}, fact_reviews={}",
            counts.dim_date,
            counts.dim_neighborhood,
            counts.dim_host,
            counts.dim_listing,
            counts.fact_reviews
        );

        Ok(schema)
    }
}

/// Transform errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("Listing {listing_id}: price {value:?} is not a number after cleaning")]
    InvalidPrice { listing_id: String, value: String },
}
