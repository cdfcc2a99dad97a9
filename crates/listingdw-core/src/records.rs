//! Raw and validated input records
//!
//! Raw records carry every field as optional text, exactly as ingested.
//! Validated records are produced by the quality checker and carry the
//! fields it has already coerced.

use serde::{Deserialize, Serialize};

/// Columns the listings extract must provide
pub const LISTING_COLUMNS: [&str; 18] = [
    "id",
    "name",
    "host_id",
    "host_name",
    "neighbourhood_group",
    "neighbourhood",
    "latitude",
    "longitude",
    "room_type",
    "price",
    "minimum_nights",
    "number_of_reviews",
    "last_review",
    "reviews_per_month",
    "calculated_host_listings_count",
    "availability_365",
    "number_of_reviews_ltm",
    "license",
];

/// Columns the reviews extract must provide
pub const REVIEW_COLUMNS: [&str; 2] = ["listing_id", "date"];

/// A tabular extract: header as read plus typed rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable<T> {
    /// Column names in source order
    pub columns: Vec<String>,

    /// Rows in source order
    pub rows: Vec<T>,
}

impl<T> RawTable<T> {
    pub fn new(columns: Vec<String>, rows: Vec<T>) -> Self {
        Self { columns, rows }
    }

    /// Required columns absent from the header, in `required` order
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|col| !self.columns.iter().any(|c| c == *col))
            .map(|col| col.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RawTable<RawListing> {
    /// A listings table with the full required header
    pub fn listings(rows: Vec<RawListing>) -> Self {
        Self::new(LISTING_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    }
}

impl RawTable<RawReview> {
    /// A reviews table with the full required header
    pub fn reviews(rows: Vec<RawReview>) -> Self {
        Self::new(REVIEW_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    }
}

/// One rental unit as ingested
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawListing {
    pub id: Option<String>,
    pub name: Option<String>,
    pub host_id: Option<String>,
    pub host_name: Option<String>,
    pub neighbourhood_group: Option<String>,
    pub neighbourhood: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub room_type: Option<String>,
    pub price: Option<String>,
    pub minimum_nights: Option<String>,
    pub number_of_reviews: Option<String>,
    pub last_review: Option<String>,
    pub reviews_per_month: Option<String>,
    pub calculated_host_listings_count: Option<String>,
    pub availability_365: Option<String>,
    pub number_of_reviews_ltm: Option<String>,
    pub license: Option<String>,
}

/// One (listing, review date) pair as ingested
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReview {
    pub listing_id: Option<String>,
    pub date: Option<String>,
}

impl RawReview {
    pub fn new(listing_id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            listing_id: Some(listing_id.into()),
            date: Some(date.into()),
        }
    }
}

/// A listing that survived validation
///
/// `id` is present and unique across the validated collection; the three
/// range-checked fields are finite and within the configured bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidListing {
    pub id: String,
    pub name: Option<String>,
    pub host_id: Option<String>,
    pub host_name: Option<String>,
    pub neighbourhood_group: Option<String>,
    pub neighbourhood: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub room_type: Option<String>,
    pub price: Option<String>,
    pub minimum_nights: Option<String>,
    pub number_of_reviews: Option<String>,
    pub last_review: Option<String>,
    pub reviews_per_month: Option<String>,
    pub calculated_host_listings_count: Option<String>,
    pub availability_365: f64,
    pub number_of_reviews_ltm: Option<String>,
    pub license: Option<String>,
}

/// A review whose listing exists among the validated listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidReview {
    pub listing_id: String,
    pub date: Option<String>,
}

/// Coerce optional text to a finite number
///
/// Missing, unparseable and non-finite values (`NaN`, `inf`) become `None`.
pub fn coerce_numeric(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_keep_required_order() {
        let table: RawTable<RawReview> = RawTable::new(vec!["date".to_string()], vec![]);
        assert_eq!(table.missing_columns(&REVIEW_COLUMNS), vec!["listing_id"]);

        let full = RawTable::reviews(vec![]);
        assert!(full.missing_columns(&REVIEW_COLUMNS).is_empty());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(coerce_numeric(Some("12.5")), Some(12.5));
        assert_eq!(coerce_numeric(Some(" -3 ")), Some(-3.0));
        assert_eq!(coerce_numeric(Some("abc")), None);
        assert_eq!(coerce_numeric(Some("")), None);
        assert_eq!(coerce_numeric(Some("NaN")), None);
        assert_eq!(coerce_numeric(Some("inf")), None);
        assert_eq!(coerce_numeric(None), None);
    }
}
