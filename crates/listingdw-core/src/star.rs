//! Star schema records (stable warehouse shape)
//!
//! Column order of every record matches the warehouse table it loads into.
//! Do not reorder fields without updating `sql/schema.sql`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Surrogate key: dense, 1-based
pub type SurrogateKey = i64;

/// One row per distinct review date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimDate {
    pub date_sk: SurrogateKey,
    pub full_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub month_name: String,
    /// Monday = 1 .. Sunday = 7
    pub day_of_week: u32,
    pub day_name: String,
}

impl DimDate {
    pub const COLUMNS: [&'static str; 8] = [
        "date_sk",
        "full_date",
        "year",
        "month",
        "day",
        "month_name",
        "day_of_week",
        "day_name",
    ];
}

/// One row per distinct (group, neighbourhood) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimNeighborhood {
    pub neighborhood_sk: SurrogateKey,
    pub neighbourhood_group: Option<String>,
    pub neighbourhood: Option<String>,
}

impl DimNeighborhood {
    pub const COLUMNS: [&'static str; 3] = ["neighborhood_sk", "neighbourhood_group", "neighbourhood"];
}

/// One row per host (SCD2-shaped)
///
/// A run only produces current versions. Closing a version is done with
/// [`DimHost::expire`], which needs no change to the table shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimHost {
    pub host_sk: SurrogateKey,
    pub host_id: String,
    pub host_name: Option<String>,
    pub calculated_host_listings_count: Option<i64>,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    pub is_current: bool,
}

impl DimHost {
    pub const COLUMNS: [&'static str; 7] = [
        "host_sk",
        "host_id",
        "host_name",
        "calculated_host_listings_count",
        "valid_from",
        "valid_to",
        "is_current",
    ];

    /// Close this version as of `valid_to`
    pub fn expire(self, valid_to: NaiveDate) -> Self {
        Self {
            valid_to: Some(valid_to),
            is_current: false,
            ..self
        }
    }
}

/// Price banding used by `dim_listing.price_tier`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Budget,
    Mid,
    Premium,
}

impl PriceTier {
    /// Half-open bins (-1, 50], (50, 150], (150, inf)
    ///
    /// Prices at or below -1 (and NaN) fall outside every bin.
    pub fn from_price(price: f64) -> Option<Self> {
        if price.is_nan() || price <= -1.0 {
            None
        } else if price <= 50.0 {
            Some(Self::Budget)
        } else if price <= 150.0 {
            Some(Self::Mid)
        } else {
            Some(Self::Premium)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Mid => "mid",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row per listing that survived validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimListing {
    pub listing_sk: SurrogateKey,
    pub listing_id: String,
    pub name: Option<String>,
    pub host_id: Option<String>,
    pub neighborhood_sk: Option<SurrogateKey>,
    pub room_type: Option<String>,
    pub price: f64,
    pub minimum_nights: i64,
    pub availability_365: i64,
    pub number_of_reviews: i64,
    pub reviews_per_month: f64,
    pub number_of_reviews_ltm: i64,
    pub license: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub estimated_occupancy_rate: f64,
    pub estimated_monthly_revenue: f64,
    pub price_tier: Option<PriceTier>,
}

impl DimListing {
    pub const COLUMNS: [&'static str; 18] = [
        "listing_sk",
        "listing_id",
        "name",
        "host_id",
        "neighborhood_sk",
        "room_type",
        "price",
        "minimum_nights",
        "availability_365",
        "number_of_reviews",
        "reviews_per_month",
        "number_of_reviews_ltm",
        "license",
        "latitude",
        "longitude",
        "estimated_occupancy_rate",
        "estimated_monthly_revenue",
        "price_tier",
    ];
}

/// One row per resolved review event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactReview {
    pub listing_sk: SurrogateKey,
    pub host_sk: SurrogateKey,
    pub date_sk: SurrogateKey,
    pub review_count: i32,
}

impl FactReview {
    pub const COLUMNS: [&'static str; 4] = ["listing_sk", "host_sk", "date_sk", "review_count"];
}

/// The full output of one transform, handed to the loader as a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarSchema {
    pub dim_date: Vec<DimDate>,
    pub dim_neighborhood: Vec<DimNeighborhood>,
    pub dim_host: Vec<DimHost>,
    pub dim_listing: Vec<DimListing>,
    pub fact_reviews: Vec<FactReview>,
}

impl StarSchema {
    /// Row counts in load order
    pub fn row_counts(&self) -> TableCounts {
        TableCounts {
            dim_date: self.dim_date.len(),
            dim_neighborhood: self.dim_neighborhood.len(),
            dim_host: self.dim_host.len(),
            dim_listing: self.dim_listing.len(),
            fact_reviews: self.fact_reviews.len(),
        }
    }

    /// SHA-256 of the canonical JSON encoding, hex encoded
    ///
    /// Two runs over unchanged input produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        // Serializing plain structs and vectors cannot fail
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.update(&bytes);
        }
        hex::encode(hasher.finalize())
    }
}

/// Row counts per warehouse table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub dim_date: usize,
    pub dim_neighborhood: usize,
    pub dim_host: usize,
    pub dim_listing: usize,
    pub fact_reviews: usize,
}

impl TableCounts {
    pub fn total(&self) -> usize {
        self.dim_date + self.dim_neighborhood + self.dim_host + self.dim_listing + self.fact_reviews
    }
}
