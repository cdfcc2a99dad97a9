//! Data quality checks over the raw extracts
//!
//! Checks run in a fixed order and each one sees the rows left by the
//! previous ones, so a row is only ever counted against the first check
//! that drops it. No check is fatal.

use crate::prune::prune_orphans;
use listingdw_core::{
    coerce_numeric, CheckResult, QualityReport, RawListing, RawReview, RawTable, ValidListing,
    ValidReview, ValidationConfig, LISTING_COLUMNS, REVIEW_COLUMNS,
};
use std::collections::HashSet;

/// Stable check names as they appear in the report
pub mod check_names {
    pub const LISTINGS_COLUMNS_PRESENT: &str = "listings_columns_present";
    pub const REVIEWS_COLUMNS_PRESENT: &str = "reviews_columns_present";
    pub const LISTINGS_ID_NOT_NULL: &str = "listings_id_not_null";
    pub const REVIEWS_LISTING_ID_NOT_NULL: &str = "reviews_listing_id_not_null";
    pub const LISTINGS_ID_UNIQUE: &str = "listings_id_unique";
    pub const LATITUDE_IN_RANGE: &str = "latitude_in_range";
    pub const LONGITUDE_IN_RANGE: &str = "longitude_in_range";
    pub const AVAILABILITY_IN_RANGE: &str = "availability_in_range";
    pub const PRICE_NOT_NULL_RAW: &str = "price_not_null_raw";
    pub const REVIEWS_LISTING_ID_FK: &str = "reviews_listing_id_fk";
}

use check_names::*;

/// Output of the quality checker
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub listings: Vec<ValidListing>,
    pub reviews: Vec<ValidReview>,
    pub report: QualityReport,
}

/// Runs the fixed battery of checks
#[derive(Debug, Clone)]
pub struct QualityChecker {
    thresholds: ValidationConfig,
}

/// A listing with an id, numeric fields coerced but not yet range-checked
struct Coerced {
    id: String,
    raw: RawListing,
    latitude: Option<f64>,
    longitude: Option<f64>,
    availability: Option<f64>,
}

/// A listing that passed the geo checks
struct Located {
    id: String,
    raw: RawListing,
    latitude: f64,
    longitude: f64,
    availability: Option<f64>,
}

impl QualityChecker {
    pub fn new(thresholds: ValidationConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ValidationConfig {
        &self.thresholds
    }

    /// Validate and clean both extracts
    pub fn run(&self, listings: RawTable<RawListing>, reviews: RawTable<RawReview>) -> Validated {
        let cfg = &self.thresholds;
        let mut checks = Vec::new();

        // Column presence
        record(&mut checks, CheckResult::missing_columns(
            LISTINGS_COLUMNS_PRESENT,
            listings.missing_columns(&LISTING_COLUMNS),
        ));
        record(&mut checks, CheckResult::missing_columns(
            REVIEWS_COLUMNS_PRESENT,
            reviews.missing_columns(&REVIEW_COLUMNS),
        ));

        // Null identifiers
        let listing_rows = listings.rows;
        let review_rows = reviews.rows;

        record(&mut checks, CheckResult::null_count(
            LISTINGS_ID_NOT_NULL,
            listing_rows.iter().filter(|r| r.id.is_none()).count(),
        ));
        record(&mut checks, CheckResult::null_count(
            REVIEWS_LISTING_ID_NOT_NULL,
            review_rows.iter().filter(|r| r.listing_id.is_none()).count(),
        ));

        let identified: Vec<(String, RawListing)> = listing_rows
            .into_iter()
            .filter_map(|raw| raw.id.clone().map(|id| (id, raw)))
            .collect();
        let reviews: Vec<ValidReview> = review_rows
            .into_iter()
            .filter_map(|raw| {
                raw.listing_id.map(|listing_id| ValidReview { listing_id, date: raw.date })
            })
            .collect();

        // Uniqueness, then keep the first occurrence of each id
        let mut seen = HashSet::new();
        let duplicates = identified.iter().filter(|(id, _)| !seen.insert(id.as_str())).count();
        record(&mut checks, CheckResult::duplicate_count(LISTINGS_ID_UNIQUE, duplicates));

        let before = identified.len();
        let mut seen = HashSet::new();
        let unique: Vec<(String, RawListing)> = identified
            .into_iter()
            .filter(|(id, _)| seen.insert(id.clone()))
            .collect();
        if unique.len() != before {
            tracing::warn!("Deduplicated listings on id. Before={}, After={}", before, unique.len());
        }

        // Numeric coercion
        let coerced: Vec<Coerced> = unique
            .into_iter()
            .map(|(id, raw)| Coerced {
                latitude: coerce_numeric(raw.latitude.as_deref()),
                longitude: coerce_numeric(raw.longitude.as_deref()),
                availability: coerce_numeric(raw.availability_365.as_deref()),
                id,
                raw,
            })
            .collect();

        // Latitude / longitude, counted on the same snapshot and dropped together
        let lat = |c: &Coerced| within(c.latitude, cfg.min_latitude, cfg.max_latitude);
        let lon = |c: &Coerced| within(c.longitude, cfg.min_longitude, cfg.max_longitude);

        record(&mut checks, CheckResult::invalid_count(
            LATITUDE_IN_RANGE,
            coerced.iter().filter(|&c| lat(c).is_none()).count(),
        ));
        record(&mut checks, CheckResult::invalid_count(
            LONGITUDE_IN_RANGE,
            coerced.iter().filter(|&c| lon(c).is_none()).count(),
        ));

        let before = coerced.len();
        let located: Vec<Located> = coerced
            .into_iter()
            .filter_map(|c| match (lat(&c), lon(&c)) {
                (Some(latitude), Some(longitude)) => Some(Located {
                    id: c.id,
                    raw: c.raw,
                    latitude,
                    longitude,
                    availability: c.availability,
                }),
                _ => None,
            })
            .collect();
        if located.len() != before {
            tracing::warn!("Dropping {} listings with bad lat/lon", before - located.len());
        }

        // Availability, on what survived the geo pass
        let avail = |l: &Located| within(l.availability, 0.0, cfg.max_availability);

        let invalid_availability = located.iter().filter(|&l| avail(l).is_none()).count();
        record(&mut checks, CheckResult::invalid_count(AVAILABILITY_IN_RANGE, invalid_availability));
        if invalid_availability > 0 {
            tracing::warn!("Dropping {} listings with invalid availability", invalid_availability);
        }

        let listings: Vec<ValidListing> = located
            .into_iter()
            .filter_map(|l| avail(&l).map(|availability| into_valid(l, availability)))
            .collect();

        // Raw price presence is recorded only; cleaning happens in transform
        record(&mut checks, CheckResult::null_count(
            PRICE_NOT_NULL_RAW,
            listings.iter().filter(|l| l.price.is_none()).count(),
        ));

        // Referential integrity
        let listing_ids: HashSet<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        let (reviews, orphans) = prune_orphans(reviews, &listing_ids);
        record(&mut checks, CheckResult::orphan_reviews(REVIEWS_LISTING_ID_FK, orphans));
        if orphans > 0 {
            tracing::warn!("Dropping {} reviews with unknown listing_id", orphans);
        }

        let report = QualityReport::new(listings.len(), reviews.len(), checks);

        tracing::info!(
            "Validation complete. listings={}, reviews={}, failed_checks={}",
            listings.len(),
            reviews.len(),
            report.failed_checks().count()
        );

        Validated { listings, reviews, report }
    }
}

/// Append a result, warning on failure
fn record(checks: &mut Vec<CheckResult>, result: CheckResult) {
    if !result.passed() {
        tracing::warn!("{} failed. count={}", result.name, result.count());
    }
    checks.push(result);
}

/// The value, if present and inside the inclusive bounds
fn within(value: Option<f64>, min: f64, max: f64) -> Option<f64> {
    value.filter(|v| (min..=max).contains(v))
}

fn into_valid(located: Located, availability_365: f64) -> ValidListing {
    let Located { id, raw, latitude, longitude, .. } = located;
    ValidListing {
        id,
        name: raw.name,
        host_id: raw.host_id,
        host_name: raw.host_name,
        neighbourhood_group: raw.neighbourhood_group,
        neighbourhood: raw.neighbourhood,
        latitude,
        longitude,
        room_type: raw.room_type,
        price: raw.price,
        minimum_nights: raw.minimum_nights,
        number_of_reviews: raw.number_of_reviews,
        last_review: raw.last_review,
        reviews_per_month: raw.reviews_per_month,
        calculated_host_listings_count: raw.calculated_host_listings_count,
        availability_365,
        number_of_reviews_ltm: raw.number_of_reviews_ltm,
        license: raw.license,
    }
}
