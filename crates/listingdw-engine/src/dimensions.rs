//! Dimension builders
//!
//! Every builder is deterministic: surrogate keys are dense, start at 1 and
//! depend only on input order (or, for dates, on sort order).

use crate::metrics::{
    clean_price, coerce_count, coerce_measure, coerce_optional_count, monthly_revenue,
    occupancy_rate,
};
use crate::transform::TransformError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use listingdw_core::{
    DimDate, DimHost, DimListing, DimNeighborhood, PriceTier, SurrogateKey, ValidListing,
    ValidReview,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Neighbourhood lookup key: (group, neighbourhood)
pub type NeighborhoodKey = (Option<String>, Option<String>);

/// Parse a review date
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time (`YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` or RFC 3339), in which case the date part is used.
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// One row per distinct review date, keyed in ascending date order
pub fn build_dim_date(reviews: &[ValidReview]) -> Vec<DimDate> {
    let dates: BTreeSet<NaiveDate> = reviews
        .iter()
        .filter_map(|r| r.date.as_deref().and_then(parse_review_date))
        .collect();

    dates
        .into_iter()
        .zip(1..)
        .map(|(full_date, date_sk)| DimDate {
            date_sk,
            full_date,
            year: full_date.year(),
            month: full_date.month(),
            day: full_date.day(),
            month_name: full_date.format("%B").to_string(),
            day_of_week: full_date.weekday().number_from_monday(),
            day_name: full_date.format("%A").to_string(),
        })
        .collect()
}

/// One row per distinct (group, neighbourhood) pair, in first-seen order
pub fn build_dim_neighborhood(listings: &[ValidListing]) -> Vec<DimNeighborhood> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for listing in listings {
        let key: NeighborhoodKey = (listing.neighbourhood_group.clone(), listing.neighbourhood.clone());
        if seen.insert(key.clone()) {
            rows.push(DimNeighborhood {
                neighborhood_sk: next_key(rows.len()),
                neighbourhood_group: key.0,
                neighbourhood: key.1,
            });
        }
    }

    rows
}

/// One current version per distinct host id, in first-seen order
///
/// Listings without a host id contribute no host row.
pub fn build_dim_host(listings: &[ValidListing], run_date: NaiveDate) -> Vec<DimHost> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for listing in listings {
        let Some(host_id) = listing.host_id.as_deref() else {
            continue;
        };
        if seen.insert(host_id) {
            rows.push(DimHost {
                host_sk: next_key(rows.len()),
                host_id: host_id.to_string(),
                host_name: listing.host_name.clone(),
                calculated_host_listings_count: coerce_optional_count(
                    listing.calculated_host_listings_count.as_deref(),
                ),
                valid_from: run_date,
                valid_to: None,
                is_current: true,
            });
        }
    }

    rows
}

/// One row per distinct listing id, with cleaned measures and derived metrics
pub fn build_dim_listing(
    listings: &[ValidListing],
    neighborhoods: &[DimNeighborhood],
) -> Result<Vec<DimListing>, TransformError> {
    let neighborhood_keys: HashMap<NeighborhoodKey, SurrogateKey> = neighborhoods
        .iter()
        .map(|n| ((n.neighbourhood_group.clone(), n.neighbourhood.clone()), n.neighborhood_sk))
        .collect();

    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for listing in listings {
        if !seen.insert(listing.id.as_str()) {
            continue;
        }

        let price = clean_price(listing.price.as_deref()).ok_or_else(|| TransformError::InvalidPrice {
            listing_id: listing.id.clone(),
            value: listing.price.clone().unwrap_or_default(),
        })?;
        let reviews_per_month = coerce_measure(listing.reviews_per_month.as_deref());
        let occupancy = occupancy_rate(reviews_per_month);
        let key = (listing.neighbourhood_group.clone(), listing.neighbourhood.clone());

        rows.push(DimListing {
            listing_sk: next_key(rows.len()),
            listing_id: listing.id.clone(),
            name: listing.name.clone(),
            host_id: listing.host_id.clone(),
            neighborhood_sk: neighborhood_keys.get(&key).copied(),
            room_type: listing.room_type.clone(),
            price,
            minimum_nights: coerce_count(listing.minimum_nights.as_deref()),
            availability_365: listing.availability_365.trunc() as i64,
            number_of_reviews: coerce_count(listing.number_of_reviews.as_deref()),
            reviews_per_month,
            number_of_reviews_ltm: coerce_count(listing.number_of_reviews_ltm.as_deref()),
            license: listing.license.clone(),
            latitude: listing.latitude,
            longitude: listing.longitude,
            estimated_occupancy_rate: occupancy,
            estimated_monthly_revenue: monthly_revenue(price, occupancy),
            price_tier: PriceTier::from_price(price),
        });
    }

    Ok(rows)
}

fn next_key(len: usize) -> SurrogateKey {
    len as SurrogateKey + 1
}
