//! Review fact builder

use crate::dimensions::parse_review_date;
use chrono::NaiveDate;
use listingdw_core::{DimDate, DimHost, DimListing, FactReview, SurrogateKey, ValidReview};
use std::collections::HashMap;

/// Resolve each review against the three dimensions
///
/// The host is taken from the listing, not from the review. Reviews with
/// any unresolved key are dropped. Output keeps review order.
pub fn build_fact_reviews(
    reviews: &[ValidReview],
    listings: &[DimListing],
    hosts: &[DimHost],
    dates: &[DimDate],
) -> Vec<FactReview> {
    let listing_keys: HashMap<&str, (SurrogateKey, Option<&str>)> = listings
        .iter()
        .map(|l| (l.listing_id.as_str(), (l.listing_sk, l.host_id.as_deref())))
        .collect();
    let host_keys: HashMap<&str, SurrogateKey> =
        hosts.iter().map(|h| (h.host_id.as_str(), h.host_sk)).collect();
    let date_keys: HashMap<NaiveDate, SurrogateKey> =
        dates.iter().map(|d| (d.full_date, d.date_sk)).collect();

    let facts: Vec<FactReview> = reviews
        .iter()
        .filter_map(|review| {
            let (listing_sk, host_id) = listing_keys.get(review.listing_id.as_str())?;
            let host_sk = host_keys.get((*host_id)?)?;
            let date = review.date.as_deref().and_then(parse_review_date)?;
            let date_sk = date_keys.get(&date)?;

            Some(FactReview {
                listing_sk: *listing_sk,
                host_sk: *host_sk,
                date_sk: *date_sk,
                review_count: 1,
            })
        })
        .collect();

    let dropped = reviews.len() - facts.len();
    if dropped > 0 {
        tracing::warn!("Dropping {} fact rows with unresolved dimension keys", dropped);
    }

    facts
}
