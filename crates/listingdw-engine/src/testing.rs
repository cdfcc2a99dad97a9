//! Row builders shared by unit tests

use listingdw_core::{RawListing, RawReview, ValidListing};

/// A raw listing that passes every check
pub fn listing(id: &str) -> RawListing {
    RawListing {
        id: Some(id.to_string()),
        name: Some(format!("Listing {}", id)),
        host_id: Some("h1".to_string()),
        host_name: Some("Ana".to_string()),
        neighbourhood_group: Some("Centro".to_string()),
        neighbourhood: Some("Sol".to_string()),
        latitude: Some("40.4168".to_string()),
        longitude: Some("-3.7038".to_string()),
        room_type: Some("Entire home/apt".to_string()),
        price: Some("$100.00".to_string()),
        minimum_nights: Some("2".to_string()),
        number_of_reviews: Some("10".to_string()),
        last_review: Some("2024-01-01".to_string()),
        reviews_per_month: Some("1.0".to_string()),
        calculated_host_listings_count: Some("1".to_string()),
        availability_365: Some("120".to_string()),
        number_of_reviews_ltm: Some("3".to_string()),
        license: None,
    }
}

pub fn review(listing_id: &str, date: &str) -> RawReview {
    RawReview::new(listing_id, date)
}

/// The validated form of [`listing`]
pub fn valid_listing(id: &str) -> ValidListing {
    let raw = listing(id);
    ValidListing {
        id: id.to_string(),
        name: raw.name,
        host_id: raw.host_id,
        host_name: raw.host_name,
        neighbourhood_group: raw.neighbourhood_group,
        neighbourhood: raw.neighbourhood,
        latitude: 40.4168,
        longitude: -3.7038,
        room_type: raw.room_type,
        price: raw.price,
        minimum_nights: raw.minimum_nights,
        number_of_reviews: raw.number_of_reviews,
        last_review: raw.last_review,
        reviews_per_month: raw.reviews_per_month,
        calculated_host_listings_count: raw.calculated_host_listings_count,
        availability_365: 120.0,
        number_of_reviews_ltm: raw.number_of_reviews_ltm,
        license: raw.license,
    }
}
