//! Test fixtures for warehouse loader integration tests
//!
//! A small but referentially complete star schema: two listings in two
//! neighbourhoods owned by two hosts, reviewed on three dates.

use chrono::NaiveDate;
use listingdw_core::{
    DimDate, DimHost, DimListing, DimNeighborhood, FactReview, PriceTier, StarSchema,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dim_dates() -> Vec<DimDate> {
    [
        (date(2024, 1, 1), "January", 1, "Monday"),
        (date(2024, 1, 6), "January", 6, "Saturday"),
        (date(2024, 2, 14), "February", 3, "Wednesday"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((full_date, month_name, day_of_week, day_name), date_sk)| DimDate {
        date_sk,
        full_date,
        year: 2024,
        month: chrono::Datelike::month(&full_date),
        day: chrono::Datelike::day(&full_date),
        month_name: month_name.to_string(),
        day_of_week,
        day_name: day_name.to_string(),
    })
    .collect()
}

pub fn dim_neighborhoods() -> Vec<DimNeighborhood> {
    vec![
        DimNeighborhood {
            neighborhood_sk: 1,
            neighbourhood_group: Some("Centro".to_string()),
            neighbourhood: Some("Sol".to_string()),
        },
        DimNeighborhood {
            neighborhood_sk: 2,
            neighbourhood_group: None,
            neighbourhood: Some("Retiro".to_string()),
        },
    ]
}

pub fn dim_hosts() -> Vec<DimHost> {
    ["h1", "h2"]
        .into_iter()
        .zip(1..)
        .map(|(host_id, host_sk)| DimHost {
            host_sk,
            host_id: host_id.to_string(),
            host_name: Some(format!("Host {}", host_id)),
            calculated_host_listings_count: Some(1),
            valid_from: date(2024, 3, 1),
            valid_to: None,
            is_current: true,
        })
        .collect()
}

pub fn dim_listing(listing_sk: i64, host_id: &str, price: f64) -> DimListing {
    DimListing {
        listing_sk,
        listing_id: format!("L{}", listing_sk),
        name: Some(format!("Listing {}", listing_sk)),
        host_id: Some(host_id.to_string()),
        neighborhood_sk: Some(listing_sk),
        room_type: Some("Entire home/apt".to_string()),
        price,
        minimum_nights: 2,
        availability_365: 120,
        number_of_reviews: 10,
        reviews_per_month: 1.5,
        number_of_reviews_ltm: 4,
        license: None,
        latitude: 40.41,
        longitude: -3.70,
        estimated_occupancy_rate: 0.3,
        estimated_monthly_revenue: price * 0.3 * 30.0,
        price_tier: PriceTier::from_price(price),
    }
}

/// A complete star schema with `facts` review rows spread over both listings
pub fn star_schema(facts: usize) -> StarSchema {
    let fact_reviews = (0..facts)
        .map(|i| FactReview {
            listing_sk: (i % 2) as i64 + 1,
            host_sk: (i % 2) as i64 + 1,
            date_sk: (i % 3) as i64 + 1,
            review_count: 1,
        })
        .collect();

    StarSchema {
        dim_date: dim_dates(),
        dim_neighborhood: dim_neighborhoods(),
        dim_host: dim_hosts(),
        dim_listing: vec![dim_listing(1, "h1", 45.0), dim_listing(2, "h2", 180.0)],
        fact_reviews,
    }
}
