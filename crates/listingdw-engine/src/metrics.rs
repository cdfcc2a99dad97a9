//! Listing measure cleaning and derived metrics

use listingdw_core::coerce_numeric;

/// Reviews per month that count as a fully occupied listing
const FULL_OCCUPANCY_REVIEWS_PER_MONTH: f64 = 5.0;

/// Nights used for the monthly revenue estimate
const NIGHTS_PER_MONTH: f64 = 30.0;

/// Clean a raw price string
///
/// Every character that is not an ASCII digit or `.` is removed, so
/// `"$1,234.50"` becomes `1234.5`. A missing price or an empty result is 0.
/// Returns `None` when what remains is not a number (e.g. `"1.2.3"`).
pub fn clean_price(raw: Option<&str>) -> Option<f64> {
    let digits: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return Some(0.0);
    }
    digits.parse().ok()
}

/// Numeric measure, 0 when missing or not a number
pub fn coerce_measure(raw: Option<&str>) -> f64 {
    coerce_numeric(raw).unwrap_or(0.0)
}

/// Integer count, 0 when missing or not a number; fractions truncate
pub fn coerce_count(raw: Option<&str>) -> i64 {
    coerce_measure(raw).trunc() as i64
}

/// Like [`coerce_count`] but keeps missing values missing
pub fn coerce_optional_count(raw: Option<&str>) -> Option<i64> {
    coerce_numeric(raw).map(|v| v.trunc() as i64)
}

/// `reviews_per_month / 5`, clamped to `[0, 1]`
pub fn occupancy_rate(reviews_per_month: f64) -> f64 {
    (reviews_per_month / FULL_OCCUPANCY_REVIEWS_PER_MONTH).clamp(0.0, 1.0)
}

pub fn monthly_revenue(price: f64, occupancy_rate: f64) -> f64 {
    price * occupancy_rate * NIGHTS_PER_MONTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_cleaning() {
        assert_eq!(clean_price(Some("$1,234.50")), Some(1234.50));
        assert_eq!(clean_price(Some("")), Some(0.0));
        assert_eq!(clean_price(Some("$")), Some(0.0));
        assert_eq!(clean_price(None), Some(0.0));
        assert_eq!(clean_price(Some("  85 ")), Some(85.0));
        assert_eq!(clean_price(Some("-20")), Some(20.0));
        assert_eq!(clean_price(Some("1.2.3")), None);
    }

    #[test]
    fn count_coercion() {
        assert_eq!(coerce_count(Some("3")), 3);
        assert_eq!(coerce_count(Some("2.9")), 2);
        assert_eq!(coerce_count(Some("many")), 0);
        assert_eq!(coerce_count(None), 0);
        assert_eq!(coerce_optional_count(Some("4.0")), Some(4));
        assert_eq!(coerce_optional_count(None), None);
        assert_eq!(coerce_measure(Some("0.75")), 0.75);
    }

    #[test]
    fn occupancy_is_clamped() {
        assert_eq!(occupancy_rate(2.5), 0.5);
        assert_eq!(occupancy_rate(12.0), 1.0);
        assert_eq!(occupancy_rate(-1.0), 0.0);
        assert_eq!(monthly_revenue(100.0, 0.5), 1500.0);
    }
}
