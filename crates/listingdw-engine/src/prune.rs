//! Referential pruning of reviews against validated listings

use listingdw_core::ValidReview;
use std::collections::HashSet;

/// Keep reviews whose listing is known; returns the kept reviews and the
/// number dropped. Order of the kept reviews is preserved.
pub fn prune_orphans(reviews: Vec<ValidReview>, listing_ids: &HashSet<&str>) -> (Vec<ValidReview>, usize) {
    let before = reviews.len();
    let kept: Vec<ValidReview> = reviews
        .into_iter()
        .filter(|r| listing_ids.contains(r.listing_id.as_str()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
