//! Post-enrichment filtering of recommendation candidates.
//!
//! Filtering is stable: candidates that pass keep the order in which the
//! neighbor query produced them. Nothing here re-sorts.

use crate::models::{FilterCriteria, Recommendation};

/// Year parsed from the leading four characters of a release date.
///
/// Absent or unparsable dates yield 0, which fails any realistic year range.
/// That exclusion is deliberate policy for now; loosening it to "unknown
/// dates pass" needs a product decision, not a code change here.
pub fn parse_release_year(release_date: Option<&str>) -> i32 {
    release_date
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
        .unwrap_or(0)
}

/// Keeps candidates whose rating meets the floor and whose release year falls
/// inside the inclusive range.
pub fn apply(candidates: Vec<Recommendation>, criteria: &FilterCriteria) -> Vec<Recommendation> {
    let (low, high) = criteria.year_range;
    candidates
        .into_iter()
        .filter(|c| {
            let year = parse_release_year(c.details.release_date.as_deref());
            c.details.rating >= criteria.min_rating && low <= year && year <= high
        })
        .collect()
}
