//! Ordering and filtering of facility summaries for display.

use std::cmp::Ordering;

use crate::favorites::FavoriteSet;
use crate::types::{FacilitySummary, ParkingRecord};

/// Sort summaries for display. The sort is stable and decided by, in order:
///
/// 1. favorites before everything else,
/// 2. facilities with a free regular space before those without,
/// 3. named facilities before `Unnamed-<n>` placeholders,
/// 4. ascending distance when reported.
///
/// Entries without a positive distance compare after those with one so the
/// comparator stays a total order; within one acquisition every entry comes
/// from the same source, so either all or none carry a distance.
#[must_use]
pub fn rank(summaries: Vec<FacilitySummary>, favorites: &FavoriteSet) -> Vec<FacilitySummary> {
    let mut ranked = summaries;
    ranked.sort_by(|a, b| compare(a, b, favorites));
    ranked
}

fn compare(a: &FacilitySummary, b: &FacilitySummary, favorites: &FavoriteSet) -> Ordering {
    let a_fav = favorites.contains(&a.name);
    let b_fav = favorites.contains(&b.name);

    b_fav
        .cmp(&a_fav)
        .then_with(|| b.has_regular_space().cmp(&a.has_regular_space()))
        .then_with(|| a.unnamed.cmp(&b.unnamed))
        .then_with(|| distance_key(a).total_cmp(&distance_key(b)))
}

// A missing distance sorts after every known one instead of tying, since
// `sort_by` needs a total order.
fn distance_key(summary: &FacilitySummary) -> f64 {
    summary
        .distance
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(f64::INFINITY)
}

/// Case-insensitive substring match on name or address.
///
/// A blank query keeps everything.
#[must_use]
pub fn filter_by_substring(summaries: &[FacilitySummary], text: &str) -> Vec<FacilitySummary> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return summaries.to_vec();
    }

    summaries
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s
                    .address
                    .as_deref()
                    .is_some_and(|addr| addr.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Keep only facilities with at least one free regular space.
#[must_use]
pub fn filter_available_only(summaries: &[FacilitySummary]) -> Vec<FacilitySummary> {
    summaries
        .iter()
        .filter(|s| s.has_regular_space())
        .cloned()
        .collect()
}

/// Keep only individual records currently reported free.
#[must_use]
pub fn filter_available_records(records: &[ParkingRecord]) -> Vec<ParkingRecord> {
    records
        .iter()
        .filter(|r| !r.is_occupied())
        .cloned()
        .collect()
}
