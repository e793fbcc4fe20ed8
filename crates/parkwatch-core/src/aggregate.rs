//! Groups normalized records into one summary per facility.

use std::collections::{HashMap, HashSet};

use crate::types::{FacilitySummary, ParkingRecord};

/// Prefix of the placeholder name given to records without a usable name.
pub const UNNAMED_PREFIX: &str = "Unnamed-";

/// Collapse records sharing a facility name into [`FacilitySummary`] rows.
///
/// Single pass, output in first-seen order. Records without a name each get
/// their own `Unnamed-<n>` summary and are never merged; counter values that
/// a real facility already uses as its name are skipped. Fee, hours, address
/// and distance come from the first record of a group; if upstream order is
/// unstable, which record wins can change between polls.
#[must_use]
pub fn aggregate(records: &[ParkingRecord]) -> Vec<FacilitySummary> {
    let mut summaries: Vec<FacilitySummary> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();
    let real_names: HashSet<&str> = records.iter().filter_map(|r| r.name.as_deref()).collect();
    let mut unnamed_count = 0usize;

    for record in records {
        let idx = match record.name.as_deref() {
            Some(name) => {
                if let Some(&idx) = index_by_name.get(name) {
                    idx
                } else {
                    summaries.push(new_summary(name.to_string(), false, record));
                    index_by_name.insert(name, summaries.len() - 1);
                    summaries.len() - 1
                }
            }
            None => {
                let placeholder = loop {
                    unnamed_count += 1;
                    let candidate = format!("{UNNAMED_PREFIX}{unnamed_count}");
                    if !real_names.contains(candidate.as_str()) {
                        break candidate;
                    }
                };
                summaries.push(new_summary(placeholder, true, record));
                summaries.len() - 1
            }
        };

        let summary = &mut summaries[idx];
        let free = !record.is_occupied();
        if record.is_accessible {
            summary.accessible_total += 1;
            if free {
                summary.accessible_available += 1;
            }
        } else {
            summary.regular_total += 1;
            if free {
                summary.regular_available += 1;
            }
        }
        summary.sample_coordinates.push(record.position());
    }

    summaries
}

fn new_summary(name: String, unnamed: bool, first: &ParkingRecord) -> FacilitySummary {
    FacilitySummary {
        name,
        unnamed,
        regular_total: 0,
        regular_available: 0,
        accessible_total: 0,
        accessible_available: 0,
        weekday_fee: first.weekday_fee.clone(),
        service_hours: first.service_hours.clone(),
        address: first.address.clone(),
        sample_coordinates: Vec::new(),
        distance: first.distance,
    }
}
