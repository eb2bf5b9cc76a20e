//! Near-duplicate collapsing and newest-first ordering.

use quakefeed_core::EarthquakeRecord;

const TIME_TOLERANCE_MS: i64 = 60_000;
const COORD_TOLERANCE_DEG: f64 = 0.01;

fn is_duplicate(a: &EarthquakeRecord, b: &EarthquakeRecord) -> bool {
    if a.id == b.id {
        return true;
    }
    (a.time - b.time).abs() < TIME_TOLERANCE_MS
        && (a.latitude - b.latitude).abs() < COORD_TOLERANCE_DEG
        && (a.longitude - b.longitude).abs() < COORD_TOLERANCE_DEG
}

/// Drop near-duplicates (first occurrence wins) and sort by `time`
/// descending. The sort is stable, so equal times keep document order.
///
/// Returns the number of records removed.
pub(crate) fn dedupe_and_sort(records: &mut Vec<EarthquakeRecord>) -> usize {
    let before = records.len();
    let mut kept: Vec<EarthquakeRecord> = Vec::with_capacity(before);
    for record in records.drain(..) {
        if kept.iter().any(|existing| is_duplicate(existing, &record)) {
            tracing::debug!(id = %record.id, time = record.time, "dropping near-duplicate record");
            continue;
        }
        kept.push(record);
    }
    kept.sort_by(|a, b| b.time.cmp(&a.time));
    *records = kept;
    before - records.len()
}
