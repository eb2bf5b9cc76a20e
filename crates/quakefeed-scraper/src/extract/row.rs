//! Row field extraction: which cell holds which field.
//!
//! The bulletin has no declared schema and reorders its columns between
//! snapshots, so each row is matched against a ladder of layout hypotheses
//! ([`RowLayout`]). The first hypothesis whose shape fits the row decides the
//! mapping; the plausibility bands disambiguate coordinates where column
//! order is unknown.

use quakefeed_core::GeoBounds;

use super::cells::{has_clock, has_date_marker, is_header_row, parse_number};
use super::report::SkipReason;
use super::{PartialRecord, When, DEFAULT_REGION};

/// Column layout hypotheses, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// ≥6 cells: `date[-time] | lat | lon | depth | mag | place`.
    CombinedDateTime,
    /// ≥6 cells: `date | time | four numerics in unknown order | place?`.
    SeparateDateTime,
    /// 5 cells: `date | time | lat | lon | mag`.
    FiveColumn,
    /// 3–4 cells: numerics classified by band.
    Sparse,
}

/// Pick the layout hypothesis for a row that has already passed the header
/// and width checks.
pub(crate) fn detect_layout(cells: &[String]) -> Option<RowLayout> {
    match cells.len() {
        // A clock in cell 1 means the date and time sit in separate cells.
        n if n >= 6 => {
            if has_date_marker(&cells[0]) && !has_clock(&cells[1]) {
                Some(RowLayout::CombinedDateTime)
            } else {
                Some(RowLayout::SeparateDateTime)
            }
        }
        5 => Some(RowLayout::FiveColumn),
        3 | 4 => Some(RowLayout::Sparse),
        _ => None,
    }
}

/// Map one table row to a partial record.
///
/// # Errors
///
/// Returns the [`SkipReason`] when the row is not an earthquake row. Field
/// values are not range-checked here beyond what layout detection needs;
/// that is the validator's job.
pub fn extract_row(cells: &[String], bounds: &GeoBounds) -> Result<PartialRecord, SkipReason> {
    if cells.len() < 3 {
        return Err(SkipReason::TooFewCells);
    }
    if is_header_row(cells) {
        return Err(SkipReason::HeaderRow);
    }
    // Confirmation signal only; the layout mapping below assigns the field.
    if magnitude_candidate(cells).is_none() {
        return Err(SkipReason::NoMagnitude);
    }

    match detect_layout(cells).ok_or(SkipReason::TooFewCells)? {
        RowLayout::CombinedDateTime => Ok(map_combined(cells)),
        RowLayout::SeparateDateTime => map_separate(cells, bounds),
        RowLayout::FiveColumn => Ok(map_five_column(cells)),
        RowLayout::Sparse => Ok(map_sparse(cells, bounds)),
    }
}

/// First cell whose numeric value lies in (0, 10], the validator's range.
pub(crate) fn magnitude_candidate(cells: &[String]) -> Option<f64> {
    cells
        .iter()
        .filter_map(|c| parse_number(c))
        .find(|v| *v > 0.0 && *v <= 10.0)
}

/// Split a combined date-time cell into `(date, time)`.
///
/// `" - "` is the bulletin's own delimiter; otherwise the first three
/// whitespace tokens are the date.
pub(crate) fn split_combined(cell: &str) -> (String, String) {
    if let Some((date, time)) = cell.split_once(" - ") {
        return (date.trim().to_owned(), time.trim().to_owned());
    }
    let tokens: Vec<&str> = cell.split_whitespace().collect();
    let split_at = tokens.len().min(3);
    (tokens[..split_at].join(" "), tokens[split_at..].join(" "))
}

fn place_from(cell: Option<&String>) -> Option<String> {
    cell.map(|c| c.trim().to_owned()).filter(|c| !c.is_empty())
}

fn map_combined(cells: &[String]) -> PartialRecord {
    let (date, time) = split_combined(&cells[0]);
    PartialRecord {
        latitude: parse_number(&cells[1]),
        longitude: parse_number(&cells[2]),
        depth: parse_number(&cells[3]),
        magnitude: parse_number(&cells[4]),
        place: place_from(cells.get(5)),
        when: When::Text { date, time },
    }
}

fn map_separate(cells: &[String], bounds: &GeoBounds) -> Result<PartialRecord, SkipReason> {
    let values: Vec<Option<f64>> = cells[2..6].iter().map(|c| parse_number(c)).collect();
    let (lat_idx, lon_idx) = locate_coordinates(&values, bounds).ok_or(SkipReason::NoCoordinates)?;

    let mut rest = (0..values.len()).filter(|i| *i != lat_idx && *i != lon_idx);
    let depth = rest.next().and_then(|i| values[i]);
    let magnitude = rest.next().and_then(|i| values[i]);

    Ok(PartialRecord {
        magnitude,
        latitude: values[lat_idx],
        longitude: values[lon_idx],
        depth,
        place: place_from(cells.get(6)),
        when: When::Text {
            date: cells[0].trim().to_owned(),
            time: cells[1].trim().to_owned(),
        },
    })
}

/// Find the `(latitude, longitude)` indices among `values`.
///
/// Adjacent pairs are tried first (both orderings) since the source keeps
/// coordinates side by side; then every pairing.
pub(crate) fn locate_coordinates(
    values: &[Option<f64>],
    bounds: &GeoBounds,
) -> Option<(usize, usize)> {
    let is_lat = |i: usize| values[i].is_some_and(|v| bounds.contains_latitude(v));
    let is_lon = |i: usize| values[i].is_some_and(|v| bounds.contains_longitude(v));

    for i in 0..values.len().saturating_sub(1) {
        let j = i + 1;
        if is_lat(i) && is_lon(j) {
            return Some((i, j));
        }
        if is_lon(i) && is_lat(j) {
            return Some((j, i));
        }
    }

    for i in 0..values.len() {
        for j in 0..values.len() {
            if i != j && is_lat(i) && is_lon(j) {
                return Some((i, j));
            }
        }
    }
    None
}

fn map_five_column(cells: &[String]) -> PartialRecord {
    PartialRecord {
        latitude: parse_number(&cells[2]),
        longitude: parse_number(&cells[3]),
        magnitude: parse_number(&cells[4]),
        depth: None,
        place: Some(DEFAULT_REGION.to_owned()),
        when: When::Text {
            date: cells[0].trim().to_owned(),
            time: cells[1].trim().to_owned(),
        },
    }
}

fn map_sparse(cells: &[String], bounds: &GeoBounds) -> PartialRecord {
    let mut latitude = None;
    let mut longitude = None;
    let mut others = Vec::new();

    for value in cells.iter().filter_map(|c| parse_number(c)) {
        if latitude.is_none() && bounds.contains_latitude(value) {
            latitude = Some(value);
        } else if longitude.is_none() && bounds.contains_longitude(value) {
            longitude = Some(value);
        } else {
            others.push(value);
        }
    }

    let magnitude_idx = others.iter().position(|v| *v > 0.0 && *v <= 10.0);
    let magnitude = magnitude_idx.map(|i| others[i]);
    let depth = others
        .iter()
        .enumerate()
        .find(|(i, _)| Some(*i) != magnitude_idx)
        .map(|(_, v)| *v);

    PartialRecord {
        magnitude,
        latitude,
        longitude,
        depth,
        place: place_from(cells.last()),
        when: When::Text {
            date: cells[0].trim().to_owned(),
            time: cells.get(1).map(|c| c.trim().to_owned()).unwrap_or_default(),
        },
    }
}
