//! Per-run extraction diagnostics.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Strategy;

/// Why a candidate row did not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Column headings (`<th>` cells or heading keywords).
    HeaderRow,
    /// Fewer than three cells; banners, spacers, pagination.
    TooFewCells,
    /// No cell or label carried a value in the magnitude range.
    NoMagnitude,
    /// No latitude/longitude pair fell inside the plausibility bands.
    NoCoordinates,
    MagnitudeOutOfRange,
    CoordinatesOutOfRange,
    /// The parsed timestamp precedes the Unix epoch.
    NegativeTime,
    /// Embedded data entry that is not an object.
    NotAnObject,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::HeaderRow => "header_row",
            SkipReason::TooFewCells => "too_few_cells",
            SkipReason::NoMagnitude => "no_magnitude",
            SkipReason::NoCoordinates => "no_coordinates",
            SkipReason::MagnitudeOutOfRange => "magnitude_out_of_range",
            SkipReason::CoordinatesOutOfRange => "coordinates_out_of_range",
            SkipReason::NegativeTime => "negative_time",
            SkipReason::NotAnObject => "not_an_object",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: Strategy,
    pub candidates: usize,
    pub accepted: usize,
}

/// Aggregated diagnostics for one extraction call.
///
/// An empty record list with `strategy: None` means the document was read but
/// nothing in it looked like an earthquake listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    /// The strategy whose records were returned.
    pub strategy: Option<Strategy>,
    pub attempts: Vec<StrategyAttempt>,
    /// Skip counts across every strategy tried.
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Accepted records whose time fell back to the extraction clock.
    pub degraded_timestamps: usize,
    pub duplicates_removed: usize,
    pub returned: usize,
}

impl ExtractionReport {
    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Skips excluding header rows, which are expected in every table.
    #[must_use]
    pub fn rejected_rows(&self) -> usize {
        self.skipped
            .iter()
            .filter(|(reason, _)| **reason != SkipReason::HeaderRow)
            .map(|(_, count)| count)
            .sum()
    }
}
