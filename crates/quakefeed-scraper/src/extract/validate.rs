//! Record validation: the single gate every strategy's output passes through.

use quakefeed_core::{GeoBounds, UNKNOWN_LOCATION};

use super::report::SkipReason;
use super::{PartialRecord, When};

const MAX_MAGNITUDE: f64 = 10.0;

/// A record that satisfies every output invariant except identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub magnitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub place: String,
    pub time: i64,
}

/// Check a partial record against the output invariants.
///
/// Missing depth becomes `0.0`; a missing or blank place becomes
/// [`UNKNOWN_LOCATION`].
///
/// # Errors
///
/// Returns the first failed check as a [`SkipReason`].
pub fn validate(
    partial: &PartialRecord,
    time_ms: i64,
    bounds: &GeoBounds,
) -> Result<ValidRecord, SkipReason> {
    let magnitude = partial.magnitude.ok_or(SkipReason::NoMagnitude)?;
    if !magnitude.is_finite() || magnitude <= 0.0 || magnitude > MAX_MAGNITUDE {
        return Err(SkipReason::MagnitudeOutOfRange);
    }

    let (Some(latitude), Some(longitude)) = (partial.latitude, partial.longitude) else {
        return Err(SkipReason::NoCoordinates);
    };
    // A zero coordinate is an empty cell read as a number, whatever the bands say.
    if is_zero(latitude)
        || is_zero(longitude)
        || !bounds.contains_latitude(latitude)
        || !bounds.contains_longitude(longitude)
    {
        return Err(SkipReason::CoordinatesOutOfRange);
    }

    if time_ms < 0 {
        return Err(SkipReason::NegativeTime);
    }

    let depth = partial
        .depth
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);
    let place = partial
        .place
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_owned();

    Ok(ValidRecord {
        magnitude,
        latitude,
        longitude,
        depth,
        place,
        time: time_ms,
    })
}

fn is_zero(value: f64) -> bool {
    value.abs() < f64::EPSILON
}

impl From<&ValidRecord> for PartialRecord {
    fn from(record: &ValidRecord) -> Self {
        PartialRecord {
            magnitude: Some(record.magnitude),
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
            depth: Some(record.depth),
            place: Some(record.place.clone()),
            when: When::EpochMillis(record.time),
        }
    }
}
