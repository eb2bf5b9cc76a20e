//! Date/time normalization for bulletin timestamps.
//!
//! The bulletin prints wall-clock times in its own zone without an offset
//! (`16 November 2025 - 02:35 PM`), other snapshots use ISO-ish or US
//! layouts. Everything funnels through [`normalize_at`], which never fails:
//! unparseable input yields the supplied "now" with `degraded = true`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use super::cells::collapse_whitespace;

const DATETIME_FORMATS: [&str; 24] = [
    "%d %B %Y %I:%M %p",
    "%d %B %Y %I:%M:%S %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d %Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d-%B-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%m-%d-%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%B %d %Y %H:%M",
];

const DATE_FORMATS: [&str; 8] = [
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d-%B-%Y",
];

/// Zone abbreviations the source appends to otherwise naive times.
const LOCAL_ZONE_SUFFIXES: [&str; 3] = ["PST", "PHT", "PHST"];

/// Result of [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTime {
    /// Milliseconds since the Unix epoch.
    pub millis: i64,
    /// `true` when no layout matched and `millis` is the extraction clock.
    pub degraded: bool,
}

/// Default source zone: Philippine Standard Time.
#[must_use]
pub fn philippine_time() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Normalize `date_text` + `time_text` against the current clock.
#[must_use]
pub fn normalize(date_text: &str, time_text: &str, source_offset: FixedOffset) -> NormalizedTime {
    normalize_at(date_text, time_text, source_offset, Utc::now())
}

/// Normalize `date_text` + `time_text`, falling back to `now`.
///
/// Attempts in order: split a combined `date - time` cell; plain
/// concatenation; slashes swapped for dashes; ISO `T` join; space join. Naive
/// readings are placed in `source_offset`.
#[must_use]
pub fn normalize_at(
    date_text: &str,
    time_text: &str,
    source_offset: FixedOffset,
    now: DateTime<Utc>,
) -> NormalizedTime {
    for candidate in candidate_strings(date_text, time_text) {
        if let Some(parsed) = parse_candidate(&candidate, source_offset) {
            return NormalizedTime {
                millis: parsed.timestamp_millis(),
                degraded: false,
            };
        }
    }

    tracing::warn!(
        date_text,
        time_text,
        "unparseable bulletin timestamp; substituting extraction time"
    );
    NormalizedTime {
        millis: now.timestamp_millis(),
        degraded: true,
    }
}

fn candidate_strings(date_text: &str, time_text: &str) -> Vec<String> {
    let date = collapse_whitespace(date_text);
    let time = collapse_whitespace(time_text);
    let mut out: Vec<String> = Vec::new();
    let mut push = |s: String| {
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    };

    if let Some((d, t)) = date.split_once(" - ") {
        push(join_parts(d.trim(), t.trim(), " "));
    }

    let joined = join_parts(&date, &time, " ");
    push(joined.clone());
    if joined.contains('/') {
        push(joined.replace('/', "-"));
    }

    if !date.is_empty() && !time.is_empty() {
        push(format!("{date}T{time}"));
        push(format!("{date} {time}"));
    }
    out
}

fn join_parts(a: &str, b: &str, sep: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_owned(),
        (false, true) => a.to_owned(),
        (false, false) => format!("{a}{sep}{b}"),
    }
}

fn parse_candidate(text: &str, source_offset: FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let text = strip_zone_suffix(text);

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    source_offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn strip_zone_suffix(text: &str) -> &str {
    LOCAL_ZONE_SUFFIXES
        .iter()
        .find_map(|zone| text.strip_suffix(zone))
        .map_or(text, str::trim_end)
}
