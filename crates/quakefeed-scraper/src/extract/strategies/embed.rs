//! Strategy 3: JSON arrays embedded in `<script>` bodies.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::extract::cells::parse_number;
use crate::extract::report::SkipReason;
use crate::extract::{Candidate, PartialRecord, RowPosition, When};

/// Epoch values below this are seconds, not milliseconds (≈ 1973 in ms).
const SECONDS_CUTOFF: f64 = 1e11;

static SELECTOR_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));

// Pre-filter: an array whose first object carries a magnitude-like key.
static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\[\s*\{[^}]*"(?:magnitude|mag)"\s*:"#).expect("valid regex")
});

/// Objects of every magnitude-bearing array, one candidate per entry.
///
/// `table` in the position is the script index, `row` the array index.
pub(super) fn candidates(document: &Html) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (script_idx, script) in document.select(&SELECTOR_SCRIPT).enumerate() {
        let content: String = script.text().collect();
        let mut cursor = 0;
        for m in CANDIDATE_RE.find_iter(&content) {
            // Inside an array already consumed.
            if m.start() < cursor {
                continue;
            }
            let Some(array_str) = extract_balanced_array(&content[m.start()..]) else {
                continue;
            };
            cursor = m.start() + array_str.len();

            let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(array_str) else {
                tracing::debug!(script = script_idx, "embedded array is not valid JSON");
                continue;
            };
            for (entry_idx, entry) in entries.iter().enumerate() {
                let position = RowPosition {
                    table: script_idx,
                    row: entry_idx,
                };
                let candidate = entry
                    .as_object()
                    .map(object_to_partial)
                    .ok_or(SkipReason::NotAnObject);
                out.push((position, candidate));
            }
        }
    }
    out
}

/// Try to extract a balanced JSON array from the start of `s`.
///
/// Tracks bracket depth outside string literals and returns the shortest
/// prefix forming a complete `[…]`, or `None` if unterminated.
fn extract_balanced_array(s: &str) -> Option<&str> {
    if !s.starts_with('[') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            '}' => depth -= 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Case-insensitive lookup of the first alias present in `obj`.
fn field<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        obj.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(alias))
            .map(|(_, value)| value)
    })
}

fn number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(parse_number))
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_millis(raw: f64) -> i64 {
    let millis = if raw.abs() < SECONDS_CUTOFF {
        raw * 1000.0
    } else {
        raw
    };
    millis.round() as i64
}

fn when_from(obj: &Map<String, Value>) -> When {
    if let Some(value) = field(obj, &["datetime", "time"]) {
        if let Some(raw) = value.as_f64() {
            return When::EpochMillis(epoch_millis(raw));
        }
        if let Some(s) = text(value) {
            if let Ok(raw) = s.parse::<f64>() {
                return When::EpochMillis(epoch_millis(raw));
            }
            let date = field(obj, &["date"]).and_then(text);
            return match date {
                Some(date) => When::Text { date, time: s },
                None => When::Text {
                    date: s,
                    time: String::new(),
                },
            };
        }
    }
    match field(obj, &["date"]) {
        Some(value) if value.is_number() => value
            .as_f64()
            .map_or(When::Unknown, |raw| When::EpochMillis(epoch_millis(raw))),
        Some(value) => text(value).map_or(When::Unknown, |date| When::Text {
            date,
            time: String::new(),
        }),
        None => When::Unknown,
    }
}

fn object_to_partial(obj: &Map<String, Value>) -> PartialRecord {
    PartialRecord {
        magnitude: field(obj, &["magnitude", "mag"]).and_then(number),
        latitude: field(obj, &["latitude", "lat"]).and_then(number),
        longitude: field(obj, &["longitude", "lon", "lng"]).and_then(number),
        depth: field(obj, &["depth"]).and_then(number),
        place: field(obj, &["place", "location"]).and_then(text),
        when: when_from(obj),
    }
}
