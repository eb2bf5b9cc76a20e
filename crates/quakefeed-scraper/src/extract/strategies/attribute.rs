//! Strategy 2: elements tagged as earthquake entries, read as labeled text.
//!
//! Matches markup such as
//! `<div class="earthquake-item">Magnitude: 5.2, Lat: 8.1, Lon: 124.3</div>`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extract::cells::{collapse_whitespace, parse_number};
use crate::extract::report::SkipReason;
use crate::extract::{Candidate, PartialRecord, RowPosition, When, DEFAULT_REGION};

const TAG_WORDS: [&str; 4] = ["earthquake", "quake", "seismic", "event"];

static SELECTOR_ANY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body *").expect("valid selector"));

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(magnitude|mag|latitude|lat|longitude|lng|lon|depth|datetime|date|time|location|place)\s*[:=]",
    )
    .expect("valid regex")
});

/// Field a label names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Magnitude,
    Latitude,
    Longitude,
    Depth,
    Date,
    Time,
    Place,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "magnitude" | "mag" => Some(Field::Magnitude),
            "latitude" | "lat" => Some(Field::Latitude),
            "longitude" | "lng" | "lon" => Some(Field::Longitude),
            "depth" => Some(Field::Depth),
            "datetime" | "date" => Some(Field::Date),
            "time" => Some(Field::Time),
            "location" | "place" => Some(Field::Place),
            _ => None,
        }
    }
}

/// Innermost tagged elements, in document order.
pub(super) fn candidates(document: &Html) -> Vec<Candidate> {
    document
        .select(&SELECTOR_ANY)
        .filter(is_tagged)
        .filter(|el| !has_tagged_descendant(el))
        .enumerate()
        .map(|(idx, el)| {
            let text = collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "));
            (RowPosition { table: 0, row: idx }, parse_labeled(&text))
        })
        .collect()
}

fn is_tagged(el: &ElementRef<'_>) -> bool {
    el.value().attrs().any(|(name, value)| match name {
        "id" | "class" => mentions_tag_word(value),
        _ => name
            .strip_prefix("data-")
            .is_some_and(|suffix| mentions_tag_word(suffix) || mentions_tag_word(value)),
    })
}

fn mentions_tag_word(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    TAG_WORDS.iter().any(|word| lower.contains(word))
}

fn has_tagged_descendant(el: &ElementRef<'_>) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|child| is_tagged(&child))
}

/// Split `text` at each label and read the value up to the next label.
pub(crate) fn parse_labeled(text: &str) -> Result<PartialRecord, SkipReason> {
    let labels: Vec<_> = LABEL_RE.captures_iter(text).collect();

    let mut partial = PartialRecord {
        magnitude: None,
        latitude: None,
        longitude: None,
        depth: None,
        place: None,
        when: When::Unknown,
    };
    let mut date: Option<String> = None;
    let mut time: Option<String> = None;

    for (idx, caps) in labels.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = labels
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let value = text[whole.end()..end]
            .trim()
            .trim_end_matches([',', ';', '|'])
            .trim();
        if value.is_empty() {
            continue;
        }

        match Field::from_label(label.as_str()) {
            Some(Field::Magnitude) => partial.magnitude = partial.magnitude.or(parse_number(value)),
            Some(Field::Latitude) => partial.latitude = partial.latitude.or(parse_number(value)),
            Some(Field::Longitude) => partial.longitude = partial.longitude.or(parse_number(value)),
            Some(Field::Depth) => partial.depth = partial.depth.or(parse_number(value)),
            Some(Field::Date) => date = date.or(Some(value.to_owned())),
            Some(Field::Time) => time = time.or(Some(value.to_owned())),
            Some(Field::Place) => partial.place = partial.place.or(Some(value.to_owned())),
            None => {}
        }
    }

    if partial.magnitude.is_none() {
        return Err(SkipReason::NoMagnitude);
    }
    if partial.place.is_none() {
        partial.place = Some(DEFAULT_REGION.to_owned());
    }
    partial.when = match (date, time) {
        (None, None) => When::Unknown,
        (date, time) => When::Text {
            date: date.unwrap_or_default(),
            time: time.unwrap_or_default(),
        },
    };
    Ok(partial)
}
