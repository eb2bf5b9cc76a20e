//! Strategy 4: best-effort matching over the page's visible prose.
//!
//! Anchors on hemisphere-marked coordinates (`06.34°N, 126.45°E`) and looks
//! for a magnitude label nearby.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use super::char_window;
use crate::extract::cells::collapse_whitespace;
use crate::extract::{Candidate, PartialRecord, RowPosition, When, DEFAULT_REGION};

/// Bytes searched on each side of a coordinate match.
const LABEL_WINDOW: usize = 160;

static COORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}(?:\.\d+)?)\s*[°º]\s*([NS])\b\s*,?\s*(\d{1,3}(?:\.\d+)?)\s*[°º]\s*([EW])\b")
        .expect("valid regex")
});
static MAGNITUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:magnitude|mag)\.?\s*(?:of\s*)?[:=]?\s*(\d{1,2}(?:\.\d+)?)")
        .expect("valid regex")
});
static DEPTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdepth\s*(?:of\s*)?[:=]?\s*(\d{1,3}(?:\.\d+)?)\s*km")
        .expect("valid regex")
});
static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:\d{1,2}\s+[a-z]{3,9}\s+\d{4}(?:\s*-\s*|\s+)\d{1,2}:\d{2}(?:\s*[ap]m)?|\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}(?::\d{2})?)",
    )
    .expect("valid regex")
});

pub(super) fn candidates(document: &Html) -> Vec<Candidate> {
    let text = visible_text(document);
    COORD_RE
        .captures_iter(&text)
        .enumerate()
        .filter_map(|(idx, caps)| {
            let whole = caps.get(0)?;
            let latitude = signed(caps.get(1)?.as_str(), caps.get(2)?.as_str(), 'S')?;
            let longitude = signed(caps.get(3)?.as_str(), caps.get(4)?.as_str(), 'W')?;

            let (before_start, _) =
                char_window(&text, whole.start().saturating_sub(LABEL_WINDOW), whole.start());
            let (_, after_end) = char_window(&text, whole.end(), whole.end() + LABEL_WINDOW);
            let before = &text[before_start..whole.start()];
            let after = &text[whole.end()..after_end];

            // Closest label wins: first after the coordinates, else last before.
            let magnitude = first_capture(&MAGNITUDE_RE, after)
                .or_else(|| last_capture(&MAGNITUDE_RE, before))?;
            let depth = first_capture(&DEPTH_RE, after).or_else(|| last_capture(&DEPTH_RE, before));
            let when = DATETIME_RE
                .find_iter(before)
                .last()
                .or_else(|| DATETIME_RE.find(after))
                .map_or(When::Unknown, |m| When::Text {
                    date: m.as_str().to_owned(),
                    time: String::new(),
                });

            let partial = PartialRecord {
                magnitude: Some(magnitude),
                latitude: Some(latitude),
                longitude: Some(longitude),
                depth,
                place: Some(DEFAULT_REGION.to_owned()),
                when,
            };
            Some((RowPosition { table: 0, row: idx }, Ok(partial)))
        })
        .collect()
}

/// Document text outside `<script>`, `<style>` and `<noscript>`.
fn visible_text(document: &Html) -> String {
    let parts: Vec<&str> = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"))
            });
            (!hidden).then_some(&**text)
        })
        .collect();
    collapse_whitespace(&parts.join(" "))
}

fn signed(value: &str, hemisphere: &str, negative: char) -> Option<f64> {
    let v: f64 = value.parse().ok()?;
    Some(if hemisphere.starts_with(negative) { -v } else { v })
}

fn first_capture(re: &Regex, haystack: &str) -> Option<f64> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn last_capture(re: &Regex, haystack: &str) -> Option<f64> {
    re.captures_iter(haystack)
        .last()
        .and_then(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Candidate> {
        candidates(&Html::parse_document(html))
    }

    #[test]
    fn prose_bulletin_is_read() {
        let html = "<p>16 November 2025 - 02:35 PM: A magnitude 4.5 earthquake struck \
                    06.34°N, 126.45°E at a depth of 48 km.</p>";
        let found = run(html);
        assert_eq!(found.len(), 1);
        let p = found[0].1.as_ref().unwrap();
        assert_eq!(p.magnitude, Some(4.5));
        assert_eq!(p.latitude, Some(6.34));
        assert_eq!(p.longitude, Some(126.45));
        assert_eq!(p.depth, Some(48.0));
        assert_eq!(
            p.when,
            When::Text {
                date: "16 November 2025 - 02:35 PM".to_owned(),
                time: String::new()
            }
        );
    }

    #[test]
    fn label_after_coordinates_is_preferred() {
        let html = "<p>Mag 6.0 last week. Today 9.12ºN 125.77ºE, Magnitude: 3.2</p>";
        let found = run(html);
        assert_eq!(found[0].1.as_ref().unwrap().magnitude, Some(3.2));
    }

    #[test]
    fn coordinates_without_magnitude_are_ignored() {
        assert!(run("<p>Office located at 14.65°N, 121.07°E.</p>").is_empty());
    }

    #[test]
    fn script_text_is_not_visible() {
        let html = "<script>var s = 'Magnitude 4.0 at 8.1°N, 124.3°E';</script><p>hello</p>";
        assert!(run(html).is_empty());
    }
}
