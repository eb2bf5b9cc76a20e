//! Text-cell primitives shared by the row extractor and the strategies.

use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("valid regex"));
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\b")
        .expect("valid regex")
});
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid regex"));
static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}:\d{2}\b").expect("valid regex"));

/// Words that mark a heading cell.
const HEADER_KEYWORDS: [&str; 12] = [
    "date",
    "time",
    "magnitude",
    "mag",
    "latitude",
    "longitude",
    "lat",
    "lon",
    "depth",
    "location",
    "place",
    "datetime",
];

/// Collapse runs of whitespace (including `&nbsp;`) into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a numeric cell the way the bulletin prints them.
///
/// Accepts zero padding (`"048"`, `"06.34"`), a trailing degree sign,
/// hemisphere letter, or `km` unit. `S`/`W` hemispheres negate the value.
/// Anything else (dates, prose) is `None`.
pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    let core = trimmed.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '°' | 'N' | 'n' | 'S' | 's' | 'E' | 'e' | 'W' | 'w' | 'k' | 'K' | 'm' | 'M')
    });
    if core.is_empty() || !NUMERIC_RE.is_match(core) {
        return None;
    }

    let suffix: String = trimmed[core.len()..]
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '°')
        .collect::<String>()
        .to_ascii_lowercase();
    let southern_or_western = suffix == "s" || suffix == "w";

    let (sign, digits) = match core.as_bytes()[0] {
        b'-' => (-1.0, &core[1..]),
        b'+' => (1.0, &core[1..]),
        _ => (1.0, core),
    };
    let unpadded = digits.trim_start_matches('0');
    let normalized = if unpadded.is_empty() || unpadded.starts_with('.') {
        format!("0{unpadded}")
    } else {
        unpadded.to_owned()
    };

    let value = normalized.parse::<f64>().ok()? * sign;
    if !value.is_finite() {
        return None;
    }
    Some(if southern_or_western { -value } else { value })
}

/// `true` when the text names a month or carries a four-digit year.
pub(crate) fn has_date_marker(text: &str) -> bool {
    MONTH_RE.is_match(text) || YEAR_RE.is_match(text)
}

/// `true` when the text carries an `hh:mm` clock reading.
pub(crate) fn has_clock(text: &str) -> bool {
    CLOCK_RE.is_match(text)
}

/// `true` when the cell reads like a column heading.
fn is_heading_cell(cell: &str) -> bool {
    if cell.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let lower = cell.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| HEADER_KEYWORDS.contains(&word))
}

/// Classify a row of cell texts as a heading row.
///
/// Two heading cells are enough. A single heading cell counts only when the
/// row has no numeric cell at all, so a data row whose place reads
/// "Unknown Location" is not mistaken for a header.
pub(crate) fn is_header_row(cells: &[String]) -> bool {
    let heading_cells = cells.iter().filter(|c| is_heading_cell(c)).count();
    if heading_cells >= 2 {
        return true;
    }
    heading_cells == 1 && !cells.iter().any(|c| parse_number(c).is_some())
}
