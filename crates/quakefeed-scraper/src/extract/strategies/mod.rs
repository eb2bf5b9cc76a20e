//! Candidate producers, one module per [`Strategy`].

mod attribute;
mod embed;
mod table;
mod text;

use quakefeed_core::GeoBounds;
use scraper::Html;

use super::{Candidate, Strategy};

pub(super) fn run(strategy: Strategy, document: &Html, bounds: &GeoBounds) -> Vec<Candidate> {
    match strategy {
        Strategy::Table => table::candidates(document, bounds),
        Strategy::Attribute => attribute::candidates(document),
        Strategy::Embedded => embed::candidates(document),
        Strategy::FreeText => text::candidates(document),
    }
}

/// Snap `[start, end)` outward-safe to UTF-8 char boundaries of `s`.
fn char_window(s: &str, start: usize, end: usize) -> (usize, usize) {
    let end = end.min(s.len());
    let start = (start.min(end)..=end)
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(end);
    let end = (end..=s.len())
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(s.len());
    (start, end)
}
