//! Strategy 1: `<table>` rows.

use std::sync::LazyLock;

use quakefeed_core::GeoBounds;
use scraper::{ElementRef, Html, Selector};

use crate::extract::cells::collapse_whitespace;
use crate::extract::report::SkipReason;
use crate::extract::row::extract_row;
use crate::extract::{Candidate, PartialRecord, RowPosition};

static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static SELECTOR_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

/// Every row of every table, in document order.
///
/// Rows of a nested table belong to the nested table only, so a layout table
/// wrapping the bulletin does not see its rows twice.
pub(super) fn candidates(document: &Html, bounds: &GeoBounds) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (table_idx, table) in document.select(&SELECTOR_TABLE).enumerate() {
        let rows = table
            .select(&SELECTOR_TR)
            .filter(|row| belongs_to(row, &table));
        for (row_idx, row) in rows.enumerate() {
            let position = RowPosition {
                table: table_idx,
                row: row_idx,
            };
            out.push((position, row_candidate(row, bounds)));
        }
    }
    out
}

/// `true` when `table` is the nearest enclosing table of `row`.
fn belongs_to(row: &ElementRef<'_>, table: &ElementRef<'_>) -> bool {
    row.ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .is_some_and(|el| el.name() == "table")
        })
        .is_some_and(|node| node.id() == table.id())
}

fn row_candidate(row: ElementRef<'_>, bounds: &GeoBounds) -> Result<PartialRecord, SkipReason> {
    let cells: Vec<ElementRef<'_>> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect();

    if cells.iter().any(|cell| cell.value().name() == "th") {
        return Err(SkipReason::HeaderRow);
    }

    let texts: Vec<String> = cells
        .iter()
        .map(|cell| collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" ")))
        .collect();
    extract_row(&texts, bounds)
}
