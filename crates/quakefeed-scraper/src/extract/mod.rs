//! Bulletin markup → earthquake records.
//!
//! Tries extraction strategies in priority order (tables, tagged elements,
//! embedded JSON, free text) and returns the records of the first strategy
//! that yields at least one valid record. Every strategy emits
//! [`PartialRecord`] candidates that pass through the same time normalization
//! and [`validate::validate`] gate, so the output invariants hold whichever
//! strategy wins.

mod assemble;
mod cells;
pub mod datetime;
mod dedupe;
pub mod report;
pub mod row;
mod strategies;
pub mod validate;

use chrono::{DateTime, FixedOffset, Utc};
use quakefeed_core::{AppConfig, EarthquakeRecord, GeoBounds};
use scraper::Html;
use serde::Serialize;

use assemble::{assemble, IdAllocator};
use datetime::{normalize_at, philippine_time, NormalizedTime};
use dedupe::dedupe_and_sort;
pub use report::{ExtractionReport, SkipReason, StrategyAttempt};

/// Place used when a tier or strategy knows the event but not where.
pub const DEFAULT_REGION: &str = "Philippines";

/// Extraction knobs. Defaults match the Philippine bulletin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub bounds: GeoBounds,
    /// Zone applied to wall-clock timestamps without an explicit offset.
    pub source_offset: FixedOffset,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            bounds: GeoBounds::default(),
            source_offset: philippine_time(),
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let source_offset = FixedOffset::east_opt(config.source_utc_offset_minutes * 60)
            .unwrap_or_else(philippine_time);
        Self {
            bounds: config.bounds,
            source_offset,
        }
    }
}

/// Records plus the diagnostics explaining how they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<EarthquakeRecord>,
    pub report: ExtractionReport,
}

/// Extraction strategies, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `<table>` rows mapped through the layout ladder.
    Table,
    /// Elements tagged `earthquake`/`quake`/`seismic`/`event` with labeled text.
    Attribute,
    /// JSON arrays inside `<script>` bodies.
    Embedded,
    /// Coordinates and magnitude labels in visible prose.
    FreeText,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Table,
        Strategy::Attribute,
        Strategy::Embedded,
        Strategy::FreeText,
    ];

    /// Short tag used as the record id prefix.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Strategy::Table => "table",
            Strategy::Attribute => "attr",
            Strategy::Embedded => "embed",
            Strategy::FreeText => "text",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Where a candidate came from: table/row for tables, group/index otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPosition {
    pub table: usize,
    pub row: usize,
}

/// How a candidate expresses its event time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum When {
    /// Wall-clock text still to be normalized. `time` may be empty when
    /// `date` already carries the clock.
    Text { date: String, time: String },
    /// Already absolute.
    EpochMillis(i64),
    /// The source gave no time at all.
    Unknown,
}

/// Fields pulled out of one candidate before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    pub magnitude: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<f64>,
    pub place: Option<String>,
    pub when: When,
}

pub(crate) type Candidate = (RowPosition, Result<PartialRecord, SkipReason>);

/// Extract earthquake records from bulletin markup.
///
/// Never fails: a page with nothing recognizable yields an empty record list
/// and a report whose `strategy` is `None`.
#[must_use]
pub fn extract_earthquakes(html: &str, options: &ExtractOptions) -> Extraction {
    extract_at(html, options, Utc::now())
}

/// [`extract_earthquakes`] with an explicit extraction clock.
#[must_use]
pub fn extract_at(html: &str, options: &ExtractOptions, now: DateTime<Utc>) -> Extraction {
    let document = Html::parse_document(html);
    let mut report = ExtractionReport::default();

    for strategy in Strategy::ALL {
        let candidates = strategies::run(strategy, &document, &options.bounds);
        let seen = candidates.len();
        let mut accepted = Vec::new();
        let mut degraded = 0;

        for (position, candidate) in candidates {
            let outcome = candidate.and_then(|partial| {
                let time = resolve_time(&partial.when, options.source_offset, now);
                validate::validate(&partial, time.millis, &options.bounds)
                    .map(|valid| (valid, time.degraded))
            });
            match outcome {
                Ok((valid, was_degraded)) => {
                    if was_degraded {
                        degraded += 1;
                    }
                    accepted.push((position, valid));
                }
                Err(reason) => {
                    tracing::debug!(
                        strategy = strategy.tag(),
                        table = position.table,
                        row = position.row,
                        reason = %reason,
                        "skipping candidate"
                    );
                    report.record_skip(reason);
                }
            }
        }

        report.attempts.push(StrategyAttempt {
            strategy,
            candidates: seen,
            accepted: accepted.len(),
        });
        if accepted.is_empty() {
            tracing::debug!(strategy = strategy.tag(), candidates = seen, "strategy found nothing");
            continue;
        }

        let mut ids = IdAllocator::new(now.timestamp_millis());
        let mut records: Vec<EarthquakeRecord> = accepted
            .into_iter()
            .map(|(position, valid)| assemble(ids.next_id(strategy, position), valid))
            .collect();

        report.duplicates_removed = dedupe_and_sort(&mut records);
        report.strategy = Some(strategy);
        report.degraded_timestamps = degraded;
        report.returned = records.len();

        tracing::info!(
            strategy = strategy.tag(),
            returned = report.returned,
            rejected = report.rejected_rows(),
            duplicates = report.duplicates_removed,
            degraded = report.degraded_timestamps,
            "extracted earthquake records"
        );
        return Extraction { records, report };
    }

    tracing::warn!(
        skipped = report.total_skipped(),
        "no earthquake records found in document"
    );
    Extraction {
        records: Vec::new(),
        report,
    }
}

fn resolve_time(when: &When, source_offset: FixedOffset, now: DateTime<Utc>) -> NormalizedTime {
    match when {
        When::Text { date, time } => normalize_at(date, time, source_offset, now),
        When::EpochMillis(millis) => NormalizedTime {
            millis: *millis,
            degraded: false,
        },
        When::Unknown => NormalizedTime {
            millis: now.timestamp_millis(),
            degraded: true,
        },
    }
}
