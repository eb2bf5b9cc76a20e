//! Record identity and final assembly.

use std::collections::HashSet;

use quakefeed_core::EarthquakeRecord;

use super::validate::ValidRecord;
use super::{RowPosition, Strategy};

/// Hands out record ids for one extraction run.
///
/// Ids read `{strategy}-{table}-{row}-{extracted_at_ms}-{hex6}`. The random
/// suffix keeps ids from colliding across runs that share a timestamp; the
/// issued set guarantees uniqueness within a run.
pub(crate) struct IdAllocator {
    extracted_at_ms: i64,
    issued: HashSet<String>,
}

impl IdAllocator {
    pub(crate) fn new(extracted_at_ms: i64) -> Self {
        Self {
            extracted_at_ms,
            issued: HashSet::new(),
        }
    }

    pub(crate) fn next_id(&mut self, strategy: Strategy, position: RowPosition) -> String {
        loop {
            let suffix = rand::random::<u32>() & 0x00ff_ffff;
            let id = format!(
                "{}-{}-{}-{}-{suffix:06x}",
                strategy.tag(),
                position.table,
                position.row,
                self.extracted_at_ms
            );
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

pub(crate) fn assemble(id: String, record: ValidRecord) -> EarthquakeRecord {
    EarthquakeRecord {
        id,
        magnitude: record.magnitude,
        place: record.place,
        time: record.time,
        longitude: record.longitude,
        latitude: record.latitude,
        depth: record.depth,
        url: String::new(),
        detail: String::new(),
    }
}
