// src/pipeline/dedup.rs

//! Two-stage duplicate filter: in-batch first, then against the store.

use std::collections::HashSet;

use crate::models::{CrawlState, NormalizedRecord};
use crate::pipeline::fingerprint;

/// A candidate that survived both stages, with its identity attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub record: NormalizedRecord,
    pub fingerprint: String,
}

/// Per-stage counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Candidates in the batch
    pub observed: usize,
    /// Later repeats of a fingerprint within the batch
    pub in_batch: usize,
    /// Fingerprints already in the store
    pub cross_run: usize,
    /// Survivors
    pub accepted: usize,
}

/// Filter a batch in page order.
///
/// The first occurrence of a fingerprint in the batch wins. Only batch-unique
/// candidates are then looked up in `state`.
pub fn dedup(batch: Vec<NormalizedRecord>, state: &CrawlState) -> (Vec<Accepted>, DedupStats) {
    let mut stats = DedupStats {
        observed: batch.len(),
        ..DedupStats::default()
    };
    let mut seen = HashSet::with_capacity(batch.len());

    let unique: Vec<Accepted> = batch
        .into_iter()
        .filter_map(|record| {
            let fingerprint = fingerprint::of_record(&record);
            if seen.insert(fingerprint.clone()) {
                Some(Accepted { record, fingerprint })
            } else {
                stats.in_batch += 1;
                None
            }
        })
        .collect();

    let accepted: Vec<Accepted> = unique
        .into_iter()
        .filter(|candidate| {
            let known = state.contains(&candidate.fingerprint);
            if known {
                stats.cross_run += 1;
            }
            !known
        })
        .collect();

    stats.accepted = accepted.len();
    (accepted, stats)
}
