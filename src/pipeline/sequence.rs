// src/pipeline/sequence.rs

//! Gapless, run-spanning record numbering.

use crate::models::{CrawlState, StoredRecord};
use crate::pipeline::dedup::Accepted;

/// Hands out record numbers; only accepted records consume one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequencer {
    next: u64,
}

impl Sequencer {
    /// Start at `next`.
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// Continue after the highest number in the store.
    pub fn from_state(state: &CrawlState) -> Self {
        Self::starting_at(state.next_number())
    }

    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Take the next number.
    pub fn next_number(&mut self) -> u64 {
        let n = self.next;
        self.next = self.next.saturating_add(1);
        n
    }

    /// Number accepted records in order and stamp them with `collect_time`.
    pub fn assign(&mut self, accepted: Vec<Accepted>, collect_time: &str) -> Vec<StoredRecord> {
        accepted
            .into_iter()
            .map(|a| StoredRecord::new(a.record, self.next_number(), a.fingerprint, collect_time))
            .collect()
    }
}
