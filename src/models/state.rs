//! Crawl state derived from an existing store.

use std::collections::HashSet;

/// Identity set and next sequence number, rebuilt from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlState {
    fingerprints: HashSet<String>,
    next_number: u64,
}

impl CrawlState {
    /// State of an empty store.
    pub fn empty() -> Self {
        Self {
            fingerprints: HashSet::new(),
            next_number: 1,
        }
    }

    /// Fold `(number, fingerprint)` pairs read from a store.
    ///
    /// Rows without a parsable number still contribute their fingerprint.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Option<u64>, String)>,
    {
        let mut state = Self::empty();
        let mut max_number = 0;
        for (number, fingerprint) in entries {
            if let Some(n) = number {
                max_number = max_number.max(n);
            }
            if !fingerprint.is_empty() {
                state.fingerprints.insert(fingerprint);
            }
        }
        state.next_number = max_number.saturating_add(1);
        state
    }

    /// Whether a fingerprint is already stored.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    /// Number the next accepted record will receive.
    pub fn next_number(&self) -> u64 {
        self.next_number
    }

    /// Count of distinct stored fingerprints.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::empty()
    }
}
