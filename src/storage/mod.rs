//! Storage abstractions for captured records.
//!
//! The canonical store is one append-only CSV file per capture session; run
//! summaries are small JSON files next to the logs.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── continuous_news_2025-03-09.csv          # Continuous mode: grows every cycle
//! ├── news_2025-03-09_20250309_140507.csv     # Single capture: fresh store
//! └── news_2025-03-09_20250309_140507.tsv     # Single capture: spreadsheet copy
//! logs/
//! ├── crawler_20250309.log
//! └── summary_20250309_140507.json
//! ```

pub mod csv;
pub mod local;
pub mod summary;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CrawlState, StoredRecord};

// Re-export for convenience
pub use local::{export_tsv, CsvStore};
pub use summary::write_summary;

/// Result of one append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Rows written
    pub appended: usize,
    /// Whether this append created the store (and wrote its header)
    pub created: bool,
}

/// Trait for record store backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Location of the store, reported in run results and summaries.
    fn path(&self) -> &Path;

    /// Rebuild the identity set and next sequence number from stored rows.
    ///
    /// A store that does not exist yet yields the empty state.
    async fn load_state(&self) -> Result<CrawlState>;

    /// Append records in column order. The header is written only when the
    /// store is created; an empty batch never creates a store.
    async fn append(&self, records: &[StoredRecord]) -> Result<AppendOutcome>;
}
