// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod run;
mod state;

// Re-export all public types
pub use config::{
    ArtifactsConfig, Config, FetcherConfig, JanitorConfig, LoggingConfig, PathsConfig,
    RunnerKind, ScheduleConfig, StrategyKind, TargetConfig,
};
pub use record::{NormalizedRecord, RawItem, StoredRecord};
pub use run::{RunResult, RunSummary};
pub use state::CrawlState;

/// Whether a cycle appends to a growing store or writes a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// One cycle into a fresh, independently numbered store
    Single,
    /// Repeated cycles into one store; numbering continues across cycles
    Continuous,
}
