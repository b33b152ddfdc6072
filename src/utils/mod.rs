//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod url;

use chrono::{DateTime, Local};

/// Collapse all whitespace runs (including newlines) to a single space and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human-readable capture time, e.g. `2025-03-09 14:05:07`.
pub fn collect_time(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Filename-safe timestamp, e.g. `20250309_140507`.
pub fn file_stamp(now: &DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}
