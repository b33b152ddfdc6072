//! Per-cycle outcome types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Outcome of one capture cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,

    /// Candidates observed before deduplication
    pub total_count: usize,

    /// Records appended this cycle
    pub news_count: usize,

    /// Store written to, if the cycle got that far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    pub fn succeeded(total_count: usize, news_count: usize, file_path: PathBuf) -> Self {
        Self {
            success: true,
            total_count,
            news_count,
            file_path: Some(file_path),
            error: None,
        }
    }

    pub fn failed(error: impl ToString, file_path: Option<PathBuf>) -> Self {
        Self {
            success: false,
            total_count: 0,
            news_count: 0,
            file_path,
            error: Some(error.to_string()),
        }
    }
}

/// JSON run summary written after each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub total_news: usize,
    pub new_news: usize,
    pub file_path: String,
}
