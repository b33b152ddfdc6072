// src/storage/summary.rs

//! Per-cycle JSON run summaries.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::RunSummary;

/// Write `summary_{stamp}.json` into `log_dir` and return its path.
pub async fn write_summary(log_dir: &Path, stamp: &str, summary: &RunSummary) -> Result<PathBuf> {
    tokio::fs::create_dir_all(log_dir).await?;
    let path = log_dir.join(format!("summary_{stamp}.json"));
    let json = serde_json::to_string_pretty(summary)?;
    tokio::fs::write(&path, json).await?;
    log::debug!("Run summary saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_summary_fields() {
        let tmp = TempDir::new().unwrap();
        let summary = RunSummary {
            timestamp: "2025-03-09 14:05:07".into(),
            total_news: 30,
            new_news: 4,
            file_path: "data/continuous_news_2025-03-09.csv".into(),
        };

        let path = write_summary(tmp.path(), "20250309_140507", &summary)
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "summary_20250309_140507.json");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_news"], 30);
        assert_eq!(value["new_news"], 4);
        assert_eq!(value["timestamp"], "2025-03-09 14:05:07");
    }
}
