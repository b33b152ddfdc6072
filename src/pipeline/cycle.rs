// src/pipeline/cycle.rs

//! One capture cycle: fetch → extract → dedup → sequence → persist.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::models::{CaptureMode, Config, RunResult, RunSummary};
use crate::pipeline::{dedup, extract, sequence::Sequencer};
use crate::services::Fetcher;
use crate::storage::{self, CsvStore, RecordStore};
use crate::utils::log::Logger;
use crate::utils::{collect_time, file_stamp};

/// Spreadsheet copy written next to a single-capture store.
pub fn export_path(store_path: &Path) -> PathBuf {
    store_path.with_extension("tsv")
}

/// Run one cycle against `store_path`.
///
/// Never returns an error: every failure is logged and reported as a failed
/// [`RunResult`] so the caller can keep going.
pub async fn run_cycle(
    config: &Config,
    fetcher: &dyn Fetcher,
    mode: CaptureMode,
    store_path: &Path,
    logger: &Logger,
) -> RunResult {
    let now = Local::now();
    let stamp = file_stamp(&now);
    let store = CsvStore::new(store_path);

    // State first: a store we cannot read must not be appended to blindly.
    let state = match store.load_state().await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to load crawl state: {}", e);
            return RunResult::failed(e, Some(store_path.to_path_buf()));
        }
    };

    let page = match fetcher.fetch(&config.target.url).await {
        Ok(page) => page,
        Err(e) => {
            log::error!("Capture aborted: {}", e);
            return RunResult::failed(e, None);
        }
    };

    let candidates = extract::normalize_batch(page.items, &page.base);
    if candidates.is_empty() {
        log::warn!("No items extracted from {}", config.target.url);
    }

    let (accepted, stats) = dedup::dedup(candidates, &state);
    logger.sub_item(&format!(
        "{} candidates, {} repeated in batch, {} already stored, {} new",
        stats.observed, stats.in_batch, stats.cross_run, stats.accepted
    ));

    let mut sequencer = Sequencer::from_state(&state);
    let records = sequencer.assign(accepted, &collect_time(&now));

    if let Err(e) = store.append(&records).await {
        log::error!("Failed to append to store: {}", e);
        return RunResult::failed(e, Some(store_path.to_path_buf()));
    }

    if mode == CaptureMode::Single && !records.is_empty() {
        let export = export_path(store_path);
        if let Err(e) = storage::export_tsv(&export, &records).await {
            log::error!("Failed to write spreadsheet copy: {}", e);
            return RunResult::failed(e, Some(store_path.to_path_buf()));
        }
        logger.sub_item(&format!("Spreadsheet copy: {}", export.display()));
    }

    let summary = RunSummary {
        timestamp: collect_time(&now),
        total_news: stats.observed,
        new_news: records.len(),
        file_path: store_path.display().to_string(),
    };
    if let Err(e) =
        storage::write_summary(Path::new(&config.paths.log_dir), &stamp, &summary).await
    {
        log::error!("Failed to write run summary: {}", e);
        return RunResult::failed(e, Some(store_path.to_path_buf()));
    }

    logger.summary(
        "Capture complete",
        &[
            ("Observed", stats.observed.to_string()),
            ("New", records.len().to_string()),
            ("Next number", sequencer.peek().to_string()),
            ("Store", store_path.display().to_string()),
        ],
    );

    RunResult::succeeded(stats.observed, records.len(), store_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;
    use url::Url;

    use crate::error::{AppError, Result};
    use crate::models::RawItem;
    use crate::services::FetchedPage;

    struct FailingFetcher;

    #[async_trait]
    impl Fetcher for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            Err(AppError::fetch(url, "navigation timeout"))
        }
    }

    struct EmptyFetcher;

    #[async_trait]
    impl Fetcher for EmptyFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage> {
            Ok(FetchedPage {
                base: Url::parse("http://x/").unwrap(),
                items: vec![RawItem::new("   ", "/blank")],
            })
        }
    }

    fn config(tmp: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.log_dir = tmp.path().join("logs").display().to_string();
        config
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_failed_result() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("store.csv");

        let result = run_cycle(
            &config(&tmp),
            &FailingFetcher,
            CaptureMode::Continuous,
            &store,
            &Logger::console(),
        )
        .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("navigation timeout"));
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_empty_extraction_succeeds_with_zero_new() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("store.csv");

        let result = run_cycle(
            &config(&tmp),
            &EmptyFetcher,
            CaptureMode::Single,
            &store,
            &Logger::console(),
        )
        .await;

        assert!(result.success);
        assert_eq!(result.news_count, 0);
        assert_eq!(result.total_count, 0);
        assert!(!store.exists());
        assert!(!export_path(&store).exists());
        assert_eq!(std::fs::read_dir(tmp.path().join("logs")).unwrap().count(), 1);
    }
}
