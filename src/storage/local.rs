//! Local filesystem record store.
//!
//! ## File Layout
//!
//! ```text
//! data/continuous_news_2025-03-09.csv
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ BOM "number","original_number","title",...,"fingerprint"         │  header, written once
//! │ "1","1","Alpha","x","http://x/a","","","2025-03-09 14:05:07","…" │
//! │ "2","","Beta", ...                                               │  appended per cycle
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are only ever appended. The crawl state (identity set and next number)
//! is recomputed from the file itself; there is no side index.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CrawlState, StoredRecord};
use crate::storage::csv::{self, BOM};
use crate::storage::{AppendOutcome, RecordStore};

const SEP: char = ',';

/// Append-only CSV store on the local filesystem.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Store backed by the file at `path` (created on first append).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the store's raw rows, header excluded. Missing file → no rows.
    async fn read_rows(&self) -> Result<(Option<Vec<String>>, Vec<Vec<String>>)> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((None, Vec::new())),
            Err(e) => return Err(AppError::store(&self.path, e)),
        };
        let text = String::from_utf8_lossy(&bytes);
        let mut rows = csv::parse_rows(&text, SEP);

        let has_header = rows
            .first()
            .and_then(|row| row.first())
            .is_some_and(|cell| cell == StoredRecord::COLUMNS[0]);
        let header = has_header.then(|| rows.remove(0));
        Ok((header, rows))
    }

    /// Load every readable record, skipping rows too short to be complete.
    pub async fn load_records(&self) -> Result<Vec<StoredRecord>> {
        let (_, rows) = self.read_rows().await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let [
                    number,
                    original_number,
                    title,
                    source,
                    link,
                    summary,
                    pub_time,
                    collect_time,
                    fingerprint,
                ]: [String; 9] = row.try_into().ok()?;
                Some(StoredRecord {
                    number: number.trim().parse().ok()?,
                    original_number,
                    title,
                    source,
                    link,
                    summary,
                    pub_time,
                    collect_time,
                    fingerprint,
                })
            })
            .collect())
    }

    /// Whether the file exists and already ends with a newline (or is empty).
    async fn needs_line_break(&self) -> Result<bool> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes.last().is_some_and(|b| *b != b'\n')),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::store(&self.path, e)),
        }
    }

    async fn is_new(&self) -> Result<bool> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(AppError::store(&self.path, e)),
        }
    }
}

#[async_trait]
impl RecordStore for CsvStore {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn load_state(&self) -> Result<CrawlState> {
        let (header, rows) = self.read_rows().await?;

        let column = |name: &str, fallback: usize| {
            header
                .as_ref()
                .and_then(|h| h.iter().position(|c| c == name))
                .unwrap_or(fallback)
        };
        let number_idx = column("number", 0);
        let fingerprint_idx = column("fingerprint", StoredRecord::COLUMNS.len() - 1);

        let state = CrawlState::from_entries(rows.into_iter().map(|row| {
            let number = row.get(number_idx).and_then(|n| n.trim().parse().ok());
            let fingerprint = row.get(fingerprint_idx).cloned().unwrap_or_default();
            (number, fingerprint)
        }));

        log::info!(
            "Loaded {} existing fingerprints from {} (next number {})",
            state.len(),
            self.path.display(),
            state.next_number()
        );
        Ok(state)
    }

    async fn append(&self, records: &[StoredRecord]) -> Result<AppendOutcome> {
        if records.is_empty() {
            return Ok(AppendOutcome::default());
        }

        let created = self.is_new().await?;
        let mut buf = String::new();
        if created {
            buf.push_str(BOM);
            buf.push_str(&csv::format_row_quoted(&StoredRecord::COLUMNS, SEP));
        } else if self.needs_line_break().await? {
            // A previous append was cut short; keep the next row on its own line.
            buf.push('\n');
        }
        for record in records {
            buf.push_str(&csv::format_row_quoted(&record.to_row(), SEP));
        }

        let write = async {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(buf.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        };
        write.await.map_err(|e| AppError::store(&self.path, e))?;

        Ok(AppendOutcome {
            appended: records.len(),
            created,
        })
    }
}

/// Write a tab-separated spreadsheet copy of `records` to `path` (overwrites).
pub async fn export_tsv(path: &Path, records: &[StoredRecord]) -> Result<()> {
    let mut buf = String::from(BOM);
    buf.push_str(&csv::format_row_minimal(&StoredRecord::COLUMNS, '\t'));
    for record in records {
        buf.push_str(&csv::format_row_minimal(&record.to_row(), '\t'));
    }
    tokio::fs::write(path, buf)
        .await
        .map_err(|e| AppError::store(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(number: u64, title: &str, fingerprint: &str) -> StoredRecord {
        StoredRecord {
            number,
            original_number: String::new(),
            title: title.to_string(),
            source: "x".to_string(),
            link: format!("http://x/{title}"),
            summary: "has, comma and \"quotes\"".to_string(),
            pub_time: String::new(),
            collect_time: "2025-03-09 14:05:07".to_string(),
            fingerprint: fingerprint.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_store_is_empty_state() {
        let tmp = TempDir::new().unwrap();
        let store = CsvStore::new(tmp.path().join("none.csv"));

        let state = store.load_state().await.unwrap();
        assert_eq!(state.next_number(), 1);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_header_written_once_with_bom() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/store.csv");
        let store = CsvStore::new(&path);

        let first = store.append(&[record(1, "a", "fa")]).await.unwrap();
        let second = store.append(&[record(2, "b", "fb")]).await.unwrap();
        assert!(first.created);
        assert!(!second.created);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(BOM));
        assert_eq!(text.matches("\"fingerprint\"").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = CsvStore::new(tmp.path().join("store.csv"));
        let records: Vec<_> = (1..=5)
            .map(|n| record(n, &format!("t{n}"), &format!("f{n}")))
            .collect();
        store.append(&records).await.unwrap();

        let state = store.load_state().await.unwrap();
        assert_eq!(state.next_number(), 6);
        assert_eq!(state.len(), 5);

        let loaded = store.load_records().await.unwrap();
        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_torn_row_is_tolerated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.csv");
        let store = CsvStore::new(&path);
        store.append(&[record(1, "a", "fa")]).await.unwrap();

        // Simulate an append that died mid-row.
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("\"2\",\"\",\"b\"");
        std::fs::write(&path, text).unwrap();

        let state = store.load_state().await.unwrap();
        assert_eq!(state.next_number(), 3);
        assert!(state.contains("fa"));

        store.append(&[record(3, "c", "fc")]).await.unwrap();
        let loaded = store.load_records().await.unwrap();
        assert_eq!(loaded.iter().map(|r| r.number).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_row_torn_inside_quotes_keeps_later_rows_readable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.csv");
        let store = CsvStore::new(&path);
        store.append(&[record(1, "a", "fa")]).await.unwrap();

        // The append stopped inside an open quoted field.
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("\"2\",\"\",\"Half-writ");
        std::fs::write(&path, text).unwrap();

        assert_eq!(store.load_state().await.unwrap().next_number(), 3);
        store.append(&[record(3, "b", "fb")]).await.unwrap();
        store.append(&[record(4, "c", "fc")]).await.unwrap();

        let state = store.load_state().await.unwrap();
        assert_eq!(state.len(), 3);
        assert!(state.contains("fb") && state.contains("fc"));
        assert_eq!(state.next_number(), 5);

        let loaded = store.load_records().await.unwrap();
        assert_eq!(loaded.iter().map(|r| r.number).collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(loaded[1], record(3, "b", "fb"));
    }

    #[tokio::test]
    async fn test_empty_append_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.csv");
        let outcome = CsvStore::new(&path).append(&[]).await.unwrap();
        assert_eq!(outcome.appended, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_export_tsv() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("copy.tsv");
        export_tsv(&path, &[record(1, "a", "fa")]).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let rows = csv::parse_rows(&text, '\t');
        assert_eq!(rows[0][0], "number");
        assert_eq!(rows[1][5], "has, comma and \"quotes\"");
    }
}
