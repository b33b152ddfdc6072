// src/pipeline/janitor.rs

//! Bounded retention for side-artifact directories.
//!
//! Snapshots, HTML dumps and logs grow by a few files per cycle. The janitor
//! keeps the newest `max_files` of each directory and deletes the rest,
//! tagging each victim as expired (older than `keep_days`) or overflow.
//! Directories at or under the cap are left alone.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::models::JanitorConfig;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Why a file was selected for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Beyond the newest `max_files` and older than `keep_days`
    Expired,
    /// Beyond the newest `max_files`, still within `keep_days`
    Overflow,
}

/// A file the janitor intends to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victim {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub reason: Reason,
}

/// Outcome of cleaning one or more directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub scanned: usize,
    pub expired: usize,
    pub overflow: usize,
    pub failed: usize,
}

impl CleanStats {
    pub fn deleted(&self) -> usize {
        self.expired + self.overflow
    }

    fn merge(&mut self, other: CleanStats) {
        self.scanned += other.scanned;
        self.expired += other.expired;
        self.overflow += other.overflow;
        self.failed += other.failed;
    }
}

/// Pick victims from `(path, mtime)` entries.
///
/// Newest first; ties broken by path so the result is stable.
pub fn plan(
    mut entries: Vec<(PathBuf, SystemTime)>,
    policy: &JanitorConfig,
    now: SystemTime,
) -> Vec<Victim> {
    if entries.len() <= policy.max_files {
        return Vec::new();
    }
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let max_age = DAY * policy.keep_days;
    entries
        .into_iter()
        .skip(policy.max_files)
        .map(|(path, modified)| {
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            let reason = if age > max_age {
                Reason::Expired
            } else {
                Reason::Overflow
            };
            Victim {
                path,
                modified,
                reason,
            }
        })
        .collect()
}

async fn list_files(dir: &Path) -> Result<Vec<(PathBuf, SystemTime)>> {
    let mut files = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let meta = match entry.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((entry.path(), modified));
    }
    Ok(files)
}

/// Clean one directory. A missing directory is empty, not an error.
pub async fn clean_dir(dir: &Path, policy: &JanitorConfig) -> Result<CleanStats> {
    let files = list_files(dir).await?;
    let mut stats = CleanStats {
        scanned: files.len(),
        ..CleanStats::default()
    };

    for victim in plan(files, policy, SystemTime::now()) {
        match tokio::fs::remove_file(&victim.path).await {
            Ok(()) => {
                log::debug!("Removed {:?} artifact {}", victim.reason, victim.path.display());
                match victim.reason {
                    Reason::Expired => stats.expired += 1,
                    Reason::Overflow => stats.overflow += 1,
                }
            }
            Err(e) => {
                log::warn!("Failed to remove {}: {}", victim.path.display(), e);
                stats.failed += 1;
            }
        }
    }

    if stats.deleted() > 0 {
        log::info!(
            "Cleaned {}: {} expired, {} over the {}-file cap",
            dir.display(),
            stats.expired,
            stats.overflow,
            policy.max_files
        );
    }
    Ok(stats)
}

/// Clean every directory; a directory that cannot be listed is logged and skipped.
pub async fn clean_all(dirs: &[PathBuf], policy: &JanitorConfig) -> CleanStats {
    let mut total = CleanStats::default();
    for dir in dirs {
        match clean_dir(dir, policy).await {
            Ok(stats) => total.merge(stats),
            Err(e) => log::warn!("Failed to clean {}: {}", dir.display(), e),
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn policy(max_files: usize, keep_days: u32) -> JanitorConfig {
        JanitorConfig {
            max_files,
            keep_days,
            every_cycles: 1,
        }
    }

    fn entries(now: SystemTime, ages_in_hours: &[u64]) -> Vec<(PathBuf, SystemTime)> {
        ages_in_hours
            .iter()
            .enumerate()
            .map(|(i, h)| {
                (
                    PathBuf::from(format!("f{i}")),
                    now - Duration::from_secs(h * 3600),
                )
            })
            .collect()
    }

    #[test]
    fn test_under_cap_is_untouched() {
        let now = SystemTime::now();
        let victims = plan(entries(now, &[1000, 2000, 3000]), &policy(3, 1), now);
        assert!(victims.is_empty());
    }

    #[test]
    fn test_newest_kept_even_when_expired() {
        let now = SystemTime::now();
        // All files are far older than keep_days.
        let victims = plan(entries(now, &[500, 400, 300, 200]), &policy(2, 1), now);

        let names: Vec<_> = victims.iter().map(|v| v.path.display().to_string()).collect();
        assert_eq!(names, vec!["f1", "f0"]);
        assert!(victims.iter().all(|v| v.reason == Reason::Expired));
    }

    #[test]
    fn test_overflow_classification() {
        let now = SystemTime::now();
        let victims = plan(entries(now, &[1, 2, 3, 100]), &policy(2, 3), now);
        let reasons: Vec<_> = victims.iter().map(|v| v.reason).collect();
        assert_eq!(reasons, vec![Reason::Overflow, Reason::Expired]);
    }

    #[tokio::test]
    async fn test_ten_recent_files_cap_five() {
        let tmp = TempDir::new().unwrap();
        let now = SystemTime::now();
        for i in 0..10u64 {
            let file = File::create(tmp.path().join(format!("snap_{i}.json"))).unwrap();
            // snap_9 is the newest.
            file.set_modified(now - Duration::from_secs((10 - i) * 60)).unwrap();
        }

        let stats = clean_dir(tmp.path(), &policy(5, 3)).await.unwrap();
        assert_eq!(stats.scanned, 10);
        assert_eq!(stats.overflow, 5);
        assert_eq!(stats.expired, 0);

        let mut left: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec!["snap_5.json", "snap_6.json", "snap_7.json", "snap_8.json", "snap_9.json"]
        );
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let stats = clean_all(&[tmp.path().join("nope")], &policy(1, 1)).await;
        assert_eq!(stats, CleanStats::default());
    }
}
