// src/utils/log.rs

//! Logging handle with server-style formatting helpers.
//!
//! The `log` facade carries all messages. This handle owns the daily log file
//! that the backend tees into, and must be shut down explicitly so buffered
//! lines reach disk. It is created once in `main` and passed to the components
//! that print structured progress (headers, steps, summaries).

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::error::Result;

/// Shared, line-buffered daily log file.
type SharedFile = Arc<Mutex<BufWriter<File>>>;

/// Observability handle passed into the pipeline and scheduler.
#[derive(Clone, Default)]
pub struct Logger {
    file: Option<SharedFile>,
    path: Option<PathBuf>,
}

impl Logger {
    /// Handle without a file sink (console only).
    pub fn console() -> Self {
        Self::default()
    }

    /// Open (or append to) `crawler_YYYYMMDD.log` inside `log_dir`.
    pub fn open(log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("crawler_{}.log", Local::now().format("%Y%m%d")));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            file: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
            path: Some(path),
        })
    }

    /// Path of the daily log file, if one is open.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writer that copies every formatted log line to stderr and the file sink.
    pub fn tee(&self) -> TeeWriter {
        TeeWriter {
            file: self.file.clone(),
        }
    }

    /// Flush the file sink. Call once before the process exits.
    pub fn shutdown(&self) {
        log::logger().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }

    /// Log a header
    pub fn header(&self, title: &str) {
        let border = "═".repeat(60);
        log::info!("{}", border);
        log::info!("  {}", title);
        log::info!("{}", border);
    }

    /// Log a step in a process
    pub fn step(&self, step_num: u64, message: &str) {
        log::info!("[CYCLE {}] {}", step_num, message);
    }

    /// Log a sub-item (indented)
    pub fn sub_item(&self, message: &str) {
        log::info!("    {}", message);
    }

    /// Log a summary section
    pub fn summary(&self, title: &str, items: &[(&str, String)]) {
        log::info!("[SUMMARY] {}", title);
        for (key, value) in items {
            log::info!("    {}: {}", key, value);
        }
    }
}

/// Log target that mirrors output to stderr and the daily file.
pub struct TeeWriter {
    file: Option<SharedFile>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                // A failing log file never takes console logging down with it.
                let _ = file.write_all(buf);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                file.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tee_writes_to_daily_file() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::open(tmp.path()).unwrap();

        let mut tee = logger.tee();
        tee.write_all(b"[INFO] hello\n").unwrap();
        logger.shutdown();

        let path = logger.path().unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("crawler_"));
        assert_eq!(fs::read_to_string(path).unwrap(), "[INFO] hello\n");
    }

    #[test]
    fn test_console_logger_has_no_file() {
        let logger = Logger::console();
        assert!(logger.path().is_none());
        let mut tee = logger.tee();
        assert!(tee.write(b"x\n").is_ok());
    }
}
