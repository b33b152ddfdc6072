//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page to capture and how to extract items from it
    #[serde(default)]
    pub target: TargetConfig,

    /// HTTP fetching behavior
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Continuous-mode timing and runner selection
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Output and artifact locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Diagnostic artifact toggles
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Side-artifact retention
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.target.url.trim().is_empty() {
            return Err(AppError::validation("target.url is empty"));
        }
        url::Url::parse(&self.target.url)?;
        for (name, selector) in self.target.selectors() {
            scraper::Selector::parse(selector).map_err(|e| {
                AppError::selector(format!("target.{name}: {selector}"), format!("{e:?}"))
            })?;
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        let interval = self.schedule.interval_minutes;
        if interval.is_nan() || interval <= 0.0 {
            return Err(AppError::validation(
                "schedule.interval_minutes must be > 0",
            ));
        }
        if self.janitor.max_files == 0 {
            return Err(AppError::validation("janitor.max_files must be > 0"));
        }
        if self.janitor.every_cycles == 0 {
            return Err(AppError::validation("janitor.every_cycles must be > 0"));
        }
        Ok(())
    }
}

/// How raw item nodes are located on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Card containers with title/link/source/time/summary sub-selectors,
    /// falling back to `Links` when no card matches
    Cards,
    /// Every sufficiently long, non-fragment, non-script link
    Links,
}

/// Target page and per-site extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Page URL to capture
    #[serde(default = "defaults::url")]
    pub url: String,

    /// Extraction strategy for this site
    #[serde(default = "defaults::strategy")]
    pub strategy: StrategyKind,

    /// Selector for each item container
    #[serde(default = "defaults::card_selector")]
    pub card_selector: String,

    /// Selector for the title element within a card
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// Selector for the link element within a card
    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// Selector for the source/publisher element within a card
    #[serde(default = "defaults::source_selector")]
    pub source_selector: String,

    /// Selector for the publish-time element within a card
    #[serde(default = "defaults::time_selector")]
    pub time_selector: String,

    /// Selector for the summary element within a card
    #[serde(default = "defaults::summary_selector")]
    pub summary_selector: String,

    /// Link-fallback: minimum link text length (in characters) to count as a title
    #[serde(default = "defaults::min_link_text")]
    pub min_link_text: usize,
}

impl TargetConfig {
    /// All configured selectors with their field names.
    pub fn selectors(&self) -> [(&'static str, &str); 6] {
        [
            ("card_selector", &self.card_selector),
            ("title_selector", &self.title_selector),
            ("link_selector", &self.link_selector),
            ("source_selector", &self.source_selector),
            ("time_selector", &self.time_selector),
            ("summary_selector", &self.summary_selector),
        ]
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            strategy: defaults::strategy(),
            card_selector: defaults::card_selector(),
            title_selector: defaults::title_selector(),
            link_selector: defaults::link_selector(),
            source_selector: defaults::source_selector(),
            time_selector: defaults::time_selector(),
            summary_selector: defaults::summary_selector(),
            min_link_text: defaults::min_link_text(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// How each continuous-mode cycle is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunnerKind {
    /// Run the pipeline inside the scheduler process
    InProcess,
    /// Re-launch this executable for every cycle
    ExternalProcess,
}

/// Continuous-mode schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Minutes between cycle starts
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: f64,

    /// Cycle runner strategy
    #[serde(default = "defaults::runner")]
    pub runner: RunnerKind,
}

impl ScheduleConfig {
    /// Interval between cycle starts.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_minutes * 60.0).unwrap_or(Duration::ZERO)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: defaults::interval_minutes(),
            runner: defaults::runner(),
        }
    }
}

/// Output and side-artifact directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding record stores
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,

    /// Directory for page-state snapshots
    #[serde(default = "defaults::snapshot_dir")]
    pub snapshot_dir: String,

    /// Directory for raw HTML dumps
    #[serde(default = "defaults::html_cache_dir")]
    pub html_cache_dir: String,

    /// Directory for log files and run summaries
    #[serde(default = "defaults::log_dir")]
    pub log_dir: String,

    /// Explicit store path for continuous mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

impl PathsConfig {
    /// Store path for continuous mode: the override, or one file per start date.
    pub fn continuous_store(&self, now: &DateTime<Local>) -> PathBuf {
        match &self.store {
            Some(path) => PathBuf::from(path),
            None => Path::new(&self.data_dir)
                .join(format!("continuous_news_{}.csv", now.format("%Y-%m-%d"))),
        }
    }

    /// Fresh, timestamped store path for single-capture mode.
    pub fn single_store(&self, now: &DateTime<Local>) -> PathBuf {
        Path::new(&self.data_dir).join(format!(
            "news_{}_{}.csv",
            now.format("%Y-%m-%d"),
            now.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Side-artifact directories managed by the janitor.
    pub fn artifact_dirs(&self) -> [PathBuf; 3] {
        [
            PathBuf::from(&self.snapshot_dir),
            PathBuf::from(&self.html_cache_dir),
            PathBuf::from(&self.log_dir),
        ]
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            snapshot_dir: defaults::snapshot_dir(),
            html_cache_dir: defaults::html_cache_dir(),
            log_dir: defaults::log_dir(),
            store: None,
        }
    }
}

/// Diagnostic artifact toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Write page-state snapshots
    #[serde(default = "defaults::enabled")]
    pub snapshots: bool,

    /// Write raw HTML dumps
    #[serde(default = "defaults::enabled")]
    pub html_cache: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            snapshots: true,
            html_cache: true,
        }
    }
}

/// Side-artifact retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Newest files kept per directory
    #[serde(default = "defaults::max_files")]
    pub max_files: usize,

    /// Age in days after which a file counts as expired
    #[serde(default = "defaults::keep_days")]
    pub keep_days: u32,

    /// Run the janitor once every this many cycles
    #[serde(default = "defaults::every_cycles")]
    pub every_cycles: u64,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            max_files: defaults::max_files(),
            keep_days: defaults::keep_days(),
            every_cycles: defaults::every_cycles(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    use super::{RunnerKind, StrategyKind};

    // Target defaults
    pub fn url() -> String {
        "https://newsnow.busiyi.world/c/hottest".into()
    }
    pub fn strategy() -> StrategyKind {
        StrategyKind::Cards
    }
    pub fn card_selector() -> String {
        ".card, .article-card, .news-card, article, .item".into()
    }
    pub fn title_selector() -> String {
        r#"h2, h3, h4, .title, [class*="title"], a"#.into()
    }
    pub fn link_selector() -> String {
        "a".into()
    }
    pub fn source_selector() -> String {
        concat!(
            r#".source, [class*="source"], .author, [class*="author"], .publisher, "#,
            r#".site, .domain, .hostname, [class*="hostname"], [class*="domain"], [class*="site"]"#
        )
        .into()
    }
    pub fn time_selector() -> String {
        r#"time, .time, .date, [class*="time"], [class*="date"], [datetime]"#.into()
    }
    pub fn summary_selector() -> String {
        concat!(
            ".summary, .description, .abstract, .content, ",
            r#"[class*="summary"], [class*="description"], [class*="abstract"], [class*="content"]"#
        )
        .into()
    }
    pub fn min_link_text() -> usize {
        10
    }

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; news-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        60
    }

    // Schedule defaults
    pub fn interval_minutes() -> f64 {
        5.0
    }
    pub fn runner() -> RunnerKind {
        RunnerKind::InProcess
    }

    // Path defaults
    pub fn data_dir() -> String {
        "data".into()
    }
    pub fn snapshot_dir() -> String {
        "screenshots".into()
    }
    pub fn html_cache_dir() -> String {
        "html_cache".into()
    }
    pub fn log_dir() -> String {
        "logs".into()
    }

    pub fn enabled() -> bool {
        true
    }

    // Janitor defaults
    pub fn max_files() -> usize {
        100
    }
    pub fn keep_days() -> u32 {
        3
    }
    pub fn every_cycles() -> u64 {
        10
    }

    pub fn level() -> String {
        "info".into()
    }
}
