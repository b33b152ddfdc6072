// src/services/fetcher.rs

//! Page fetcher service.
//!
//! Fetches the target page over HTTP, extracts raw item nodes with the
//! configured strategy, and leaves best-effort diagnostic artifacts behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, RawItem};
use crate::services::strategy::{self, ExtractStrategy};
use crate::utils::{collect_time, file_stamp, http};

/// One fetched page: raw items plus the origin relative links resolve against.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub base: Url,
    pub items: Vec<RawItem>,
}

/// Source of raw item nodes for a capture cycle.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its raw items. Any failure is a single opaque error.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Where diagnostic artifacts go; `None` disables that artifact kind.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub snapshot_dir: Option<PathBuf>,
    pub html_dir: Option<PathBuf>,
}

impl Diagnostics {
    /// Artifact locations according to the config toggles.
    pub fn from_config(config: &Config) -> Self {
        Self {
            snapshot_dir: config
                .artifacts
                .snapshots
                .then(|| PathBuf::from(&config.paths.snapshot_dir)),
            html_dir: config
                .artifacts
                .html_cache
                .then(|| PathBuf::from(&config.paths.html_cache_dir)),
        }
    }

    async fn write(dir: &Path, name: &str, bytes: &[u8]) {
        let path = dir.join(name);
        let result = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, bytes).await
        }
        .await;

        match result {
            Ok(()) => log::debug!("Diagnostic artifact saved to {}", path.display()),
            Err(e) => log::warn!("Failed to save diagnostic artifact {}: {}", path.display(), e),
        }
    }

    async fn snapshot<T: Serialize>(&self, name: &str, value: &T) {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };
        match serde_json::to_vec_pretty(value) {
            Ok(bytes) => Self::write(dir, name, &bytes).await,
            Err(e) => log::warn!("Failed to encode snapshot {}: {}", name, e),
        }
    }

    async fn html(&self, name: &str, body: &str) {
        if let Some(dir) = &self.html_dir {
            Self::write(dir, name, body.as_bytes()).await;
        }
    }
}

/// Page-state snapshot written after a successful fetch.
#[derive(Debug, Serialize)]
struct PageState<'a> {
    captured_at: String,
    url: &'a str,
    final_url: &'a str,
    status: u16,
    bytes: usize,
    strategy: &'static str,
    items: usize,
}

/// Failure snapshot written when a fetch aborts.
#[derive(Debug, Serialize)]
struct FetchFailure<'a> {
    captured_at: String,
    url: &'a str,
    status: Option<u16>,
    error: String,
}

/// HTTP fetcher driven by a configurable extraction strategy.
pub struct HttpFetcher {
    client: Client,
    strategy: Box<dyn ExtractStrategy>,
    diagnostics: Diagnostics,
}

impl HttpFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(&config.fetcher)?,
            strategy: strategy::from_config(&config.target)?,
            diagnostics: Diagnostics::from_config(config),
        })
    }

    /// Create a fetcher with an explicit strategy and artifact locations.
    pub fn with_parts(
        client: Client,
        strategy: Box<dyn ExtractStrategy>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            client,
            strategy,
            diagnostics,
        }
    }

    async fn fail(
        &self,
        stamp: &str,
        url: &str,
        status: Option<u16>,
        body: Option<&str>,
        error: impl std::fmt::Display,
    ) -> AppError {
        let err = AppError::fetch(url, error);
        log::error!("{}", err);

        let failure = FetchFailure {
            captured_at: collect_time(&Local::now()),
            url,
            status,
            error: err.to_string(),
        };
        self.diagnostics
            .snapshot(&format!("error_{stamp}.json"), &failure)
            .await;
        if let Some(body) = body {
            self.diagnostics
                .html(&format!("error_content_{stamp}.html"), body)
                .await;
        }
        err
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let stamp = file_stamp(&Local::now());
        log::info!("Fetching {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(&stamp, url, None, None, e).await),
        };

        let status = response.status();
        let final_url = response.url().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Err(self.fail(&stamp, url, Some(status.as_u16()), None, e).await),
        };

        if !status.is_success() {
            return Err(self
                .fail(&stamp, url, Some(status.as_u16()), Some(&body), format!("HTTP {status}"))
                .await);
        }

        self.diagnostics
            .html(&format!("page_content_{stamp}.html"), &body)
            .await;

        let items = self.strategy.extract(&body);
        log::info!(
            "Extracted {} raw items with '{}' strategy",
            items.len(),
            self.strategy.name()
        );

        let state = PageState {
            captured_at: collect_time(&Local::now()),
            url,
            final_url: final_url.as_str(),
            status: status.as_u16(),
            bytes: body.len(),
            strategy: self.strategy.name(),
            items: items.len(),
        };
        self.diagnostics
            .snapshot(&format!("page_state_{stamp}.json"), &state)
            .await;

        Ok(FetchedPage {
            base: final_url,
            items,
        })
    }
}
