//! Service layer for the crawler application.
//!
//! This module contains the collaborators the capture pipeline talks to:
//! - Page fetching (`Fetcher`, `HttpFetcher`)
//! - Per-site item extraction (`ExtractStrategy`)

pub mod fetcher;
pub mod strategy;

pub use fetcher::{Diagnostics, FetchedPage, Fetcher, HttpFetcher};
pub use strategy::{CardStrategy, ExtractStrategy, LinkStrategy};
