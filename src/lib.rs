// src/lib.rs

//! Headline capture library: periodic, deduplicated, append-only news ledger.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
