// src/pipeline/extract.rs

//! Raw item → normalized record.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::models::{NormalizedRecord, RawItem};
use crate::utils::clean_text;
use crate::utils::url::{resolve, source_from_link};

/// Leading ordinal: digits, then `.`, `．`, `、` or whitespace, then the rest.
fn ordinal_pattern() -> Option<&'static Regex> {
    static ORDINAL: OnceLock<Option<Regex>> = OnceLock::new();
    ORDINAL
        .get_or_init(|| Regex::new(r"^(\d+)(?:[.．、]\s*|\s+)(.+)$").ok())
        .as_ref()
}

/// Split a cleaned title into `(original_number, title)`.
///
/// Titles without a separated leading number come back unchanged with an
/// empty ordinal, so `"2025"` and `"3D printing"` keep their digits.
pub fn split_ordinal(title: &str) -> (String, String) {
    ordinal_pattern()
        .and_then(|re| re.captures(title))
        .and_then(|caps| {
            let rest = caps.get(2)?.as_str().trim();
            (!rest.is_empty()).then(|| (caps[1].to_string(), rest.to_string()))
        })
        .unwrap_or_else(|| (String::new(), title.to_string()))
}

/// Clean one raw item. Returns `None` only when the title is empty after cleaning.
pub fn normalize(raw: RawItem, base: &Url) -> Option<NormalizedRecord> {
    let cleaned = clean_text(&raw.title);
    if cleaned.is_empty() {
        return None;
    }
    let (original_number, title) = split_ordinal(&cleaned);

    let link = raw
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| resolve(base, l))
        .unwrap_or_default();

    let source = raw
        .source
        .as_deref()
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| source_from_link(&link));

    Some(NormalizedRecord {
        title,
        original_number,
        source,
        link,
        summary: raw.summary.as_deref().map(clean_text).unwrap_or_default(),
        pub_time: raw.pub_time.as_deref().map(clean_text).unwrap_or_default(),
    })
}

/// Normalize a whole batch in page order, dropping empty titles.
pub fn normalize_batch(items: Vec<RawItem>, base: &Url) -> Vec<NormalizedRecord> {
    let total = items.len();
    let records: Vec<_> = items
        .into_iter()
        .filter_map(|raw| normalize(raw, base))
        .collect();
    if records.len() < total {
        log::debug!("Dropped {} items with empty titles", total - records.len());
    }
    records
}
