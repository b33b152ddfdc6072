//! Captured item data structures, from raw page node to stored row.

use serde::{Deserialize, Serialize};

/// A raw item node as located on the page, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    /// Title text exactly as found
    pub title: String,

    /// Link as found (possibly site-relative)
    #[serde(default)]
    pub link: Option<String>,

    /// Source/publisher text
    #[serde(default)]
    pub source: Option<String>,

    /// Publish time text or `datetime` attribute
    #[serde(default)]
    pub pub_time: Option<String>,

    /// Summary text
    #[serde(default)]
    pub summary: Option<String>,
}

impl RawItem {
    /// Item with only a title and link.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: Some(link.into()),
            ..Self::default()
        }
    }
}

/// A cleaned item, ready for fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Whitespace-collapsed title with any leading ordinal removed; never empty
    pub title: String,

    /// Leading ordinal split off the raw title (empty if none)
    pub original_number: String,

    /// Explicit source, or a name derived from the link's domain
    pub source: String,

    /// Absolute link (empty if the node had none)
    pub link: String,

    pub summary: String,

    pub pub_time: String,
}

/// A record as persisted in the append-only store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub number: u64,
    pub original_number: String,
    pub title: String,
    pub source: String,
    pub link: String,
    pub summary: String,
    pub pub_time: String,
    pub collect_time: String,
    pub fingerprint: String,
}

impl StoredRecord {
    /// Store column order.
    pub const COLUMNS: [&'static str; 9] = [
        "number",
        "original_number",
        "title",
        "source",
        "link",
        "summary",
        "pub_time",
        "collect_time",
        "fingerprint",
    ];

    /// Build a stored record from an accepted candidate.
    pub fn new(
        record: NormalizedRecord,
        number: u64,
        fingerprint: String,
        collect_time: &str,
    ) -> Self {
        Self {
            number,
            original_number: record.original_number,
            title: record.title,
            source: record.source,
            link: record.link,
            summary: record.summary,
            pub_time: record.pub_time,
            collect_time: collect_time.to_string(),
            fingerprint,
        }
    }

    /// Fields in column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.original_number.clone(),
            self.title.clone(),
            self.source.clone(),
            self.link.clone(),
            self.summary.clone(),
            self.pub_time.clone(),
            self.collect_time.clone(),
            self.fingerprint.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_follows_column_order() {
        let record = NormalizedRecord {
            title: "Alpha".into(),
            original_number: "1".into(),
            source: "GitHub".into(),
            link: "https://github.com/a".into(),
            summary: String::new(),
            pub_time: "10分钟前".into(),
        };
        let stored = StoredRecord::new(record, 7, "abc".into(), "2025-01-01 08:00:00");
        let row = stored.to_row();

        assert_eq!(row.len(), StoredRecord::COLUMNS.len());
        assert_eq!(row[0], "7");
        assert_eq!(row[1], "1");
        assert_eq!(row[2], "Alpha");
        assert_eq!(row[6], "10分钟前");
        assert_eq!(row[8], "abc");
    }
}
