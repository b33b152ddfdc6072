// src/pipeline/fingerprint.rs

//! Record identity.

use sha2::{Digest, Sha256};

use crate::models::NormalizedRecord;

/// Length of a fingerprint string (hex-encoded SHA-256).
pub const FINGERPRINT_LEN: usize = 64;

/// SHA-256 over the length-framed `(title, link)` pair, hex encoded.
///
/// Each part is prefixed with its byte length so that moving characters
/// between title and link always changes the digest. A record without a link
/// is fingerprinted from its title alone, which merges unrelated link-less
/// items that happen to share a title.
pub fn fingerprint(title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [title, link] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Fingerprint of a normalized record.
pub fn of_record(record: &NormalizedRecord) -> String {
    fingerprint(&record.title, &record.link)
}
