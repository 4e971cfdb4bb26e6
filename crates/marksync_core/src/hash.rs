//! Content hashing.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Computes the `sha256:<hex>` digest of a content string.
///
/// This is the digest stored in the watermark and compared against the
/// fetched remote content on every run, so it must be stable across
/// invocations for identical input.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut out = String::with_capacity(7 + digest.len() * 2);
    out.push_str("sha256:");
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Returns true if the string is a well-formed `sha256:<hex>` digest.
pub fn is_content_hash(value: &str) -> bool {
    match value.strip_prefix("sha256:") {
        Some(hex) => hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
