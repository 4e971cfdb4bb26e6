//! Watermark block parse/serialize.
//!
//! The watermark is the embedded metadata block recording the last
//! agreed-upon sync state: where the remote counterpart lives, when the two
//! sides last agreed, and the digest of the content they agreed on. It is
//! carried in the artifact's frontmatter under a configurable key prefix,
//! e.g. with prefix `gdoc`:
//!
//! ```text
//! gdoc_url: https://docs.google.com/document/d/abc123/edit
//! gdoc_id: abc123
//! gdoc_last_sync: 2026-08-01T10:00:00Z
//! gdoc_content_hash: sha256:9f86d0...
//! gdoc_last_modified: 2026-08-01T09:58:12Z
//! ```

use crate::error::{CoreError, CoreResult};
use crate::hash::is_content_hash;
use chrono::{DateTime, SecondsFormat, Utc};

const KEY_URL: &str = "url";
const KEY_ID: &str = "id";
const KEY_LAST_SYNC: &str = "last_sync";
const KEY_CONTENT_HASH: &str = "content_hash";
const KEY_LAST_MODIFIED: &str = "last_modified";

/// The last-agreed sync state embedded in a local artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    /// Remote reference as given by the user (URL or bare id).
    pub remote_url: String,
    /// Remote document or collection id.
    pub remote_id: String,
    /// Time of the last successful sync. Monotonic across syncs.
    pub last_sync: DateTime<Utc>,
    /// `sha256:<hex>` digest of the remote content at last sync.
    pub content_hash: String,
    /// Remote-reported modification time at last sync.
    pub remote_last_modified: DateTime<Utc>,
}

impl Watermark {
    /// Parses a watermark from frontmatter lines under the given key prefix.
    ///
    /// A missing or partially-populated block is `None` (no prior sync).
    /// A present timestamp or hash field that does not parse is
    /// [`CoreError::MalformedWatermark`]: sync history is unreliable and the
    /// caller must be told, never given a silent default.
    pub fn parse(frontmatter: &[String], prefix: &str) -> CoreResult<Option<Self>> {
        let mut url = None;
        let mut id = None;
        let mut last_sync = None;
        let mut content_hash = None;
        let mut last_modified = None;

        for line in frontmatter {
            let Some((key, value)) = split_key_value(line) else {
                continue;
            };
            let Some(suffix) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix('_')) else {
                continue;
            };
            match suffix {
                KEY_URL => url = Some(value.to_owned()),
                KEY_ID => id = Some(value.to_owned()),
                KEY_LAST_SYNC => {
                    last_sync = Some(parse_timestamp(&full_key(prefix, KEY_LAST_SYNC), value)?);
                }
                KEY_CONTENT_HASH => {
                    if !is_content_hash(value) {
                        return Err(CoreError::MalformedWatermark {
                            field: full_key(prefix, KEY_CONTENT_HASH),
                            message: format!("not a sha256:<hex> digest: `{value}`"),
                        });
                    }
                    content_hash = Some(value.to_owned());
                }
                KEY_LAST_MODIFIED => {
                    last_modified =
                        Some(parse_timestamp(&full_key(prefix, KEY_LAST_MODIFIED), value)?);
                }
                _ => {}
            }
        }

        match (url, id, last_sync, content_hash, last_modified) {
            (Some(remote_url), Some(remote_id), Some(last_sync), Some(content_hash), Some(remote_last_modified)) => {
                Ok(Some(Self {
                    remote_url,
                    remote_id,
                    last_sync,
                    content_hash,
                    remote_last_modified,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Writes this watermark into frontmatter lines under the given prefix.
    ///
    /// Existing `{prefix}_*` keys are rewritten in place; missing keys are
    /// appended at the end. Every other frontmatter line is left untouched.
    pub fn apply_to(&self, frontmatter: &mut Vec<String>, prefix: &str) {
        let entries = [
            (full_key(prefix, KEY_URL), self.remote_url.clone()),
            (full_key(prefix, KEY_ID), self.remote_id.clone()),
            (
                full_key(prefix, KEY_LAST_SYNC),
                format_timestamp(self.last_sync),
            ),
            (full_key(prefix, KEY_CONTENT_HASH), self.content_hash.clone()),
            (
                full_key(prefix, KEY_LAST_MODIFIED),
                format_timestamp(self.remote_last_modified),
            ),
        ];

        let mut written = [false; 5];
        for line in frontmatter.iter_mut() {
            let Some((key, _)) = split_key_value(line) else {
                continue;
            };
            if let Some(pos) = entries.iter().position(|(k, _)| k == key) {
                *line = format!("{}: {}", entries[pos].0, entries[pos].1);
                written[pos] = true;
            }
        }
        for (pos, (key, value)) in entries.iter().enumerate() {
            if !written[pos] {
                frontmatter.push(format!("{key}: {value}"));
            }
        }
    }
}

fn full_key(prefix: &str, suffix: &str) -> String {
    format!("{prefix}_{suffix}")
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

fn parse_timestamp(field: &str, value: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::MalformedWatermark {
            field: field.to_owned(),
            message: format!("`{value}`: {e}"),
        })
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::content_hash;
    use chrono::TimeZone;

    fn sample() -> Watermark {
        Watermark {
            remote_url: "https://docs.google.com/document/d/abc123/edit".into(),
            remote_id: "abc123".into(),
            last_sync: Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap(),
            content_hash: content_hash("remote body"),
            remote_last_modified: Utc.with_ymd_and_hms(2026, 8, 1, 9, 58, 12).unwrap(),
        }
    }

    #[test]
    fn roundtrip_through_frontmatter() {
        let wm = sample();
        let mut lines = vec!["title: Quarterly Plan".to_owned(), "tags: [work]".to_owned()];
        wm.apply_to(&mut lines, "gdoc");

        let parsed = Watermark::parse(&lines, "gdoc").unwrap().unwrap();
        assert_eq!(parsed, wm);

        // Foreign keys survive untouched.
        assert_eq!(lines[0], "title: Quarterly Plan");
        assert_eq!(lines[1], "tags: [work]");
    }

    #[test]
    fn rewrite_in_place_keeps_position() {
        let wm = sample();
        let mut lines = vec![
            "gdoc_url: old".to_owned(),
            "title: X".to_owned(),
            "gdoc_id: old".to_owned(),
        ];
        wm.apply_to(&mut lines, "gdoc");
        assert!(lines[0].starts_with("gdoc_url: https://"));
        assert_eq!(lines[1], "title: X");
        assert_eq!(lines[2], "gdoc_id: abc123");
    }

    #[test]
    fn missing_block_is_none() {
        let lines = vec!["title: X".to_owned()];
        assert!(Watermark::parse(&lines, "gdoc").unwrap().is_none());
    }

    #[test]
    fn partial_block_is_none() {
        // Only url and id: no prior sync was ever recorded.
        let lines = vec!["gdoc_url: u".to_owned(), "gdoc_id: i".to_owned()];
        assert!(Watermark::parse(&lines, "gdoc").unwrap().is_none());
    }

    #[test]
    fn corrupt_timestamp_is_an_error() {
        let lines = vec!["gdoc_last_sync: not-a-time".to_owned()];
        let err = Watermark::parse(&lines, "gdoc").unwrap_err();
        assert!(matches!(err, CoreError::MalformedWatermark { ref field, .. }
            if field == "gdoc_last_sync"));
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        let lines = vec!["gdoc_content_hash: md5:abcd".to_owned()];
        let err = Watermark::parse(&lines, "gdoc").unwrap_err();
        assert!(matches!(err, CoreError::MalformedWatermark { ref field, .. }
            if field == "gdoc_content_hash"));
    }

    #[test]
    fn other_prefixes_are_ignored() {
        let wm = sample();
        let mut lines = Vec::new();
        wm.apply_to(&mut lines, "gdoc");
        assert!(Watermark::parse(&lines, "notion").unwrap().is_none());
    }
}
