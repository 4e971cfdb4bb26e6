//! Conflict marker wrap and detection.
//!
//! When a divergence cannot be merged, the whole document body is wrapped in
//! a literal conflict block holding both full variants. The marker's
//! presence is the sole signal that blocks further automated sync on the
//! artifact until a human clears it.

use chrono::{DateTime, SecondsFormat, Utc};

/// Machine-detectable token opening a conflict block.
pub const CONFLICT_MARKER: &str = "<!-- SYNC-CONFLICT:";

const CONFLICT_CLOSE: &str = "<!-- /SYNC-CONFLICT -->";
const REMOTE_FENCE: &str = "<<<<<<< REMOTE";
const SEPARATOR: &str = "=======";
const LOCAL_FENCE: &str = ">>>>>>> LOCAL";

/// Returns true if the body contains an unresolved conflict block.
pub fn contains_conflict_marker(body: &str) -> bool {
    body.contains(CONFLICT_MARKER)
}

/// Wraps both full variants of a diverged document in a conflict block.
pub fn wrap_conflict(remote: &str, local: &str, at: DateTime<Utc>) -> String {
    let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut out = String::with_capacity(remote.len() + local.len() + 128);
    out.push_str(CONFLICT_MARKER);
    out.push(' ');
    out.push_str(&stamp);
    out.push_str(" -->\n");
    out.push_str(REMOTE_FENCE);
    out.push('\n');
    push_block(&mut out, remote);
    out.push_str(SEPARATOR);
    out.push('\n');
    push_block(&mut out, local);
    out.push_str(LOCAL_FENCE);
    out.push('\n');
    out.push_str(CONFLICT_CLOSE);
    out.push('\n');
    out
}

/// Extracts the timestamp a conflict block was written at, if present and
/// parseable.
pub fn conflict_marked_at(body: &str) -> Option<DateTime<Utc>> {
    let start = body.find(CONFLICT_MARKER)? + CONFLICT_MARKER.len();
    let rest = body[start..].trim_start();
    let end = rest.find("-->")?;
    DateTime::parse_from_rfc3339(rest[..end].trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn push_block(out: &mut String, block: &str) {
    out.push_str(block);
    if !block.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wrapped_body_is_detected() {
        let at = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let body = wrap_conflict("remote variant\n", "local variant\n", at);

        assert!(contains_conflict_marker(&body));
        assert!(body.contains(REMOTE_FENCE));
        assert!(body.contains(LOCAL_FENCE));
        assert!(body.contains("remote variant"));
        assert!(body.contains("local variant"));
        assert_eq!(conflict_marked_at(&body), Some(at));
    }

    #[test]
    fn clean_body_is_not_detected() {
        assert!(!contains_conflict_marker("# Just a doc\n"));
        assert!(conflict_marked_at("# Just a doc\n").is_none());
    }

    #[test]
    fn garbled_timestamp_still_blocks() {
        let body = format!("{CONFLICT_MARKER} whenever -->\nstuff\n");
        assert!(contains_conflict_marker(&body));
        assert!(conflict_marked_at(&body).is_none());
    }
}
