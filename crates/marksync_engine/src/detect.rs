//! Sync state classification.
//!
//! The detector decides the safe sync direction from the watermark and the
//! two current snapshots. The comparison is deliberately asymmetric: the
//! remote side is compared by content hash (the service's modification
//! clock is not assumed comparable across sync cycles, but its content is
//! stable), while the local side is compared by filesystem mtime against
//! the watermark's last sync time.

use chrono::{DateTime, Utc};
use marksync_core::{content_hash, Watermark};

/// The relationship between local and remote since the last agreed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Neither side changed; nothing to do.
    InSync,
    /// Only the local side changed; safe to push.
    LocalAhead,
    /// Only the remote side changed; safe to pull.
    RemoteAhead,
    /// Both sides changed; merge or flag a conflict.
    Diverged,
}

impl SyncState {
    /// Returns true if content must move from remote to local.
    pub fn needs_pull(&self) -> bool {
        matches!(self, SyncState::RemoteAhead)
    }

    /// Returns true if content must move from local to remote.
    pub fn needs_push(&self) -> bool {
        matches!(self, SyncState::LocalAhead)
    }

    /// Returns true if both sides changed independently.
    pub fn is_diverged(&self) -> bool {
        matches!(self, SyncState::Diverged)
    }
}

/// Classifies the sync state for one invocation.
///
/// `remote_content` is `None` when no remote counterpart exists yet. With
/// no watermark this is the bootstrap case, not a conflict: a present
/// remote means first download, an absent one first upload.
pub fn classify(
    watermark: Option<&Watermark>,
    local_modified: DateTime<Utc>,
    remote_content: Option<&str>,
) -> SyncState {
    let Some(watermark) = watermark else {
        return if remote_content.is_some() {
            SyncState::RemoteAhead
        } else {
            SyncState::LocalAhead
        };
    };

    let remote_changed = match remote_content {
        Some(content) => content_hash(content) != watermark.content_hash,
        None => false,
    };
    let local_changed = local_modified > watermark.last_sync;

    let state = match (remote_changed, local_changed) {
        (true, true) => SyncState::Diverged,
        (true, false) => SyncState::RemoteAhead,
        (false, true) => SyncState::LocalAhead,
        (false, false) => SyncState::InSync,
    };
    tracing::debug!(
        ?state,
        remote_changed,
        local_changed,
        last_sync = %watermark.last_sync,
        "classified sync state"
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn watermark_for(content: &str, last_sync: DateTime<Utc>) -> Watermark {
        Watermark {
            remote_url: "https://example.com/d/doc1/edit".into(),
            remote_id: "doc1".into(),
            last_sync,
            content_hash: content_hash(content),
            remote_last_modified: last_sync,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn bootstrap_with_remote_is_first_download() {
        assert_eq!(classify(None, t0(), Some("remote")), SyncState::RemoteAhead);
    }

    #[test]
    fn bootstrap_without_remote_is_first_upload() {
        assert_eq!(classify(None, t0(), None), SyncState::LocalAhead);
    }

    #[test]
    fn unchanged_pair_is_in_sync() {
        let wm = watermark_for("body", t0());
        assert_eq!(classify(Some(&wm), t0(), Some("body")), SyncState::InSync);
    }

    #[test]
    fn remote_hash_change_alone_is_remote_ahead() {
        // Watermark hash H0 at T0; remote now hashes to H1; local mtime <= T0.
        let wm = watermark_for("old remote", t0());
        assert_eq!(
            classify(Some(&wm), t0(), Some("new remote")),
            SyncState::RemoteAhead
        );
        assert_eq!(
            classify(Some(&wm), t0() - Duration::hours(1), Some("new remote")),
            SyncState::RemoteAhead
        );
    }

    #[test]
    fn local_mtime_alone_is_local_ahead() {
        let wm = watermark_for("body", t0());
        assert_eq!(
            classify(Some(&wm), t0() + Duration::seconds(1), Some("body")),
            SyncState::LocalAhead
        );
    }

    #[test]
    fn diverged_requires_both() {
        let wm = watermark_for("old remote", t0());
        assert_eq!(
            classify(Some(&wm), t0() + Duration::seconds(1), Some("new remote")),
            SyncState::Diverged
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let wm = watermark_for("body", t0());
        let first = classify(Some(&wm), t0(), Some("body"));
        let second = classify(Some(&wm), t0(), Some("body"));
        assert_eq!(first, SyncState::InSync);
        assert_eq!(second, SyncState::InSync);
    }
}
