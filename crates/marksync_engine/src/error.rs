//! Error types for the sync engine.

use chrono::{DateTime, Utc};
use marksync_core::CoreError;
use marksync_remote::RemoteError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a sync invocation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Artifact or watermark error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Remote collaborator error.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The artifact carries an unresolved conflict marker.
    ///
    /// The marker acts as an advisory lock: automated sync on this artifact
    /// stays blocked until a human clears it.
    #[error("unresolved conflict in {path} (marked {marked_at:?}); resolve and remove the marker before syncing")]
    UnresolvedConflict {
        /// Artifact path.
        path: PathBuf,
        /// When the conflict block was written, if recorded.
        marked_at: Option<DateTime<Utc>>,
    },

    /// An anchor or remote id is already bound to a different counterpart.
    ///
    /// Aborts only the binding attempt for this item, never the whole pass.
    #[error("duplicate binding: anchor `{anchor}` vs remote `{remote_id}` (existing counterpart `{existing}`)")]
    DuplicateBinding {
        /// Anchor side of the attempted binding.
        anchor: String,
        /// Remote side of the attempted binding.
        remote_id: String,
        /// The counterpart already bound.
        existing: String,
    },

    /// No remote reference was supplied and the artifact carries none.
    #[error("no remote reference for {path}: pass one or sync the artifact once with an explicit target")]
    NoRemoteReference {
        /// Artifact path.
        path: PathBuf,
    },

    /// Operation is recognized but deliberately not implemented.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
}

impl SyncError {
    /// Returns true if this error terminates the whole invocation.
    ///
    /// Per-item errors (a single unparseable task line, one failed asset
    /// fetch, one duplicate binding) are recorded in the report and the pass
    /// continues; everything else aborts with no partial writes.
    pub fn aborts_invocation(&self) -> bool {
        match self {
            SyncError::Core(CoreError::TaskParse { .. }) => false,
            SyncError::Remote(remote) => remote.is_fatal(),
            SyncError::DuplicateBinding { .. } => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_classification() {
        assert!(SyncError::UnresolvedConflict {
            path: "a.md".into(),
            marked_at: None
        }
        .aborts_invocation());

        assert!(SyncError::Core(CoreError::MalformedWatermark {
            field: "gdoc_last_sync".into(),
            message: "bad".into()
        })
        .aborts_invocation());

        assert!(SyncError::Remote(RemoteError::RateLimited("quota".into()))
            .aborts_invocation());

        assert!(!SyncError::Core(CoreError::TaskParse {
            line: 3,
            message: "bad".into()
        })
        .aborts_invocation());

        assert!(!SyncError::Remote(RemoteError::AssetFetch {
            name: "img.png".into(),
            message: "403".into()
        })
        .aborts_invocation());

        assert!(!SyncError::DuplicateBinding {
            anchor: "a".into(),
            remote_id: "r".into(),
            existing: "other".into()
        }
        .aborts_invocation());
    }
}
