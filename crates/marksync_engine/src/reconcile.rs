//! Sticky-completion task reconciliation.
//!
//! The central correctness property of collection sync: per linked item,
//! `Open → Complete` is the only valid transition, guarded at the single
//! [`Completion::transition`] entry point. Two independently-authoritative
//! systems can then never ping-pong an item's status.

use crate::error::{SyncError, SyncResult};
use crate::linker::IdentityLinker;
use chrono::{DateTime, NaiveDate, Utc};
use marksync_core::{LocalTask, TaskStatus};
use marksync_remote::RemoteTask;
use std::collections::HashMap;

/// A local `Open → Complete` transition decided during the pull pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// 1-based body line of the task to rewrite.
    pub line: usize,
    /// Anchor of the item being completed.
    pub anchor: String,
    /// Completion time: the remote's, or now if the remote reports none.
    pub completed_at: DateTime<Utc>,
}

impl Completion {
    /// The single guarded transition point.
    ///
    /// Returns `None` for an item that is already `Complete`: completion is
    /// sticky and a completed item is never consulted or mutated again.
    pub fn transition(task: &LocalTask, completed_at: DateTime<Utc>) -> Option<Self> {
        match task.status {
            TaskStatus::Complete => None,
            TaskStatus::Open => Some(Self {
                line: task.line,
                anchor: task.anchor.clone()?,
                completed_at,
            }),
        }
    }
}

/// An unlinked pending remote item, materialized for later triage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEntry {
    /// Remote item id; becomes the capture line's anchor.
    pub remote_id: String,
    /// Remote title.
    pub title: String,
    /// Remote due date, if any.
    pub due: Option<NaiveDate>,
}

/// Result of the pull-direction reconciliation pass.
#[derive(Debug, Default)]
pub struct PullOutcome {
    /// Local transitions to apply.
    pub completions: Vec<Completion>,
    /// Newly discovered pending remote items.
    pub captures: Vec<CaptureEntry>,
    /// Unlinked remote items already complete: nothing to reconcile.
    pub skipped_completed: usize,
    /// Binding attempts rejected for this pass (item skipped, pass
    /// continues).
    pub binding_errors: Vec<SyncError>,
}

/// Pull-direction reconciliation over the full remote item set.
///
/// Decisions are computed against one consistent snapshot: a linked id's
/// absence from `remote_tasks` means the remote item was deleted, which is
/// treated as implicit completion, never as item loss.
pub fn reconcile_pull(
    local_tasks: &[LocalTask],
    linker: &mut IdentityLinker,
    remote_tasks: &[RemoteTask],
    now: DateTime<Utc>,
) -> PullOutcome {
    let remote_by_id: HashMap<&str, &RemoteTask> =
        remote_tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut outcome = PullOutcome::default();

    for task in local_tasks {
        let Some(anchor) = task.anchor.as_deref() else {
            continue;
        };
        if task.status == TaskStatus::Complete {
            // Sticky: never consulted again.
            continue;
        }
        let remote_id = linker.resolve(anchor).unwrap_or(anchor).to_owned();
        match remote_by_id.get(remote_id.as_str()) {
            Some(remote) if remote.is_completed() => {
                let at = remote.completed_at.unwrap_or(now);
                if let Some(completion) = Completion::transition(task, at) {
                    tracing::debug!(anchor, %remote_id, "remote completed; completing locally");
                    outcome.completions.push(completion);
                }
            }
            Some(_) => {}
            None => {
                // Deleted remotely: implicit completion.
                if let Some(completion) = Completion::transition(task, now) {
                    tracing::debug!(anchor, %remote_id, "remote deleted; completing locally");
                    outcome.completions.push(completion);
                }
            }
        }
    }

    let linked_ids: Vec<String> = local_tasks
        .iter()
        .filter_map(|t| t.anchor.as_deref())
        .map(|a| linker.resolve(a).unwrap_or(a).to_owned())
        .collect();

    for remote in remote_tasks {
        if linked_ids.iter().any(|id| *id == remote.id)
            || linker.resolve_reverse(&remote.id).is_some()
        {
            continue;
        }
        if remote.is_completed() {
            outcome.skipped_completed += 1;
            continue;
        }
        // Binding is created when the capture entry materializes; the
        // capture line's anchor doubles as the local id.
        match linker.bind(&remote.id, &remote.id) {
            Ok(()) => {
                tracing::info!(remote_id = %remote.id, title = %remote.title, "capturing unlinked remote task");
                outcome.captures.push(CaptureEntry {
                    remote_id: remote.id.clone(),
                    title: remote.title.clone(),
                    due: remote.due,
                });
            }
            Err(err) => outcome.binding_errors.push(err),
        }
    }

    outcome
}

/// Push-direction reconciliation: remote ids needing a completion request.
///
/// Only linked, locally-complete items whose remote counterpart is present
/// and still open are pushed. Unlinked local items are never pushed;
/// linking happens via the capture-and-triage path first.
pub fn reconcile_push(
    local_tasks: &[LocalTask],
    linker: &IdentityLinker,
    remote_tasks: &[RemoteTask],
) -> Vec<String> {
    let remote_by_id: HashMap<&str, &RemoteTask> =
        remote_tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    local_tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Complete)
        .filter_map(|t| t.anchor.as_deref())
        .map(|a| linker.resolve(a).unwrap_or(a).to_owned())
        .filter(|id| {
            matches!(remote_by_id.get(id.as_str()), Some(remote) if !remote.is_completed())
        })
        .collect()
}

/// Push-direction title/due-date propagation for linked open items.
///
/// Deliberately unsupported: the source material defines no conflict policy
/// for it, so the engine refuses rather than guessing one.
pub fn propagate_task_metadata() -> SyncResult<()> {
    Err(SyncError::Unsupported {
        operation: "push-direction title/due-date propagation",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marksync_remote::RemoteTaskStatus;

    fn local(line: usize, status: TaskStatus, anchor: Option<&str>) -> LocalTask {
        LocalTask {
            line,
            status,
            title: format!("task-{line}"),
            due: None,
            anchor: anchor.map(str::to_owned),
        }
    }

    fn remote(id: &str, status: RemoteTaskStatus) -> RemoteTask {
        RemoteTask {
            id: id.into(),
            title: format!("remote-{id}"),
            status,
            due: None,
            completed_at: None,
        }
    }

    #[test]
    fn remote_completion_transitions_open_item() {
        let locals = vec![local(1, TaskStatus::Open, Some("r1"))];
        let remotes = vec![remote("r1", RemoteTaskStatus::Completed)];
        let mut linker = IdentityLinker::new();

        let outcome = reconcile_pull(&locals, &mut linker, &remotes, Utc::now());
        assert_eq!(outcome.completions.len(), 1);
        assert_eq!(outcome.completions[0].line, 1);
    }

    #[test]
    fn remote_deletion_is_implicit_completion() {
        let locals = vec![local(1, TaskStatus::Open, Some("gone"))];
        let mut linker = IdentityLinker::new();

        let outcome = reconcile_pull(&locals, &mut linker, &[], Utc::now());
        assert_eq!(outcome.completions.len(), 1);
        assert_eq!(outcome.completions[0].anchor, "gone");
    }

    #[test]
    fn open_remote_leaves_open_local_untouched() {
        let locals = vec![local(1, TaskStatus::Open, Some("r1"))];
        let remotes = vec![remote("r1", RemoteTaskStatus::NeedsAction)];
        let mut linker = IdentityLinker::new();

        let outcome = reconcile_pull(&locals, &mut linker, &remotes, Utc::now());
        assert!(outcome.completions.is_empty());
    }

    #[test]
    fn completed_local_item_is_never_touched() {
        // Even a remote claiming "open" cannot reopen a completed item.
        let locals = vec![local(1, TaskStatus::Complete, Some("r1"))];
        let remotes = vec![remote("r1", RemoteTaskStatus::NeedsAction)];
        let mut linker = IdentityLinker::new();

        let outcome = reconcile_pull(&locals, &mut linker, &remotes, Utc::now());
        assert!(outcome.completions.is_empty());
    }

    #[test]
    fn unlinked_pending_remote_is_captured_and_bound() {
        let remotes = vec![remote("new1", RemoteTaskStatus::NeedsAction)];
        let mut linker = IdentityLinker::new();

        let outcome = reconcile_pull(&[], &mut linker, &remotes, Utc::now());
        assert_eq!(outcome.captures.len(), 1);
        assert_eq!(outcome.captures[0].remote_id, "new1");
        assert_eq!(linker.resolve_reverse("new1"), Some("new1"));
    }

    #[test]
    fn unlinked_completed_remote_is_skipped_entirely() {
        let remotes = vec![remote("done1", RemoteTaskStatus::Completed)];
        let mut linker = IdentityLinker::new();

        let outcome = reconcile_pull(&[], &mut linker, &remotes, Utc::now());
        assert!(outcome.captures.is_empty());
        assert_eq!(outcome.skipped_completed, 1);
        assert!(linker.is_empty());
    }

    #[test]
    fn already_captured_remote_is_not_recaptured() {
        let remotes = vec![remote("new1", RemoteTaskStatus::NeedsAction)];
        let mut linker = IdentityLinker::new();

        let first = reconcile_pull(&[], &mut linker, &remotes, Utc::now());
        assert_eq!(first.captures.len(), 1);

        let second = reconcile_pull(&[], &mut linker, &remotes, Utc::now());
        assert!(second.captures.is_empty());
    }

    #[test]
    fn push_targets_open_remote_counterparts_only() {
        let locals = vec![
            local(1, TaskStatus::Complete, Some("r1")),
            local(2, TaskStatus::Complete, Some("r2")),
            local(3, TaskStatus::Open, Some("r3")),
            local(4, TaskStatus::Complete, None),
        ];
        let remotes = vec![
            remote("r1", RemoteTaskStatus::NeedsAction),
            remote("r2", RemoteTaskStatus::Completed),
            remote("r3", RemoteTaskStatus::NeedsAction),
        ];
        let linker = IdentityLinker::new();

        let push = reconcile_push(&locals, &linker, &remotes);
        assert_eq!(push, vec!["r1".to_owned()]);
    }

    #[test]
    fn push_skips_deleted_remote_counterparts() {
        let locals = vec![local(1, TaskStatus::Complete, Some("gone"))];
        let linker = IdentityLinker::new();
        assert!(reconcile_push(&locals, &linker, &[]).is_empty());
    }

    #[test]
    fn metadata_propagation_is_unsupported() {
        let err = propagate_task_metadata().unwrap_err();
        assert!(matches!(err, SyncError::Unsupported { .. }));
    }

    #[test]
    fn linker_override_maps_anchor_to_remote() {
        // A non-identity mapping (e.g. migrated ids) resolves through the
        // linker before hitting the remote set.
        let mut linker = IdentityLinker::new();
        linker.bind("old-anchor", "r9").unwrap();

        let locals = vec![local(1, TaskStatus::Open, Some("old-anchor"))];
        let remotes = vec![remote("r9", RemoteTaskStatus::Completed)];

        let outcome = reconcile_pull(&locals, &mut linker, &remotes, Utc::now());
        assert_eq!(outcome.completions.len(), 1);
    }
}
