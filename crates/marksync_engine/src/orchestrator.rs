//! Per-invocation sync orchestration.
//!
//! One call is one sequential pass. The unresolved-conflict gate runs
//! before any remote contact; all reconciliation decisions are computed
//! after the full remote snapshot is in hand; local writes land in a single
//! atomic save. Nothing is retried here.

use crate::config::SyncConfig;
use crate::detect::{classify, SyncState};
use crate::error::{SyncError, SyncResult};
use crate::linker::IdentityLinker;
use crate::merge::{merge_documents, MergeApprover, MergeOutcome, MergeStrategy};
use crate::reconcile::{reconcile_pull, reconcile_push};
use chrono::{Timelike, Utc};
use marksync_core::{
    complete_task_line, conflict_marked_at, contains_conflict_marker, content_hash,
    format_capture_line, parse_tasks, wrap_conflict, LocalArtifact, Watermark,
};
use marksync_remote::{extract_remote_id, DocumentRemote, DocumentSnapshot, TaskRemote};
use std::path::Path;

/// What the document pass did to the local artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocAction {
    /// Nothing changed on either side.
    UpToDate,
    /// Remote content replaced the local body.
    Pulled,
    /// Local body was written to the remote.
    Pushed,
    /// An approved merge was applied to both sides.
    MergedApplied,
    /// The body was wrapped in a conflict block; sync is now blocked.
    ConflictMarked,
}

/// Single-pass result report for a document sync.
#[derive(Debug)]
pub struct DocSyncReport {
    /// Classified state at the start of the pass.
    pub state: SyncState,
    /// Action taken.
    pub action: DocAction,
    /// Assets that failed to fetch; the pass continued without them.
    pub asset_failures: Vec<String>,
    /// Sections that blocked a merge, when the action is `ConflictMarked`.
    pub blocked_sections: Vec<String>,
}

/// Single-pass result report for a task-collection sync.
#[derive(Debug, Default)]
pub struct TaskSyncReport {
    /// Linked items completed locally from remote state (completion or
    /// deletion).
    pub completed_from_remote: usize,
    /// Completion requests issued to the remote.
    pub completed_on_remote: usize,
    /// Capture entries appended for unlinked pending remote items.
    pub captured: usize,
    /// Unlinked remote items already complete, skipped entirely.
    pub skipped_completed: usize,
    /// Task lines that failed to parse, skipped per item.
    pub parse_errors: Vec<String>,
    /// Binding attempts rejected during capture, skipped per item.
    pub binding_errors: Vec<String>,
}

/// Sequences detection, merging, and reconciliation for one invocation.
#[derive(Debug, Clone, Default)]
pub struct SyncOrchestrator {
    config: SyncConfig,
}

impl SyncOrchestrator {
    /// Creates an orchestrator with the given configuration.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Syncs one local document artifact against its remote counterpart.
    ///
    /// `remote_ref` overrides the watermark's stored reference; with
    /// neither, the pass fails before contacting the remote.
    pub fn sync_document(
        &self,
        artifact_path: &Path,
        remote_ref: Option<&str>,
        remote: &dyn DocumentRemote,
        strategy: Option<&dyn MergeStrategy>,
        approver: Option<&dyn MergeApprover>,
    ) -> SyncResult<DocSyncReport> {
        let mut artifact = LocalArtifact::load(artifact_path)?;
        self.gate_on_conflict(&artifact)?;

        let prefix = &self.config.watermark_prefix;
        let watermark = artifact.watermark(prefix)?;
        let remote_id = match (remote_ref, &watermark) {
            (Some(reference), _) => extract_remote_id(reference),
            (None, Some(wm)) => wm.remote_id.clone(),
            (None, None) => {
                return Err(SyncError::NoRemoteReference {
                    path: artifact.path.clone(),
                })
            }
        };

        let snapshot = match remote.fetch(&remote_id) {
            Ok(snapshot) => Some(snapshot),
            // First upload: the target does not exist yet and there is no
            // sync history to lose.
            Err(marksync_remote::RemoteError::NotFound { .. }) if watermark.is_none() => None,
            Err(err) => return Err(err.into()),
        };

        let state = classify(
            watermark.as_ref(),
            artifact.local_modified,
            snapshot.as_ref().map(|s| s.content.as_str()),
        );
        tracing::info!(path = %artifact.path.display(), ?state, "document sync pass");

        match (state, snapshot) {
            (SyncState::InSync, _) => Ok(DocSyncReport {
                state,
                action: DocAction::UpToDate,
                asset_failures: Vec::new(),
                blocked_sections: Vec::new(),
            }),
            // These states require remote content by construction.
            (SyncState::RemoteAhead | SyncState::Diverged, None) => {
                Err(SyncError::NoRemoteReference {
                    path: artifact.path.clone(),
                })
            }
            (SyncState::RemoteAhead, Some(snapshot)) => {
                let asset_failures = self.fetch_assets(remote, &remote_id);
                artifact.body = snapshot.content.clone();
                self.commit(&mut artifact, remote_ref, &remote_id, &snapshot, &watermark)?;
                Ok(DocSyncReport {
                    state,
                    action: DocAction::Pulled,
                    asset_failures,
                    blocked_sections: Vec::new(),
                })
            }
            (SyncState::LocalAhead, _) => {
                let written = remote.write(&remote_id, &artifact.body)?;
                self.commit(&mut artifact, remote_ref, &remote_id, &written, &watermark)?;
                Ok(DocSyncReport {
                    state,
                    action: DocAction::Pushed,
                    asset_failures: Vec::new(),
                    blocked_sections: Vec::new(),
                })
            }
            (SyncState::Diverged, Some(snapshot)) => self.resolve_divergence(
                artifact, remote_ref, &remote_id, snapshot, watermark, remote, strategy, approver,
            ),
        }
    }

    /// Syncs a local task artifact against the remote collection.
    ///
    /// Captures land in `capture_path`; link state persists through
    /// `linker`.
    pub fn sync_tasks(
        &self,
        tasks_path: &Path,
        capture_path: &Path,
        linker: &mut IdentityLinker,
        remote: &dyn TaskRemote,
    ) -> SyncResult<TaskSyncReport> {
        let mut artifact = LocalArtifact::load(tasks_path)?;
        self.gate_on_conflict(&artifact)?;

        let service = &self.config.anchor_service;
        let parsed = parse_tasks(&artifact.body, service);

        // Full snapshot before any decision.
        let remote_tasks = remote.list_all()?;
        let now = Utc::now();
        let pull = reconcile_pull(&parsed.tasks, linker, &remote_tasks, now);

        let mut report = TaskSyncReport {
            skipped_completed: pull.skipped_completed,
            parse_errors: parsed.errors.iter().map(|e| e.to_string()).collect(),
            binding_errors: pull.binding_errors.iter().map(|e| e.to_string()).collect(),
            ..TaskSyncReport::default()
        };

        if !pull.completions.is_empty() {
            let mut lines: Vec<String> = artifact.body.lines().map(str::to_owned).collect();
            for completion in &pull.completions {
                if let Some(line) = lines.get_mut(completion.line - 1) {
                    *line = complete_task_line(line, completion.completed_at.date_naive());
                }
            }
            artifact.body = lines.join("\n");
            artifact.body.push('\n');
            artifact.save()?;
            report.completed_from_remote = pull.completions.len();
        }

        if !pull.captures.is_empty() {
            let mut capture = if capture_path.exists() {
                LocalArtifact::load(capture_path)?
            } else {
                LocalArtifact::new(capture_path, format!("{}\n", self.config.capture_heading))
            };
            for entry in &pull.captures {
                capture.body.push_str(&format_capture_line(
                    &entry.title,
                    entry.due,
                    service,
                    &entry.remote_id,
                ));
                capture.body.push('\n');
            }
            capture.save()?;
            // New bindings persist together with their capture entries, so
            // an aborted push cannot re-discover the same items on retry.
            linker.save()?;
            report.captured = pull.captures.len();
        }

        let push_ids = reconcile_push(&parsed.tasks, linker, &remote_tasks);
        for id in &push_ids {
            remote.complete(id)?;
            tracing::info!(remote_id = %id, "completed remote counterpart");
        }
        report.completed_on_remote = push_ids.len();

        linker.save()?;
        Ok(report)
    }

    /// Fails fast if the artifact carries an unresolved conflict marker.
    ///
    /// Runs before any remote contact: the marker is an advisory lock.
    fn gate_on_conflict(&self, artifact: &LocalArtifact) -> SyncResult<()> {
        if contains_conflict_marker(&artifact.body) {
            return Err(SyncError::UnresolvedConflict {
                path: artifact.path.clone(),
                marked_at: conflict_marked_at(&artifact.body),
            });
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_divergence(
        &self,
        mut artifact: LocalArtifact,
        remote_ref: Option<&str>,
        remote_id: &str,
        snapshot: DocumentSnapshot,
        watermark: Option<Watermark>,
        remote: &dyn DocumentRemote,
        strategy: Option<&dyn MergeStrategy>,
        approver: Option<&dyn MergeApprover>,
    ) -> SyncResult<DocSyncReport> {
        let outcome = merge_documents(&snapshot.content, &artifact.body, strategy, &self.config);

        if let MergeOutcome::Merged { text } = &outcome {
            let approved = approver.map_or(false, |a| a.approve(text));
            if approved {
                let written = remote.write(remote_id, text)?;
                artifact.body = text.clone();
                self.commit(&mut artifact, remote_ref, remote_id, &written, &watermark)?;
                return Ok(DocSyncReport {
                    state: SyncState::Diverged,
                    action: DocAction::MergedApplied,
                    asset_failures: Vec::new(),
                    blocked_sections: Vec::new(),
                });
            }
            tracing::info!("merge proposal not approved; marking conflict");
        }

        let blocked_sections = match outcome {
            MergeOutcome::Conflict { blocked_sections } => blocked_sections,
            MergeOutcome::Merged { .. } => Vec::new(),
        };

        // Watermark is NOT advanced: the divergence stays unresolved and the
        // marker blocks the next run.
        artifact.body = wrap_conflict(&snapshot.content, &artifact.body, Utc::now());
        artifact.save()?;
        Ok(DocSyncReport {
            state: SyncState::Diverged,
            action: DocAction::ConflictMarked,
            asset_failures: Vec::new(),
            blocked_sections,
        })
    }

    /// Writes content and watermark as one atomic local save.
    fn commit(
        &self,
        artifact: &mut LocalArtifact,
        remote_ref: Option<&str>,
        remote_id: &str,
        written: &DocumentSnapshot,
        prior: &Option<Watermark>,
    ) -> SyncResult<()> {
        // Stamped at whole-second precision; the saved file's mtime is
        // pinned to the stamp below so the save itself never reads as a
        // local edit while an edit made moments later still does.
        let now = Utc::now().with_nanosecond(0).unwrap_or_else(Utc::now);
        let last_sync = prior
            .as_ref()
            .map(|wm| wm.last_sync.max(now))
            .unwrap_or(now);
        let remote_url = remote_ref
            .map(str::to_owned)
            .or_else(|| prior.as_ref().map(|wm| wm.remote_url.clone()))
            .unwrap_or_else(|| remote_id.to_owned());

        let watermark = Watermark {
            remote_url,
            remote_id: remote_id.to_owned(),
            last_sync,
            content_hash: content_hash(&written.content),
            remote_last_modified: written.last_modified,
        };
        artifact.set_watermark(&watermark, &self.config.watermark_prefix);
        artifact.save()?;
        artifact.set_modified(last_sync)?;
        Ok(())
    }

    fn fetch_assets(&self, remote: &dyn DocumentRemote, remote_id: &str) -> Vec<String> {
        let assets = match remote.assets(remote_id) {
            Ok(assets) => assets,
            Err(err) => {
                tracing::warn!(%err, "asset listing failed; continuing without assets");
                return vec![err.to_string()];
            }
        };
        let mut failures = Vec::new();
        for asset in &assets {
            if let Err(err) = remote.fetch_asset(remote_id, asset) {
                tracing::warn!(asset = %asset.name, %err, "asset fetch failed; pass continues");
                failures.push(asset.name.clone());
            }
        }
        failures
    }
}
