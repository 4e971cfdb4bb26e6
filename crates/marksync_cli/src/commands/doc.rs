//! Doc sync command implementation.

use marksync_engine::{DocAction, DocSyncReport, SyncConfig, SyncOrchestrator, SyncState};
use marksync_remote::{looks_like_remote, DirDocumentRemote};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Document sync result, flattened for output.
#[derive(Debug, Serialize)]
pub struct DocResult {
    /// Artifact path.
    pub artifact: String,
    /// Classified state at the start of the pass.
    pub state: String,
    /// Action taken.
    pub action: String,
    /// Assets that failed to fetch.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub asset_failures: Vec<String>,
    /// Sections that blocked a merge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_sections: Vec<String>,
}

/// Runs the doc sync command.
///
/// `targets` is one or two positional arguments: with two, the one that
/// parses as a remote reference is the remote side; with one, the artifact's
/// watermark supplies the stored reference.
pub fn run(
    remote_root: &Path,
    targets: &[String],
    prefix: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (artifact, remote_ref) = resolve_direction(targets)?;
    tracing::info!(
        artifact = %artifact.display(),
        remote = ?remote_ref,
        "starting document sync"
    );

    let config = SyncConfig::new().with_watermark_prefix(prefix);
    let orchestrator = SyncOrchestrator::new(config);
    let remote = DirDocumentRemote::new(remote_root);

    let report = orchestrator.sync_document(&artifact, remote_ref.as_deref(), &remote, None, None)?;
    let result = DocResult {
        artifact: artifact.display().to_string(),
        state: state_name(report.state).to_owned(),
        action: action_name(report.action).to_owned(),
        asset_failures: report.asset_failures.clone(),
        blocked_sections: report.blocked_sections.clone(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result, &report),
    }
    Ok(())
}

/// Splits positional targets into (local artifact, optional remote
/// reference).
fn resolve_direction(targets: &[String]) -> Result<(PathBuf, Option<String>), String> {
    match targets {
        [artifact] => Ok((PathBuf::from(artifact), None)),
        [a, b] => {
            let (remote, local) = match (looks_like_remote(a), looks_like_remote(b)) {
                (true, false) => (a, b),
                (false, true) => (b, a),
                (true, true) => {
                    return Err(format!(
                        "both `{a}` and `{b}` look like remote references; one must be a local path"
                    ));
                }
                (false, false) => {
                    return Err(format!(
                        "neither `{a}` nor `{b}` looks like a remote reference"
                    ));
                }
            };
            Ok((PathBuf::from(local), Some(remote.clone())))
        }
        _ => Err("expected one or two targets".into()),
    }
}

fn state_name(state: SyncState) -> &'static str {
    match state {
        SyncState::InSync => "in-sync",
        SyncState::LocalAhead => "local-ahead",
        SyncState::RemoteAhead => "remote-ahead",
        SyncState::Diverged => "diverged",
    }
}

fn action_name(action: DocAction) -> &'static str {
    match action {
        DocAction::UpToDate => "up-to-date",
        DocAction::Pulled => "pulled",
        DocAction::Pushed => "pushed",
        DocAction::MergedApplied => "merged",
        DocAction::ConflictMarked => "conflict-marked",
    }
}

fn print_text_output(result: &DocResult, report: &DocSyncReport) {
    println!("Artifact: {}", result.artifact);
    println!("State:    {}", result.state);
    println!("Action:   {}", result.action);
    for name in &report.asset_failures {
        println!("  asset fetch failed: {name}");
    }
    if report.action == DocAction::ConflictMarked {
        println!();
        if !report.blocked_sections.is_empty() {
            println!("Blocked sections:");
            for id in &report.blocked_sections {
                println!("  {id}");
            }
        }
        println!("Both sides changed. Resolve the conflict block in the file,");
        println!("remove the marker, then sync again.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_target_uses_stored_reference() {
        let (artifact, remote) = resolve_direction(&["notes/plan.md".into()]).unwrap();
        assert_eq!(artifact, PathBuf::from("notes/plan.md"));
        assert!(remote.is_none());
    }

    #[test]
    fn two_targets_pick_remote_by_shape() {
        let (artifact, remote) = resolve_direction(&[
            "https://docs.google.com/document/d/abc/edit".into(),
            "notes/plan.md".into(),
        ])
        .unwrap();
        assert_eq!(artifact, PathBuf::from("notes/plan.md"));
        assert_eq!(
            remote.as_deref(),
            Some("https://docs.google.com/document/d/abc/edit")
        );

        // Order does not matter.
        let (artifact, remote) =
            resolve_direction(&["notes/plan.md".into(), "abc123".into()]).unwrap();
        assert_eq!(artifact, PathBuf::from("notes/plan.md"));
        assert_eq!(remote.as_deref(), Some("abc123"));
    }

    #[test]
    fn ambiguous_targets_are_rejected() {
        assert!(resolve_direction(&["abc".into(), "def".into()]).is_err());
        assert!(resolve_direction(&["a/b.md".into(), "c/d.md".into()]).is_err());
    }
}
