//! Task sync command implementation.

use marksync_engine::{IdentityLinker, SyncConfig, SyncOrchestrator, TaskSyncReport};
use marksync_remote::DirTaskRemote;
use serde::Serialize;
use std::path::Path;

/// Task sync result, flattened for output.
#[derive(Debug, Serialize)]
pub struct TasksResult {
    /// Checklist artifact path.
    pub tasks_file: String,
    /// Tasks completed locally from remote state.
    pub completed_from_remote: usize,
    /// Completion requests issued to the remote.
    pub completed_on_remote: usize,
    /// Capture entries appended.
    pub captured: usize,
    /// Completed unlinked remote items skipped.
    pub skipped_completed: usize,
    /// Unparseable task lines, skipped per item.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parse_errors: Vec<String>,
    /// Rejected binding attempts, skipped per item.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub binding_errors: Vec<String>,
}

/// Runs the task sync command.
pub fn run(
    remote_root: &Path,
    tasks_file: &Path,
    capture: &Path,
    links: &Path,
    service: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::new().with_anchor_service(service);
    let orchestrator = SyncOrchestrator::new(config);
    let remote = DirTaskRemote::new(remote_root.join("tasks.json"));
    let mut linker = IdentityLinker::load(links)?;
    tracing::info!(
        tasks = %tasks_file.display(),
        bindings = linker.len(),
        "starting task sync"
    );

    let report = orchestrator.sync_tasks(tasks_file, capture, &mut linker, &remote)?;
    let result = TasksResult {
        tasks_file: tasks_file.display().to_string(),
        completed_from_remote: report.completed_from_remote,
        completed_on_remote: report.completed_on_remote,
        captured: report.captured,
        skipped_completed: report.skipped_completed,
        parse_errors: report.parse_errors.clone(),
        binding_errors: report.binding_errors.clone(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result, &report),
    }
    Ok(())
}

fn print_text_output(result: &TasksResult, report: &TaskSyncReport) {
    println!("Checklist: {}", result.tasks_file);
    println!();
    println!("Pull:");
    println!("  completed locally:  {}", result.completed_from_remote);
    println!("  captured:           {}", result.captured);
    println!("  skipped (done):     {}", result.skipped_completed);
    println!("Push:");
    println!("  completed remotely: {}", result.completed_on_remote);

    if !report.parse_errors.is_empty() {
        println!();
        println!("Skipped lines:");
        for err in &report.parse_errors {
            println!("  {err}");
        }
    }
    if !report.binding_errors.is_empty() {
        println!();
        println!("Skipped bindings:");
        for err in &report.binding_errors {
            println!("  {err}");
        }
    }
}
