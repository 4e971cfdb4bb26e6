//! Status command implementation.

use marksync_core::{conflict_marked_at, contains_conflict_marker, LocalArtifact};
use serde::Serialize;
use std::path::Path;

/// Artifact status, read from local state only.
#[derive(Debug, Serialize)]
pub struct StatusResult {
    /// Artifact path.
    pub artifact: String,
    /// Whether the artifact carries a watermark block.
    pub watermarked: bool,
    /// Stored remote reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Stored remote id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// Time of the last successful sync (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
    /// Stored content digest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Whether an unresolved conflict marker blocks sync.
    pub conflict: bool,
    /// When the conflict block was written, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_marked_at: Option<String>,
}

/// Runs the status command. Never contacts the remote.
pub fn run(artifact: &Path, prefix: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = LocalArtifact::load(artifact)?;
    let watermark = loaded.watermark(prefix)?;
    let conflict = contains_conflict_marker(&loaded.body);

    let result = StatusResult {
        artifact: artifact.display().to_string(),
        watermarked: watermark.is_some(),
        remote_url: watermark.as_ref().map(|wm| wm.remote_url.clone()),
        remote_id: watermark.as_ref().map(|wm| wm.remote_id.clone()),
        last_sync: watermark.as_ref().map(|wm| wm.last_sync.to_rfc3339()),
        content_hash: watermark.as_ref().map(|wm| wm.content_hash.clone()),
        conflict,
        conflict_marked_at: conflict_marked_at(&loaded.body).map(|ts| ts.to_rfc3339()),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &StatusResult) {
    println!("Artifact: {}", result.artifact);
    match (&result.remote_id, &result.last_sync) {
        (Some(id), Some(last_sync)) => {
            println!("Remote:    {id}");
            println!("Last sync: {last_sync}");
            if let Some(hash) = &result.content_hash {
                println!("Hash:      {hash}");
            }
        }
        _ => println!("Not yet synced (no watermark)"),
    }
    if result.conflict {
        println!();
        match &result.conflict_marked_at {
            Some(ts) => println!("BLOCKED: unresolved conflict marked at {ts}"),
            None => println!("BLOCKED: unresolved conflict"),
        }
    }
}
