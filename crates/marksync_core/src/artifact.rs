//! Local artifact loading and atomic saving.

use crate::error::{CoreError, CoreResult};
use crate::watermark::Watermark;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const FENCE: &str = "---";

/// A local, human-edited artifact: frontmatter plus markdown body.
///
/// Owned by the caller's filesystem; loaded fresh per invocation and never
/// held across invocations.
#[derive(Debug, Clone)]
pub struct LocalArtifact {
    /// Filesystem path the artifact was loaded from.
    pub path: PathBuf,
    /// Raw frontmatter lines, without the `---` fences.
    pub frontmatter: Vec<String>,
    /// Markdown body following the frontmatter.
    pub body: String,
    /// Filesystem modification time at load.
    pub local_modified: DateTime<Utc>,
}

impl LocalArtifact {
    /// Loads an artifact from disk, splitting frontmatter from body.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CoreError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)?;
        let modified: DateTime<Utc> = fs::metadata(path)?.modified()?.into();
        let (frontmatter, body) = split_frontmatter(&raw);
        Ok(Self {
            path: path.to_path_buf(),
            frontmatter,
            body,
            local_modified: modified,
        })
    }

    /// Creates an in-memory artifact not yet backed by a file.
    pub fn new(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            frontmatter: Vec::new(),
            body: body.into(),
            local_modified: Utc::now(),
        }
    }

    /// Parses the watermark from this artifact's frontmatter.
    pub fn watermark(&self, prefix: &str) -> CoreResult<Option<Watermark>> {
        Watermark::parse(&self.frontmatter, prefix)
    }

    /// Writes the watermark into this artifact's frontmatter.
    pub fn set_watermark(&mut self, watermark: &Watermark, prefix: &str) {
        watermark.apply_to(&mut self.frontmatter, prefix);
    }

    /// Renders the artifact to its on-disk form.
    pub fn render(&self) -> String {
        if self.frontmatter.is_empty() {
            return self.body.clone();
        }
        let mut out = String::new();
        out.push_str(FENCE);
        out.push('\n');
        for line in &self.frontmatter {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(FENCE);
        out.push('\n');
        out.push_str(&self.body);
        out
    }

    /// Saves the artifact atomically: write to a sibling temp file, sync it
    /// to disk, then rename over the target. Either the full new state
    /// lands on disk or nothing changes.
    pub fn save(&self) -> CoreResult<()> {
        let tmp = self.path.with_extension("marksync.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(self.render().as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Sets the saved file's modification time.
    pub fn set_modified(&self, at: DateTime<Utc>) -> CoreResult<()> {
        let file = fs::File::options().write(true).open(&self.path)?;
        file.set_modified(at.into())?;
        Ok(())
    }
}

/// Splits raw file content into frontmatter lines and body.
///
/// Frontmatter is an optional leading block fenced by `---` lines. Content
/// without a leading fence is all body.
fn split_frontmatter(raw: &str) -> (Vec<String>, String) {
    let mut lines = raw.lines();
    if lines.next() != Some(FENCE) {
        return (Vec::new(), raw.to_owned());
    }

    let mut frontmatter = Vec::new();
    for line in lines.by_ref() {
        if line == FENCE {
            let body: String = lines.map(|l| format!("{l}\n")).collect();
            return (frontmatter, body);
        }
        frontmatter.push(line.to_owned());
    }

    // Unterminated fence: treat the whole file as body.
    (Vec::new(), raw.to_owned())
}
