//! Directory-backed remotes.
//!
//! A plain folder standing in for the cloud side: documents as `{id}.md`
//! files, the task collection as a single JSON file. Useful for local
//! testing and demos without credentials, the same way a loopback transport
//! stands in for a real server.

use crate::document::{AssetRef, DocumentRemote, DocumentSnapshot};
use crate::error::{RemoteError, RemoteResult};
use crate::tasks::{RemoteTask, RemoteTaskStatus, TaskRemote};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Document remote over a directory of `{id}.md` files.
#[derive(Debug, Clone)]
pub struct DirDocumentRemote {
    root: PathBuf,
}

impl DirDocumentRemote {
    /// Creates a remote over the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.md"))
    }

    fn assets_dir(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}_assets"))
    }
}

impl DocumentRemote for DirDocumentRemote {
    fn fetch(&self, id: &str) -> RemoteResult<DocumentSnapshot> {
        let path = self.doc_path(id);
        if !path.exists() {
            return Err(RemoteError::NotFound {
                reference: id.to_owned(),
            });
        }
        let content = fs::read_to_string(&path).map_err(io_error)?;
        let last_modified = mtime(&path)?;
        Ok(DocumentSnapshot {
            id: id.to_owned(),
            content,
            last_modified,
        })
    }

    fn write(&self, id: &str, content: &str) -> RemoteResult<DocumentSnapshot> {
        let path = self.doc_path(id);
        fs::write(&path, content).map_err(io_error)?;
        let last_modified = mtime(&path)?;
        Ok(DocumentSnapshot {
            id: id.to_owned(),
            content: content.to_owned(),
            last_modified,
        })
    }

    fn assets(&self, id: &str) -> RemoteResult<Vec<AssetRef>> {
        let dir = self.assets_dir(id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut assets = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if entry.file_type().map_err(io_error)?.is_file() {
                assets.push(AssetRef {
                    name: entry.file_name().to_string_lossy().into_owned(),
                });
            }
        }
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assets)
    }

    fn fetch_asset(&self, id: &str, asset: &AssetRef) -> RemoteResult<Vec<u8>> {
        fs::read(self.assets_dir(id).join(&asset.name)).map_err(|e| RemoteError::AssetFetch {
            name: asset.name.clone(),
            message: e.to_string(),
        })
    }
}

/// Task remote over a single JSON file holding the full collection.
#[derive(Debug, Clone)]
pub struct DirTaskRemote {
    path: PathBuf,
}

impl DirTaskRemote {
    /// Creates a remote over the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> RemoteResult<Vec<RemoteTask>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(io_error)?;
        serde_json::from_str(&raw).map_err(|e| RemoteError::Network {
            message: format!("malformed task collection: {e}"),
            retryable: false,
        })
    }

    fn store(&self, tasks: &[RemoteTask]) -> RemoteResult<()> {
        let raw = serde_json::to_string_pretty(tasks).map_err(|e| RemoteError::Network {
            message: e.to_string(),
            retryable: false,
        })?;
        fs::write(&self.path, raw).map_err(io_error)
    }
}

impl TaskRemote for DirTaskRemote {
    fn list_all(&self) -> RemoteResult<Vec<RemoteTask>> {
        self.load()
    }

    fn complete(&self, id: &str) -> RemoteResult<()> {
        let mut tasks = self.load()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Err(RemoteError::NotFound {
                reference: id.to_owned(),
            });
        };
        task.status = RemoteTaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        self.store(&tasks)
    }
}

fn mtime(path: &Path) -> RemoteResult<DateTime<Utc>> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(io_error)?;
    Ok(modified.into())
}

fn io_error(e: std::io::Error) -> RemoteError {
    RemoteError::Network {
        message: e.to_string(),
        retryable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn document_fetch_write_roundtrip() {
        let dir = TempDir::new().unwrap();
        let remote = DirDocumentRemote::new(dir.path());

        assert!(matches!(
            remote.fetch("d1"),
            Err(RemoteError::NotFound { .. })
        ));

        remote.write("d1", "# Hello\n").unwrap();
        let doc = remote.fetch("d1").unwrap();
        assert_eq!(doc.content, "# Hello\n");
        assert_eq!(doc.id, "d1");
    }

    #[test]
    fn assets_listing_is_sorted() {
        let dir = TempDir::new().unwrap();
        let assets_dir = dir.path().join("d1_assets");
        fs::create_dir(&assets_dir).unwrap();
        fs::write(assets_dir.join("b.png"), b"b").unwrap();
        fs::write(assets_dir.join("a.png"), b"a").unwrap();

        let remote = DirDocumentRemote::new(dir.path());
        let assets = remote.assets("d1").unwrap();
        let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(remote.fetch_asset("d1", &assets[0]).unwrap(), b"a");
    }

    #[test]
    fn task_complete_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let remote = DirTaskRemote::new(&path);
        assert!(remote.list_all().unwrap().is_empty());

        let tasks = vec![RemoteTask {
            id: "t1".into(),
            title: "Review".into(),
            status: RemoteTaskStatus::NeedsAction,
            due: None,
            completed_at: None,
        }];
        remote.store(&tasks).unwrap();

        remote.complete("t1").unwrap();
        let listed = remote.list_all().unwrap();
        assert!(listed[0].is_completed());
        assert!(listed[0].completed_at.is_some());
    }
}
