//! Anchor ↔ remote-id identity linking.
//!
//! The link map is an explicit bidirectional map with uniqueness
//! invariants, not cross-references embedded in item objects: the two id
//! spaces are independently owned, and an explicit map cannot dangle or
//! alias. Persisted as a JSON file so the binding survives across
//! invocations.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bidirectional map between local anchors and remote item ids.
///
/// A given anchor maps to at most one remote id and vice versa; once
/// created, a link is never repointed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IdentityLinker {
    anchor_to_remote: BTreeMap<String, String>,
    remote_to_anchor: BTreeMap<String, String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl IdentityLinker {
    /// Creates an empty, unpersisted linker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the linker from a JSON file; a missing file is an empty map.
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let mut linker = if path.exists() {
            let raw = fs::read_to_string(path).map_err(marksync_core::CoreError::from)?;
            serde_json::from_str::<Self>(&raw).map_err(|e| {
                marksync_core::CoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("malformed link store {}: {e}", path.display()),
                ))
            })?
        } else {
            Self::default()
        };
        linker.path = Some(path.to_path_buf());
        Ok(linker)
    }

    /// Saves the linker atomically to its backing file, if it has one.
    pub fn save(&self) -> SyncResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(self).map_err(|e| {
            marksync_core::CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(marksync_core::CoreError::from)?;
        fs::rename(&tmp, path).map_err(marksync_core::CoreError::from)?;
        Ok(())
    }

    /// Resolves an anchor to its remote id.
    pub fn resolve(&self, anchor_id: &str) -> Option<&str> {
        self.anchor_to_remote.get(anchor_id).map(String::as_str)
    }

    /// Resolves a remote id to its anchor.
    pub fn resolve_reverse(&self, remote_id: &str) -> Option<&str> {
        self.remote_to_anchor.get(remote_id).map(String::as_str)
    }

    /// Binds an anchor to a remote id.
    ///
    /// Rebinding the same pair is a no-op. Binding either side to a
    /// different counterpart fails with [`SyncError::DuplicateBinding`] and
    /// leaves the original binding intact.
    pub fn bind(&mut self, anchor_id: &str, remote_id: &str) -> SyncResult<()> {
        if let Some(existing) = self.anchor_to_remote.get(anchor_id) {
            if existing == remote_id {
                return Ok(());
            }
            return Err(SyncError::DuplicateBinding {
                anchor: anchor_id.to_owned(),
                remote_id: remote_id.to_owned(),
                existing: existing.clone(),
            });
        }
        if let Some(existing) = self.remote_to_anchor.get(remote_id) {
            return Err(SyncError::DuplicateBinding {
                anchor: anchor_id.to_owned(),
                remote_id: remote_id.to_owned(),
                existing: existing.clone(),
            });
        }
        self.anchor_to_remote
            .insert(anchor_id.to_owned(), remote_id.to_owned());
        self.remote_to_anchor
            .insert(remote_id.to_owned(), anchor_id.to_owned());
        Ok(())
    }

    /// Removes the binding for a remote id, returning its anchor.
    ///
    /// Manual repair path; nothing calls this automatically (remote
    /// deletion of a linked item is treated as completion, keeping the
    /// link).
    pub fn unbind(&mut self, remote_id: &str) -> Option<String> {
        let anchor = self.remote_to_anchor.remove(remote_id)?;
        self.anchor_to_remote.remove(&anchor);
        Some(anchor)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.anchor_to_remote.len()
    }

    /// Returns true if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.anchor_to_remote.is_empty()
    }
}
