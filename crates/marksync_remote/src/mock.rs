//! Mock remotes for testing.
//!
//! Scripted responses behind mutexes, plus call counters so tests can prove
//! a code path never contacted the remote at all (the conflict-marker gate
//! requires exactly that).

use crate::document::{AssetRef, DocumentRemote, DocumentSnapshot};
use crate::error::{RemoteError, RemoteResult};
use crate::tasks::{RemoteTask, RemoteTaskStatus, TaskRemote};
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A mock document remote with a scripted document.
#[derive(Debug, Default)]
pub struct MockDocumentRemote {
    document: Mutex<Option<DocumentSnapshot>>,
    assets: Mutex<Vec<AssetRef>>,
    failing_assets: Mutex<Vec<String>>,
    fail_next_fetch: Mutex<Option<RemoteError>>,
    fail_next_write: Mutex<Option<RemoteError>>,
    fetch_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl MockDocumentRemote {
    /// Creates an empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the document the next fetches will return.
    pub fn set_document(&self, snapshot: DocumentSnapshot) {
        *self.document.lock().unwrap() = Some(snapshot);
    }

    /// Scripts the asset list.
    pub fn set_assets(&self, assets: Vec<AssetRef>) {
        *self.assets.lock().unwrap() = assets;
    }

    /// Marks asset names whose fetch will fail.
    pub fn set_failing_assets(&self, names: Vec<String>) {
        *self.failing_assets.lock().unwrap() = names;
    }

    /// Makes the next fetch fail with the given error.
    pub fn fail_next_fetch(&self, error: RemoteError) {
        *self.fail_next_fetch.lock().unwrap() = Some(error);
    }

    /// Makes the next write fail with the given error.
    pub fn fail_next_write(&self, error: RemoteError) {
        *self.fail_next_write.lock().unwrap() = Some(error);
    }

    /// Number of fetch calls made so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of write calls made so far.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// The currently stored document, if any.
    pub fn current(&self) -> Option<DocumentSnapshot> {
        self.document.lock().unwrap().clone()
    }
}

impl DocumentRemote for MockDocumentRemote {
    fn fetch(&self, id: &str) -> RemoteResult<DocumentSnapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next_fetch.lock().unwrap().take() {
            return Err(err);
        }
        self.document
            .lock()
            .unwrap()
            .clone()
            .filter(|d| d.id == id)
            .ok_or_else(|| RemoteError::NotFound {
                reference: id.to_owned(),
            })
    }

    fn write(&self, id: &str, content: &str) -> RemoteResult<DocumentSnapshot> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next_write.lock().unwrap().take() {
            return Err(err);
        }
        let snapshot = DocumentSnapshot {
            id: id.to_owned(),
            content: content.to_owned(),
            last_modified: Utc::now() + Duration::seconds(1),
        };
        *self.document.lock().unwrap() = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn assets(&self, _id: &str) -> RemoteResult<Vec<AssetRef>> {
        Ok(self.assets.lock().unwrap().clone())
    }

    fn fetch_asset(&self, _id: &str, asset: &AssetRef) -> RemoteResult<Vec<u8>> {
        if self
            .failing_assets
            .lock()
            .unwrap()
            .iter()
            .any(|n| *n == asset.name)
        {
            return Err(RemoteError::AssetFetch {
                name: asset.name.clone(),
                message: "scripted failure".into(),
            });
        }
        Ok(asset.name.as_bytes().to_vec())
    }
}

/// A mock task remote over an in-memory task set.
#[derive(Debug, Default)]
pub struct MockTaskRemote {
    tasks: Mutex<Vec<RemoteTask>>,
    fail_next_list: Mutex<Option<RemoteError>>,
    fail_next_complete: Mutex<Option<RemoteError>>,
    list_calls: AtomicUsize,
    complete_calls: Mutex<Vec<String>>,
}

impl MockTaskRemote {
    /// Creates an empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full scripted task set.
    pub fn set_tasks(&self, tasks: Vec<RemoteTask>) {
        *self.tasks.lock().unwrap() = tasks;
    }

    /// Makes the next list call fail with the given error.
    pub fn fail_next_list(&self, error: RemoteError) {
        *self.fail_next_list.lock().unwrap() = Some(error);
    }

    /// Makes the next complete call fail with the given error.
    pub fn fail_next_complete(&self, error: RemoteError) {
        *self.fail_next_complete.lock().unwrap() = Some(error);
    }

    /// Number of list calls made so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Ids passed to `complete`, in call order.
    pub fn completed_ids(&self) -> Vec<String> {
        self.complete_calls.lock().unwrap().clone()
    }

    /// The current task set.
    pub fn current(&self) -> Vec<RemoteTask> {
        self.tasks.lock().unwrap().clone()
    }
}

impl TaskRemote for MockTaskRemote {
    fn list_all(&self) -> RemoteResult<Vec<RemoteTask>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next_list.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    fn complete(&self, id: &str) -> RemoteResult<()> {
        if let Some(err) = self.fail_next_complete.lock().unwrap().take() {
            return Err(err);
        }
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Err(RemoteError::NotFound {
                reference: id.to_owned(),
            });
        };
        task.status = RemoteTaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        self.complete_calls.lock().unwrap().push(id.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, content: &str) -> DocumentSnapshot {
        DocumentSnapshot {
            id: id.into(),
            content: content.into(),
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn fetch_counts_and_scripted_document() {
        let remote = MockDocumentRemote::new();
        remote.set_document(snapshot("d1", "hello"));

        assert_eq!(remote.fetch_calls(), 0);
        let doc = remote.fetch("d1").unwrap();
        assert_eq!(doc.content, "hello");
        assert_eq!(remote.fetch_calls(), 1);

        assert!(matches!(
            remote.fetch("other"),
            Err(RemoteError::NotFound { .. })
        ));
    }

    #[test]
    fn write_replaces_document() {
        let remote = MockDocumentRemote::new();
        remote.set_document(snapshot("d1", "old"));
        let written = remote.write("d1", "new").unwrap();
        assert_eq!(written.content, "new");
        assert_eq!(remote.current().unwrap().content, "new");
    }

    #[test]
    fn scripted_fetch_failure_is_one_shot() {
        let remote = MockDocumentRemote::new();
        remote.set_document(snapshot("d1", "x"));
        remote.fail_next_fetch(RemoteError::RateLimited("quota".into()));

        assert!(matches!(
            remote.fetch("d1"),
            Err(RemoteError::RateLimited(_))
        ));
        assert!(remote.fetch("d1").is_ok());
    }

    #[test]
    fn failing_asset_reports_asset_fetch() {
        let remote = MockDocumentRemote::new();
        remote.set_assets(vec![
            AssetRef { name: "a.png".into() },
            AssetRef { name: "b.png".into() },
        ]);
        remote.set_failing_assets(vec!["b.png".into()]);

        let assets = remote.assets("d1").unwrap();
        assert!(remote.fetch_asset("d1", &assets[0]).is_ok());
        assert!(matches!(
            remote.fetch_asset("d1", &assets[1]),
            Err(RemoteError::AssetFetch { .. })
        ));
    }

    #[test]
    fn complete_marks_task() {
        let remote = MockTaskRemote::new();
        remote.set_tasks(vec![RemoteTask {
            id: "t1".into(),
            title: "Review".into(),
            status: RemoteTaskStatus::NeedsAction,
            due: None,
            completed_at: None,
        }]);

        remote.complete("t1").unwrap();
        assert_eq!(remote.completed_ids(), vec!["t1".to_owned()]);
        assert!(remote.current()[0].is_completed());

        assert!(matches!(
            remote.complete("missing"),
            Err(RemoteError::NotFound { .. })
        ));
    }
}
