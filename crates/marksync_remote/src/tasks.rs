//! Task remote boundary.

use crate::error::RemoteResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Wire status of a remote task.
///
/// Mirrors the task service's status strings: `needsAction` for pending,
/// `completed` for done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteTaskStatus {
    /// Task is pending.
    #[serde(rename = "needsAction")]
    NeedsAction,
    /// Task is completed.
    #[serde(rename = "completed")]
    Completed,
}

/// One task item in the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Remote item id.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Wire status.
    pub status: RemoteTaskStatus,
    /// Due date, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    /// Remote completion time, if the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl RemoteTask {
    /// Returns true if the task is completed on the remote side.
    pub fn is_completed(&self) -> bool {
        self.status == RemoteTaskStatus::Completed
    }
}

/// A remote collaborator holding an independently-maintained task
/// collection.
///
/// `list_all` must return the full item set: the reconciler interprets a
/// linked id's absence as deletion, which only holds against a complete
/// fetch.
pub trait TaskRemote: Send + Sync {
    /// Fetches the full task set, completed items included.
    fn list_all(&self) -> RemoteResult<Vec<RemoteTask>>;

    /// Marks a remote task as completed.
    fn complete(&self, id: &str) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_wire_strings() {
        let json = serde_json::to_string(&RemoteTaskStatus::NeedsAction).unwrap();
        assert_eq!(json, "\"needsAction\"");
        let back: RemoteTaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(back, RemoteTaskStatus::Completed);
    }

    #[test]
    fn task_roundtrips_without_optional_fields() {
        let task = RemoteTask {
            id: "t1".into(),
            title: "Review".into(),
            status: RemoteTaskStatus::NeedsAction,
            due: None,
            completed_at: None,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("due"));
        let back: RemoteTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}
