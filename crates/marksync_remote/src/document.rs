//! Document remote boundary.

use crate::error::RemoteResult;
use chrono::{DateTime, Utc};

/// A fetched remote document. Read-only input to the engine; mutation goes
/// only through [`DocumentRemote::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Remote document id.
    pub id: String,
    /// Document content as markdown.
    pub content: String,
    /// Remote-reported modification time.
    pub last_modified: DateTime<Utc>,
}

/// An embedded asset referenced by a document (e.g. an image).
///
/// The engine only tracks fetch outcomes per asset; transcoding and storage
/// belong to external collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Asset name, unique within the document.
    pub name: String,
}

/// A remote collaborator holding one independently-editable document.
///
/// Implementations handle the concrete API; the engine calls each method at
/// most once per invocation and treats any error as terminating the run.
pub trait DocumentRemote: Send + Sync {
    /// Fetches the current document snapshot.
    fn fetch(&self, id: &str) -> RemoteResult<DocumentSnapshot>;

    /// Writes new content, returning the post-write snapshot.
    fn write(&self, id: &str, content: &str) -> RemoteResult<DocumentSnapshot>;

    /// Lists assets embedded in the document.
    fn assets(&self, id: &str) -> RemoteResult<Vec<AssetRef>>;

    /// Fetches one asset's bytes.
    fn fetch_asset(&self, id: &str, asset: &AssetRef) -> RemoteResult<Vec<u8>>;
}

/// Extracts the document id from a remote reference.
///
/// Accepts either a bare id or a full URL of the form `.../d/{ID}/...`.
pub fn extract_remote_id(reference: &str) -> String {
    if let Some(pos) = reference.find("/d/") {
        let rest = &reference[pos + 3..];
        let end = rest.find('/').unwrap_or(rest.len());
        return rest[..end].to_owned();
    }
    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(reference)
        .to_owned()
}

/// Returns true if the reference looks like a remote target rather than a
/// local path: a URL, or a bare id with no path separators or extension.
pub fn looks_like_remote(reference: &str) -> bool {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return true;
    }
    !reference.contains('/') && !reference.contains('.')
}
