//! # Marksync Remote
//!
//! Remote collaborator boundary for marksync.
//!
//! This crate defines the traits the engine syncs against and the snapshot
//! types they exchange. Concrete API clients (Google Docs, Google Tasks,
//! OAuth handling) live outside the engine; what ships here is:
//! - [`DocumentRemote`] / [`TaskRemote`] trait boundaries
//! - Read-only snapshot types ([`DocumentSnapshot`], [`RemoteTask`])
//! - Mock remotes with scripted responses and call counters, for tests
//! - Directory-backed remotes, an in-process stand-in for the cloud side
//!
//! The engine fetches a full snapshot before deciding any transition and
//! never retries internally; transport failures surface as [`RemoteError`]
//! and terminate the invocation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dir;
mod document;
mod error;
mod mock;
mod tasks;

pub use dir::{DirDocumentRemote, DirTaskRemote};
pub use document::{
    extract_remote_id, looks_like_remote, AssetRef, DocumentRemote, DocumentSnapshot,
};
pub use error::{RemoteError, RemoteResult};
pub use mock::{MockDocumentRemote, MockTaskRemote};
pub use tasks::{RemoteTask, RemoteTaskStatus, TaskRemote};
