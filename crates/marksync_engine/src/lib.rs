//! # Marksync Engine
//!
//! Watermarked bidirectional synchronization engine.
//!
//! This crate provides:
//! - Sync state classification (in-sync, local-ahead, remote-ahead, diverged)
//! - Sectioned document merging with a pluggable merge strategy
//! - Anchor ↔ remote-id identity linking with uniqueness invariants
//! - Sticky-completion task reconciliation
//! - The per-invocation orchestrator and its result report
//!
//! ## Architecture
//!
//! One invocation is one sequential pass: gate on an unresolved conflict
//! marker, fetch the full remote snapshot, classify, dispatch, then apply
//! all local writes atomically. The engine never retries internally; any
//! remote failure terminates the invocation and retry policy stays with the
//! caller.
//!
//! ## Key Invariants
//!
//! - A conflict marker blocks all automated sync until a human clears it
//! - Completion is sticky: `Open → Complete` is the only transition
//! - An anchor binds to at most one remote id and vice versa, forever
//! - The watermark advances only on successful apply, and monotonically
//! - Divergence requires both a remote hash change and a newer local mtime

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod detect;
mod error;
mod linker;
mod merge;
mod orchestrator;
mod reconcile;

pub use config::SyncConfig;
pub use detect::{classify, SyncState};
pub use error::{SyncError, SyncResult};
pub use linker::IdentityLinker;
pub use merge::{merge_documents, MergeApprover, MergeOutcome, MergeProposal, MergeStrategy};
pub use orchestrator::{DocAction, DocSyncReport, SyncOrchestrator, TaskSyncReport};
pub use reconcile::{
    propagate_task_metadata, reconcile_pull, reconcile_push, CaptureEntry, Completion, PullOutcome,
};
