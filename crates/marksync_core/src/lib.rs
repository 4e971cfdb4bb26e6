//! # Marksync Core
//!
//! Artifact model and content primitives for marksync.
//!
//! This crate provides:
//! - Local artifact loading/saving with frontmatter handling
//! - Watermark block parse/serialize (the last-agreed sync state)
//! - Content hashing (`sha256:<hex>` digests)
//! - Heading-based document sectioning with content-derived ids
//! - Markdown checklist parsing with remote anchors
//! - Conflict marker wrap/detect
//!
//! ## Key Invariants
//!
//! - A watermark is either fully parsed or absent; a present field that
//!   cannot be parsed is an error, never a silent default
//! - Artifact writes are atomic (temp file + rename)
//! - Frontmatter keys outside the watermark prefix are preserved untouched
//! - Section ids derive from content alone, never from byte offsets

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod conflict;
mod error;
mod hash;
mod section;
mod tasklist;
mod watermark;

pub use artifact::LocalArtifact;
pub use conflict::{conflict_marked_at, contains_conflict_marker, wrap_conflict, CONFLICT_MARKER};
pub use error::{CoreError, CoreResult};
pub use hash::content_hash;
pub use section::{split_sections, Section};
pub use tasklist::{
    anchor_token, complete_task_line, format_capture_line, parse_tasks, LocalTask, TaskParseOutcome,
    TaskStatus,
};
pub use watermark::Watermark;
