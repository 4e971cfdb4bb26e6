//! CLI command implementations.

pub mod doc;
pub mod status;
pub mod tasks;
pub mod unbind;
