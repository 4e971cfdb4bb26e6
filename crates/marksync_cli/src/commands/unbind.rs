//! Unbind command implementation.
//!
//! Manual repair path for the link store. Nothing unbinds automatically;
//! remote deletion of a linked item completes it and keeps the link.

use marksync_engine::IdentityLinker;
use std::path::Path;

/// Runs the unbind command.
pub fn run(links: &Path, remote_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut linker = IdentityLinker::load(links)?;
    match linker.unbind(remote_id) {
        Some(anchor) => {
            linker.save()?;
            tracing::info!(remote_id, %anchor, "removed binding");
            println!("Unbound remote `{remote_id}` from anchor `{anchor}`");
            Ok(())
        }
        None => Err(format!("no binding found for remote id `{remote_id}`").into()),
    }
}
