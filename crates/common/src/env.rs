//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

/// Create `dir` (and parents) if missing.
pub async fn ensure_dir(dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
    Ok(())
}

/// Create the parent directory of `file` if it has one.
pub async fn ensure_parent(file: &Path) -> anyhow::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display())),
        _ => Ok(()),
    }
}
