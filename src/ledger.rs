//! JSON ledger files.
//!
//! A ledger is a flat JSON array of records. It is always rewritten as a whole:
//! the new content goes to a sibling temp file which is then renamed over the
//! ledger.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::ModError;
use crate::runtime::Runtime;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load every record of the ledger at `path`. A missing file is an empty ledger.
#[tracing::instrument(level = "debug", skip(runtime))]
pub fn load<R: Runtime, T: DeserializeOwned>(runtime: &R, path: &Path) -> Result<Vec<T>> {
    if !runtime.exists(path) {
        return Ok(Vec::new());
    }

    let content = runtime.read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ModError::MalformedLedger {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Replace the ledger at `path` with `records`.
#[tracing::instrument(level = "debug", skip(runtime, records))]
pub fn save<R: Runtime, T: Serialize>(runtime: &R, path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !runtime.exists(parent)
    {
        runtime.create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(records)?;
    let temp = temp_path(path);
    runtime
        .write(&temp, content.as_bytes())
        .with_context(|| format!("Failed to save ledger to {:?}", path))?;
    runtime
        .rename(&temp, path)
        .with_context(|| format!("Failed to replace ledger {:?}", path))
}
